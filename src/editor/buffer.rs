use ropey::Rope;
use unicode_width::UnicodeWidthChar;

/// Spaces inserted by the Tab key.
pub const TAB_WIDTH: usize = 4;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in characters.
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Editable text of one document, backed by a rope.
///
/// The buffer only knows text and cursor; whether the text differs from
/// disk is tracked by the session.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    scroll: usize,
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
            scroll: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Replace the whole text, keeping the cursor as close as possible.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let Cursor { line, col, .. } = self.cursor;
        self.move_to(line, col);
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// First visible line.
    pub const fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its line ending.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx).to_string();
        Some(line.trim_end_matches(is_line_break).to_string())
    }

    /// Length of a line in characters, without its line ending.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Terminal column of the cursor, accounting for wide characters.
    pub fn display_col(&self) -> usize {
        self.line_at(self.cursor.line)
            .unwrap_or_default()
            .chars()
            .take(self.cursor.col)
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    pub fn insert_char(&mut self, ch: char) {
        if matches!(ch, '\n' | '\r') {
            self.split_line();
            return;
        }
        if is_line_break(ch) {
            self.insert_str(ch.encode_utf8(&mut [0; 4]));
            return;
        }
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, ch);
        self.cursor.set_col(self.cursor.col + 1);
    }

    /// Insert `s` at the cursor and leave the cursor after it.
    ///
    /// `\r\n` and lone `\r` are stored as `\n`.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let text = normalize_newlines(s);
        let idx = self.cursor_char_idx();
        self.rope.insert(idx, &text);

        let end = idx + text.chars().count();
        let line = self.rope.char_to_line(end);
        self.cursor.line = line;
        self.cursor.set_col(end - self.rope.line_to_char(line));
    }

    /// Insert spaces up to the next tab stop.
    pub fn insert_tab(&mut self) {
        let pad = TAB_WIDTH - self.cursor.col % TAB_WIDTH;
        self.insert_str(&" ".repeat(pad));
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }

        if self.cursor.col == 0 {
            // Join with previous line, removing its whole line ending.
            let prev = self.cursor.line - 1;
            let prev_len = self.line_len(prev);
            let prev_end = self.rope.line_to_char(prev) + prev_len;
            let line_start = self.rope.line_to_char(self.cursor.line);
            self.rope.remove(prev_end..line_start);
            self.cursor.line = prev;
            self.cursor.set_col(prev_len);
        } else {
            let idx = self.cursor_char_idx();
            self.rope.remove(idx - 1..idx);
            self.cursor.set_col(self.cursor.col - 1);
        }
        true
    }

    /// Delete the character at the cursor (Delete key).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        let line_len = self.line_len(self.cursor.line);
        let idx = self.cursor_char_idx();

        if self.cursor.col < line_len {
            self.rope.remove(idx..=idx);
            return true;
        }
        if self.cursor.line + 1 >= self.line_count() {
            return false;
        }
        let next_start = self.rope.line_to_char(self.cursor.line + 1);
        self.rope.remove(idx..next_start);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }

        let chars: Vec<char> = self.line_at(self.cursor.line).unwrap_or_default().chars().collect();
        let mut pos = self.cursor.col.min(chars.len());
        while pos > 0 && !is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        self.cursor.set_col(pos);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        let chars: Vec<char> = self.line_at(self.cursor.line).unwrap_or_default().chars().collect();

        if self.cursor.col >= chars.len() {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let mut pos = self.cursor.col;
        while pos < chars.len() && is_word_char(chars[pos]) {
            pos += 1;
        }
        while pos < chars.len() && !is_word_char(chars[pos]) {
            pos += 1;
        }
        self.cursor.set_col(pos);
    }

    /// Move cursor to a line and column, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let max_col = self.line_len(self.cursor.line);
        self.cursor.set_col(col.min(max_col));
    }

    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    pub fn move_to_end(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.cursor.line = last_line;
        self.cursor.set_col(self.line_len(last_line));
    }

    pub fn page_up(&mut self, rows: usize) {
        self.move_lines(-isize::try_from(rows.max(1)).unwrap_or(isize::MAX));
    }

    pub fn page_down(&mut self, rows: usize) {
        self.move_lines(isize::try_from(rows.max(1)).unwrap_or(isize::MAX));
    }

    /// Adjust the scroll offset so the cursor is inside a `height`-row view.
    pub const fn ensure_cursor_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor.line < self.scroll {
            self.scroll = self.cursor.line;
        } else if self.cursor.line >= self.scroll + height {
            self.scroll = self.cursor.line + 1 - height;
        }
    }

    // --- Private helpers ---

    fn cursor_char_idx(&self) -> usize {
        let col = self.cursor.col.min(self.line_len(self.cursor.line));
        self.rope.line_to_char(self.cursor.line) + col
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.set_col(self.cursor.col - 1);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.line) {
            self.cursor.set_col(self.cursor.col + 1);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let target = self.cursor.line.saturating_add_signed(delta);
        if target == self.cursor.line || target >= self.line_count() {
            return;
        }
        self.cursor.line = target;
        self.cursor.col = self.cursor.col_memory.min(self.line_len(target));
    }

    fn move_lines(&mut self, delta: isize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = self.cursor.line.saturating_add_signed(delta).min(max_line);
        self.cursor.col = self.cursor.col_memory.min(self.line_len(self.cursor.line));
    }
}

/// Characters ropey treats as ending a line.
const fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

fn normalize_newlines(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains('\r') {
        std::borrow::Cow::Owned(s.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("scroll", &self.scroll)
            .finish()
    }
}
