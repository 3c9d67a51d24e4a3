use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::session::Session;
use crate::storage::FsStorage;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Holds back preview re-rendering until typing pauses.
///
/// Every queued edit restarts the delay, so a burst of keystrokes renders
/// once.
pub(super) struct PreviewDebouncer {
    delay_ms: u64,
    pending: Option<u64>,
}

impl PreviewDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, now_ms: u64) {
        self.pending = Some(now_ms);
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.pending else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let open_scope = crate::perf::scope("app.open_startup_files");
        let session = self.build_session();
        drop(open_scope);

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: mdtab requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;

        crate::perf::log_event(
            "init.layout",
            format!(
                "terminal={}x{} documents={} preview={}",
                size.width,
                size.height,
                session.len(),
                self.preview_visible
            ),
        );

        let mut model = Model::new(session, (size.width, size.height));
        model.preview_visible = self.preview_visible;

        let result = self.event_loop(&mut terminal, model);

        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();

        result
    }

    /// Open the startup files, or one untitled document when there are none.
    pub(super) fn build_session(&self) -> Session {
        let mut session = Session::new(FsStorage);
        let paths = crate::bootstrap::startup_files(
            &self.app_dir,
            &self.files,
            self.cheatsheet_enabled,
        );
        // Each open activates its tab, so the last file ends up in front.
        for path in &paths {
            session.open_document(path);
        }
        if session.is_empty() {
            session.create_document();
        }
        session
    }

    fn event_loop(&self, terminal: &mut DefaultTerminal, mut model: Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut preview_debouncer =
            PreviewDebouncer::new(u64::try_from(self.preview_delay.as_millis()).unwrap_or(u64::MAX));
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                model = update(model, Message::Resize(width, height));
                needs_render = true;
            }

            if model.take_preview_request() {
                preview_debouncer.queue(now_ms);
            }
            if preview_debouncer.take_ready(now_ms) {
                model = update(model, Message::RefreshPreview);
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() || preview_debouncer.is_pending() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, &model, event_ms, &mut resize_debouncer)
                {
                    crate::perf::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    model = Self::dispatch(model, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                let mut drained = 0_u32;
                while !model.should_quit && event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, &model, drain_ms, &mut resize_debouncer)
                    {
                        drained += 1;
                        model = Self::dispatch(model, msg);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            if model.should_quit {
                break;
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| Self::view(&model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }
        }
        Ok(())
    }

    /// Run `msg` through [`update`] and then its side effects.
    pub(super) fn dispatch(model: Model, msg: Message) -> Model {
        let side_msg = msg.clone();
        let mut model = update(model, msg);
        Self::handle_message_side_effects(&mut model, &side_msg);
        model
    }
}
