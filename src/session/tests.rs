use std::path::{Path, PathBuf};
use std::rc::Rc;

use proptest::prelude::*;
use tempfile::tempdir;

use super::*;
use crate::storage::{FsStorage, MemoryStorage};

/// Prompter that records what it was asked.
#[derive(Default)]
struct RecordingPrompter {
    path: Option<PathBuf>,
    choice: Option<SaveChoice>,
    path_requests: usize,
    confirm_requests: Vec<usize>,
}

impl RecordingPrompter {
    fn choosing(path: &str) -> Self {
        Self {
            path: Some(PathBuf::from(path)),
            ..Self::default()
        }
    }

    fn confirming(choice: SaveChoice) -> Self {
        Self {
            choice: Some(choice),
            ..Self::default()
        }
    }
}

impl Prompter for RecordingPrompter {
    fn choose_save_path(&mut self, _document: &Document) -> Option<PathBuf> {
        self.path_requests += 1;
        self.path.clone()
    }

    fn confirm_save(&mut self, dirty: &[&Document]) -> SaveChoice {
        self.confirm_requests.push(dirty.len());
        self.choice.unwrap_or(SaveChoice::Cancel)
    }
}

fn memory_session() -> (Session, Rc<MemoryStorage>) {
    let storage = Rc::new(MemoryStorage::new().with_file("/docs/a.md", "# A"));
    (Session::new(Rc::clone(&storage)), storage)
}

fn title_changes(events: &[SessionEvent], id: DocumentId) -> usize {
    events
        .iter()
        .filter(|e| **e == SessionEvent::TitleChanged(id))
        .count()
}

#[test]
fn test_create_document_is_dirty_and_unbound() {
    let (mut session, _) = memory_session();
    let id = session.create_document();
    let doc = session.get(id).unwrap();
    assert!(doc.is_dirty());
    assert!(doc.path().is_none());
    assert_eq!(doc.content(), "");
    assert_eq!(session.active_id(), Some(id));
}

#[test]
fn test_create_document_emits_opened_and_activated() {
    let (mut session, _) = memory_session();
    let id = session.create_document();
    assert_eq!(
        session.drain_events(),
        vec![SessionEvent::Opened(id), SessionEvent::Activated(id)]
    );
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_ids_are_not_reused_after_close() {
    let (mut session, _) = memory_session();
    let first = session.create_document();
    session
        .close_document(first, &mut PromptAnswers::confirming(SaveChoice::Discard))
        .unwrap();
    let second = session.create_document();
    assert_ne!(first, second);
}

#[test]
fn test_open_document_loads_clean_bound_content() {
    let (mut session, _) = memory_session();
    let id = session.open_document("/docs/a.md");
    let doc = session.get(id).unwrap();
    assert_eq!(doc.content(), "# A");
    assert!(!doc.is_dirty());
    assert_eq!(doc.path(), Some(Path::new("/docs/a.md")));
    assert_eq!(doc.display_title(), "a.md");
}

#[test]
fn test_open_same_path_twice_yields_one_document() {
    let (mut session, storage) = memory_session();
    let first = session.open_document("/docs/a.md");
    let other = session.create_document();
    session.drain_events();

    let second = session.open_document("/docs/../docs/a.md");
    assert_eq!(first, second);
    assert_eq!(session.len(), 2);
    assert_eq!(session.active_id(), Some(first));
    assert_ne!(session.active_id(), Some(other));
    assert_eq!(session.drain_events(), vec![SessionEvent::Activated(first)]);
    assert_eq!(storage.read_count(), 1);
}

#[test]
fn test_open_nonexistent_path_shows_error_without_writing() {
    let (mut session, storage) = memory_session();
    let id = session.open_document("/nope/missing.md");
    let doc = session.get(id).unwrap();
    assert!(doc.content().contains("Error loading file"));
    assert!(!doc.is_dirty());
    assert!(doc.path().is_none());
    assert_eq!(doc.display_title(), "missing.md");
    assert_eq!(storage.write_count(), 0);
    assert_eq!(session.active_id(), Some(id));
}

#[test]
fn test_failed_open_is_not_treated_as_open_path() {
    let (mut session, _) = memory_session();
    let first = session.open_document("/nope/missing.md");
    let second = session.open_document("/nope/missing.md");
    assert_ne!(first, second);
}

#[test]
fn test_edit_marks_dirty_title_once() {
    let (mut session, _) = memory_session();
    let id = session.open_document("/docs/a.md");
    session.drain_events();

    session.edit_document(id, "# A!").unwrap();
    session.edit_document(id, "# A!!").unwrap();
    let events = session.drain_events();

    assert_eq!(title_changes(&events, id), 1);
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == SessionEvent::ContentChanged(id))
            .count(),
        2
    );
    let doc = session.get(id).unwrap();
    assert!(doc.is_dirty());
    assert_eq!(doc.display_title(), "* a.md");
    assert_eq!(doc.content(), "# A!!");
}

#[test]
fn test_edit_new_document_never_marks_title() {
    let (mut session, _) = memory_session();
    let id = session.create_document();
    session.drain_events();
    session.edit_document(id, "x").unwrap();
    assert_eq!(title_changes(&session.drain_events(), id), 0);
}

#[test]
fn test_edit_unknown_document_is_an_error() {
    let (mut session, _) = memory_session();
    let id = session.create_document();
    session
        .close_document(id, &mut PromptAnswers::confirming(SaveChoice::Discard))
        .unwrap();
    assert_eq!(
        session.edit_document(id, "x"),
        Err(SessionError::UnknownDocument(id))
    );
}

#[test]
fn test_save_clean_document_is_noop() {
    let (mut session, storage) = memory_session();
    let id = session.open_document("/docs/a.md");
    let mut prompter = RecordingPrompter::default();
    let outcome = session.save_document(id, &mut prompter).unwrap();
    assert!(matches!(outcome, SaveOutcome::Unchanged));
    assert!(outcome.is_success());
    assert_eq!(storage.write_count(), 0);
    assert_eq!(prompter.path_requests, 0);
}

#[test]
fn test_save_bound_document_writes_in_place() {
    let (mut session, storage) = memory_session();
    let id = session.open_document("/docs/a.md");
    session.edit_document(id, "# B").unwrap();
    session.drain_events();

    let mut prompter = RecordingPrompter::default();
    let outcome = session.save_document(id, &mut prompter).unwrap();

    assert!(matches!(outcome, SaveOutcome::Saved(ref p) if p == Path::new("/docs/a.md")));
    assert_eq!(prompter.path_requests, 0);
    let doc = session.get(id).unwrap();
    assert!(!doc.is_dirty());
    assert_eq!(doc.path(), Some(Path::new("/docs/a.md")));
    assert_eq!(storage.contents("/docs/a.md").as_deref(), Some("# B"));
    assert_eq!(session.drain_events(), vec![SessionEvent::TitleChanged(id)]);
}

#[test]
fn test_save_unbound_document_binds_chosen_path() {
    let (mut session, storage) = memory_session();
    let id = session.create_document();
    session.edit_document(id, "hello").unwrap();

    let mut prompter = RecordingPrompter::choosing("/docs/new.md");
    let outcome = session.save_document(id, &mut prompter).unwrap();

    assert!(matches!(outcome, SaveOutcome::Saved(_)));
    assert_eq!(prompter.path_requests, 1);
    let doc = session.get(id).unwrap();
    assert!(!doc.is_dirty());
    assert_eq!(doc.path(), Some(Path::new("/docs/new.md")));
    assert_eq!(doc.display_title(), "new.md");
    assert_eq!(storage.contents("/docs/new.md").as_deref(), Some("hello"));
}

#[test]
fn test_save_cancelled_leaves_state_unchanged() {
    let (mut session, storage) = memory_session();
    let id = session.create_document();
    session.edit_document(id, "draft").unwrap();
    session.drain_events();

    let outcome = session.save_document(id, &mut PromptAnswers::none()).unwrap();

    assert!(matches!(outcome, SaveOutcome::Cancelled));
    let doc = session.get(id).unwrap();
    assert!(doc.is_dirty());
    assert!(doc.path().is_none());
    assert_eq!(doc.content(), "draft");
    assert_eq!(storage.write_count(), 0);
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_save_as_onto_open_path_is_refused() {
    let (mut session, storage) = memory_session();
    let open = session.open_document("/docs/a.md");
    let id = session.create_document();

    let answers = PromptAnswers::none().with_path(id, "/docs/a.md");
    let outcome = session.save_document(id, &mut answers.clone()).unwrap();

    assert!(matches!(outcome, SaveOutcome::Failed(SaveError::AlreadyOpen(_))));
    assert_eq!(storage.write_count(), 0);
    assert!(session.get(id).unwrap().is_dirty());
    assert_eq!(session.get(open).unwrap().content(), "# A");
}

#[test]
fn test_save_failure_keeps_dirty_and_shows_error() {
    let (mut session, storage) = memory_session();
    let id = session.open_document("/docs/a.md");
    session.edit_document(id, "# changed").unwrap();
    session.drain_events();
    storage.set_fail_writes(true);

    let outcome = session.save_document(id, &mut PromptAnswers::none()).unwrap();

    assert!(matches!(outcome, SaveOutcome::Failed(SaveError::Write { .. })));
    assert!(!outcome.is_success());
    let doc = session.get(id).unwrap();
    assert!(doc.is_dirty());
    assert!(doc.content().starts_with("Error writing file\n"));
    assert_eq!(doc.path(), Some(Path::new("/docs/a.md")));
    assert!(session
        .drain_events()
        .contains(&SessionEvent::ContentReplaced(id)));
}

#[test]
fn test_save_unknown_document_is_an_error() {
    let (mut session, _) = memory_session();
    let id = session.create_document();
    session
        .close_document(id, &mut PromptAnswers::confirming(SaveChoice::Discard))
        .unwrap();
    assert!(matches!(
        session.save_document(id, &mut PromptAnswers::none()),
        Err(SessionError::UnknownDocument(_))
    ));
}

#[test]
fn test_close_clean_document_does_not_prompt() {
    let (mut session, _) = memory_session();
    let id = session.open_document("/docs/a.md");
    let mut prompter = RecordingPrompter::default();
    let outcome = session.close_document(id, &mut prompter).unwrap();
    assert_eq!(outcome, CloseOutcome::Closed);
    assert!(prompter.confirm_requests.is_empty());
    assert!(session.is_empty());
    assert_eq!(session.active_id(), None);
}

#[test]
fn test_close_dirty_document_cancel_keeps_it() {
    let (mut session, _) = memory_session();
    let id = session.create_document();
    let mut prompter = RecordingPrompter::confirming(SaveChoice::Cancel);
    let outcome = session.close_document(id, &mut prompter).unwrap();
    assert_eq!(outcome, CloseOutcome::Kept);
    assert_eq!(prompter.confirm_requests, vec![1]);
    assert_eq!(session.len(), 1);
}

#[test]
fn test_close_dirty_document_save_all_writes_then_closes() {
    let (mut session, storage) = memory_session();
    let id = session.open_document("/docs/a.md");
    session.edit_document(id, "# saved on close").unwrap();
    let mut prompter = RecordingPrompter::confirming(SaveChoice::SaveAll);
    let outcome = session.close_document(id, &mut prompter).unwrap();
    assert_eq!(outcome, CloseOutcome::Closed);
    assert_eq!(
        storage.contents("/docs/a.md").as_deref(),
        Some("# saved on close")
    );
}

#[test]
fn test_close_dirty_untitled_with_cancelled_path_stays_open() {
    let (mut session, _) = memory_session();
    let id = session.create_document();
    let mut prompter = RecordingPrompter::confirming(SaveChoice::SaveAll);
    let outcome = session.close_document(id, &mut prompter).unwrap();
    assert_eq!(outcome, CloseOutcome::Kept);
    assert_eq!(prompter.path_requests, 1);
}

#[test]
fn test_close_active_selects_neighbour() {
    let (mut session, _) = memory_session();
    let a = session.open_document("/docs/a.md");
    let b = session.create_document();
    let c = session.create_document();
    session.activate(b).unwrap();
    session.drain_events();

    session
        .close_document(b, &mut PromptAnswers::confirming(SaveChoice::Discard))
        .unwrap();
    assert_eq!(session.active_id(), Some(c));
    assert_eq!(
        session.drain_events(),
        vec![SessionEvent::Closed(b), SessionEvent::Activated(c)]
    );

    session
        .close_document(c, &mut PromptAnswers::confirming(SaveChoice::Discard))
        .unwrap();
    assert_eq!(session.active_id(), Some(a));
}

#[test]
fn test_close_inactive_keeps_selection() {
    let (mut session, _) = memory_session();
    let a = session.open_document("/docs/a.md");
    let b = session.create_document();
    session
        .close_document(a, &mut PromptAnswers::none())
        .unwrap();
    assert_eq!(session.active_id(), Some(b));
}

#[test]
fn test_request_exit_without_dirty_documents_exits() {
    let (mut session, _) = memory_session();
    session.open_document("/docs/a.md");
    let mut prompter = RecordingPrompter::default();
    assert_eq!(session.request_exit(&mut prompter), ExitOutcome::Exit);
    assert!(prompter.confirm_requests.is_empty());
}

#[test]
fn test_request_exit_declined_keeps_everything() {
    let (mut session, storage) = memory_session();
    let a = session.open_document("/docs/a.md");
    session.edit_document(a, "# A2").unwrap();
    let b = session.create_document();

    let mut prompter = RecordingPrompter::confirming(SaveChoice::Cancel);
    assert_eq!(session.request_exit(&mut prompter), ExitOutcome::Stay);

    assert_eq!(prompter.confirm_requests, vec![2]);
    assert_eq!(session.len(), 2);
    assert!(session.get(a).unwrap().is_dirty());
    assert!(session.get(b).unwrap().is_dirty());
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_request_exit_save_all_saves_each_dirty_document() {
    let (mut session, storage) = memory_session();
    let a = session.open_document("/docs/a.md");
    session.edit_document(a, "# A2").unwrap();
    let b = session.create_document();
    session.edit_document(b, "fresh").unwrap();

    let mut answers = PromptAnswers::confirming(SaveChoice::SaveAll).with_path(b, "/docs/b.md");
    assert_eq!(session.request_exit(&mut answers), ExitOutcome::Exit);

    assert_eq!(storage.contents("/docs/a.md").as_deref(), Some("# A2"));
    assert_eq!(storage.contents("/docs/b.md").as_deref(), Some("fresh"));
    assert!(session.dirty_documents().is_empty());
}

#[test]
fn test_request_exit_save_all_exits_despite_failures() {
    let (mut session, storage) = memory_session();
    let a = session.open_document("/docs/a.md");
    session.edit_document(a, "# A2").unwrap();
    session.create_document();
    storage.set_fail_writes(true);

    let mut answers = PromptAnswers::confirming(SaveChoice::SaveAll);
    assert_eq!(session.request_exit(&mut answers), ExitOutcome::Exit);
    assert_eq!(session.dirty_documents().len(), 2);
}

#[test]
fn test_request_exit_discard_exits_without_writing() {
    let (mut session, storage) = memory_session();
    session.create_document();
    let mut answers = PromptAnswers::confirming(SaveChoice::Discard);
    assert_eq!(session.request_exit(&mut answers), ExitOutcome::Exit);
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_activate_next_and_previous_wrap() {
    let (mut session, _) = memory_session();
    let a = session.create_document();
    let b = session.create_document();
    let c = session.create_document();
    assert_eq!(session.activate_next(), Some(a));
    assert_eq!(session.activate_previous(), Some(c));
    assert_eq!(session.activate_previous(), Some(b));
    assert_eq!(session.activate_index(5), None);
    assert_eq!(session.active_id(), Some(b));
}

#[test]
fn test_export_path_only_for_bound_documents() {
    let (mut session, _) = memory_session();
    let a = session.open_document("/docs/a.md");
    let b = session.create_document();
    assert_eq!(session.export_path(a), Some(PathBuf::from("/docs/a.html")));
    assert_eq!(session.export_path(b), None);
}

#[test]
fn test_export_path_never_targets_own_html_file() {
    let storage = MemoryStorage::new().with_file("/docs/page.html", "# Source");
    let mut session = Session::new(storage);
    let id = session.open_document("/docs/page.html");
    assert_eq!(
        session.export_path(id),
        Some(PathBuf::from("/docs/page.export.html"))
    );
}

#[test]
fn test_scenario_save_and_reopen_in_fresh_session() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("a.md");

    let mut session = Session::new(FsStorage);
    let id = session.create_document();
    session.edit_document(id, "# Hi").unwrap();
    let mut answers = PromptAnswers::none().with_path(id, &target);
    let outcome = session.save_document(id, &mut answers).unwrap();
    assert!(outcome.is_success());

    let mut fresh = Session::new(FsStorage);
    let reopened = fresh.open_document(&target);
    let doc = fresh.get(reopened).unwrap();
    assert_eq!(doc.content(), "# Hi");
    assert!(!doc.is_dirty());
}

#[derive(Debug, Clone)]
enum Op {
    Edit(String),
    Save,
    FailingSave,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z# ]{0,12}".prop_map(Op::Edit),
        Just(Op::Save),
        Just(Op::FailingSave),
    ]
}

proptest! {
    #[test]
    fn prop_dirty_tracks_last_successful_write(ops in prop::collection::vec(op_strategy(), 0..24)) {
        let storage = Rc::new(MemoryStorage::new().with_file("/p.md", ""));
        let mut session = Session::new(Rc::clone(&storage));
        let id = session.open_document("/p.md");
        session.drain_events();
        let mut expect_dirty = false;

        for op in ops {
            match op {
                Op::Edit(text) => {
                    session.edit_document(id, text).unwrap();
                    let marks = title_changes(&session.drain_events(), id);
                    prop_assert_eq!(marks, usize::from(!expect_dirty));
                    expect_dirty = true;
                }
                Op::Save | Op::FailingSave => {
                    storage.set_fail_writes(matches!(op, Op::FailingSave));
                    let writes_before = storage.write_count();
                    let outcome = session.save_document(id, &mut PromptAnswers::none()).unwrap();
                    if expect_dirty {
                        prop_assert_eq!(storage.write_count(), writes_before + 1);
                        expect_dirty = !outcome.is_success();
                    } else {
                        prop_assert!(matches!(outcome, SaveOutcome::Unchanged));
                        prop_assert_eq!(storage.write_count(), writes_before);
                    }
                    session.drain_events();
                }
            }
            prop_assert_eq!(session.get(id).unwrap().is_dirty(), expect_dirty);
            if !expect_dirty {
                let stored = storage.contents("/p.md").unwrap();
                prop_assert_eq!(session.get(id).unwrap().content(), stored.as_str());
            }
        }
    }
}
