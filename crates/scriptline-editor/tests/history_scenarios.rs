//! Undo/redo behavior of an editing session over the in-memory store

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use scriptline_editor::{
    BufferState, Classification, EditorError, EditorSession, HistoryAction, HistoryStats,
    LineKind, MemoryStore, ScriptTarget, StoreError, StoreOp,
};

const THREAD: ScriptTarget = ScriptTarget::Thread(1);
const EPISODE: ScriptTarget = ScriptTarget::Episode(2);
const BODY: &str = "夜\nアリス: こんにちは\nボブ\nやあ";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn open_session() -> EditorSession<MemoryStore> {
    init_logging();
    let store = MemoryStore::new()
        .with_known_speakers(["アリス", "ボブ"])
        .with_body(THREAD, BODY)
        .with_body(EPISODE, "ボブ\nまたね");
    let mut session = EditorSession::new(store);
    block_on(session.load_overrides()).unwrap();
    block_on(session.open(THREAD)).unwrap();
    session
}

fn block(term: &str) -> HistoryAction {
    HistoryAction::SetFilterTerm {
        term: term.to_string(),
        before_enabled: false,
        after_enabled: true,
        reparse: true,
    }
}

/// (undo, redo) depths
fn counts(session: &EditorSession<MemoryStore>) -> (usize, usize) {
    let s = session.history_stats();
    (s.undo_count, s.redo_count)
}

#[test]
fn commit_after_undo_discards_redo() {
    let mut session = open_session();
    assert!(block_on(session.commit(block("a"))).unwrap());
    assert!(block_on(session.commit(block("b"))).unwrap());
    assert_eq!(counts(&session), (2, 0));

    assert!(block_on(session.undo()).unwrap());
    assert!(block_on(session.undo()).unwrap());
    assert_eq!(counts(&session), (0, 2));

    assert!(block_on(session.commit(block("c"))).unwrap());
    assert_eq!(counts(&session), (1, 0));
    assert_eq!(session.next_undo_description(), Some("Block \"c\""));
    assert_eq!(session.store().blocked_terms(), vec!["c".to_string()]);
}

#[test]
fn empty_stacks_report_false() {
    let mut session = open_session();
    assert!(!block_on(session.undo()).unwrap());
    assert!(!block_on(session.redo()).unwrap());
}

#[test]
fn noop_actions_leave_history_alone() {
    let mut session = open_session();
    assert!(block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap());
    let before = session.history_stats();

    let same = HistoryAction::SetLineRule {
        line_text: "夜".into(),
        before: Some(Classification::Location),
        after: Some(Classification::Location),
        reparse: true,
    };
    assert!(!block_on(session.commit(same)).unwrap());
    assert!(!block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap());
    assert!(!block_on(session.set_blocked_term("(笑)", false)).unwrap());

    assert_eq!(session.history_stats(), before);
    assert_eq!(session.store().call_count(StoreOp::UpsertLineRule), 1);
}

#[test]
fn undo_then_redo_restores_committed_state() {
    let mut session = open_session();
    assert!(block_on(session.split_speakers()).unwrap());
    assert!(block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap());

    let text = session.text().to_string();
    let parsed = session.parsed_lines().to_vec();
    let rules = session.overrides().line_rules().to_vec();
    let history: HistoryStats = session.history_stats();

    assert!(block_on(session.undo()).unwrap());
    assert_ne!(session.parsed_lines(), parsed.as_slice());
    assert!(block_on(session.redo()).unwrap());

    assert_eq!(session.text(), text);
    assert_eq!(session.parsed_lines(), parsed.as_slice());
    assert_eq!(session.overrides().line_rules(), rules.as_slice());
    assert_eq!(session.history_stats(), history);
}

#[test]
fn undo_then_redo_restores_a_blocked_term() {
    let mut session = open_session();
    assert!(block_on(session.set_blocked_term("やあ", true)).unwrap());

    let parsed = session.parsed_lines().to_vec();
    let blocked = session.overrides().blocked_terms().to_vec();
    let history = session.history_stats();
    assert_eq!(parsed.last().map(|l| l.kind), Some(LineKind::Direction));

    assert!(block_on(session.undo()).unwrap());
    assert!(!session.overrides().is_blocked("やあ"));
    assert!(session.store().blocked_terms().is_empty());
    assert_ne!(session.parsed_lines(), parsed.as_slice());

    assert!(block_on(session.redo()).unwrap());
    assert_eq!(session.parsed_lines(), parsed.as_slice());
    assert_eq!(session.overrides().blocked_terms(), blocked.as_slice());
    assert_eq!(session.store().blocked_terms(), vec!["やあ".to_string()]);
    assert_eq!(session.history_stats(), history);
}

#[test]
fn actions_without_reparse_keep_the_displayed_list() {
    let mut session = open_session();
    let displayed = session.parsed_lines().to_vec();

    let quiet_block = HistoryAction::SetFilterTerm {
        term: "やあ".into(),
        before_enabled: false,
        after_enabled: true,
        reparse: false,
    };
    let quiet_rule = HistoryAction::SetLineRule {
        line_text: "夜".into(),
        before: None,
        after: Some(Classification::Location),
        reparse: false,
    };
    assert!(block_on(session.commit(quiet_block)).unwrap());
    assert!(block_on(session.commit(quiet_rule)).unwrap());

    // Overrides changed, the list on screen did not
    assert!(session.overrides().is_blocked("やあ"));
    assert_eq!(session.overrides().rule_for("夜"), Some(Classification::Location));
    assert_eq!(session.parsed_lines(), displayed.as_slice());
    assert_ne!(session.parse_current().unwrap(), displayed);

    let blocked = session.overrides().blocked_terms().to_vec();
    let rules = session.overrides().line_rules().to_vec();
    let history = session.history_stats();

    assert!(block_on(session.undo()).unwrap());
    assert!(block_on(session.undo()).unwrap());
    assert!(!session.overrides().is_blocked("やあ"));
    assert_eq!(session.overrides().rule_for("夜"), None);
    assert_eq!(session.parsed_lines(), displayed.as_slice());

    assert!(block_on(session.redo()).unwrap());
    assert!(block_on(session.redo()).unwrap());
    assert_eq!(session.overrides().blocked_terms(), blocked.as_slice());
    assert_eq!(session.overrides().line_rules(), rules.as_slice());
    assert_eq!(session.parsed_lines(), displayed.as_slice());
    assert_eq!(session.history_stats(), history);
}

#[test]
fn failed_write_changes_nothing() {
    let mut session = open_session();
    let parsed = session.parsed_lines().to_vec();
    session.store().fail_next(
        StoreOp::UpsertLineRule,
        StoreError::PermissionDenied("row policy".into()),
    );

    let err = block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap_err();
    assert_eq!(
        err,
        EditorError::Persistence(StoreError::PermissionDenied("row policy".into()))
    );
    assert_eq!(session.history_stats(), HistoryStats::default());
    assert_eq!(session.overrides().rule_for("夜"), None);
    assert_eq!(session.parsed_lines(), parsed.as_slice());
}

#[test]
fn failed_undo_keeps_the_entry() {
    let mut session = open_session();
    assert!(block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap());
    session
        .store()
        .fail_next(StoreOp::DeleteLineRule, StoreError::Network("offline".into()));

    assert!(block_on(session.undo()).unwrap_err().is_persistence_error());
    assert!(session.can_undo());
    assert!(!session.can_redo());
    assert_eq!(session.overrides().rule_for("夜"), Some(Classification::Location));

    // Retrying after the store recovers works
    assert!(block_on(session.undo()).unwrap());
    assert_eq!(session.overrides().rule_for("夜"), None);
}

#[test]
fn failed_reload_after_write_still_commits() {
    let mut session = open_session();
    session
        .store()
        .fail_next(StoreOp::LoadBlockedTerms, StoreError::Network("flaky".into()));

    assert!(block_on(session.set_blocked_term("やあ", true)).unwrap());
    assert!(session.overrides().is_blocked("やあ"));
    assert_eq!(session.store().blocked_terms(), vec!["やあ".to_string()]);
}

#[test]
fn rule_changes_reclassify_the_body() {
    let mut session = open_session();
    assert_eq!(session.parsed_lines()[0].kind, LineKind::Dialogue);

    block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap();
    assert_eq!(session.parsed_lines()[0].kind, LineKind::Location);
    assert_eq!(session.parsed_lines()[0].source_rule, Some(Classification::Location));

    block_on(session.undo()).unwrap();
    assert_eq!(session.parsed_lines()[0].kind, LineKind::Dialogue);
}

#[test]
fn structural_edits_are_undoable_body_drafts() {
    let mut session = open_session();

    assert!(block_on(session.split_speakers()).unwrap());
    assert_eq!(session.text(), "夜\nアリス\nこんにちは\nボブ\nやあ");
    assert_eq!(session.state(), BufferState::Dirty);

    // 夜 is a direction followed by two dialogues
    assert_eq!(session.parsed_lines().len(), 3);
    assert!(block_on(session.delete_row(0)).unwrap());
    assert_eq!(session.text(), "アリス\nこんにちは\nボブ\nやあ");

    assert!(block_on(session.split_line(0, 2)).unwrap());
    assert_eq!(session.text(), "アリ\nス\nこんにちは\nボブ\nやあ");

    for _ in 0..3 {
        assert!(block_on(session.undo()).unwrap());
    }
    assert_eq!(session.text(), BODY);
    assert_eq!(session.state(), BufferState::Clean);
}

#[test]
fn invalid_structural_edits_are_rejected() {
    let mut session = open_session();
    assert!(matches!(
        block_on(session.split_line(9, 1)),
        Err(EditorError::Core(_))
    ));
    assert_eq!(
        block_on(session.delete_row(42)),
        Err(EditorError::RowNotFound { index: 42 })
    );
    assert!(!session.can_undo());
}

#[test]
fn switching_targets_clears_history() {
    let mut session = open_session();
    block_on(session.set_blocked_term("やあ", true)).unwrap();
    block_on(session.undo()).unwrap();
    block_on(session.split_speakers()).unwrap();
    assert!(session.can_undo());

    block_on(session.open(EPISODE)).unwrap();
    assert_eq!(session.history_stats(), HistoryStats::default());
    assert_eq!(session.text(), "ボブ\nまたね");
    assert_eq!(session.parsed_lines()[0].speaker, "ボブ");
}

#[test]
fn save_returns_buffer_to_clean() {
    let mut session = open_session();
    block_on(session.split_speakers()).unwrap();
    block_on(session.save_body()).unwrap();

    assert_eq!(session.state(), BufferState::Clean);
    assert_eq!(
        session.store().body(THREAD).as_deref(),
        Some("夜\nアリス\nこんにちは\nボブ\nやあ")
    );

    // Undo after saving restores the old text as a new draft
    block_on(session.undo()).unwrap();
    assert_eq!(session.state(), BufferState::Dirty);
}
