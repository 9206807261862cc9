//! SQLite backend: fresh databases and databases from older schemas

#![cfg(feature = "sqlite")]

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use scriptline_editor::{
    Classification, EditorError, EditorSession, LineKind, LineRule, NewAnnotation, ScriptStore,
    ScriptTarget, SqliteStore, StoreError,
};

/// A database from before episodes and line rules existed
fn legacy_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE blocked_terms (id INTEGER PRIMARY KEY AUTOINCREMENT, term TEXT NOT NULL UNIQUE);
         CREATE TABLE speaker_profiles (id INTEGER PRIMARY KEY, name TEXT NOT NULL, sort_order INTEGER NOT NULL DEFAULT 0);
         CREATE TABLE threads (id INTEGER PRIMARY KEY, body TEXT NOT NULL DEFAULT '');
         CREATE TABLE tag_annotations (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             tag_id INTEGER NOT NULL,
             thread_id INTEGER NOT NULL,
             start_offset INTEGER NOT NULL,
             end_offset INTEGER NOT NULL,
             selected_text TEXT NOT NULL
         );
         INSERT INTO threads (id, body) VALUES (1, 'アリス\nこんにちは');
         INSERT INTO speaker_profiles (name) VALUES ('アリス');",
    )
    .unwrap();
    conn
}

#[test]
fn capabilities_are_detected_once_at_open() {
    let store = SqliteStore::open(legacy_connection()).unwrap();
    let caps = store.capabilities();

    assert!(caps.blocked_terms);
    assert!(caps.threads);
    assert!(!caps.line_rules);
    assert!(!caps.episodes);
    assert!(caps.supports_scope(ScriptTarget::Thread(1)));
    assert!(!caps.supports_scope(ScriptTarget::Episode(1)));
}

#[test]
fn absent_objects_load_as_empty_but_reject_writes() {
    let store = SqliteStore::open(legacy_connection()).unwrap();

    assert_eq!(block_on(store.load_line_rules()), Ok(Vec::new()));
    assert_eq!(
        block_on(store.load_annotations(ScriptTarget::Episode(3))),
        Ok(Vec::new())
    );

    assert_eq!(
        block_on(store.upsert_line_rule(&LineRule::new("夜", Classification::Location))),
        Err(StoreError::missing_schema("line_rules"))
    );
    let new = NewAnnotation {
        tag_id: 1,
        scope: ScriptTarget::Episode(3),
        start_offset: 0,
        end_offset: 1,
        selected_text: "夜".into(),
    };
    assert_eq!(
        block_on(store.insert_annotation(&new)),
        Err(StoreError::missing_schema("tag_annotations.episode_id"))
    );
    assert_eq!(
        block_on(store.load_body(ScriptTarget::Episode(3))),
        Err(StoreError::missing_schema("episodes"))
    );
}

#[test]
fn legacy_thread_annotations_still_work() {
    let store = SqliteStore::open(legacy_connection()).unwrap();
    let target = ScriptTarget::Thread(1);
    let new = NewAnnotation {
        tag_id: 3,
        scope: target,
        start_offset: 0,
        end_offset: 3,
        selected_text: "アリス".into(),
    };

    let id = block_on(store.insert_annotation(&new)).unwrap();
    assert_eq!(
        block_on(store.load_annotations(target)).unwrap(),
        vec![new.with_id(id)]
    );
}

#[test]
fn initializing_adds_missing_tables() {
    let store = SqliteStore::open_and_initialize(legacy_connection()).unwrap();
    let caps = store.capabilities();
    assert!(caps.line_rules);
    assert!(caps.episodes);
    // Existing tables are left as they are
    assert!(!caps.annotation_episode_scope);
}

#[test]
fn unknown_classifications_are_skipped() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .with_connection(|conn| {
            conn.execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 INSERT INTO line_rules (line_text, classification) VALUES ('夜', 'location');
                 INSERT INTO line_rules (line_text, classification) VALUES ('謎', 'narrator');",
            )
        })
        .unwrap();

    let rules = block_on(store.load_line_rules()).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].classification, Classification::Location);
}

#[test]
fn session_over_a_fresh_database() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .with_connection(|conn| {
            conn.execute_batch(
                "INSERT INTO episodes (id, body) VALUES (5, '夜\nアリス\nこんにちは');
                 INSERT INTO speaker_profiles (name, sort_order) VALUES ('アリス', 0);",
            )
        })
        .unwrap();
    let target = ScriptTarget::Episode(5);

    let mut session = EditorSession::new(store);
    block_on(session.load_overrides()).unwrap();
    block_on(session.open(target)).unwrap();

    block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap();
    assert_eq!(session.parsed_lines()[0].kind, LineKind::Location);

    block_on(session.add_annotation(6, 11, 1)).unwrap();
    assert_eq!(session.annotations()[0].selected_text, "こんにちは");

    block_on(session.undo()).unwrap();
    assert_eq!(block_on(session.store().load_line_rules()).unwrap(), Vec::new());
}

#[test]
fn legacy_overrides_load_with_defaults() {
    let mut session = EditorSession::new(SqliteStore::open(legacy_connection()).unwrap());
    session
        .store()
        .with_connection(|conn| conn.execute("INSERT INTO blocked_terms (term) VALUES ('(笑)')", []))
        .unwrap();

    block_on(session.load_overrides()).unwrap();
    assert!(session.overrides().is_blocked("(笑)"));
    assert_eq!(session.overrides().known_speakers(), ["アリス".to_string()]);
    assert!(session.overrides().line_rules().is_empty());

    block_on(session.open(ScriptTarget::Thread(1))).unwrap();
    assert_eq!(session.parsed_lines()[0].kind, LineKind::Dialogue);

    let err = block_on(session.set_line_rule("アリス", Some(Classification::Location))).unwrap_err();
    assert_eq!(
        err,
        EditorError::Persistence(StoreError::missing_schema("line_rules"))
    );
    assert!(!err.is_recoverable());
    assert!(!session.can_undo());
}

#[test]
fn episode_opens_without_episode_tagging() {
    let store = SqliteStore::open_and_initialize(legacy_connection()).unwrap();
    store
        .with_connection(|conn| {
            conn.execute("INSERT INTO episodes (id, body) VALUES (1, 'アリス\nまたね')", [])
        })
        .unwrap();
    let mut session = EditorSession::new(store);
    block_on(session.load_overrides()).unwrap();

    block_on(session.open(ScriptTarget::Episode(1))).unwrap();
    assert_eq!(session.text(), "アリス\nまたね");
    assert_eq!(session.parsed_lines().len(), 1);
    assert_eq!(session.parsed_lines()[0].speaker, "アリス");
    assert!(session.annotations().is_empty());

    assert_eq!(
        block_on(session.add_annotation(4, 7, 1)),
        Err(EditorError::Persistence(StoreError::missing_schema(
            "tag_annotations.episode_id"
        )))
    );
}

#[test]
fn missing_body_table_is_still_reported() {
    let mut session = EditorSession::new(SqliteStore::open(legacy_connection()).unwrap());
    assert!(!block_on(session.open(ScriptTarget::Episode(1)))
        .unwrap_err()
        .is_recoverable());
    assert_eq!(session.target(), None);
}
