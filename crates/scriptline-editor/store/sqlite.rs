//! SQLite store
//!
//! Creates its tables on a fresh database. Databases written by older
//! builds may lack a table or column; which objects exist is detected once
//! when the store is opened. Loads from an absent override or annotation
//! table answer with no rows, so callers start from defaults. Writes that
//! need an absent object fail with [`StoreError::MissingSchema`].

use core::str::FromStr;
use std::path::Path;

use log::{debug, info, warn};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use scriptline_core::{Classification, LineRule};

use super::{ScriptStore, StoreError, StoreResult};
use crate::annotations::{AnnotationId, NewAnnotation, TagAnnotation};
use crate::core::target::ScriptTarget;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS blocked_terms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        term TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS line_rules (
        line_text TEXT PRIMARY KEY NOT NULL,
        classification TEXT NOT NULL
            CHECK (classification IN ('speaker', 'direction', 'location')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS speaker_profiles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        sort_order INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS threads (
        id INTEGER PRIMARY KEY,
        body TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS episodes (
        id INTEGER PRIMARY KEY,
        body TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS tag_annotations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tag_id INTEGER NOT NULL,
        thread_id INTEGER REFERENCES threads(id) ON DELETE CASCADE,
        episode_id INTEGER REFERENCES episodes(id) ON DELETE CASCADE,
        start_offset INTEGER NOT NULL,
        end_offset INTEGER NOT NULL,
        selected_text TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK ((thread_id IS NULL) <> (episode_id IS NULL)),
        CHECK (start_offset < end_offset)
    );
";

/// Which schema objects the opened database has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaCapabilities {
    pub blocked_terms: bool,
    pub line_rules: bool,
    pub speaker_profiles: bool,
    pub threads: bool,
    pub episodes: bool,
    pub tag_annotations: bool,
    /// `tag_annotations.thread_id`
    pub annotation_thread_scope: bool,
    /// `tag_annotations.episode_id`
    pub annotation_episode_scope: bool,
}

impl SchemaCapabilities {
    /// Inspect the database behind `conn`
    pub fn detect(conn: &Connection) -> StoreResult<Self> {
        let annotation_columns = table_columns(conn, "tag_annotations")?;
        let has = |column: &str| annotation_columns.iter().any(|c| c == column);

        Ok(Self {
            blocked_terms: !table_columns(conn, "blocked_terms")?.is_empty(),
            line_rules: !table_columns(conn, "line_rules")?.is_empty(),
            speaker_profiles: !table_columns(conn, "speaker_profiles")?.is_empty(),
            threads: !table_columns(conn, "threads")?.is_empty(),
            episodes: !table_columns(conn, "episodes")?.is_empty(),
            tag_annotations: !annotation_columns.is_empty(),
            annotation_thread_scope: has("thread_id"),
            annotation_episode_scope: has("episode_id"),
        })
    }

    /// Whether annotations of `scope` can be stored
    #[must_use]
    pub const fn supports_scope(&self, scope: ScriptTarget) -> bool {
        self.tag_annotations
            && match scope {
                ScriptTarget::Thread(_) => self.annotation_thread_scope,
                ScriptTarget::Episode(_) => self.annotation_episode_scope,
            }
    }

    /// Name of the scope column, or `None` when it is absent
    const fn scope_column(&self, scope: ScriptTarget) -> Option<&'static str> {
        if !self.supports_scope(scope) {
            return None;
        }
        match scope {
            ScriptTarget::Thread(_) => Some("thread_id"),
            ScriptTarget::Episode(_) => Some("episode_id"),
        }
    }

    fn require_scope(&self, scope: ScriptTarget) -> StoreResult<()> {
        if !self.tag_annotations {
            return Err(StoreError::missing_schema("tag_annotations"));
        }
        match scope {
            ScriptTarget::Thread(_) => require(
                self.annotation_thread_scope,
                "tag_annotations.thread_id",
            ),
            ScriptTarget::Episode(_) => require(
                self.annotation_episode_scope,
                "tag_annotations.episode_id",
            ),
        }
    }
}

fn require(present: bool, object: &str) -> StoreResult<()> {
    if present {
        Ok(())
    } else {
        Err(StoreError::missing_schema(object))
    }
}

fn table_columns(conn: &Connection, table: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .map_err(backend)?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(backend)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(backend)?;
    Ok(columns)
}

/// Loads from an absent object answer with no rows
fn defaulted(object: &str) {
    debug!("{object} not in schema, loading no rows");
}

fn backend(err: rusqlite::Error) -> StoreError {
    StoreError::backend(err)
}

fn to_offset(value: i64) -> rusqlite::Result<usize> {
    usize::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, value))
}

fn from_offset(value: usize) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::backend(format!("offset {value} out of range")))
}

/// `ScriptStore` backed by a SQLite connection
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    capabilities: SchemaCapabilities,
}

impl SqliteStore {
    /// Wrap an existing database without changing its schema
    pub fn open(conn: Connection) -> StoreResult<Self> {
        let capabilities = SchemaCapabilities::detect(&conn)?;
        debug!("sqlite store capabilities: {capabilities:?}");
        Ok(Self {
            conn: Mutex::new(conn),
            capabilities,
        })
    }

    /// Create any missing tables, then open
    ///
    /// Existing tables are not altered, so an older `tag_annotations`
    /// without `episode_id` keeps lacking it.
    pub fn open_and_initialize(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA).map_err(backend)?;

        let capabilities = SchemaCapabilities::detect(&conn)?;
        for (present, column) in [
            (capabilities.annotation_thread_scope, "thread_id"),
            (capabilities.annotation_episode_scope, "episode_id"),
        ] {
            if present {
                conn.execute_batch(&format!(
                    "CREATE INDEX IF NOT EXISTS idx_tag_annotations_{column} \
                     ON tag_annotations({column});"
                ))
                .map_err(backend)?;
            }
        }

        info!("sqlite store schema initialized");
        Self::open(conn)
    }

    /// Open (or create) a database file and initialize it
    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(backend)?;
        Self::open_and_initialize(conn)
    }

    /// Fresh in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::open_and_initialize(conn)
    }

    /// Capabilities detected at open
    #[must_use]
    pub const fn capabilities(&self) -> SchemaCapabilities {
        self.capabilities
    }

    /// Run `f` with the underlying connection
    ///
    /// Used by hosts to manage rows outside the editor (threads, episodes,
    /// the speaker directory).
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        let conn = self.conn.lock();
        f(&conn).map_err(backend)
    }

    fn body_table(&self, target: ScriptTarget) -> StoreResult<&'static str> {
        match target {
            ScriptTarget::Thread(_) => {
                require(self.capabilities.threads, "threads")?;
                Ok("threads")
            }
            ScriptTarget::Episode(_) => {
                require(self.capabilities.episodes, "episodes")?;
                Ok("episodes")
            }
        }
    }
}

fn target_id(target: ScriptTarget) -> i64 {
    match target {
        ScriptTarget::Thread(id) | ScriptTarget::Episode(id) => id,
    }
}

impl ScriptStore for SqliteStore {
    async fn load_blocked_terms(&self) -> StoreResult<Vec<String>> {
        if !self.capabilities.blocked_terms {
            defaulted("blocked_terms");
            return Ok(Vec::new());
        }
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT term FROM blocked_terms ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
    }

    async fn upsert_blocked_term(&self, term: &str) -> StoreResult<()> {
        require(self.capabilities.blocked_terms, "blocked_terms")?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO blocked_terms (term) VALUES (?1) ON CONFLICT(term) DO NOTHING",
                params![term],
            )
        })?;
        Ok(())
    }

    async fn delete_blocked_term(&self, term: &str) -> StoreResult<()> {
        require(self.capabilities.blocked_terms, "blocked_terms")?;
        self.with_connection(|conn| {
            conn.execute("DELETE FROM blocked_terms WHERE term = ?1", params![term])
        })?;
        Ok(())
    }

    async fn load_line_rules(&self) -> StoreResult<Vec<LineRule>> {
        if !self.capabilities.line_rules {
            defaulted("line_rules");
            return Ok(Vec::new());
        }
        let rows: Vec<(String, String)> = self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT line_text, classification FROM line_rules ORDER BY rowid")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|(line_text, raw)| match Classification::from_str(&raw) {
                Ok(classification) => Some(LineRule {
                    line_text,
                    classification,
                }),
                Err(_) => {
                    warn!("skipping line rule for {line_text:?} with unknown classification {raw:?}");
                    None
                }
            })
            .collect())
    }

    async fn upsert_line_rule(&self, rule: &LineRule) -> StoreResult<()> {
        require(self.capabilities.line_rules, "line_rules")?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO line_rules (line_text, classification, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(line_text) DO UPDATE SET
                     classification = excluded.classification,
                     updated_at = excluded.updated_at",
                params![rule.line_text, rule.classification.as_str()],
            )
        })?;
        Ok(())
    }

    async fn delete_line_rule(&self, line_text: &str) -> StoreResult<()> {
        require(self.capabilities.line_rules, "line_rules")?;
        self.with_connection(|conn| {
            conn.execute(
                "DELETE FROM line_rules WHERE line_text = ?1",
                params![line_text],
            )
        })?;
        Ok(())
    }

    async fn load_known_speakers(&self) -> StoreResult<Vec<String>> {
        if !self.capabilities.speaker_profiles {
            defaulted("speaker_profiles");
            return Ok(Vec::new());
        }
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT name FROM speaker_profiles ORDER BY sort_order, id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
    }

    async fn load_annotations(&self, scope: ScriptTarget) -> StoreResult<Vec<TagAnnotation>> {
        let Some(column) = self.capabilities.scope_column(scope) else {
            defaulted("tag_annotations scope column");
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT id, tag_id, start_offset, end_offset, selected_text
             FROM tag_annotations WHERE {column} = ?1 ORDER BY id"
        );

        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![target_id(scope)], |row| {
                Ok(TagAnnotation {
                    id: AnnotationId(row.get(0)?),
                    tag_id: row.get(1)?,
                    scope,
                    start_offset: to_offset(row.get(2)?)?,
                    end_offset: to_offset(row.get(3)?)?,
                    selected_text: row.get(4)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
    }

    async fn insert_annotation(&self, annotation: &NewAnnotation) -> StoreResult<AnnotationId> {
        self.capabilities.require_scope(annotation.scope)?;
        let column = match annotation.scope {
            ScriptTarget::Thread(_) => "thread_id",
            ScriptTarget::Episode(_) => "episode_id",
        };
        let sql = format!(
            "INSERT INTO tag_annotations
                 (tag_id, {column}, start_offset, end_offset, selected_text)
             VALUES (?1, ?2, ?3, ?4, ?5)"
        );
        let start = from_offset(annotation.start_offset)?;
        let end = from_offset(annotation.end_offset)?;

        let id = self.with_connection(|conn| {
            conn.execute(
                &sql,
                params![
                    annotation.tag_id,
                    target_id(annotation.scope),
                    start,
                    end,
                    annotation.selected_text
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        Ok(AnnotationId(id))
    }

    async fn delete_annotation(&self, id: AnnotationId) -> StoreResult<()> {
        require(self.capabilities.tag_annotations, "tag_annotations")?;
        self.with_connection(|conn| {
            conn.execute("DELETE FROM tag_annotations WHERE id = ?1", params![id.0])
        })?;
        Ok(())
    }

    async fn load_body(&self, target: ScriptTarget) -> StoreResult<String> {
        let table = self.body_table(target)?;
        let sql = format!("SELECT body FROM {table} WHERE id = ?1");
        let conn = self.conn.lock();
        match conn.query_row(&sql, params![target_id(target)], |row| row.get(0)) {
            Ok(body) => Ok(body),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StoreError::NotFound(target.to_string()))
            }
            Err(err) => Err(backend(err)),
        }
    }

    async fn save_body(&self, target: ScriptTarget, text: &str) -> StoreResult<()> {
        let table = self.body_table(target)?;
        let sql = format!("UPDATE {table} SET body = ?1 WHERE id = ?2");
        let updated =
            self.with_connection(|conn| conn.execute(&sql, params![text, target_id(target)]))?;
        if updated == 0 {
            return Err(StoreError::NotFound(target.to_string()));
        }
        Ok(())
    }
}
