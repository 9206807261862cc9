//! In-process store
//!
//! Keeps rows in memory behind a mutex. Used by tests and by hosts that sync
//! through some other channel. Any operation can be made to fail once with
//! [`MemoryStore::fail_next`].

use std::collections::HashMap;

use log::trace;
use parking_lot::Mutex;
use scriptline_core::LineRule;

use super::{ScriptStore, StoreError, StoreOp, StoreResult};
use crate::annotations::{AnnotationId, NewAnnotation, TagAnnotation};
use crate::core::target::ScriptTarget;

#[derive(Debug, Default)]
struct MemoryRows {
    blocked_terms: Vec<String>,
    line_rules: Vec<LineRule>,
    known_speakers: Vec<String>,
    annotations: Vec<TagAnnotation>,
    bodies: HashMap<ScriptTarget, String>,
    next_annotation_id: i64,
    failures: HashMap<StoreOp, StoreError>,
    calls: HashMap<StoreOp, usize>,
}

impl MemoryRows {
    fn begin(&mut self, op: StoreOp) -> StoreResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        trace!("memory store: {op:?}");
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// `ScriptStore` backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<MemoryRows>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed blocked terms
    #[must_use]
    pub fn with_blocked_terms<I, S>(self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut rows = self.rows.lock();
            for term in terms {
                let term = term.into();
                if !rows.blocked_terms.contains(&term) {
                    rows.blocked_terms.push(term);
                }
            }
        }
        self
    }

    /// Seed line rules
    #[must_use]
    pub fn with_line_rules<I>(self, rules: I) -> Self
    where
        I: IntoIterator<Item = LineRule>,
    {
        {
            let mut rows = self.rows.lock();
            for rule in rules {
                upsert_rule(&mut rows.line_rules, rule);
            }
        }
        self
    }

    /// Seed the speaker directory
    #[must_use]
    pub fn with_known_speakers<I, S>(self, speakers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows
            .lock()
            .known_speakers
            .extend(speakers.into_iter().map(Into::into));
        self
    }

    /// Seed the body of a thread or episode
    #[must_use]
    pub fn with_body(self, target: ScriptTarget, text: impl Into<String>) -> Self {
        self.rows.lock().bodies.insert(target, text.into());
        self
    }

    /// Make the next call of `op` fail with `err`
    pub fn fail_next(&self, op: StoreOp, err: StoreError) {
        self.rows.lock().failures.insert(op, err);
    }

    /// Number of calls of `op` so far, failed ones included
    #[must_use]
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.rows.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Current blocked terms
    #[must_use]
    pub fn blocked_terms(&self) -> Vec<String> {
        self.rows.lock().blocked_terms.clone()
    }

    /// Current line rules
    #[must_use]
    pub fn line_rules(&self) -> Vec<LineRule> {
        self.rows.lock().line_rules.clone()
    }

    /// Every stored annotation, all scopes
    #[must_use]
    pub fn annotations(&self) -> Vec<TagAnnotation> {
        self.rows.lock().annotations.clone()
    }

    /// Stored body of a target
    #[must_use]
    pub fn body(&self, target: ScriptTarget) -> Option<String> {
        self.rows.lock().bodies.get(&target).cloned()
    }
}

fn upsert_rule(rules: &mut Vec<LineRule>, rule: LineRule) {
    match rules.iter_mut().find(|r| r.line_text == rule.line_text) {
        Some(existing) => existing.classification = rule.classification,
        None => rules.push(rule),
    }
}

impl ScriptStore for MemoryStore {
    async fn load_blocked_terms(&self) -> StoreResult<Vec<String>> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::LoadBlockedTerms)?;
        Ok(rows.blocked_terms.clone())
    }

    async fn upsert_blocked_term(&self, term: &str) -> StoreResult<()> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::UpsertBlockedTerm)?;
        if !rows.blocked_terms.iter().any(|t| t == term) {
            rows.blocked_terms.push(term.to_string());
        }
        Ok(())
    }

    async fn delete_blocked_term(&self, term: &str) -> StoreResult<()> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::DeleteBlockedTerm)?;
        rows.blocked_terms.retain(|t| t != term);
        Ok(())
    }

    async fn load_line_rules(&self) -> StoreResult<Vec<LineRule>> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::LoadLineRules)?;
        Ok(rows.line_rules.clone())
    }

    async fn upsert_line_rule(&self, rule: &LineRule) -> StoreResult<()> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::UpsertLineRule)?;
        upsert_rule(&mut rows.line_rules, rule.clone());
        Ok(())
    }

    async fn delete_line_rule(&self, line_text: &str) -> StoreResult<()> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::DeleteLineRule)?;
        rows.line_rules.retain(|r| r.line_text != line_text);
        Ok(())
    }

    async fn load_known_speakers(&self) -> StoreResult<Vec<String>> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::LoadKnownSpeakers)?;
        Ok(rows.known_speakers.clone())
    }

    async fn load_annotations(&self, scope: ScriptTarget) -> StoreResult<Vec<TagAnnotation>> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::LoadAnnotations)?;
        let mut found: Vec<TagAnnotation> = rows
            .annotations
            .iter()
            .filter(|a| a.scope == scope)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.id);
        Ok(found)
    }

    async fn insert_annotation(&self, annotation: &NewAnnotation) -> StoreResult<AnnotationId> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::InsertAnnotation)?;
        rows.next_annotation_id += 1;
        let id = AnnotationId(rows.next_annotation_id);
        rows.annotations.push(annotation.clone().with_id(id));
        Ok(id)
    }

    async fn delete_annotation(&self, id: AnnotationId) -> StoreResult<()> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::DeleteAnnotation)?;
        rows.annotations.retain(|a| a.id != id);
        Ok(())
    }

    async fn load_body(&self, target: ScriptTarget) -> StoreResult<String> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::LoadBody)?;
        rows.bodies
            .get(&target)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(target.to_string()))
    }

    async fn save_body(&self, target: ScriptTarget, text: &str) -> StoreResult<()> {
        let mut rows = self.rows.lock();
        rows.begin(StoreOp::SaveBody)?;
        match rows.bodies.get_mut(&target) {
            Some(body) => {
                text.clone_into(body);
                Ok(())
            }
            None => Err(StoreError::NotFound(target.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use scriptline_core::Classification;

    #[test]
    fn blocked_terms_are_unique_and_ordered() {
        let store = MemoryStore::new().with_blocked_terms(["b", "a", "b"]);
        block_on(store.upsert_blocked_term("c")).unwrap();
        block_on(store.upsert_blocked_term("a")).unwrap();
        assert_eq!(block_on(store.load_blocked_terms()).unwrap(), ["b", "a", "c"]);

        block_on(store.delete_blocked_term("a")).unwrap();
        block_on(store.delete_blocked_term("missing")).unwrap();
        assert_eq!(store.blocked_terms(), ["b", "c"]);
    }

    #[test]
    fn line_rules_upsert_in_place() {
        let store = MemoryStore::new();
        block_on(store.upsert_line_rule(&LineRule::new("夜", Classification::Direction))).unwrap();
        block_on(store.upsert_line_rule(&LineRule::new("朝", Classification::Direction))).unwrap();
        block_on(store.upsert_line_rule(&LineRule::new("夜", Classification::Location))).unwrap();

        assert_eq!(
            store.line_rules(),
            vec![
                LineRule::new("夜", Classification::Location),
                LineRule::new("朝", Classification::Direction),
            ]
        );
    }

    #[test]
    fn injected_failure_fires_once() {
        let store = MemoryStore::new();
        store.fail_next(StoreOp::LoadLineRules, StoreError::Network("down".into()));

        assert_eq!(
            block_on(store.load_line_rules()),
            Err(StoreError::Network("down".into()))
        );
        assert!(block_on(store.load_line_rules()).is_ok());
        assert_eq!(store.call_count(StoreOp::LoadLineRules), 2);
    }

    #[test]
    fn annotations_are_scoped_and_deletes_idempotent() {
        let store = MemoryStore::new();
        let new = NewAnnotation {
            tag_id: 1,
            scope: ScriptTarget::Episode(4),
            start_offset: 0,
            end_offset: 2,
            selected_text: "ab".into(),
        };
        let id = block_on(store.insert_annotation(&new)).unwrap();

        assert_eq!(
            block_on(store.load_annotations(ScriptTarget::Episode(4)))
                .unwrap()
                .len(),
            1
        );
        assert!(block_on(store.load_annotations(ScriptTarget::Thread(4)))
            .unwrap()
            .is_empty());

        block_on(store.delete_annotation(id)).unwrap();
        block_on(store.delete_annotation(id)).unwrap();
        assert!(store.annotations().is_empty());
    }

    #[test]
    fn bodies_require_an_existing_row() {
        let target = ScriptTarget::Thread(1);
        let store = MemoryStore::new().with_body(target, "old");

        block_on(store.save_body(target, "new")).unwrap();
        assert_eq!(store.body(target).as_deref(), Some("new"));
        assert!(matches!(
            block_on(store.load_body(ScriptTarget::Thread(2))),
            Err(StoreError::NotFound(_))
        ));
    }
}
