//! Process-local cache of the override tables
//!
//! Holds the store's blocked terms, line rules and speaker directory in
//! display order, plus the [`Overrides`] snapshot handed to the classifier.
//! A reload replaces a table only when the store answered; a failed reload
//! leaves the previous contents in place.

use log::debug;
use scriptline_core::{Classification, LineRule, Overrides};

use crate::store::{ScriptStore, StoreResult};

/// Cached override tables
#[derive(Debug, Clone, Default)]
pub struct OverrideCache {
    blocked_terms: Vec<String>,
    line_rules: Vec<LineRule>,
    known_speakers: Vec<String>,
    snapshot: Overrides,
}

impl OverrideCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from rows already in hand
    #[must_use]
    pub fn from_rows(
        blocked_terms: Vec<String>,
        line_rules: Vec<LineRule>,
        known_speakers: Vec<String>,
    ) -> Self {
        let mut cache = Self {
            blocked_terms,
            line_rules,
            known_speakers,
            snapshot: Overrides::new(),
        };
        cache.rebuild();
        cache
    }

    /// Reload every table
    ///
    /// All three loads must succeed before anything is replaced.
    pub async fn reload<S: ScriptStore>(&mut self, store: &S) -> StoreResult<()> {
        let (blocked_terms, line_rules, known_speakers) = futures::try_join!(
            store.load_blocked_terms(),
            store.load_line_rules(),
            store.load_known_speakers(),
        )?;

        self.blocked_terms = blocked_terms;
        self.line_rules = line_rules;
        self.known_speakers = known_speakers;
        self.rebuild();

        debug!(
            "override cache loaded: {} blocked terms, {} line rules, {} speakers",
            self.blocked_terms.len(),
            self.line_rules.len(),
            self.known_speakers.len()
        );
        Ok(())
    }

    /// Reload only the blocked terms
    pub async fn reload_blocked_terms<S: ScriptStore>(&mut self, store: &S) -> StoreResult<()> {
        self.blocked_terms = store.load_blocked_terms().await?;
        self.rebuild();
        Ok(())
    }

    /// Reload only the line rules
    pub async fn reload_line_rules<S: ScriptStore>(&mut self, store: &S) -> StoreResult<()> {
        self.line_rules = store.load_line_rules().await?;
        self.rebuild();
        Ok(())
    }

    /// Reload only the speaker directory
    pub async fn reload_known_speakers<S: ScriptStore>(&mut self, store: &S) -> StoreResult<()> {
        self.known_speakers = store.load_known_speakers().await?;
        self.rebuild();
        Ok(())
    }

    /// Apply a blocked-term change locally, mirroring what the store did
    pub fn patch_blocked_term(&mut self, term: &str, enabled: bool) {
        let present = self.blocked_terms.iter().any(|t| t == term);
        match (enabled, present) {
            (true, false) => self.blocked_terms.push(term.to_string()),
            (false, true) => self.blocked_terms.retain(|t| t != term),
            _ => {}
        }
        self.snapshot.set_blocked(term, enabled);
    }

    /// Apply a line-rule change locally, mirroring what the store did
    pub fn patch_line_rule(&mut self, line_text: &str, classification: Option<Classification>) {
        match classification {
            Some(c) => {
                if let Some(rule) = self.line_rules.iter_mut().find(|r| r.line_text == line_text) {
                    rule.classification = c;
                } else {
                    self.line_rules.push(LineRule::new(line_text, c));
                }
            }
            None => self.line_rules.retain(|r| r.line_text != line_text),
        }
        self.snapshot.set_rule(line_text, classification);
    }

    /// Snapshot for the classifier
    #[must_use]
    pub const fn snapshot(&self) -> &Overrides {
        &self.snapshot
    }

    /// Blocked terms in display order
    #[must_use]
    pub fn blocked_terms(&self) -> &[String] {
        &self.blocked_terms
    }

    /// Line rules in store order
    #[must_use]
    pub fn line_rules(&self) -> &[LineRule] {
        &self.line_rules
    }

    /// Speaker directory in store order
    #[must_use]
    pub fn known_speakers(&self) -> &[String] {
        &self.known_speakers
    }

    #[must_use]
    pub fn is_blocked(&self, term: &str) -> bool {
        self.snapshot.is_blocked(term)
    }

    #[must_use]
    pub fn rule_for(&self, line_text: &str) -> Option<Classification> {
        self.snapshot.rule_for(line_text)
    }

    fn rebuild(&mut self) {
        self.snapshot = Overrides::new()
            .with_blocked_terms(self.blocked_terms.iter().cloned())
            .with_line_rules(self.line_rules.iter().cloned())
            .with_known_speakers(self.known_speakers.iter().cloned());
    }
}
