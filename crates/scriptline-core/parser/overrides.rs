//! Snapshot of the user-maintained classification overrides
//!
//! Hosts keep the authoritative rows in their store; the classifier only
//! ever sees an immutable `Overrides` passed by reference.

use ahash::RandomState;
use std::collections::{HashMap, HashSet};

use super::ast::{Classification, LineRule};
use crate::utils::{create_hash_map, create_hash_set};

/// Blocked terms, line rules and known speakers used for one classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    blocked_terms: HashSet<String, RandomState>,
    line_rules: HashMap<String, Classification, RandomState>,
    known_speakers: HashSet<String, RandomState>,
}

impl Overrides {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocked_terms: create_hash_set(),
            line_rules: create_hash_map(),
            known_speakers: create_hash_set(),
        }
    }

    /// Add blocked terms
    #[must_use]
    pub fn with_blocked_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Add line rules; later rules for the same text replace earlier ones
    #[must_use]
    pub fn with_line_rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = LineRule>,
    {
        for rule in rules {
            self.line_rules.insert(rule.line_text, rule.classification);
        }
        self
    }

    /// Add known speakers
    #[must_use]
    pub fn with_known_speakers<I, S>(mut self, speakers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_speakers
            .extend(speakers.into_iter().map(Into::into));
        self
    }

    /// Check if a normalized line is blocked
    #[must_use]
    pub fn is_blocked(&self, line: &str) -> bool {
        self.blocked_terms.contains(line)
    }

    /// Rule attached to a normalized line
    #[must_use]
    pub fn rule_for(&self, line: &str) -> Option<Classification> {
        self.line_rules.get(line).copied()
    }

    /// Check if a line is in the speaker directory
    #[must_use]
    pub fn is_known_speaker(&self, line: &str) -> bool {
        self.known_speakers.contains(line)
    }

    /// Iterate known speakers in arbitrary order
    pub fn known_speakers(&self) -> impl Iterator<Item = &str> {
        self.known_speakers.iter().map(String::as_str)
    }

    /// Insert or remove a blocked term
    pub fn set_blocked(&mut self, term: &str, blocked: bool) {
        if blocked {
            self.blocked_terms.insert(term.to_string());
        } else {
            self.blocked_terms.remove(term);
        }
    }

    /// Upsert (`Some`) or remove (`None`) the rule for a line
    pub fn set_rule(&mut self, line_text: &str, classification: Option<Classification>) {
        match classification {
            Some(c) => {
                self.line_rules.insert(line_text.to_string(), c);
            }
            None => {
                self.line_rules.remove(line_text);
            }
        }
    }

    /// Number of blocked terms
    #[must_use]
    pub fn blocked_term_count(&self) -> usize {
        self.blocked_terms.len()
    }

    /// Number of line rules
    #[must_use]
    pub fn line_rule_count(&self) -> usize {
        self.line_rules.len()
    }
}
