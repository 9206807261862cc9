//! History actions for classification edits
//!
//! Every undoable edit is one [`HistoryAction`] value holding both its
//! before and after state. Committing applies the after side, undo applies
//! the before side, and redo applies the after side again, so all three go
//! through [`HistoryAction::apply`].
//!
//! Override actions write to the store first. Memory is only touched once
//! the write succeeded, which leaves the session unchanged when the store
//! rejects a call.

use core::mem;

use log::{debug, warn};
use scriptline_core::{Classification, LineRule};

use crate::core::buffer::BodyBuffer;
use crate::core::errors::Result;
use crate::core::overrides::OverrideCache;
use crate::store::ScriptStore;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which state of an action to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSide {
    /// Undo
    Before,
    /// Commit and redo
    After,
}

/// A reversible edit of the classification state
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// Enable or disable a blocked filler term
    SetFilterTerm {
        term: String,
        before_enabled: bool,
        after_enabled: bool,
        reparse: bool,
    },

    /// Set, change or clear the rule for a literal line
    SetLineRule {
        line_text: String,
        before: Option<Classification>,
        after: Option<Classification>,
        reparse: bool,
    },

    /// Replace the body buffer (structural edits)
    ReplaceBodyDraft {
        before_body: String,
        after_body: String,
    },
}

/// Mutable state an action is applied to
pub struct ActionContext<'a, S> {
    pub store: &'a S,
    pub overrides: &'a mut OverrideCache,
    pub buffer: &'a mut BodyBuffer,
}

impl HistoryAction {
    /// Whether applying either side would change nothing
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match self {
            Self::SetFilterTerm {
                before_enabled,
                after_enabled,
                ..
            } => before_enabled == after_enabled,
            Self::SetLineRule { before, after, .. } => before == after,
            Self::ReplaceBodyDraft {
                before_body,
                after_body,
            } => before_body == after_body,
        }
    }

    /// Whether the parsed lines must be recomputed after applying
    #[must_use]
    pub const fn needs_reparse(&self) -> bool {
        match self {
            Self::SetFilterTerm { reparse, .. } | Self::SetLineRule { reparse, .. } => *reparse,
            Self::ReplaceBodyDraft { .. } => true,
        }
    }

    /// Label for undo/redo menus
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::SetFilterTerm {
                term,
                after_enabled: true,
                ..
            } => format!("Block \"{term}\""),
            Self::SetFilterTerm { term, .. } => format!("Unblock \"{term}\""),
            Self::SetLineRule {
                line_text,
                after: Some(classification),
                ..
            } => format!("Mark \"{line_text}\" as {classification}"),
            Self::SetLineRule { line_text, .. } => format!("Clear rule for \"{line_text}\""),
            Self::ReplaceBodyDraft { .. } => "Edit body".to_string(),
        }
    }

    /// Approximate heap footprint
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>()
            + match self {
                Self::SetFilterTerm { term, .. } => term.len(),
                Self::SetLineRule { line_text, .. } => line_text.len(),
                Self::ReplaceBodyDraft {
                    before_body,
                    after_body,
                } => before_body.len() + after_body.len(),
            }
    }

    /// Apply one side of the action
    ///
    /// Store writes happen before any in-memory change; an error from the
    /// store is returned with the context untouched. After a successful
    /// write the affected cache table is reloaded, falling back to a local
    /// patch if the reload fails.
    pub async fn apply<S: ScriptStore>(
        &self,
        side: ActionSide,
        ctx: &mut ActionContext<'_, S>,
    ) -> Result<()> {
        match self {
            Self::SetFilterTerm {
                term,
                before_enabled,
                after_enabled,
                ..
            } => {
                let enabled = pick(side, *before_enabled, *after_enabled);
                if enabled {
                    ctx.store.upsert_blocked_term(term).await?;
                } else {
                    ctx.store.delete_blocked_term(term).await?;
                }
                debug!("blocked term {term:?} set to {enabled}");

                if let Err(err) = ctx.overrides.reload_blocked_terms(ctx.store).await {
                    warn!("reloading blocked terms failed, patching cache locally: {err}");
                    ctx.overrides.patch_blocked_term(term, enabled);
                }
            }

            Self::SetLineRule {
                line_text,
                before,
                after,
                ..
            } => {
                let classification = pick(side, *before, *after);
                match classification {
                    Some(c) => {
                        ctx.store
                            .upsert_line_rule(&LineRule::new(line_text.as_str(), c))
                            .await?;
                    }
                    None => ctx.store.delete_line_rule(line_text).await?,
                }
                debug!("line rule for {line_text:?} set to {classification:?}");

                if let Err(err) = ctx.overrides.reload_line_rules(ctx.store).await {
                    warn!("reloading line rules failed, patching cache locally: {err}");
                    ctx.overrides.patch_line_rule(line_text, classification);
                }
            }

            Self::ReplaceBodyDraft {
                before_body,
                after_body,
            } => {
                ctx.buffer
                    .replace_draft(pick(side, before_body, after_body));
            }
        }

        Ok(())
    }
}

fn pick<T>(side: ActionSide, before: T, after: T) -> T {
    match side {
        ActionSide::Before => before,
        ActionSide::After => after,
    }
}
