//! # scriptline core
//!
//! Line classifier for pasted narrative-script transcripts. Takes a raw block
//! of text copied out of a script viewer and segments it into typed lines:
//! dialogue attributed to a speaker, stage directions and location captions.
//!
//! ## Features
//!
//! - **Deterministic classification**: pure function of text and overrides
//! - **User overrides**: literal-line rules always win over heuristics
//! - **Traceability**: every parsed line names the raw line it came from
//! - **Body transforms**: split/delete/speaker-split helpers for structural edits
//!
//! ## Quick Start
//!
//! ```rust
//! use scriptline_core::{classify, LineKind, Overrides};
//!
//! let overrides = Overrides::new().with_known_speakers(["アリス", "ボブ"]);
//! let lines = classify("アリス\nこんにちは\nボブ\nやあ", &overrides);
//!
//! assert_eq!(lines.len(), 2);
//! assert_eq!(lines[0].kind, LineKind::Dialogue);
//! assert_eq!(lines[0].speaker, "アリス");
//! assert_eq!(lines[1].content, "やあ");
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod parser;
pub mod transform;
pub mod utils;

pub use config::{ClassifierConfig, SpeakerPolicy};
pub use parser::{
    classify, classify_with_config, reassemble, Classification, LineClassifier, LineKind,
    LineRule, Overrides, ParsedLine,
};
pub use utils::{CoreError, Result};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
