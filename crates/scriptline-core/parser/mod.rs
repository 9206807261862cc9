//! Script-line classification
//!
//! Pipeline: normalize (split on any line ending, trim, drop blanks) →
//! drop viewer banners → drop blocked terms → cursor walk producing
//! [`ParsedLine`] records.
//!
//! # Example
//!
//! ```rust
//! use scriptline_core::parser::{classify, LineKind, Overrides};
//!
//! let overrides = Overrides::new().with_known_speakers(["アリス", "ボブ"]);
//! let lines = classify("アリス\nこんにちは\n機能一覧\nボブ\nやあ", &overrides);
//!
//! assert_eq!(lines.len(), 2);
//! assert!(lines.iter().all(|l| l.kind == LineKind::Dialogue));
//! ```

pub mod ast;
pub mod classifier;
pub mod normalize;
pub mod overrides;
pub mod reassemble;

pub use ast::{Classification, LineKind, LineRule, ParsedLine};
pub use classifier::{classify, classify_with_config, LineClassifier};
pub use normalize::{normalize, SourceLine};
pub use overrides::Overrides;
pub use reassemble::reassemble;
