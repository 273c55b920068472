//! Core library for daihon-lint.
//!
//! Validates Japanese narration scripts against a fixed editorial policy
//! before they proceed to production. Three validators cover three
//! orthogonal concerns, plus a comparator for cross-checking derived
//! representations of the same script:
//!
//! - [`safety`] — banned words, generic pronouns, consecutive-ending
//!   repetition, and term-reading consistency
//! - [`tone`] — moralizing phrases in narrator-voiced lines
//! - [`structure`] — the Ki/Sho/Ten-ketsu length contract, gated behind
//!   the safety scan
//! - [`compare`] — narration extraction and character-level diffing
//!
//! Rules live in a versioned [`policy::Policy`], compiled once per run.
//!
//! # Quick Start
//!
//! ```
//! use daihon_lint_core::{Policy, safety};
//!
//! let policy = Policy::builtin().compile().expect("built-in policy compiles");
//! let verdict = safety::validate("村は静まり返っていた。\n", &policy);
//! assert!(verdict.pass);
//! ```
#![deny(unsafe_code)]

pub mod compare;
pub mod config;
pub mod error;
pub mod policy;
pub mod report;
pub mod safety;
pub mod script;
pub mod structure;
pub mod tone;

pub use compare::DiffReport;
pub use config::{Config, ConfigLoader, LogLevel};
pub use error::{ConfigError, ConfigResult, PolicyError, PolicyResult};
pub use policy::{CompiledPolicy, Policy};
pub use report::{Finding, RuleKind, Verdict};
pub use structure::{StructureOptions, StructureReport};

/// Default maximum input size: 5 MiB.
///
/// Narration scripts are small text files; anything larger is almost
/// certainly a mistake.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;
