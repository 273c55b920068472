//! Findings and verdicts shared by all validators.
//!
//! A [`Finding`] is one reported rule violation; a [`Verdict`] is the
//! pass/fail outcome of a single validator run. Both are ephemeral:
//! they are produced, printed (or serialized), and discarded.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from the offending line as context.
pub const CONTEXT_MAX_CHARS: usize = 60;

/// Which rule a finding was triggered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// A banned word or expression (demonetization / style risk).
    BannedWord,
    /// A generic pronoun where a specific name is required.
    Pronoun,
    /// The same sentence-final form repeated across consecutive lines.
    RepetitiveEnding,
    /// A term annotated with a reading that differs from the canonical one.
    InconsistentReading,
    /// A moralizing phrase in a narrator-voiced line.
    MoralizingPhrase,
    /// One or more structural section markers are absent.
    MissingMarkers,
    /// Total cleaned character volume is below the configured floor.
    VolumeFloor,
    /// A section's share of the total falls outside its target band.
    RatioBand,
}

/// One reported instance of a rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    /// 1-based line number in the original document. Document-level
    /// findings (markers, volume, ratios) carry no line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// The rule that fired.
    pub kind: RuleKind,
    /// Human-readable explanation of the violation.
    pub rationale: String,
    /// Excerpt of the offending line (stripped, truncated).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context: String,
}

impl Finding {
    /// Build a line-level finding with a context excerpt.
    pub fn at_line(line: usize, kind: RuleKind, rationale: impl Into<String>, context: &str) -> Self {
        Self {
            line: Some(line),
            kind,
            rationale: rationale.into(),
            context: excerpt(context),
        }
    }

    /// Build a document-level finding (no line, no context).
    pub fn document(kind: RuleKind, rationale: impl Into<String>) -> Self {
        Self {
            line: None,
            kind,
            rationale: rationale.into(),
            context: String::new(),
        }
    }
}

/// Pass/fail outcome of one validator invocation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    /// All findings, ordered by line number ascending (first-seen order).
    pub findings: Vec<Finding>,
    /// `true` iff no findings were produced.
    pub pass: bool,
}

impl Verdict {
    /// Build a verdict from accumulated findings.
    ///
    /// The verdict passes iff `findings` is empty.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let pass = findings.is_empty();
        Self { findings, pass }
    }
}

/// Truncate a line to [`CONTEXT_MAX_CHARS`] characters on a char boundary.
pub(crate) fn excerpt(line: &str) -> String {
    if line.chars().count() <= CONTEXT_MAX_CHARS {
        return line.to_string();
    }
    let mut out: String = line.chars().take(CONTEXT_MAX_CHARS).collect();
    out.push('…');
    out
}
