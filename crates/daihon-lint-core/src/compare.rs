//! Narration comparison between two shapes of the same script.
//!
//! A full production script carries narration interleaved with scene
//! headers, production notes, and comments; a narration-only file carries
//! just the spoken text. Both are reduced to a normalized character stream
//! and compared; any divergence is reported as a character-level edit
//! script (Replace / Delete / Insert spans, in left-to-right order).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use similar::{DiffTag, TextDiff};

use crate::script;

/// Kind of one non-equal span in the alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// A span in the full script maps to different text in the narration file.
    Replace,
    /// Text present only in the full script.
    Delete,
    /// Text present only in the narration file.
    Insert,
}

/// One non-equal span of the character alignment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiffSpan {
    /// What kind of divergence this is.
    pub kind: DiffKind,
    /// The span's text in the full script ("" for inserts).
    pub a: String,
    /// The span's text in the narration file ("" for deletes).
    pub b: String,
}

/// Result of comparing the two extracted narration texts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiffReport {
    /// `true` iff the normalized forms are identical.
    pub exact_match: bool,
    /// Non-equal spans, in alignment order. Empty on an exact match.
    pub spans: Vec<DiffSpan>,
}

/// Extract narration from a full script.
///
/// Metadata-prefixed lines are dropped; the narrator label (either colon
/// variant) is stripped; every other surviving line is assumed to be
/// narration and kept in order.
pub fn extract_narration(full_script: &str) -> String {
    let mut narration = Vec::new();
    for line in full_script.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || script::is_narration_metadata(stripped) {
            continue;
        }
        let content = script::narrator_payload(stripped).unwrap_or(stripped);
        narration.push(content);
    }
    narration.join("\n")
}

/// Normalize extracted narration for strict character comparison.
///
/// Removes all whitespace (ASCII and full-width), newlines, and the
/// bracket characters extraction can leave behind.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '　' | '\n' | '\r' | '[' | ']'))
        .collect()
}

/// Compare a full script's narration against a narration-only document.
///
/// `full_script` goes through narration extraction; `narration_only` is
/// used raw. Both are normalized identically before comparison.
#[tracing::instrument(skip_all, fields(a_len = full_script.len(), b_len = narration_only.len()))]
pub fn compare(full_script: &str, narration_only: &str) -> DiffReport {
    let a = normalize(&extract_narration(full_script));
    let b = normalize(narration_only);

    if a == b {
        return DiffReport {
            exact_match: true,
            spans: Vec::new(),
        };
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let diff = TextDiff::from_chars(a.as_str(), b.as_str());

    let spans = diff
        .ops()
        .iter()
        .filter_map(|op| {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            let kind = match tag {
                DiffTag::Equal => return None,
                DiffTag::Replace => DiffKind::Replace,
                DiffTag::Delete => DiffKind::Delete,
                DiffTag::Insert => DiffKind::Insert,
            };
            Some(DiffSpan {
                kind,
                a: a_chars[old_range].iter().collect(),
                b: b_chars[new_range].iter().collect(),
            })
        })
        .collect();

    DiffReport {
        exact_match: false,
        spans,
    }
}
