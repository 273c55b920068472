//! Narrative tone validation: no moralizing in narrator lines.
//!
//! Enforces a "show, don't tell" policy. Only narrator-attributed lines
//! are checked; dialogue and metadata are free to moralize.

use crate::policy::CompiledPolicy;
use crate::report::{Finding, RuleKind, Verdict};
use crate::script;

/// Scan narrator-voiced lines for moralizing phrases.
///
/// Each phrase reports at most once per line, however often it occurs.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn validate(text: &str, policy: &CompiledPolicy) -> Verdict {
    let mut findings = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let stripped = line.trim();

        // Section headers locate later findings in the trace log.
        if stripped.starts_with('#') {
            tracing::trace!(section = %stripped, "entering section");
            continue;
        }

        let Some(payload) = script::narrator_payload(stripped) else {
            continue;
        };

        let mut hit = vec![false; policy.moralizing.len()];
        for m in policy.moralizing_ac.find_overlapping_iter(payload) {
            hit[m.pattern().as_usize()] = true;
        }
        for (pattern_idx, phrase) in policy.moralizing.iter().enumerate() {
            if hit[pattern_idx] {
                findings.push(Finding::at_line(
                    idx + 1,
                    RuleKind::MoralizingPhrase,
                    format!("moralizing phrase '{phrase}' in a narrator line"),
                    payload,
                ));
            }
        }
    }

    Verdict::from_findings(findings)
}
