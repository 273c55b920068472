//! Safety validation: banned words, pronouns, ending repetition, and
//! term-reading consistency.
//!
//! One pass over the document, line by line. Metadata lines (production
//! notes, scene headers, comments, whitelisted lines) are never scanned.
//! All checks that can run do run; findings accumulate in first-seen order
//! and nothing short-circuits.

use crate::policy::CompiledPolicy;
use crate::report::{Finding, RuleKind, Verdict};
use crate::script;

/// Consecutive-ending tracking across qualifying lines.
///
/// Reset whenever a line's ending does not match the tracked pattern;
/// restarted at 1 when a line ends differently from the previous one.
#[derive(Default)]
struct EndingRun {
    last_ending: String,
    run_length: u32,
}

impl EndingRun {
    /// Feed the ending matched on the current line; returns the run length.
    fn advance(&mut self, ending: &str) -> u32 {
        if ending == self.last_ending {
            self.run_length += 1;
        } else {
            self.last_ending = ending.to_string();
            self.run_length = 1;
        }
        self.run_length
    }

    fn clear(&mut self) {
        self.last_ending.clear();
        self.run_length = 0;
    }
}

/// Scan a document against the safety policy.
///
/// The verdict passes iff zero findings were produced across all checks.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn validate(text: &str, policy: &CompiledPolicy) -> Verdict {
    let mut findings = Vec::new();
    let mut run = EndingRun::default();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        if policy.is_whitelisted(line) || script::is_safety_metadata(stripped) {
            continue;
        }

        check_word_rules(line_num, line, stripped, policy, &mut findings);
        check_ending(line_num, stripped, policy, &mut run, &mut findings);
        check_terms(line_num, stripped, policy, &mut findings);
    }

    Verdict::from_findings(findings)
}

/// Banned-word and pronoun rules: one finding per occurrence per rule,
/// unless a declared adjacency exception applies.
fn check_word_rules(
    line_num: usize,
    line: &str,
    stripped: &str,
    policy: &CompiledPolicy,
    findings: &mut Vec<Finding>,
) {
    for rule in &policy.rules {
        for m in rule.regex.find_iter(line) {
            if rule.exception_at(line, m.start(), m.end()) {
                continue;
            }
            findings.push(Finding::at_line(
                line_num,
                rule.kind,
                rule.rationale.clone(),
                stripped,
            ));
        }
    }
}

/// Consecutive sentence-final repetition across qualifying lines.
fn check_ending(
    line_num: usize,
    stripped: &str,
    policy: &CompiledPolicy,
    run: &mut EndingRun,
    findings: &mut Vec<Finding>,
) {
    let Some(ref ending_re) = policy.ending else {
        return;
    };
    match ending_re.captures(stripped) {
        Some(caps) => {
            let ending = caps.get(1).map_or("", |m| m.as_str());
            let length = run.advance(ending);
            if length >= 2 {
                findings.push(Finding::at_line(
                    line_num,
                    RuleKind::RepetitiveEnding,
                    format!(
                        "ending '{ending}' repeated {length} lines in a row. \
                         Vary the sentence (e.g. a noun-stop / 体言止め)."
                    ),
                    stripped,
                ));
            }
        }
        None => run.clear(),
    }
}

/// Term-consistency: a present-but-wrong parenthetical reading is an error;
/// an absent annotation is not.
fn check_terms(
    line_num: usize,
    stripped: &str,
    policy: &CompiledPolicy,
    findings: &mut Vec<Finding>,
) {
    for term in &policy.terms {
        if !stripped.contains(term.term.as_str()) {
            continue;
        }
        let Some(caps) = term.annotation.captures(stripped) else {
            continue;
        };
        let actual = caps.get(1).map_or("", |m| m.as_str());
        if actual != term.reading {
            findings.push(Finding::at_line(
                line_num,
                RuleKind::InconsistentReading,
                format!(
                    "inconsistent reading for '{}': found '（{actual}）', expected '（{}）'",
                    term.term, term.reading
                ),
                stripped,
            ));
        }
    }
}
