//! Structural validation: the Ki/Sho/Ten-ketsu length contract.
//!
//! Structural analysis is gated behind the safety scan: ratio numbers are
//! meaningless on a script that cannot ship anyway, so any safety failure
//! aborts before sections are even extracted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::policy::CompiledPolicy;
use crate::report::{Finding, RuleKind, Verdict};
use crate::safety;
use crate::script;

/// Default minimum cleaned character volume: a full episode-length script,
/// not a summary.
pub const DEFAULT_MIN_VOLUME_CHARS: usize = 6000;

/// Target share bands, in percent of total cleaned volume. Half-open:
/// the lower bound is acceptable, the upper bound is not.
const KI_BAND: (f64, f64) = (5.0, 15.0);
const SHO_BAND: (f64, f64) = (70.0, 90.0);
const TEN_KETSU_BAND: (f64, f64) = (5.0, 15.0);

/// The three script sections, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SectionLabel {
    /// 起 — setup.
    Ki,
    /// 承 — extended development.
    Sho,
    /// 転結 — short climax and resolution.
    TenKetsu,
}

impl SectionLabel {
    /// Display name used in findings and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ki => "Ki",
            Self::Sho => "Sho",
            Self::TenKetsu => "Ten-Ketsu",
        }
    }

    const fn band(self) -> (f64, f64) {
        match self {
            Self::Ki => KI_BAND,
            Self::Sho => SHO_BAND,
            Self::TenKetsu => TEN_KETSU_BAND,
        }
    }
}

/// Measured size of one section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SectionStats {
    /// Which section.
    pub label: SectionLabel,
    /// Cleaned character count (metadata and blank lines removed).
    pub chars: usize,
    /// Share of the total cleaned volume, in percent.
    pub percent: f64,
}

/// Tunables for structural validation.
#[derive(Debug, Clone)]
pub struct StructureOptions {
    /// Abort threshold for total cleaned volume.
    pub min_volume_chars: usize,
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            min_volume_chars: DEFAULT_MIN_VOLUME_CHARS,
        }
    }
}

/// Outcome of a gated structural run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StructureReport {
    /// The gating safety verdict. When it fails, no structural analysis ran
    /// and `findings` is empty.
    pub safety: Verdict,
    /// Per-section measurements; empty if analysis aborted early.
    pub sections: Vec<SectionStats>,
    /// Total cleaned character volume across the three sections.
    pub total_chars: usize,
    /// Structural findings (markers, volume floor, ratio bands).
    pub findings: Vec<Finding>,
    /// `true` iff the safety gate and every structural check passed.
    pub pass: bool,
}

impl StructureReport {
    fn gated(safety: Verdict) -> Self {
        Self {
            safety,
            sections: Vec::new(),
            total_chars: 0,
            findings: Vec::new(),
            pass: false,
        }
    }

    fn aborted(safety: Verdict, finding: Finding) -> Self {
        Self {
            safety,
            sections: Vec::new(),
            total_chars: 0,
            findings: vec![finding],
            pass: false,
        }
    }
}

/// Validate the three-act shape of a script.
///
/// Runs the safety scan first as a hard gate, then checks markers,
/// volume floor, and the 1:8:1 ratio bands. Band violations accumulate
/// independently; only the gate and the two abort conditions short-circuit.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn validate(text: &str, policy: &CompiledPolicy, opts: &StructureOptions) -> StructureReport {
    let safety = safety::validate(text, policy);
    if !safety.pass {
        tracing::debug!(findings = safety.findings.len(), "safety gate failed");
        return StructureReport::gated(safety);
    }

    let missing: Vec<&str> = script::MARKERS
        .iter()
        .copied()
        .filter(|m| !text.contains(m))
        .collect();
    if !missing.is_empty() {
        return StructureReport::aborted(
            safety,
            Finding::document(
                RuleKind::MissingMarkers,
                format!("missing structural markers: {}", missing.join(", ")),
            ),
        );
    }

    let fragments: Vec<&str> = script::MARKER_PATTERN.split(text).collect();
    if fragments.len() < 4 {
        return StructureReport::aborted(
            safety,
            Finding::document(
                RuleKind::MissingMarkers,
                "could not split content into sections; \
                 each marker must open its section",
            ),
        );
    }

    let labels = [SectionLabel::Ki, SectionLabel::Sho, SectionLabel::TenKetsu];
    let counts: Vec<usize> = fragments[1..=3].iter().map(|s| cleaned_char_count(s)).collect();
    let total: usize = counts.iter().sum();

    if total < opts.min_volume_chars {
        return StructureReport::aborted(
            safety,
            Finding::document(
                RuleKind::VolumeFloor,
                format!(
                    "script volume ({total}) is below the floor ({}); \
                     possible over-summarization",
                    opts.min_volume_chars
                ),
            ),
        );
    }

    let mut findings = Vec::new();
    let sections: Vec<SectionStats> = labels
        .iter()
        .zip(&counts)
        .map(|(&label, &chars)| {
            let percent = (chars as f64 / total as f64) * 100.0;
            let (low, high) = label.band();
            // Lower bound inclusive, upper exclusive: a section sitting
            // exactly on its ceiling has already crowded out the others.
            if percent < low || percent >= high {
                findings.push(Finding::document(
                    RuleKind::RatioBand,
                    format!(
                        "'{}' is {percent:.1}% of the script; must be at least \
                         {low:.0}% and under {high:.0}%",
                        label.as_str()
                    ),
                ));
            }
            SectionStats {
                label,
                chars,
                percent,
            }
        })
        .collect();

    let pass = findings.is_empty();
    StructureReport {
        safety,
        sections,
        total_chars: total,
        findings,
        pass,
    }
}

/// Character volume of a section once metadata and blank lines are dropped.
///
/// Counts Unicode scalars, not bytes; surviving lines are joined without
/// separators first, matching how episode length is budgeted.
fn cleaned_char_count(section: &str) -> usize {
    section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !script::is_structure_metadata(line))
        .map(|line| line.chars().count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;
    use crate::script::{MARKER_KI, MARKER_SHO, MARKER_TEN_KETSU};

    fn compiled() -> CompiledPolicy {
        Policy::builtin().compile().unwrap()
    }

    /// A marked-up script with the given cleaned section sizes.
    fn script_with_sizes(ki: usize, sho: usize, ten: usize) -> String {
        let fill = |n: usize| "安".repeat(n);
        format!(
            "# 台本\n{MARKER_KI}\n【制作メモ】導入は静かに\n{}\n{MARKER_SHO}\n[SE: 風]\n{}\n{MARKER_TEN_KETSU}\n{}\n",
            fill(ki),
            fill(sho),
            fill(ten),
        )
    }

    #[test]
    fn golden_ratio_passes() {
        let report = validate(&script_with_sizes(1000, 8000, 1000), &compiled(), &StructureOptions::default());
        assert!(report.pass, "findings: {:?}", report.findings);
        assert_eq!(report.total_chars, 10000);
        let percents: Vec<u32> = report.sections.iter().map(|s| s.percent.round() as u32).collect();
        assert_eq!(percents, vec![10, 80, 10]);
    }

    #[test]
    fn sho_over_band_fails_with_single_finding() {
        let report = validate(&script_with_sizes(500, 9000, 500), &compiled(), &StructureOptions::default());
        assert!(!report.pass);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].kind, RuleKind::RatioBand);
        assert!(report.findings[0].rationale.contains("Sho"));
    }

    #[test]
    fn band_bounds_are_lower_inclusive_upper_exclusive() {
        // 500/9000/500: Ki and Ten-ketsu sit exactly on their 5% floor
        // (acceptable); Sho sits exactly on its 90% ceiling (not).
        let report = validate(&script_with_sizes(500, 9000, 500), &compiled(), &StructureOptions::default());
        assert_eq!(report.findings.len(), 1);
        assert!(report.findings[0].rationale.contains("Sho"));

        // 1500/7000/1500: Sho exactly on its 70% floor passes; the outer
        // sections exactly on their 15% ceiling both fail.
        let report = validate(&script_with_sizes(1500, 7000, 1500), &compiled(), &StructureOptions::default());
        assert_eq!(report.findings.len(), 2);
        assert!(report.findings[0].rationale.contains("Ki"));
        assert!(report.findings[1].rationale.contains("Ten-Ketsu"));
    }

    #[test]
    fn band_violations_accumulate() {
        // 20/60/20: every band is violated, none suppressed.
        let report = validate(&script_with_sizes(2000, 6000, 2000), &compiled(), &StructureOptions::default());
        assert_eq!(report.findings.len(), 3);
    }

    #[test]
    fn missing_marker_aborts_regardless_of_volume() {
        let text = script_with_sizes(1000, 8000, 1000).replace(MARKER_SHO, "");
        let report = validate(&text, &compiled(), &StructureOptions::default());
        assert!(!report.pass);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].kind, RuleKind::MissingMarkers);
        assert!(report.findings[0].rationale.contains(MARKER_SHO));
        assert!(report.sections.is_empty());
    }

    #[test]
    fn thin_script_hits_the_volume_floor() {
        let report = validate(&script_with_sizes(100, 800, 100), &compiled(), &StructureOptions::default());
        assert!(!report.pass);
        assert_eq!(report.findings[0].kind, RuleKind::VolumeFloor);
    }

    #[test]
    fn volume_floor_is_configurable() {
        let opts = StructureOptions {
            min_volume_chars: 500,
        };
        let report = validate(&script_with_sizes(100, 800, 100), &compiled(), &opts);
        assert!(report.pass, "findings: {:?}", report.findings);
    }

    #[test]
    fn safety_gate_preempts_structural_analysis() {
        let mut text = script_with_sizes(1000, 8000, 1000);
        text.push_str("彼は戻らなかった。\n");
        let report = validate(&text, &compiled(), &StructureOptions::default());
        assert!(!report.pass);
        assert!(!report.safety.pass);
        // The reported failure is the safety one, not a structural one.
        assert!(report.findings.is_empty());
        assert!(report.sections.is_empty());
    }

    #[test]
    fn metadata_lines_do_not_count_toward_volume() {
        let with_meta = script_with_sizes(1000, 8000, 1000);
        let report = validate(&with_meta, &compiled(), &StructureOptions::default());
        // 【制作メモ】 and [SE:] lines are invisible to the count.
        assert_eq!(report.total_chars, 10000);
    }
}
