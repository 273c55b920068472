//! Script line classification.
//!
//! Narration scripts interleave narrative lines with production metadata:
//! markdown headers, bracketed scene/visual cues (ASCII `[` and full-width
//! `【`), HTML comments, and parenthetical asides. Each consumer excludes a
//! slightly different subset, so the three prefix sets are kept distinct.

use regex::Regex;
use std::sync::LazyLock;

/// Structural marker opening the setup (Ki) section.
pub const MARKER_KI: &str = "<!-- PART: KI -->";

/// Structural marker opening the development (Sho) section.
pub const MARKER_SHO: &str = "<!-- PART: SHO -->";

/// Structural marker opening the climax/resolution (Ten-ketsu) section.
pub const MARKER_TEN_KETSU: &str = "<!-- PART: TEN-KETSU -->";

/// All three required structural markers.
pub const MARKERS: &[&str] = &[MARKER_KI, MARKER_SHO, MARKER_TEN_KETSU];

/// Matches any enclosing-comment structural marker, used to split the
/// document into sections.
pub static MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- PART: [A-Z-]+ -->").expect("valid regex"));

/// Narrator label with half-width colon.
const NARRATOR_PREFIX: &str = "ナレーター:";

/// Narrator label with full-width colon.
const NARRATOR_PREFIX_WIDE: &str = "ナレーター：";

/// Prefixes the safety validator skips (scene headers, comments, markdown).
const SAFETY_METADATA_PREFIXES: &[&str] = &["#", "[", "<"];

/// Prefixes stripped when measuring section volume.
const STRUCTURE_METADATA_PREFIXES: &[&str] = &["【", "[", "<!--", "#"];

/// Prefixes excluded when extracting narration for comparison.
const NARRATION_METADATA_PREFIXES: &[&str] = &["#", "[", "【", "<!--", "（"];

/// Returns the narrator-voiced payload of a line, with the label prefix
/// stripped, or `None` if the line is not narrator-attributed.
///
/// Both colon variants are accepted.
pub fn narrator_payload(stripped: &str) -> Option<&str> {
    stripped
        .strip_prefix(NARRATOR_PREFIX)
        .or_else(|| stripped.strip_prefix(NARRATOR_PREFIX_WIDE))
        .map(str::trim)
}

/// Whether a stripped line is metadata for the safety scan.
pub fn is_safety_metadata(stripped: &str) -> bool {
    SAFETY_METADATA_PREFIXES.iter().any(|p| stripped.starts_with(p))
}

/// Whether a stripped line is dropped when counting section volume.
pub fn is_structure_metadata(stripped: &str) -> bool {
    STRUCTURE_METADATA_PREFIXES.iter().any(|p| stripped.starts_with(p))
}

/// Whether a stripped line is dropped when extracting narration.
pub fn is_narration_metadata(stripped: &str) -> bool {
    NARRATION_METADATA_PREFIXES.iter().any(|p| stripped.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrator_prefix_both_colons() {
        assert_eq!(narrator_payload("ナレーター:こんにちは"), Some("こんにちは"));
        assert_eq!(narrator_payload("ナレーター：こんにちは"), Some("こんにちは"));
        assert_eq!(narrator_payload("田中:こんにちは"), None);
    }

    #[test]
    fn narrator_payload_is_trimmed() {
        assert_eq!(narrator_payload("ナレーター: こんにちは "), Some("こんにちは"));
    }

    #[test]
    fn marker_pattern_matches_all_markers() {
        for marker in MARKERS {
            assert!(MARKER_PATTERN.is_match(marker), "should match {marker}");
        }
    }

    #[test]
    fn marker_pattern_ignores_plain_comments() {
        assert!(!MARKER_PATTERN.is_match("<!-- SAFETY_OVERRIDE -->"));
    }

    #[test]
    fn safety_skips_angle_bracket_lines() {
        assert!(is_safety_metadata("<!-- comment -->"));
        assert!(is_safety_metadata("[BGM: rain]"));
        assert!(is_safety_metadata("# 見出し"));
        assert!(!is_safety_metadata("【制作メモ】rough cut"));
    }

    #[test]
    fn structure_drops_production_notes() {
        assert!(is_structure_metadata("【制作メモ】rough cut"));
        assert!(is_structure_metadata("[SEQ: 01]"));
        assert!(is_structure_metadata("<!-- PART: KI -->"));
        assert!(is_structure_metadata("# 見出し"));
        assert!(!is_structure_metadata("村は静まり返っていた。"));
    }

    #[test]
    fn narration_drops_parenthetical_asides() {
        assert!(is_narration_metadata("（全編完）"));
        assert!(is_narration_metadata("【制作メモ】"));
        assert!(!is_narration_metadata("ナレーター:こんにちは"));
    }
}
