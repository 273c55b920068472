//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Write a script to a temp dir and return (dir, path).
fn script_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// A structurally valid script with roughly 1:8:1 proportions.
fn golden_script() -> String {
    let fill = |n: usize| "安".repeat(n);
    format!(
        "# 台本\n<!-- PART: KI -->\n{}\n<!-- PART: SHO -->\n{}\n<!-- PART: TEN-KETSU -->\n{}\n",
        fill(1000),
        fill(8000),
        fill(1000),
    )
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn no_args_shows_help() {
    cmd().assert().failure().stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Safety Command
// =============================================================================

#[test]
fn safety_passes_clean_script() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(&dir, "clean.md", "村は静まり返っていた。\n[SE: 風の音]\n");
    cmd()
        .arg("safety")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn safety_fails_on_banned_word() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(&dir, "bad.md", "その村で殺人が起きた。\n");
    cmd()
        .arg("safety")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("line 1"));
}

#[test]
fn safety_fails_on_generic_pronoun() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(&dir, "pronoun.md", "彼は戻らなかった。\n");
    cmd().arg("safety").arg(&path).assert().failure();
}

#[test]
fn safety_allows_hisshi_compound() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(&dir, "hisshi.md", "必死に走り続けた。\n");
    cmd().arg("safety").arg(&path).assert().success();
}

#[test]
fn safety_json_output_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(&dir, "bad.md", "その村で殺人が起きた。\n");
    let output = cmd()
        .arg("--json")
        .arg("safety")
        .arg(&path)
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let verdict: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(verdict["pass"], false);
    assert_eq!(verdict["findings"][0]["line"], 1);
}

#[test]
fn safety_reads_shift_jis_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cp932.md");
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode("村は静まり返っていた。\n");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&encoded).unwrap();
    drop(file);
    cmd().arg("safety").arg(&path).assert().success();
}

#[test]
fn missing_file_is_a_fatal_input_error() {
    cmd()
        .arg("safety")
        .arg("does-not-exist.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// =============================================================================
// Tone Command
// =============================================================================

#[test]
fn tone_passes_factual_narration() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(
        &dir,
        "facts.md",
        "ナレーター:気温は氷点下まで下がった。\n",
    );
    cmd().arg("tone").arg(&path).assert().success();
}

#[test]
fn tone_fails_on_moralizing_narrator_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(
        &dir,
        "preachy.md",
        "ナレーター:この事件の教訓は深い。\n",
    );
    cmd()
        .arg("tone")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("教訓"));
}

#[test]
fn tone_ignores_dialogue_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(&dir, "dialogue.md", "田中:私たちが学ぶべきことは多い。\n");
    cmd().arg("tone").arg(&path).assert().success();
}

// =============================================================================
// Structure Command
// =============================================================================

#[test]
fn structure_passes_golden_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let path = script_file(&dir, "golden.md", &golden_script());
    cmd()
        .arg("structure")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn structure_fails_on_missing_marker() {
    let dir = tempfile::tempdir().unwrap();
    let script = golden_script().replace("<!-- PART: SHO -->", "");
    let path = script_file(&dir, "unmarked.md", &script);
    cmd()
        .arg("structure")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing structural markers"));
}

#[test]
fn structure_blocked_by_safety_gate() {
    let dir = tempfile::tempdir().unwrap();
    let mut script = golden_script();
    script.push_str("彼は戻らなかった。\n");
    let path = script_file(&dir, "unsafe.md", &script);
    cmd()
        .arg("structure")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("safety gate"));
}

#[test]
fn structure_volume_floor_can_be_overridden() {
    let dir = tempfile::tempdir().unwrap();
    let fill = |n: usize| "安".repeat(n);
    let script = format!(
        "<!-- PART: KI -->\n{}\n<!-- PART: SHO -->\n{}\n<!-- PART: TEN-KETSU -->\n{}\n",
        fill(100),
        fill(800),
        fill(100),
    );
    let path = script_file(&dir, "short.md", &script);

    cmd().arg("structure").arg(&path).assert().failure();
    cmd()
        .arg("structure")
        .arg(&path)
        .arg("--min-volume")
        .arg("500")
        .assert()
        .success();
}

// =============================================================================
// Compare Command
// =============================================================================

#[test]
fn compare_reports_exact_match() {
    let dir = tempfile::tempdir().unwrap();
    let full = script_file(
        &dir,
        "full.md",
        "ナレーター:こんにちは\n[SE: door]\n# note\n",
    );
    let narration = script_file(&dir, "narr.txt", "こんにちは");
    cmd()
        .arg("compare")
        .arg(&full)
        .arg(&narration)
        .assert()
        .success()
        .stdout(predicate::str::contains("MATCH"));
}

#[test]
fn compare_reports_replace_span() {
    let dir = tempfile::tempdir().unwrap();
    let full = script_file(&dir, "full.md", "ABCXYZ\n");
    let narration = script_file(&dir, "narr.txt", "ABDXYZ");
    cmd()
        .arg("compare")
        .arg(&full)
        .arg(&narration)
        .assert()
        .failure()
        .stdout(predicate::str::contains("replace"));
}

// =============================================================================
// Config & Policy
// =============================================================================

#[test]
fn config_file_sets_volume_floor() {
    let dir = tempfile::tempdir().unwrap();
    let fill = |n: usize| "安".repeat(n);
    let script = format!(
        "<!-- PART: KI -->\n{}\n<!-- PART: SHO -->\n{}\n<!-- PART: TEN-KETSU -->\n{}\n",
        fill(100),
        fill(800),
        fill(100),
    );
    let path = script_file(&dir, "short.md", &script);
    let config = script_file(&dir, "config.toml", "min_volume_chars = 500\n");

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("structure")
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn external_policy_replaces_builtin_rules() {
    let dir = tempfile::tempdir().unwrap();
    let policy = script_file(
        &dir,
        "policy.toml",
        r#"
version = 2

[[banned]]
pattern = "りんご"
rationale = "test: no apples"
"#,
    );
    let config = script_file(
        &dir,
        "config.toml",
        &format!("policy = \"{}\"\n", policy.display()),
    );
    // 殺人 passes under the replacement policy; りんご does not.
    let ok = script_file(&dir, "ok.md", "その村で殺人が起きた。\n");
    let bad = script_file(&dir, "bad.md", "赤いりんごを食べた。\n");

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("safety")
        .arg(&ok)
        .assert()
        .success();
    cmd()
        .arg("--config")
        .arg(&config)
        .arg("safety")
        .arg(&bad)
        .assert()
        .failure();
}

#[test]
fn info_shows_policy_summary() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains("policy:"));
}
