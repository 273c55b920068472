//! Tone command — "show, don't tell" enforcement for narrator lines.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use daihon_lint_core::policy::CompiledPolicy;
use daihon_lint_core::tone;

use super::read_input_file;
use super::safety::print_findings;

/// Arguments for the `tone` subcommand.
#[derive(Args, Debug)]
pub struct ToneArgs {
    /// Script file to analyze.
    pub file: Utf8PathBuf,
}

/// Check narrator-voiced lines for moralizing language.
#[instrument(name = "cmd_tone", skip_all, fields(file = %args.file))]
pub fn cmd_tone(
    args: ToneArgs,
    global_json: bool,
    policy: &CompiledPolicy,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, "executing tone command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let verdict = tone::validate(&content, policy);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        if !verdict.pass {
            bail!("{} failed tone checks", args.file);
        }
        return Ok(());
    }

    if verdict.pass {
        println!(
            "{} {} no moralizing language in narrator lines",
            "PASS:".green(),
            args.file
        );
        return Ok(());
    }

    println!("{} {}", args.file.bold(), "FAIL".red());
    print_findings(&verdict);
    println!("  The narrator deals in facts and emotions, not opinions.");
    bail!(
        "{}: {} moralizing phrases found",
        args.file,
        verdict.findings.len()
    );
}
