//! Compare command — cross-check narration between two script shapes.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use daihon_lint_core::compare::{self, DiffKind};

use super::read_input_file;

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Full script (narration interleaved with production metadata).
    pub full_script: Utf8PathBuf,

    /// Narration-only file.
    pub narration: Utf8PathBuf,
}

/// Compare extracted narration character-for-character.
#[instrument(name = "cmd_compare", skip_all, fields(a = %args.full_script, b = %args.narration))]
pub fn cmd_compare(
    args: CompareArgs,
    global_json: bool,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(a = %args.full_script, b = %args.narration, "executing compare command");

    let full = read_input_file(&args.full_script, max_input_bytes)?;
    let narration = read_input_file(&args.narration, max_input_bytes)?;
    let report = compare::compare(&full, &narration);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.exact_match {
            bail!("narration differs between {} and {}", args.full_script, args.narration);
        }
        return Ok(());
    }

    if report.exact_match {
        println!(
            "{} narration is identical character-for-character",
            "MATCH:".green()
        );
        return Ok(());
    }

    println!("{} differences detected", "DIFF:".red());
    for span in &report.spans {
        match span.kind {
            DiffKind::Replace => {
                println!("  {} '{}' -> '{}'", "replace".yellow(), span.a, span.b);
            }
            DiffKind::Delete => {
                println!(
                    "  {}  full script has '{}', missing in narration file",
                    "delete".red(),
                    span.a
                );
            }
            DiffKind::Insert => {
                println!(
                    "  {}  narration file has '{}', missing in full script",
                    "insert".green(),
                    span.b
                );
            }
        }
    }
    bail!(
        "narration differs between {} and {} ({} spans)",
        args.full_script,
        args.narration,
        report.spans.len()
    );
}
