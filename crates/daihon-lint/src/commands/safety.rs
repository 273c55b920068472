//! Safety command — the NG word / pronoun / repetition / reading blockade.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, info, instrument};

use daihon_lint_core::policy::CompiledPolicy;
use daihon_lint_core::report::Verdict;
use daihon_lint_core::safety;

use super::read_input_file;

/// Arguments for the `safety` subcommand.
#[derive(Args, Debug)]
pub struct SafetyArgs {
    /// Script file to scan.
    pub file: Utf8PathBuf,
}

/// Print a verdict's findings with line numbers and context excerpts.
pub fn print_findings(verdict: &Verdict) {
    for finding in &verdict.findings {
        match finding.line {
            Some(line) => println!("  line {line}: {}", finding.rationale),
            None => println!("  {}", finding.rationale),
        }
        if !finding.context.is_empty() {
            println!("    -> {}", finding.context.dimmed());
        }
    }
}

/// Scan a script for safety and consistency violations.
#[instrument(name = "cmd_safety", skip_all, fields(file = %args.file))]
pub fn cmd_safety(
    args: SafetyArgs,
    global_json: bool,
    policy: &CompiledPolicy,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, "executing safety command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let verdict = safety::validate(&content, policy);
    info!(
        file = %args.file,
        findings = verdict.findings.len(),
        pass = verdict.pass,
        "safety scan complete"
    );

    if global_json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        if !verdict.pass {
            bail!("{} failed safety checks", args.file);
        }
        return Ok(());
    }

    if verdict.pass {
        println!("{} {} no safety or style issues", "PASS:".green(), args.file);
        return Ok(());
    }

    println!("{} {}", args.file.bold(), "FAIL".red());
    print_findings(&verdict);
    bail!("{}: {} safety issues found", args.file, verdict.findings.len());
}
