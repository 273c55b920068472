//! Structure command — Ki/Sho/Ten-ketsu ratio validation behind the
//! safety gate.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use daihon_lint_core::policy::CompiledPolicy;
use daihon_lint_core::structure::{self, StructureOptions};

use super::read_input_file;
use super::safety::print_findings;

/// Arguments for the `structure` subcommand.
#[derive(Args, Debug)]
pub struct StructureArgs {
    /// Script file to validate.
    pub file: Utf8PathBuf,

    /// Minimum cleaned character volume (overrides config).
    #[arg(long)]
    pub min_volume: Option<usize>,
}

/// Validate the three-act shape of a script.
#[instrument(name = "cmd_structure", skip_all, fields(file = %args.file))]
pub fn cmd_structure(
    args: StructureArgs,
    global_json: bool,
    policy: &CompiledPolicy,
    config_min_volume: usize,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, min_volume = ?args.min_volume, "executing structure command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let opts = StructureOptions {
        min_volume_chars: args.min_volume.unwrap_or(config_min_volume),
    };
    let report = structure::validate(&content, policy, &opts);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.pass {
            bail!("{} failed structure checks", args.file);
        }
        return Ok(());
    }

    // The gate failure is reported as a safety failure, not a structural one.
    if !report.safety.pass {
        println!("{} {} blocked by safety gate", args.file.bold(), "FAIL".red());
        print_findings(&report.safety);
        bail!(
            "{}: {} safety issues found; structural analysis skipped",
            args.file,
            report.safety.findings.len()
        );
    }

    if !report.sections.is_empty() {
        println!("{} (total: {} chars)", args.file.bold(), report.total_chars);
        for section in &report.sections {
            println!(
                "  {:<10} {:>6} chars  {:>5.1}%",
                section.label.as_str(),
                section.chars,
                section.percent,
            );
        }
    }

    if report.pass {
        println!("{} golden ratio (1:8:1) achieved", "PASS:".green());
        return Ok(());
    }

    print_findings(&daihon_lint_core::Verdict::from_findings(report.findings.clone()));
    bail!("{} failed structure checks", args.file);
}
