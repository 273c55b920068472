//! Info command — package, policy, and configuration introspection.

use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use daihon_lint_core::config::{Config, ConfigSources};
use daihon_lint_core::policy::CompiledPolicy;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {}

/// Show package information and the active policy/config.
#[instrument(name = "cmd_info", skip_all)]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
    policy: &CompiledPolicy,
) -> anyhow::Result<()> {
    debug!("executing info command");

    if global_json {
        let payload = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "policy": {
                "version": policy.version,
                "word_rules": policy.rule_count(),
                "terms": policy.term_count(),
                "source": config.policy,
            },
            "config": {
                "file": sources.primary_file(),
                "log_level": config.log_level.as_str(),
                "min_volume_chars": config.min_volume_chars,
            },
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{} {}", env!("CARGO_PKG_NAME").bold(), env!("CARGO_PKG_VERSION"));
    match config.policy {
        Some(ref path) => println!(
            "  {} v{} from {path} ({} word rules, {} terms)",
            "policy:".cyan(),
            policy.version,
            policy.rule_count(),
            policy.term_count(),
        ),
        None => println!(
            "  {} v{} built-in ({} word rules, {} terms)",
            "policy:".cyan(),
            policy.version,
            policy.rule_count(),
            policy.term_count(),
        ),
    }
    match sources.primary_file() {
        Some(file) => println!("  {} {file}", "config:".cyan()),
        None => println!("  {} defaults (no config file found)", "config:".cyan()),
    }
    println!("  {} {}", "log level:".cyan(), config.log_level.as_str());
    println!(
        "  {} {} chars",
        "volume floor:".cyan(),
        config.min_volume_chars
    );

    Ok(())
}
