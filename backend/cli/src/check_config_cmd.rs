//! `gamegate check-config`: show the effective config and what is wrong with it.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use gamegate_config::{redact, validate};
use gamegate_logging::init_logger;

use crate::resolve_config_path;
use crate::terminal_output::{note_error, note_info, note_success, note_warn, report_table};

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    init_logger("warn", None, false)?;

    let path = resolve_config_path(config_path);
    note_info(&format!("Config file: {}", path.display()));

    let config = gamegate_config::load_and_prepare(&path).await?;
    let value = serde_json::to_value(&config).context("Failed to serialize config")?;
    println!("{}", serde_yaml::to_string(&redact(&value))?);

    let report = validate(&config);
    if !report.errors.is_empty() || !report.warnings.is_empty() {
        println!("{}", report_table(&report));
    }

    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    if report.is_valid() {
        note_success("Config is valid");
        Ok(())
    } else {
        note_error(&format!("{} error(s) found", report.errors.len()));
        bail!("Config at {} is invalid", path.display())
    }
}
