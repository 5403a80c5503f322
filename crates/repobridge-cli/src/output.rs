//! Terminal output for CLI commands.

use std::io::Write;

use anyhow::Result;
use console::style;

use repobridge_core::macro_store::MacroConfig;
use repobridge_core::types::FileListResult;

use crate::OutputFormat;

pub fn print_file_list(result: &FileListResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "{} markdown files on {}",
                style(result.files.len()).bold(),
                style(&result.resolved_branch).green()
            );
            for file in &result.files {
                println!("  {}", file);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }
    Ok(())
}

/// Write content exactly as fetched.
pub fn print_content(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

pub fn print_macro_config(
    local_id: &str,
    config: Option<&MacroConfig>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "localId": local_id,
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let Some(config) = config else {
                println!("No configuration saved for macro '{}'", local_id);
                return Ok(());
            };
            println!("{}", style(format!("  Macro {}", local_id)).bold());
            println!("  Provider: {}", style(config.provider).green());
            println!(
                "  Host:     {}",
                config.host.as_deref().unwrap_or(config.provider.default_host())
            );
            println!("  Repo:     {}/{}", config.owner, config.repo);
            println!("  Branch:   {}", config.branch.as_deref().unwrap_or("(default)"));
            println!("  Path:     {}", config.path.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}
