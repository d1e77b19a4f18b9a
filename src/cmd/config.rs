use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the resolved configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand, config: &AppConfig) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(config, &mut io::stdout()),
    }
}

fn run_show<W: Write>(cfg: &AppConfig, out: &mut W) -> AppResult<()> {
    writeln!(out, "Model API key: {}", mask_secret(&cfg.openai_api_key))?;
    writeln!(out, "Model: {}", cfg.openai_model)?;
    writeln!(out, "Model API base URL: {}", cfg.openai_base_url)?;
    writeln!(out, "Temperature: {}", cfg.temperature)?;
    writeln!(out, "Ticket source: {}", cfg.source)?;
    writeln!(out, "Odoo URL: {}", display_value(&cfg.odoo_url))?;
    writeln!(out, "Odoo database: {}", display_value(&cfg.odoo_db))?;
    writeln!(out, "Odoo username: {}", display_value(&cfg.odoo_username))?;
    writeln!(out, "Odoo password: {}", mask_secret(&cfg.odoo_password))?;

    let missing = cfg.missing_backend_settings();
    if missing.is_empty() {
        writeln!(out, "Submission: enabled")?;
    } else {
        writeln!(
            out,
            "Submission: dry run (missing {})",
            missing.join(", ")
        )?;
    }
    Ok(())
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
