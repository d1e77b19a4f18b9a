mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
#[cfg(test)]
mod test_support;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::odoo::OdooClient;
use crate::infra::openai::OpenAiClient;

#[derive(Parser)]
#[command(
    name = "intake",
    author,
    version,
    about = "Conversational ticket intake for the helpdesk"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant until a ticket is ready, then submit it.
    Chat(ChatArgs),
    /// Inspect CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args, Default)]
struct ChatArgs {
    /// Override the model configured via OPENAI_MODEL.
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Config(args)) => config_cmd::run(args.command, &config),
        Some(Commands::Chat(args)) => run_chat(config, args).await,
        None => run_chat(config, ChatArgs::default()).await,
    }
}

async fn run_chat(mut config: AppConfig, args: ChatArgs) -> AppResult<()> {
    if let Some(model) = args.model {
        config.openai_model = model;
    }

    if config.openai_api_key.is_none() {
        eprintln!("Warning: OPENAI_API_KEY not configured; the first turn will fail.");
    }
    let missing = config.missing_backend_settings();
    if !missing.is_empty() {
        eprintln!(
            "Warning: {} not configured; tickets will be printed instead of submitted.",
            missing.join(", ")
        );
    }

    let language_model = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
        config.temperature,
    ));
    let issue_tracker = Arc::new(OdooClient::new());

    let context = AppContext::new(config, issue_tracker, language_model);

    cmd::chat::run(&context).await
}
