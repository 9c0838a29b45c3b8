//! Analyze endpoint command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tracelens_core::InferenceConfig;
use tracelens_llm::InferenceClient;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "TRACELENS_PORT", default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "TRACELENS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Model identifier (overrides TRACELENS_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Chat-completions URL (overrides TRACELENS_COMPLETIONS_URL)
    #[arg(long)]
    pub completions_url: Option<String>,

    /// Upstream timeout in seconds (overrides TRACELENS_UPSTREAM_TIMEOUT_SECS)
    #[arg(long)]
    pub upstream_timeout: Option<u64>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (default: ./tracelens-serve.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = InferenceConfig::from_env()
        .context("The analyze endpoint needs GROQ_API_KEY to reach the inference API")?;
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(url) = args.completions_url {
        config = config.with_completions_url(url);
    }
    if let Some(secs) = args.upstream_timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    tracing::debug!(?config, "Inference configuration");

    println!();
    println!("  {} {}", "tracelens".cyan().bold(), "Analyze Endpoint".bold());
    println!();
    println!(
        "  {}  http://{}:{}/analyze",
        "Analyze".green(),
        args.host,
        args.port
    );
    println!(
        "  {}   http://{}:{}/health",
        "Health".green(),
        args.host,
        args.port
    );
    println!("  {}    {}", "Model".green(), config.model);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let client = InferenceClient::new(config);
    tracelens_web::run_server(client, &args.host, args.port).await?;

    Ok(())
}
