//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracelens_shim::client::DEFAULT_ENDPOINT_URL;
use tracelens_shim::executor::DEFAULT_INTERPRETER;
use tracelens_shim::{CaptureShim, EndpointClient, Executor, KernelExecutor, ProcessExecutor};

pub mod explain;
pub mod redact;
pub mod run;
pub mod serve;
pub mod session;

/// tracelens - inline AI explanations for failing code
#[derive(Parser)]
#[command(name = "tracelens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the analyze endpoint
    Serve(serve::ServeArgs),

    /// Run one block of code and explain it if it fails
    Run(run::RunArgs),

    /// Interactive session: run cells separated by `%%` lines
    Session(session::SessionArgs),

    /// Print the redacted form of a trace
    Redact(redact::RedactArgs),

    /// Explain an already captured failure
    Explain(explain::ExplainArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Run(args) => run::execute(args).await,
            Commands::Session(args) => session::execute(args).await,
            Commands::Redact(args) => redact::execute(args).await,
            Commands::Explain(args) => explain::execute(args).await,
        }
    }
}

/// Options shared by the commands that talk to the analyze endpoint.
#[derive(Args)]
pub struct ShimArgs {
    /// Base URL of the analyze endpoint
    #[arg(long, env = "TRACELENS_URL", default_value = DEFAULT_ENDPOINT_URL)]
    pub endpoint: String,

    /// Python interpreter command
    #[arg(long, env = "TRACELENS_INTERPRETER", default_value = DEFAULT_INTERPRETER)]
    pub interpreter: String,

    /// Give up on the endpoint after this many seconds (default: wait)
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ShimArgs {
    /// Build the session's capture shim.
    ///
    /// With `persistent`, every cell runs in one long-lived interpreter and
    /// sees the names earlier cells defined; otherwise each cell gets a
    /// fresh process.
    pub fn build_shim(&self, persistent: bool) -> Result<CaptureShim> {
        let executor: Box<dyn Executor> = if persistent {
            Box::new(KernelExecutor::from_command_line(&self.interpreter)?)
        } else {
            Box::new(ProcessExecutor::from_command_line(&self.interpreter)?)
        };

        let mut endpoint = EndpointClient::with_url(&self.endpoint);
        if let Some(secs) = self.timeout {
            endpoint = endpoint.with_timeout(Duration::from_secs(secs));
        }

        Ok(CaptureShim::new(executor, endpoint).with_progress(true))
    }
}

/// Read a whole file, or stdin when the path is absent or `-`.
pub async fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_session_defaults() {
        let cli = Cli::try_parse_from(["tracelens", "session"]).unwrap();
        match cli.command {
            Commands::Session(args) => {
                assert_eq!(args.shim.interpreter, DEFAULT_INTERPRETER);
                assert!(args.shim.timeout.is_none());
                assert!(!args.isolated);
            }
            _ => panic!("expected session command"),
        }
    }

    #[test]
    fn test_parse_run_with_file() {
        let cli = Cli::try_parse_from([
            "tracelens",
            "run",
            "cell.py",
            "--endpoint",
            "http://10.0.0.2:8000",
            "--timeout",
            "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.file.as_deref(), Some(Path::new("cell.py")));
                assert_eq!(args.shim.endpoint, "http://10.0.0.2:8000");
                assert_eq!(args.shim.timeout, Some(30));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_parse_session_isolated() {
        let cli = Cli::try_parse_from(["tracelens", "session", "--isolated"]).unwrap();
        match cli.command {
            Commands::Session(args) => assert!(args.isolated),
            _ => panic!("expected session command"),
        }
    }

    #[test]
    fn test_log_file_requires_log() {
        assert!(Cli::try_parse_from(["tracelens", "serve", "--log-file", "x.log"]).is_err());
        assert!(Cli::try_parse_from(["tracelens", "serve", "--log", "--log-file", "x.log"]).is_ok());
    }
}
