//! tracelens CLI
//!
//! Runs the analyze endpoint, or runs code and explains its failures inline.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

/// Initialize tracing.
///
/// The server logs to stdout and, with `--log`, also to a file. Every other
/// command logs to stderr so stdout carries only the user's program output
/// and the rendered explanations.
fn init_tracing(log_file: Option<&std::path::Path>, server_mode: bool, verbose: bool) {
    let default_filter = match (server_mode, verbose) {
        (_, true) => "tracelens=debug,tracelens_web=debug,tracelens_llm=debug,tracelens_shim=debug",
        (true, false) => "tracelens=info,tracelens_web=debug,tracelens_llm=info,tower_http=info",
        (false, false) => "tracelens=warn,tracelens_shim=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if let Some(path) = log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let _ = std::fs::create_dir_all(dir);
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tracelens.log".into());
        let appender = tracing_appender::rolling::never(dir, file_name);

        // Log to both stdout and file when --log is used
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false),
            )
            .init();
    } else if server_mode {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) if args.log => Some(
            args.log_file
                .clone()
                .unwrap_or_else(|| std::path::PathBuf::from("tracelens-serve.log")),
        ),
        _ => None,
    };

    let server_mode = matches!(&cli.command, Commands::Serve(_));
    init_tracing(log_file.as_deref(), server_mode, cli.verbose);

    cli.execute().await
}
