//! Interactive session command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::Write;
use tokio::io::BufReader;
use tracelens_shim::session::CELL_DELIMITER;
use tracelens_shim::CellReader;

use super::ShimArgs;

#[derive(Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub shim: ShimArgs,

    /// Run every cell in a fresh interpreter instead of sharing one
    #[arg(long)]
    pub isolated: bool,
}

pub async fn execute(args: SessionArgs) -> Result<()> {
    // One shim for the whole session.
    let shim = args.shim.build_shim(!args.isolated)?;

    eprintln!(
        "  {} {} {}",
        "●".green().bold(),
        "tracelens".cyan().bold(),
        "session".bold()
    );
    eprintln!("  {} Interpreter: {}", "▸".dimmed(), args.shim.interpreter);
    eprintln!(
        "  {} State:       {}",
        "▸".dimmed(),
        if args.isolated { "fresh per cell" } else { "shared across cells" }
    );
    eprintln!("  {} Endpoint:    {}", "▸".dimmed(), args.shim.endpoint);
    eprintln!(
        "  {} End each cell with a line containing only {}; Ctrl+D to quit",
        "▸".dimmed(),
        CELL_DELIMITER.bold()
    );
    eprintln!();

    let mut reader = CellReader::new(BufReader::new(tokio::io::stdin()));
    let mut stdout = std::io::stdout();
    let mut ran = 0usize;
    let mut failed = 0usize;

    loop {
        eprint!("{} ", format!("In [{}]:", ran + 1).green());
        let _ = std::io::stderr().flush();

        let Some(cell) = reader.next_cell().await? else {
            break;
        };

        ran += 1;
        let outcome = shim.run_cell(&cell, &mut stdout).await?;
        stdout.flush()?;
        if outcome.is_failure() {
            failed += 1;
        }
    }

    eprintln!();
    eprintln!(
        "  {} {} cell(s) run, {} failed",
        "■".cyan(),
        ran.to_string().bold(),
        if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().green()
        }
    );

    Ok(())
}
