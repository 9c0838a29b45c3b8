//! Run a single block of code through the capture shim.

use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use super::{read_source, ShimArgs};

#[derive(Args)]
pub struct RunArgs {
    /// File holding the code to run (`-` or omitted reads stdin)
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub shim: ShimArgs,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let code = read_source(args.file.as_deref()).await?;
    let shim = args.shim.build_shim(false)?;

    let mut stdout = std::io::stdout();
    let outcome = shim.run_cell(&code, &mut stdout).await?;
    stdout.flush()?;

    if outcome.is_failure() {
        std::process::exit(1);
    }

    Ok(())
}
