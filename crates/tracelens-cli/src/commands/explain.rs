//! Explain a failure captured elsewhere.

use anyhow::{bail, Result};
use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{read_source, ShimArgs};

#[derive(Args)]
pub struct ExplainArgs {
    /// File holding the code that failed
    #[arg(long)]
    pub code: PathBuf,

    /// File holding the trace (`-` reads stdin)
    #[arg(long)]
    pub error: PathBuf,

    #[command(flatten)]
    pub shim: ShimArgs,
}

pub async fn execute(args: ExplainArgs) -> Result<()> {
    if args.code == Path::new("-") && args.error == Path::new("-") {
        bail!("--code and --error cannot both read stdin");
    }

    let code = read_source(Some(args.code.as_path())).await?;
    let trace = read_source(Some(args.error.as_path())).await?;
    let shim = args.shim.build_shim(false)?;

    let mut stdout = std::io::stdout();
    shim.explain(&code, &trace, &mut stdout).await?;
    stdout.flush()?;

    Ok(())
}
