//! Redact a trace without sending it anywhere.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracelens_core::Redactor;

use super::read_source;

#[derive(Args)]
pub struct RedactArgs {
    /// File holding the trace (`-` or omitted reads stdin)
    pub file: Option<PathBuf>,
}

pub async fn execute(args: RedactArgs) -> Result<()> {
    let trace = read_source(args.file.as_deref()).await?;
    print!("{}", Redactor::from_env().redact(&trace));
    Ok(())
}
