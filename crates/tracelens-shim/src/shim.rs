//! The capture shim.
//!
//! A [`CaptureShim`] is built once per session and handed every cell. It
//! runs the cell and, when it fails, shows the trace, redacts it, asks the
//! analyze endpoint for an explanation and shows that too.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;
use tracelens_core::{AnalysisRequest, Redactor, FALLBACK_ANALYSIS};
use tracing::{debug, warn};

use crate::client::EndpointClient;
use crate::error::ShimResult;
use crate::executor::{ExecutionOutcome, Executor};
use crate::render;

/// Session-scoped failure handler.
pub struct CaptureShim {
    executor: Box<dyn Executor>,
    endpoint: EndpointClient,
    redactor: Redactor,
    show_progress: bool,
}

impl CaptureShim {
    pub fn new(executor: Box<dyn Executor>, endpoint: EndpointClient) -> Self {
        Self {
            executor,
            endpoint,
            redactor: Redactor::from_env(),
            show_progress: false,
        }
    }

    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Show a spinner on stderr while waiting for the endpoint.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run one cell, explaining it if it fails.
    ///
    /// Only a failure to run the cell at all is returned as an error. A
    /// failing endpoint is reported in `out` and the outcome still returned.
    pub async fn run_cell(&self, code: &str, out: &mut dyn Write) -> ShimResult<ExecutionOutcome> {
        let outcome = self.executor.execute(code).await?;

        if let ExecutionOutcome::Failure { trace } = &outcome {
            self.explain(code, trace, out).await?;
        }

        Ok(outcome)
    }

    /// Show `trace` and the endpoint's explanation of it.
    pub async fn explain(&self, code: &str, trace: &str, out: &mut dyn Write) -> ShimResult<()> {
        render::render_trace(out, trace)?;
        out.flush()?;

        let request = AnalysisRequest {
            code: code.to_string(),
            error: self.redactor.redact(trace),
        };
        debug!(
            redacted = request.error != trace,
            "Sending failure to analyze endpoint"
        );

        let spinner = self.spinner();
        let result = self.endpoint.analyze(&request).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match result {
            Ok(reply) => render::render_analysis(out, reply.text_or_fallback())?,
            Err(e) => {
                warn!(error = %e, "Could not get an explanation");
                render::render_warning(out, &format!("AI explanation unavailable: {}", e))?;
                render::render_analysis(out, FALLBACK_ANALYSIS)?;
            }
        }

        out.flush()?;
        Ok(())
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Asking for an explanation...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }
}
