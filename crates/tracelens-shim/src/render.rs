//! Terminal output for failed cells.
//!
//! Headings are colored; the trace and the explanation are written
//! verbatim so they can be copied back into an editor.

use colored::Colorize;
use std::io::{self, Write};

/// Print the original trace under an error heading.
pub fn render_trace(out: &mut dyn Write, trace: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{} {}", "✗".red().bold(), "Cell failed".red().bold())?;
    writeln!(out, "{}", "─".repeat(60).dimmed())?;
    writeln!(out, "{}", trace.trim_end())?;
    writeln!(out, "{}", "─".repeat(60).dimmed())?;
    Ok(())
}

/// Print the explanation under its own heading.
pub fn render_analysis(out: &mut dyn Write, analysis: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{} {}", "●".cyan().bold(), "AI explanation".cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "{}", analysis.trim_end())?;
    writeln!(out)?;
    Ok(())
}

/// Print a one-line warning.
pub fn render_warning(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "⚠".yellow().bold(), message.yellow())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_trace_is_verbatim() {
        let trace = "Traceback (most recent call last):\n  File \"<stdin>\", line 1\nNameError: name 'y' is not defined\n";
        let out = rendered(|w| render_trace(w, trace));
        assert!(out.contains("Cell failed"));
        assert!(out.contains(trace.trim_end()));
    }

    #[test]
    fn test_analysis_section() {
        let out = rendered(|w| render_analysis(w, "Define `y` before using it.\n\n"));
        assert!(out.contains("AI explanation"));
        assert!(out.contains("\nDefine `y` before using it.\n"));
    }

    #[test]
    fn test_warning_line() {
        let out = rendered(|w| render_warning(w, "endpoint unreachable"));
        assert!(out.contains("endpoint unreachable"));
        assert!(out.ends_with('\n'));
    }
}
