//! Prompt assembly for error explanations.

/// System message establishing the tutor persona.
pub const SYSTEM_PROMPT: &str = "You are a patient teaching assistant for students learning to \
program in Python. When shown a student's code and the error it raised, you explain the \
problem in plain language, help them understand the cause, and guide them towards fixing \
it themselves. Keep explanations short and concrete.";

/// Shown in place of an empty code block.
pub const EMPTY_CODE: &str = "[EMPTY CODE]";

/// Shown in place of an empty error message.
pub const EMPTY_ERROR: &str = "No error message";

/// Build the user prompt for a failing snippet and its sanitized trace.
///
/// The output depends only on the two inputs.
pub fn build_prompt(code: &str, sanitized_error: &str) -> String {
    let code = non_blank_or(code, EMPTY_CODE);
    let error = non_blank_or(sanitized_error, EMPTY_ERROR);

    let mut out = String::with_capacity(code.len() + error.len() + 256);

    out.push_str("A student ran the code below and it failed.\n\n");
    out.push_str("Student code:\n");
    out.push_str(code);
    out.push_str("\n\nError message:\n");
    out.push_str(error);
    out.push_str("\n\nExplain:\n");
    out.push_str("1. What is the issue?\n");
    out.push_str("2. Why did it happen?\n");
    out.push_str("3. How to fix it?\n");
    out.push_str("4. Give a minimal corrected example.\n");

    out
}

fn non_blank_or<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = text.trim_end();
    if trimmed.trim_start().is_empty() {
        placeholder
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_inputs_and_questions() {
        let prompt = build_prompt("x = 1/0", "ZeroDivisionError: division by zero");
        assert!(prompt.contains("Student code:\nx = 1/0\n"));
        assert!(prompt.contains("Error message:\nZeroDivisionError: division by zero\n"));
        assert!(prompt.contains("1. What is the issue?"));
        assert!(prompt.contains("2. Why did it happen?"));
        assert!(prompt.contains("3. How to fix it?"));
        assert!(prompt.contains("4. Give a minimal corrected example."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("print(undefined)", "NameError: name 'undefined' is not defined");
        let b = build_prompt("print(undefined)", "NameError: name 'undefined' is not defined");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_empty_inputs_use_placeholders() {
        let prompt = build_prompt("", "  \n");
        assert!(prompt.contains("Student code:\n[EMPTY CODE]\n"));
        assert!(prompt.contains("Error message:\nNo error message\n"));
    }

    #[test]
    fn test_leading_indentation_is_kept() {
        let prompt = build_prompt("    return x\n\n", "IndentationError");
        assert!(prompt.contains("Student code:\n    return x\n\nError message:"));
    }
}
