//! Trace redaction rules.
//!
//! Scrubs home-directory paths and local host names from a failure trace
//! before it leaves the machine. Redaction is idempotent: the placeholders
//! never match any rule.

use regex::Regex;
use std::sync::LazyLock;

/// Replaces the home-directory prefix of a path.
pub const HOME_PLACEHOLDER: &str = "[REDACTED_HOME]";

/// Replaces a local host name or private address.
pub const HOST_PLACEHOLDER: &str = "[REDACTED_HOST]";

/// Patterns that should be redacted, applied in order.
static REDACTION_PATTERNS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    vec![
        // C:\Users\<user>, C:/Users/<user>
        (
            Regex::new(r#"(?i)\b[a-z]:[\\/]Users[\\/][^\\/\s"':]+"#).unwrap(),
            HOME_PLACEHOLDER.to_string(),
        ),
        // /home/<user>, /Users/<user>
        (
            Regex::new(r#"/(?:home|Users)/[^/\\\s"':]+"#).unwrap(),
            HOME_PLACEHOLDER.to_string(),
        ),
        // /root as a home directory, not /var/root, /rootfs or a redacted home's root/
        (
            Regex::new(r"(?m)(^|[^\w/.~\]-])/root\b").unwrap(),
            format!("${{1}}{}", HOME_PLACEHOLDER),
        ),
        // mDNS and site-local names; a trailing `(` or `.name` means code, not a host
        (
            Regex::new(
                r"(?im)\b[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9-]+)*\.(?:local|lan|internal|localdomain|home\.arpa)\b(\.?(?:[^\w(.-]|$))",
            )
            .unwrap(),
            format!("{}${{1}}", HOST_PLACEHOLDER),
        ),
        // RFC 1918 addresses
        (
            Regex::new(
                r"\b(?:10(?:\.\d{1,3}){3}|192\.168(?:\.\d{1,3}){2}|172\.(?:1[6-9]|2\d|3[01])(?:\.\d{1,3}){2})\b",
            )
            .unwrap(),
            HOST_PLACEHOLDER.to_string(),
        ),
    ]
});

/// Redact sensitive patterns from text using the built-in rules.
pub fn redact(text: &str) -> String {
    let mut result = text.to_string();

    for (pattern, replacement) in REDACTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, replacement.as_str()).into_owned();
    }

    result
}

/// Check if text contains anything the built-in rules would redact.
pub fn contains_sensitive(text: &str) -> bool {
    REDACTION_PATTERNS
        .iter()
        .any(|(pattern, _)| pattern.is_match(text))
}

/// Redactor with the built-in rules plus machine-specific host names.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    hostnames: Option<Regex>,
}

impl Redactor {
    /// Redactor with only the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also redact the given literal host names (case-insensitive, whole words).
    ///
    /// Names shorter than three characters and `localhost` are ignored.
    pub fn with_hostnames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| n.len() >= 3 && !n.eq_ignore_ascii_case("localhost"))
            .map(|n| regex::escape(&n))
            .collect();

        if !alternatives.is_empty() {
            let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
            self.hostnames = Regex::new(&pattern).ok();
        }
        self
    }

    /// Redactor that also scrubs this machine's host name, when it can be found.
    pub fn from_env() -> Self {
        let names = machine_hostname()
            .map(|host| hostname_variants(&host))
            .unwrap_or_default();
        Self::new().with_hostnames(names)
    }

    pub fn redact(&self, text: &str) -> String {
        let result = redact(text);
        match &self.hostnames {
            Some(pattern) => pattern.replace_all(&result, HOST_PLACEHOLDER).into_owned(),
            None => result,
        }
    }

    pub fn contains_sensitive(&self, text: &str) -> bool {
        contains_sensitive(text)
            || self
                .hostnames
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(text))
    }
}

/// Look up this machine's host name.
///
/// `HOSTNAME` is often set but not exported, so fall back to `/etc/hostname`
/// and then the `hostname` command.
pub fn machine_hostname() -> Option<String> {
    std::env::var("HOSTNAME")
        .ok()
        .and_then(non_empty)
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .and_then(non_empty)
        })
        .or_else(|| {
            std::process::Command::new("hostname")
                .output()
                .ok()
                .filter(|output| output.status.success())
                .and_then(|output| non_empty(String::from_utf8_lossy(&output.stdout).into_owned()))
        })
}

/// The full name plus its first label, so `ada-mbp.example.com` also
/// covers a bare `ada-mbp`.
fn hostname_variants(host: &str) -> Vec<String> {
    let mut names = vec![host.to_string()];
    if let Some((short, _)) = host.split_once('.') {
        if !short.is_empty() {
            names.push(short.to_string());
        }
    }
    names
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
