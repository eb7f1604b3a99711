//! Redaction of sensitive `key=value` pairs in client-facing text.
//!
//! For every configured key, each occurrence of `<key>=<value>` or
//! `<key>:<value>` (case-insensitive key, optional whitespace before the
//! value) keeps its `key=` / `key:` prefix and has the value replaced with
//! [`REDACTED`]. A key not immediately followed by `=` or `:` is left alone.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Placeholder written in place of a sensitive value.
pub const REDACTED: &str = "[REDACTED]";

/// Keys redacted when no configuration says otherwise.
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &["password", "token", "secret"];

static DEFAULT_REDACTOR: LazyLock<Redactor> = LazyLock::new(Redactor::default);

/// Compiled redaction rule for a fixed set of keys.
#[derive(Debug, Clone)]
pub struct Redactor {
    pattern: Option<Regex>,
}

impl Redactor {
    /// Build a redactor for `keys`. Keys are matched literally and without
    /// regard to case. An empty key list yields a redactor that changes nothing.
    ///
    /// # Errors
    /// Returns `regex::Error` if the combined pattern exceeds the regex size limits.
    pub fn new<I, S>(keys: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternation = keys
            .into_iter()
            .map(|k| regex::escape(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(r"(?i)(?P<key>{alternation})(?P<sep>[=:])\s*\S+"))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Replace every sensitive value in `message`.
    #[must_use]
    pub fn redact<'a>(&self, message: &'a str) -> Cow<'a, str> {
        match &self.pattern {
            Some(re) => re.replace_all(message, format!("${{key}}${{sep}}{REDACTED}")),
            None => Cow::Borrowed(message),
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        let alternation = DEFAULT_SENSITIVE_KEYS.join("|");
        let pattern = Regex::new(&format!(r"(?i)(?P<key>{alternation})(?P<sep>[=:])\s*\S+"))
            .unwrap_or_else(|_| unreachable!("default redaction pattern is a valid regex"));
        Self {
            pattern: Some(pattern),
        }
    }
}

/// Redact `message` with the default keys (`password`, `token`, `secret`).
#[must_use]
pub fn sanitize(message: &str) -> Cow<'_, str> {
    DEFAULT_REDACTOR.redact(message)
}
