//! Dispatcher configuration.

use faultline_errors::{DEFAULT_SENSITIVE_KEYS, UriReferenceError};
use serde::{Deserialize, Serialize};

/// Settings consumed by [`crate::ProblemDispatcher::from_config`].
///
/// Usually embedded as a section of the host application's config file:
///
/// ```yaml
/// problems:
///   sensitive_keys: [password, token, secret, api_key]
///   default_type_url: "about:blank"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProblemConfig {
    /// Keys whose `key=value` / `key: value` occurrences are masked in
    /// client-facing detail text. Matched case-insensitively.
    pub sensitive_keys: Vec<String>,
    /// `type` reported for problems that carry no documentation link.
    /// Omitted from the body when unset.
    pub default_type_url: Option<String>,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            sensitive_keys: DEFAULT_SENSITIVE_KEYS
                .iter()
                .map(|k| (*k).to_owned())
                .collect(),
            default_type_url: None,
        }
    }
}

/// Invalid dispatcher configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("sensitive key at index {index} is blank")]
    BlankSensitiveKey { index: usize },
    #[error("failed to compile redaction pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("default_type_url '{url}' is not a valid URI reference: {source}")]
    DefaultTypeUrl {
        url: String,
        #[source]
        source: UriReferenceError,
    },
}
