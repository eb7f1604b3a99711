//! URI-reference checks for the problem `type` member.
//!
//! `type` is a URI reference: absolute (`https://x/y`, `about:blank`,
//! `urn:problem:loan`) or relative (`/errors/loan-not-found`).

use url::{ParseError, Url};

/// Base used only to resolve relative references while checking them.
const RESOLUTION_BASE: &str = "http://uri-reference.invalid/";

/// Characters RFC 3986 never allows unescaped in a URI.
const EXCLUDED: &[char] = &['"', '<', '>', '\\', '^', '`', '{', '|', '}'];

/// Why a string is not a URI reference.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UriReferenceError {
    #[error("contains a character that must be percent-encoded: {0:?}")]
    IllegalCharacter(char),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Check that `uri` is a syntactically valid absolute or relative URI reference.
///
/// # Errors
/// Returns [`UriReferenceError`] describing the first problem found.
pub fn check_uri_reference(uri: &str) -> Result<(), UriReferenceError> {
    if let Some(c) = uri
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || EXCLUDED.contains(c))
    {
        return Err(UriReferenceError::IllegalCharacter(c));
    }

    match Url::parse(uri) {
        Ok(_) => Ok(()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(RESOLUTION_BASE)?;
            Url::options().base_url(Some(&base)).parse(uri)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
