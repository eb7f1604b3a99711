//! Declarative error metadata and its extractor.
//!
//! An error variant opts into classified handling by carrying an [`ErrorMeta`],
//! normally attached with `#[derive(ProblemMetadata)]`:
//!
//! ```rust,ignore
//! #[derive(Debug, thiserror::Error, ProblemMetadata)]
//! pub enum LoanError {
//!     #[error("Loan {0} not found")]
//!     #[problem(code = "LOAN_NOT_FOUND", status = 404, title = "Loan Not Found")]
//!     NotFound(u64),
//!     // No metadata: handled as an unclassified error
//!     #[error("ledger unavailable")]
//!     LedgerUnavailable,
//! }
//! ```

use std::fmt;

use http::StatusCode;

/// Title used when neither the declared title nor the error message has text.
pub const FALLBACK_TITLE: &str = "An error occurred";

/// Static metadata attached to one error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMeta {
    pub code: &'static str,
    pub status: u16,
    pub doc: Option<&'static str>,
    pub title: Option<&'static str>,
}

impl ErrorMeta {
    /// Metadata with the given code, status 500 and no doc or title.
    #[must_use]
    pub const fn new(code: &'static str) -> Self {
        Self {
            code,
            status: 500,
            doc: None,
            title: None,
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn with_doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    #[must_use]
    pub const fn with_title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }
}

/// Implemented by errors that may carry [`ErrorMeta`].
///
/// Returning `None` routes the error to generic handling.
pub trait ProblemMetadata {
    fn problem_meta(&self) -> Option<ErrorMeta>;
}

impl<T: ProblemMetadata + ?Sized> ProblemMetadata for &T {
    fn problem_meta(&self) -> Option<ErrorMeta> {
        (**self).problem_meta()
    }
}

impl<T: ProblemMetadata + ?Sized> ProblemMetadata for Box<T> {
    fn problem_meta(&self) -> Option<ErrorMeta> {
        (**self).problem_meta()
    }
}

/// Effective metadata for one error occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMeta {
    pub code: &'static str,
    pub status: StatusCode,
    pub doc: Option<&'static str>,
    pub title: String,
}

/// Look up the metadata attached to `error` and resolve its effective title.
///
/// The title is the declared title when non-blank, else the error message when
/// non-blank, else [`FALLBACK_TITLE`]. A declared status outside the valid
/// HTTP range resolves to 500.
#[must_use]
pub fn extract<E>(error: &E) -> Option<ResolvedMeta>
where
    E: ProblemMetadata + fmt::Display + ?Sized,
{
    let meta = error.problem_meta()?;

    let title = match meta.title.filter(|t| !t.trim().is_empty()) {
        Some(declared) => declared.to_owned(),
        None => {
            let message = error.to_string();
            if message.trim().is_empty() {
                FALLBACK_TITLE.to_owned()
            } else {
                message
            }
        }
    };

    // `from_u16` accepts up to 999; problem statuses stop at 599
    let status = StatusCode::from_u16(meta.status)
        .ok()
        .filter(|s| s.as_u16() <= 599)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Some(ResolvedMeta {
        code: meta.code,
        status,
        doc: meta.doc,
        title,
    })
}

/// Whether `error` carries metadata at all.
#[must_use]
pub fn has_metadata<E>(error: &E) -> bool
where
    E: ProblemMetadata + fmt::Display + ?Sized,
{
    extract(error).is_some()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Raised {
        meta: Option<ErrorMeta>,
        message: &'static str,
    }

    impl fmt::Display for Raised {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl ProblemMetadata for Raised {
        fn problem_meta(&self) -> Option<ErrorMeta> {
            self.meta
        }
    }

    #[test]
    fn declared_title_wins() {
        let err = Raised {
            meta: Some(
                ErrorMeta::new("LOAN_NOT_FOUND")
                    .with_status(404)
                    .with_doc("https://x/y")
                    .with_title("Loan Not Found"),
            ),
            message: "Loan 123 not found",
        };

        let resolved = extract(&err).unwrap();
        assert_eq!(resolved.code, "LOAN_NOT_FOUND");
        assert_eq!(resolved.status, StatusCode::NOT_FOUND);
        assert_eq!(resolved.doc, Some("https://x/y"));
        assert_eq!(resolved.title, "Loan Not Found");
    }

    #[test]
    fn blank_title_falls_back_to_message() {
        let err = Raised {
            meta: Some(ErrorMeta::new("X").with_title("   ")),
            message: "M",
        };
        assert_eq!(extract(&err).unwrap().title, "M");
    }

    #[test]
    fn blank_title_and_message_fall_back_to_fixed_title() {
        let err = Raised {
            meta: Some(ErrorMeta::new("X")),
            message: " ",
        };
        assert_eq!(extract(&err).unwrap().title, FALLBACK_TITLE);
    }

    #[test]
    fn default_status_is_internal_server_error() {
        let err = Raised {
            meta: Some(ErrorMeta::new("X")),
            message: "boom",
        };
        let resolved = extract(&err).unwrap();
        assert_eq!(resolved.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolved.title, "boom");
        assert_eq!(resolved.doc, None);
    }

    #[test]
    fn out_of_range_status_resolves_to_500() {
        let err = Raised {
            meta: Some(ErrorMeta::new("X").with_status(42)),
            message: "boom",
        };
        assert_eq!(
            extract(&err).unwrap().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = Raised {
            meta: Some(ErrorMeta::new("X").with_status(700)),
            message: "boom",
        };
        assert_eq!(
            extract(&err).unwrap().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn no_metadata_means_absent() {
        let err = Raised {
            meta: None,
            message: "Something went wrong",
        };
        assert!(extract(&err).is_none());
        assert!(!has_metadata(&err));
    }

    #[test]
    fn lookup_goes_through_references_and_boxes() {
        let err = Box::new(Raised {
            meta: Some(ErrorMeta::new("X")),
            message: "boom",
        });
        assert!(has_metadata(&err));
        assert!(has_metadata(&&*err));
    }
}
