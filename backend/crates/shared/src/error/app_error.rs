//! Application Error
//!
//! [`AppError`] is what a domain error becomes at the HTTP edge: a kind, a
//! sentence the app can show as-is, and optionally what the user should do
//! next. The underlying cause is kept for logs and never rendered.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

type Source = Box<dyn Error + Send + Sync + 'static>;

/// Client-facing error
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::Forbidden, "You are too far from the mission location")
///     .with_action("Move closer and try again");
/// assert_eq!(err.status_code(), 403);
/// assert_eq!(err.action(), Some("Move closer and try again"));
/// ```
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    detail: Cow<'static, str>,
    action: Option<Cow<'static, str>>,
    source: Option<Source>,
}

impl AppError {
    pub fn new(kind: ErrorKind, detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            action: None,
            source: None,
        }
    }

    /// What the user can do about it, e.g. "Enable location access"
    pub fn with_action(mut self, action: impl Into<Cow<'static, str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Keep the cause for logging
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_failure_carries_action() {
        let err = AppError::new(ErrorKind::UnprocessableEntity, "We could not verify your location")
            .with_action("Enable location access for the app and try again");

        assert_eq!(err.status_code(), 422);
        assert_eq!(err.detail(), "We could not verify your location");
        assert!(err.action().unwrap().starts_with("Enable location"));
        assert_eq!(
            err.to_string(),
            "422 Unprocessable Entity: We could not verify your location"
        );
    }

    #[test]
    fn test_source_stays_out_of_display() {
        let cause = std::io::Error::other("connection reset by peer");
        let err = AppError::new(ErrorKind::InternalServerError, "Internal server error")
            .with_source(cause);

        assert!(err.source().is_some());
        assert!(!err.to_string().contains("connection reset"));
    }
}
