//! Error classes
//!
//! Every failure a client can see falls in one [`ErrorKind`], which fixes
//! the HTTP status and the problem title it is answered with.

use std::fmt;

/// Client-visible class of an [`AppError`](super::app_error::AppError)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request, header or coordinates
    BadRequest,
    /// Caller identity missing or not understood
    Unauthorized,
    /// Known caller, not allowed (wrong role, outside the mission area)
    Forbidden,
    NotFound,
    /// Clashes with current state (duplicate submission, already reviewed)
    Conflict,
    /// No longer available (closed mission, sold-out reward)
    Gone,
    /// Understood but cannot be acted on (position could not be verified)
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
}

impl ErrorKind {
    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Gone => 410,
            Self::UnprocessableEntity => 422,
            Self::TooManyRequests => 429,
            Self::InternalServerError => 500,
        }
    }

    /// Problem title, the status reason phrase
    pub const fn title(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::Gone => "Gone",
            Self::UnprocessableEntity => "Unprocessable Entity",
            Self::TooManyRequests => "Too Many Requests",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code(), self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorKind;

    #[test]
    fn test_submission_outcomes_map_to_distinct_statuses() {
        // Outside the area, no position, duplicate, closed: the app tells them apart by status
        let statuses = [
            ErrorKind::Forbidden,
            ErrorKind::UnprocessableEntity,
            ErrorKind::Conflict,
            ErrorKind::Gone,
        ]
        .map(ErrorKind::status_code);
        assert_eq!(statuses, [403, 422, 409, 410]);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorKind::TooManyRequests.to_string(), "429 Too Many Requests");
        assert_eq!(ErrorKind::Unauthorized.title(), "Unauthorized");
    }
}
