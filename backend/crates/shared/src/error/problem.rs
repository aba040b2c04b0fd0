//! Problem Details (RFC 7807)
//!
//! The single JSON error shape of the API. Rendered from an [`AppError`];
//! the axum `IntoResponse` lives behind the `axum` feature.

use serde::Serialize;

use super::app_error::AppError;

/// `application/problem+json` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem<'a> {
    #[serde(rename = "type")]
    pub type_uri: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'a str>,
}

impl AppError {
    pub fn problem(&self) -> Problem<'_> {
        Problem {
            type_uri: "about:blank",
            title: self.kind().title(),
            status: self.status_code(),
            detail: self.detail(),
            action: self.action(),
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match serde_json::to_vec(&self.problem()) {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "application/problem+json")],
                body,
            )
                .into_response(),
            Err(_) => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[test]
    fn test_problem_body() {
        let err = AppError::new(ErrorKind::Forbidden, "You are too far from the mission location")
            .with_action("Move closer to the mission area and try again");

        let json = serde_json::to_value(err.problem()).unwrap();
        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["title"], "Forbidden");
        assert_eq!(json["status"], 403);
        assert_eq!(json["detail"], "You are too far from the mission location");
        assert_eq!(json["action"], "Move closer to the mission area and try again");
    }

    #[test]
    fn test_action_omitted_when_absent() {
        let err = AppError::new(ErrorKind::Conflict, "You have already submitted this mission");

        let json = serde_json::to_value(err.problem()).unwrap();
        assert_eq!(json["status"], 409);
        assert!(json.get("action").is_none());
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_response_status_and_content_type() {
        use axum::response::IntoResponse;

        let response = AppError::new(ErrorKind::Gone, "This mission is no longer accepting submissions")
            .into_response();
        assert_eq!(response.status().as_u16(), 410);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/problem+json"
        );
    }
}
