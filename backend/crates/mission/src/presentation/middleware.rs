//! Request Extractors
//!
//! Identity is verified upstream by the auth gateway, which forwards the
//! caller as `X-User-Id` / `X-User-Role`. This module only reads them.
//!
//! Body, path and query extractors wrap axum's own so that a malformed
//! request is answered with the same problem JSON as every other error.

use crate::domain::value_objects::{Actor, ActorRole};
use crate::error::{MissionError, MissionResult};
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use kernel::id::UserId;
use platform::client::{extract_client_ip, header_str};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Authenticated caller of the current request
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Actor);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = MissionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(Caller)
    }
}

/// A missing role header means a plain app user
pub fn actor_from_headers(headers: &HeaderMap) -> MissionResult<Actor> {
    let raw_id = header_str(headers, USER_ID_HEADER)
        .ok_or_else(|| MissionError::MissingHeader(USER_ID_HEADER.to_string()))?;

    let user_id = Uuid::parse_str(raw_id).map_err(|_| {
        tracing::warn!(header = USER_ID_HEADER, "Malformed caller id");
        MissionError::Unauthorized
    })?;

    let role = match header_str(headers, USER_ROLE_HEADER) {
        Some(code) => ActorRole::from_code(code).ok_or_else(|| {
            tracing::warn!(role = code, "Unknown caller role");
            MissionError::Unauthorized
        })?,
        None => ActorRole::default(),
    };

    Ok(Actor::new(UserId::from(user_id), role))
}

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(MissionError))]
pub struct AppJson<T>(pub T);

/// Typed path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(MissionError))]
pub struct AppPath<T>(pub T);

/// Typed query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(MissionError))]
pub struct AppQuery<T>(pub T);

/// Best-effort client address: proxy headers first, then the socket peer
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());

        Ok(ClientIp(extract_client_ip(&parts.headers, direct)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: Option<&'static str>, role: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(id) = id {
            headers.insert(USER_ID_HEADER, HeaderValue::from_static(id));
        }
        if let Some(role) = role {
            headers.insert(USER_ROLE_HEADER, HeaderValue::from_static(role));
        }
        headers
    }

    const ID: &str = "8d9f3c1e-5b7a-4e2d-9c3f-1a2b3c4d5e6f";

    #[test]
    fn test_actor_from_headers() {
        let actor = actor_from_headers(&headers(Some(ID), Some("Admin"))).unwrap();
        assert_eq!(actor.user_id.to_string(), ID);
        assert_eq!(actor.role, ActorRole::Admin);
    }

    #[test]
    fn test_role_defaults_to_user() {
        let actor = actor_from_headers(&headers(Some(ID), None)).unwrap();
        assert_eq!(actor.role, ActorRole::User);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = actor_from_headers(&headers(None, Some("admin"))).unwrap_err();
        assert!(matches!(err, MissionError::MissingHeader(ref h) if h == USER_ID_HEADER));
    }

    #[test]
    fn test_malformed_identity_is_unauthorized() {
        let err = actor_from_headers(&headers(Some("not-a-uuid"), None)).unwrap_err();
        assert!(matches!(err, MissionError::Unauthorized));

        let err = actor_from_headers(&headers(Some(ID), Some("superuser"))).unwrap_err();
        assert!(matches!(err, MissionError::Unauthorized));
    }
}
