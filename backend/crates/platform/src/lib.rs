//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain meaning:
//! - Client identification from request headers
//! - Rate limiting configuration and window arithmetic
//! - Environment-backed configuration helpers

pub mod client;
pub mod config;
pub mod rate_limit;
