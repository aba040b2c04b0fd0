//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - [`error::app_error::AppError`], its [`error::kind::ErrorKind`] and the
//!   RFC 7807 [`error::problem::Problem`] body it renders to
//! - typed identifiers for missions, submissions, rewards and users
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod kind;
    pub mod problem;
}
pub mod id;
