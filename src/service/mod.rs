//! Service layer: business logic orchestration.
//!
//! [`UserService`] coordinates signup/login and profile operations,
//! delegating storage to the repository and token issuance to the
//! [`crate::auth::JwtSigner`].

pub mod user_service;

pub use user_service::UserService;
