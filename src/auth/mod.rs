//! Authentication layer: JWT issuance/verification and password hashing.
//!
//! The [`Authenticator`] trait is the seam consumed by both the REST
//! extractors and the realtime identity resolver. The concrete
//! [`JwtAuthenticator`] validates `Bearer` tokens from the
//! `Authorization` header.

pub mod authenticator;
pub mod extract;
pub mod jwt;
pub mod password;

pub use authenticator::{Authenticator, JwtAuthenticator};
pub use extract::CurrentUser;
pub use jwt::{Claims, JwtSigner};
