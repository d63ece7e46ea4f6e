//! `minibank-auth`: credential checks and session tokens.
//!
//! Decoupled from HTTP: the transport hands in strings and gets back account
//! ids or typed errors.

pub mod claims;
pub mod gate;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use gate::{AuthConfig, AuthGate, IssuedToken};
pub use token::TokenCodec;
