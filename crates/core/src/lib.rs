//! `minibank-core`: ledger building blocks.
//!
//! This crate contains **pure domain** primitives (no locking, no IO): account
//! identifiers, fixed-point amounts, currency codes and the error taxonomy every
//! other crate reports through.

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::AccountId;
pub use money::{Amount, Currency};
