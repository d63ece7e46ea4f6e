//! Ledger module: the in-memory account store and its invariants.
//!
//! No HTTP, no persistence. Every balance mutation in the system goes through
//! [`AccountStore`]; callers only ever hold ids and [`AccountView`] copies.

pub mod account;
pub mod event;
pub mod secret;
pub mod store;

pub use account::AccountView;
pub use event::{AccountOpened, Deposited, LedgerEvent, Transferred, Withdrawn};
pub use secret::SecretHasher;
pub use store::AccountStore;
