//! `minibank-events`: facts about ledger mutations and how they fan out.
//!
//! Mechanics only: the concrete event types live next to the code that emits
//! them (`minibank-ledger`), consumers live in the transport crate.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
