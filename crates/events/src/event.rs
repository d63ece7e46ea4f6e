use chrono::{DateTime, Utc};

use minibank_core::AccountId;

/// A fact about something that already happened to the ledger.
///
/// Events are immutable and versioned. They are emitted after the mutation
/// has been applied, never before.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "ledger.transferred").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the mutation was applied.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Accounts touched by the event, source first.
    fn subjects(&self) -> Vec<AccountId>;
}
