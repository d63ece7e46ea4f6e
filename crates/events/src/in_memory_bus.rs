//! In-process event bus backed by std channels.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// A publisher panicked while holding the subscriber list.
    #[error("event bus subscriber list poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO, no async
/// - Best-effort fan-out; dead subscribers are pruned on publish
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned list still yields a subscription; it just never fires.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_each_message() {
        let bus = InMemoryEventBus::<u32>::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(7).unwrap();
        bus.publish(8).unwrap();

        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(a.try_recv().unwrap(), 8);
        assert_eq!(b.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 8);
    }

    #[test]
    fn late_subscribers_miss_earlier_messages() {
        let bus = InMemoryEventBus::<u32>::new();
        bus.publish(1).unwrap();
        let sub = bus.subscribe();
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn dropped_subscriptions_are_pruned_on_publish() {
        let bus = InMemoryEventBus::<u32>::new();
        let keep = bus.subscribe();
        let gone = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(gone);
        bus.publish(1).unwrap();

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv().unwrap(), 1);
    }
}
