//! Audit trail for committed ledger mutations.
//!
//! A dedicated thread drains a bus subscription and writes one structured
//! record per event under the `audit` tracing target. Route it to its own sink
//! with a filter such as `RUST_LOG=info,audit=info`.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use minibank_core::Amount;
use minibank_events::{Event, EventBus};
use minibank_ledger::LedgerEvent;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Write one audit record for `event`.
///
/// `subjects` and `balances` list the touched accounts and their resulting
/// balances in the same order, source first.
pub fn record(event: &LedgerEvent) {
    let (username, currency) = match event {
        LedgerEvent::AccountOpened(e) => (Some(e.username.as_str()), Some(e.currency.as_str())),
        _ => (None, None),
    };

    info!(
        target: "audit",
        event_type = event.event_type(),
        version = event.version(),
        subjects = %join(&event.subjects()),
        amount = event.amount().minor_units(),
        balances = %join(&balances(event)),
        username,
        currency,
        occurred_at = %event.occurred_at().to_rfc3339(),
        "ledger mutation"
    );
}

/// Resulting balance of each subject of `event`.
fn balances(event: &LedgerEvent) -> Vec<Amount> {
    match event {
        LedgerEvent::AccountOpened(e) => vec![e.initial_balance],
        LedgerEvent::Deposited(e) => vec![e.balance],
        LedgerEvent::Withdrawn(e) => vec![e.balance],
        LedgerEvent::Transferred(e) => vec![e.from_balance, e.to_balance],
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Background consumer of ledger events.
pub struct AuditWorker;

impl AuditWorker {
    /// Subscribe to `bus` and hand every event to `handler` on a named thread.
    ///
    /// The subscription is taken before this returns, so events published
    /// afterwards are never missed.
    pub fn spawn<B, F>(name: &str, bus: &B, handler: F) -> io::Result<WorkerHandle>
    where
        B: EventBus<LedgerEvent> + ?Sized,
        F: Fn(&LedgerEvent) + Send + 'static,
    {
        let subscription = bus.subscribe();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let worker_name = name.to_string();

        let join = thread::Builder::new()
            .name(worker_name.clone())
            .spawn(move || {
                loop {
                    match subscription.recv_timeout(POLL_INTERVAL) {
                        Ok(event) => handler(&event),
                        Err(RecvTimeoutError::Timeout) => {
                            if flag.load(Ordering::Acquire) {
                                break;
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            debug!(worker = %worker_name, "event bus dropped; audit worker exiting");
                            break;
                        }
                    }
                }
            })?;

        Ok(WorkerHandle {
            stop,
            join: Some(join),
        })
    }
}

/// Handle to a running worker.
///
/// Call [`WorkerHandle::shutdown`] before the process exits; dropping the
/// handle detaches the thread and whatever is still queued may never be
/// written.
#[derive(Debug)]
pub struct WorkerHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Ask the worker to stop once its queue is drained and wait for it.
    ///
    /// Events already published are all handled before this returns.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("audit worker panicked");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }
}
