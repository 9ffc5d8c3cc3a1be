use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// An observable state slot with generation fencing.
///
/// Every dispatch takes a [`Ticket`]; starting a new dispatch invalidates
/// all earlier tickets, so a late-resolving older request can never
/// overwrite the state a newer request published.
pub struct Slot<T> {
    tx: watch::Sender<T>,
    generation: Arc<AtomicU64>,
}

impl<T: Clone> Slot<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Start a new dispatch, superseding all outstanding tickets.
    pub fn begin(&self) -> Ticket<T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            tx: self.tx.clone(),
            slot_generation: Arc::clone(&self.generation),
            generation,
        }
    }
}

/// Write access for one dispatch. Publishes are dropped once a newer
/// dispatch has begun on the same slot.
pub struct Ticket<T> {
    tx: watch::Sender<T>,
    slot_generation: Arc<AtomicU64>,
    generation: u64,
}

impl<T> Ticket<T> {
    /// Publish a state, unless this ticket has been superseded.
    /// Returns whether the value was actually published.
    pub fn publish(&self, value: T) -> bool {
        if self.slot_generation.load(Ordering::SeqCst) == self.generation {
            self.tx.send_replace(value);
            true
        } else {
            false
        }
    }
}
