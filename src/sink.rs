//! Event delivery gate.
//!
//! Monitor ticks and the trap receiver hand events to the consumer through
//! an unbounded channel. The sender sits behind a mutex so that every write
//! happens under the lock and [`Gate::close`] can shut delivery off
//! synchronously: once `close` returns, no further event gets through.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Serialized, closable event sender.
#[derive(Debug)]
pub(crate) struct Gate<E> {
    sender: Mutex<Option<UnboundedSender<E>>>,
}

impl<E> Gate<E> {
    pub(crate) fn new(sender: UnboundedSender<E>) -> Self {
        Self {
            sender: Mutex::new(Some(sender)),
        }
    }

    /// A gate plus the receiving end of its channel.
    pub(crate) fn channel() -> (Self, UnboundedReceiver<E>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }

    fn lock(&self) -> MutexGuard<'_, Option<UnboundedSender<E>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver one event. Returns `false` if the gate is closed or the
    /// receiver is gone.
    pub(crate) fn deliver(&self, event: E) -> bool {
        match self.lock().as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Stop delivery. Waits for an in-flight `deliver` to finish.
    pub(crate) fn close(&self) {
        self.lock().take();
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.lock().as_ref().is_none_or(|sender| sender.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_then_close() {
        let (gate, mut rx) = Gate::channel();
        assert!(gate.deliver(1));
        gate.close();
        assert!(!gate.deliver(2));
        assert!(gate.is_closed());

        assert_eq!(rx.try_recv().ok(), Some(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_receiver_dropped() {
        let (gate, rx) = Gate::<u32>::channel();
        drop(rx);
        assert!(!gate.deliver(7));
        assert!(gate.is_closed());
    }
}
