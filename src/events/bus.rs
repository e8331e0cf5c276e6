//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so that the supervisor and its retry timers
//! can publish without blocking, and any number of receivers can observe.
//!
//! ```text
//! Publishers:                         Receivers:
//!   connect()   ──┐                     ┌──► SubscriberSet (LogWriter, ...)
//!   retry timer ──┼──► Bus (ring) ──────┼──► ConnectionSupervisor::subscribe()
//!   shutdown()  ──┘                     └──► ...
//! ```
//!
//! ## Rules
//! - `publish()` never blocks; with no receivers the event is dropped.
//! - One bounded ring buffer is shared by all receivers.
//! - Slow receivers get `RecvError::Lagged(n)` and skip the `n` oldest items.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lifecycle events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver for events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ConnectStarting));
    }

    #[test]
    fn test_receiver_sees_only_later_events() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::ConnectStarting));
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ConnectSucceeded).with_target("db"));

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::ConnectSucceeded);
        assert!(rx.try_recv().is_err());
    }
}
