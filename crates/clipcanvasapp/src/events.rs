//! Outward signals from a collection to whoever presents it.
//!
//! One [`EventBus`] per producer. Consumers call [`EventBus::subscribe`] and own
//! the returned receiver; dropping it is the unsubscribe. Emitting never blocks
//! and never fails the emitting operation.

use crate::result::OperationResult;
use crate::store::StorageHandle;
use async_channel as channel;
use std::sync::Mutex;
use tracing::error;

#[derive(Debug, Clone)]
pub enum CollectionEvent {
    /// Show the empty "new canvas" slot.
    OpenNewCanvas,
    /// A load ended with a non-success result (never emitted for cancellation).
    CanvasLoadFailed(OperationResult),
    /// The collection is gone; leave it.
    ReturnToParent,
    /// The collection could not be opened at all.
    CollectionErrorRaised(OperationResult),
    ItemsInitializationStarted,
    ItemsInitializationFinished,
    TipTextUpdateRequested(String),
    ItemAdded(StorageHandle),
    ItemRemoved(StorageHandle),
}

/// Broadcast bus fanning out to one unbounded channel per subscriber.
pub struct EventBus<E> {
    subscribers: Mutex<Vec<channel::Sender<E>>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> channel::Receiver<E> {
        let (tx, rx) = channel::unbounded();
        match self.subscribers.lock() {
            Ok(mut subs) => subs.push(tx),
            Err(_) => error!("EventBus: subscribers lock poisoned; subscriber not registered"),
        }
        rx
    }

    /// Deliver to every live subscriber; closed channels are dropped.
    pub fn emit(&self, event: E) {
        match self.subscribers.lock() {
            Ok(mut subs) => {
                subs.retain(|sub| !sub.is_closed());
                for sub in subs.iter() {
                    let _ = sub.try_send(event.clone());
                }
            }
            Err(_) => error!("EventBus: subscribers lock poisoned; dropping event"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|mut subs| {
                subs.retain(|sub| !sub.is_closed());
                subs.len()
            })
            .unwrap_or(0)
    }
}

/// Drain whatever is queued on a receiver without waiting.
pub fn drain<E>(rx: &channel::Receiver<E>) -> Vec<E> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.emit(CollectionEvent::OpenNewCanvas);

        assert!(matches!(drain(&a).as_slice(), [CollectionEvent::OpenNewCanvas]));
        assert!(matches!(drain(&b).as_slice(), [CollectionEvent::OpenNewCanvas]));
    }

    #[test]
    fn test_dropped_receiver_unsubscribes() {
        let bus: EventBus<CollectionEvent> = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(CollectionEvent::ReturnToParent);
        assert_eq!(drain(&kept).len(), 1);
    }

    #[test]
    fn test_late_subscriber_sees_only_future_events() {
        let bus = EventBus::new();
        bus.emit(CollectionEvent::ItemsInitializationStarted);
        let rx = bus.subscribe();
        bus.emit(CollectionEvent::ItemsInitializationFinished);
        assert!(matches!(
            drain(&rx).as_slice(),
            [CollectionEvent::ItemsInitializationFinished]
        ));
    }
}
