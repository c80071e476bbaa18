//! Event bus and the notifications exchanged with playback and host
//!
//! Listeners are registered explicitly and removed explicitly. Dispatch runs
//! over a snapshot of the listener list taken when `emit` is called, so a
//! listener may subscribe or unsubscribe from inside a handler. Listeners
//! removed mid-dispatch are skipped; listeners added mid-dispatch first see
//! the next event.

use crate::{Level, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Notifications emitted by a playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// The set of selectable levels changed
    LevelsAvailable { levels: Vec<Level> },
    /// A level switch has begun
    LevelSwitchStarted,
    /// A level switch has completed
    LevelSwitchEnded,
    /// The level in effect changed
    ActiveLevelChanged { level: i32 },
}

/// Notifications emitted by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    /// Host finished setting up its playback
    Ready,
    /// Host controls were (re)rendered
    Rendered,
    /// Host controls were hidden
    Hide,
    /// The active container (and with it the playback) changed
    ContainerChanged,
}

/// Identifier of a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Arc<dyn Fn(&E) -> Result<()> + Send + Sync>;

struct Entry<E> {
    id: ListenerId,
    active: Arc<AtomicBool>,
    listener: Listener<E>,
}

impl<E> Clone for Entry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Arc::clone(&self.active),
            listener: Arc::clone(&self.listener),
        }
    }
}

struct Registry<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<E>>>,
}

impl<E> Registry<E> {
    fn remove(&self, id: ListenerId) {
        let removed = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .iter()
                .position(|entry| entry.id == id)
                .map(|pos| entries.remove(pos))
        };
        // Listener is dropped outside the lock; it may own subscriptions to this bus.
        if let Some(entry) = removed {
            entry.active.store(false, Ordering::SeqCst);
        }
    }
}

/// Observer registration for one kind of notification
pub struct EventBus<E> {
    registry: Arc<Registry<E>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(1),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.registry
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<E: 'static> EventBus<E> {
    /// Register a listener; it stays registered until the returned
    /// subscription is unsubscribed or dropped
    #[must_use = "dropping a Subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        let id = ListenerId(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Entry {
            id,
            active: Arc::new(AtomicBool::new(true)),
            listener: Arc::new(listener),
        };
        self.registry
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);

        let registry: Weak<Registry<E>> = Arc::downgrade(&self.registry);
        Subscription {
            id,
            cancel: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(id);
                }
            })),
        }
    }

    /// Dispatch an event to every listener registered at call time.
    ///
    /// Stops at the first listener error and returns it.
    pub fn emit(&self, event: &E) -> Result<()> {
        let snapshot: Vec<Entry<E>> = self
            .registry
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for entry in snapshot {
            if entry.active.load(Ordering::SeqCst) {
                (entry.listener)(event)?;
            }
        }
        Ok(())
    }
}

/// Handle to a registered listener
pub struct Subscription {
    id: ListenerId,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener from its bus
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribe_and_emit() {
        let bus = EventBus::<HostEvent>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.emit(&HostEvent::Rendered).unwrap();
        bus.emit(&HostEvent::Hide).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_unsubscribe_and_drop() {
        let bus = EventBus::<HostEvent>::new();
        let first = bus.subscribe(|_| Ok(()));
        let second = bus.subscribe(|_| Ok(()));
        assert_eq!(bus.listener_count(), 2);

        first.unsubscribe();
        assert_eq!(bus.listener_count(), 1);

        drop(second);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_emit_stops_at_first_error() {
        let bus = EventBus::<HostEvent>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _failing = bus.subscribe(|_| Err(Error::InvalidConfig("boom".into())));
        let counter = Arc::clone(&hits);
        let _after = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(bus.emit(&HostEvent::Ready).is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_removed_during_dispatch_is_skipped() {
        let bus = EventBus::<HostEvent>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&victim);
        let _remover = bus.subscribe(move |_| {
            if let Some(sub) = slot.lock().unwrap().take() {
                sub.unsubscribe();
            }
            Ok(())
        });
        let counter = Arc::clone(&hits);
        *victim.lock().unwrap() = Some(bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.emit(&HostEvent::ContainerChanged).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_listener_added_during_dispatch_sees_next_event() {
        let bus = EventBus::<HostEvent>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let added: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = bus.clone();
        let counter = Arc::clone(&hits);
        let store = Arc::clone(&added);
        let _adder = bus.subscribe(move |_| {
            let mut store = store.lock().unwrap();
            if store.is_empty() {
                let counter = Arc::clone(&counter);
                store.push(inner_bus.subscribe(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }));
            }
            Ok(())
        });

        bus.emit(&HostEvent::Rendered).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        bus.emit(&HostEvent::Rendered).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_playback_event_json() {
        let event: PlaybackEvent =
            serde_json::from_str(r#"{"type": "active_level_changed", "level": 2}"#).unwrap();
        assert_eq!(event, PlaybackEvent::ActiveLevelChanged { level: 2 });
    }
}
