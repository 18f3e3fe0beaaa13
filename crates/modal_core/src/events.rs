//! Synchronous publish/subscribe registry keyed by event name.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use connectors::{ProviderHandle, WalletSession};
use parking_lot::RwLock;

use crate::error::ConnectFailure;

pub type EventCallback<P> = Arc<dyn Fn(&P) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration<P> {
    id: ListenerId,
    event: String,
    callback: EventCallback<P>,
}

pub struct EventController<P> {
    registrations: RwLock<Vec<Registration<P>>>,
    next_id: AtomicU64,
}

impl<P> Default for EventController<P> {
    fn default() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<P> EventController<P> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers `callback` under `event`. The same callback may be registered
    /// any number of times; each registration gets its own id.
    pub fn on(&self, event: impl Into<String>, callback: EventCallback<P>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.write().push(Registration {
            id,
            event: event.into(),
            callback,
        });
        id
    }

    /// Removes every registration of `callback` under `event`, or every
    /// registration under `event` when no callback is given.
    pub fn off(&self, event: &str, callback: Option<&EventCallback<P>>) {
        self.registrations.write().retain(|registration| {
            if registration.event != event {
                return true;
            }
            match callback {
                Some(callback) => !Arc::ptr_eq(&registration.callback, callback),
                None => false,
            }
        });
    }

    /// Removes exactly one registration. Returns whether it was still present.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    pub fn clear(&self) {
        self.registrations.write().clear();
    }

    /// Invokes the callbacks registered for `event` in registration order.
    ///
    /// The registry lock is released before any callback runs, so callbacks may
    /// register or remove listeners. A panicking callback is not caught.
    pub fn trigger(&self, event: &str, payload: &P) {
        let callbacks: Vec<EventCallback<P>> = self
            .registrations
            .read()
            .iter()
            .filter(|registration| registration.event == event)
            .map(|registration| Arc::clone(&registration.callback))
            .collect();
        for callback in callbacks {
            callback(payload);
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.registrations
            .read()
            .iter()
            .filter(|registration| registration.event == event)
            .count()
    }
}

/// Handle returned by `WalletModal::on`; removes exactly the registration it
/// was created for.
pub struct Subscription<P> {
    controller: Weak<EventController<P>>,
    id: ListenerId,
}

impl<P> Subscription<P> {
    pub(crate) fn new(controller: &Arc<EventController<P>>, id: ListenerId) -> Self {
        Self {
            controller: Arc::downgrade(controller),
            id,
        }
    }

    pub fn unsubscribe(self) -> bool {
        self.controller
            .upgrade()
            .is_some_and(|controller| controller.remove(self.id))
    }
}

/// Payload carried by connect, error and close events.
#[derive(Clone)]
pub enum EventPayload {
    Connected(ProviderHandle),
    Failed(ConnectFailure),
    Closed,
}

impl EventPayload {
    pub fn provider(&self) -> Option<&ProviderHandle> {
        match self {
            EventPayload::Connected(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ConnectFailure> {
        match self {
            EventPayload::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPayload::Connected(handle) => f
                .debug_tuple("Connected")
                .field(&handle.provider_id())
                .finish(),
            EventPayload::Failed(failure) => f.debug_tuple("Failed").field(failure).finish(),
            EventPayload::Closed => f.write_str("Closed"),
        }
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
