//! Live fan-out of new analysis results.
//!
//! The broadcaster only carries notifications. It keeps no history, so a
//! consumer that subscribes late must read the result store to catch up.

use crate::models::AnalysisResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

type Listener = Arc<dyn Fn(&AnalysisResult) + Send + Sync>;

/// A registered listener. `active` is cleared when its subscription ends,
/// which also stops delivery from a publish already in progress.
struct Entry {
    id: u64,
    active: Arc<AtomicBool>,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Entry>,
}

/// Delivers each published result to the listeners registered at that moment.
#[derive(Clone, Default)]
pub struct Broadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. It stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AnalysisResult) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        let active = Arc::new(AtomicBool::new(true));
        registry.listeners.push(Entry {
            id,
            active: Arc::clone(&active),
            listener: Arc::new(listener),
        });
        debug!("Listener {} subscribed ({} active)", id, registry.listeners.len());

        Subscription {
            id,
            active,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invoke every registered listener with `result`, in registration
    /// order, before returning. Returns how many listeners were invoked.
    ///
    /// Listeners may subscribe or unsubscribe from inside a callback.
    /// One subscribed during the call does not receive this result; one
    /// unsubscribed during the call is skipped if it has not run yet.
    pub fn publish(&self, result: &AnalysisResult) -> usize {
        let listeners: Vec<(Arc<AtomicBool>, Listener)> = self
            .lock()
            .listeners
            .iter()
            .map(|entry| (Arc::clone(&entry.active), Arc::clone(&entry.listener)))
            .collect();

        let mut delivered = 0;
        for (active, listener) in &listeners {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            listener(result);
            delivered += 1;
        }

        debug!(
            "Published result for zone {} to {} listeners",
            result.zone().unwrap_or("<unknown>"),
            delivered
        );
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a registered listener. Dropping it unregisters the listener.
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Unregister the listener now.
    pub fn unsubscribe(self) {}

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.registry.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.listeners.retain(|entry| entry.id != self.id);
        debug!("Listener {} unsubscribed", self.id);
    }
}
