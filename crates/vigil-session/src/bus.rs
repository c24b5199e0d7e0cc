//! In-process activity event source

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use vigil_core::{ActivityHandler, ActivityKind, Subscribable, SubscriptionToken};

/// Fan-out of user-interaction events to subscribed handlers
///
/// Frontends translate their native input (terminal keys, mouse, etc.) into
/// `emit` calls. Handlers are invoked outside the lock, so a handler may
/// subscribe or unsubscribe.
#[derive(Default)]
pub struct ActivityBus {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<u64, (ActivityKind, ActivityHandler)>>,
}

impl ActivityBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event; returns how many handlers saw it
    pub fn emit(&self, kind: ActivityKind) -> usize {
        let matching: Vec<ActivityHandler> = self
            .handlers
            .lock()
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in &matching {
            handler(kind);
        }
        matching.len()
    }

    /// Number of live subscriptions
    pub fn active_subscriptions(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl Subscribable for ActivityBus {
    fn subscribe(&self, kind: ActivityKind, handler: ActivityHandler) -> SubscriptionToken {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().insert(id, (kind, handler));
        SubscriptionToken::new(id)
    }

    fn unsubscribe(&self, token: SubscriptionToken) {
        self.handlers.lock().remove(&token.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_emit_reaches_matching_kind_only() {
        let bus = ActivityBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        bus.subscribe(
            ActivityKind::KeyDown,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(bus.emit(ActivityKind::KeyDown), 1);
        assert_eq!(bus.emit(ActivityKind::Scroll), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = ActivityBus::new();
        let token = bus.subscribe(ActivityKind::Click, Arc::new(|_| {}));
        assert_eq!(bus.active_subscriptions(), 1);

        bus.unsubscribe(token);
        bus.unsubscribe(token);
        assert_eq!(bus.active_subscriptions(), 0);
        assert_eq!(bus.emit(ActivityKind::Click), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let bus = Arc::new(ActivityBus::new());
        let slot: Arc<Mutex<Option<SubscriptionToken>>> = Arc::new(Mutex::new(None));

        let inner_bus = Arc::clone(&bus);
        let inner_slot = Arc::clone(&slot);
        let token = bus.subscribe(
            ActivityKind::Scroll,
            Arc::new(move |_| {
                if let Some(token) = inner_slot.lock().take() {
                    inner_bus.unsubscribe(token);
                }
            }),
        );
        *slot.lock() = Some(token);

        assert_eq!(bus.emit(ActivityKind::Scroll), 1);
        assert_eq!(bus.emit(ActivityKind::Scroll), 0);
    }
}
