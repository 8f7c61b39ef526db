//! Typed listener registry.
//!
//! Listeners are keyed by [`EventKind`]. Emission works on a snapshot of the
//! listener list, so a callback may register or remove listeners (including
//! itself) without deadlocking the map.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::socket::message::{EventKind, SocketEvent};

/// Handle returned by registration, used to remove a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn Fn(&SocketEvent) + Send + Sync>;

struct Listener {
    id: ListenerId,
    once: bool,
    fired: AtomicBool,
    callback: Callback,
}

#[derive(Default)]
pub struct ListenerRegistry {
    listeners: DashMap<EventKind, Vec<Arc<Listener>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` on every event of `kind`.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&SocketEvent) + Send + Sync + 'static,
    {
        self.register(kind, false, Box::new(callback))
    }

    /// Call `callback` on the first event of `kind` only.
    pub fn once<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&SocketEvent) + Send + Sync + 'static,
    {
        self.register(kind, true, Box::new(callback))
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut removed = false;
        for mut entry in self.listeners.iter_mut() {
            let before = entry.len();
            entry.retain(|l| l.id != id);
            removed |= entry.len() != before;
        }
        removed
    }

    /// Deliver `event` to the listeners of its kind. Returns how many ran.
    pub fn emit(&self, event: &SocketEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Arc<Listener>> = match self.listeners.get(&kind) {
            Some(entry) => entry.value().clone(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut spent = false;
        for listener in snapshot {
            if listener.once {
                // A concurrent emit may race us to the same one-shot listener.
                if listener.fired.swap(true, Ordering::AcqRel) {
                    continue;
                }
                spent = true;
            }
            (listener.callback)(event);
            delivered += 1;
        }

        if spent {
            if let Some(mut entry) = self.listeners.get_mut(&kind) {
                entry.retain(|l| !(l.once && l.fired.load(Ordering::Acquire)));
            }
        }
        delivered
    }

    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.listeners.get(kind).map(|e| e.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        self.listeners.clear();
    }

    fn register(&self, kind: EventKind, once: bool, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.entry(kind).or_default().push(Arc::new(Listener {
            id,
            once,
            fired: AtomicBool::new(false),
            callback,
        }));
        id
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total: usize = self.listeners.iter().map(|e| e.len()).sum();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&SocketEvent) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move |_: &SocketEvent| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn ready() -> SocketEvent {
        SocketEvent::Message {
            kind: EventKind::Ready,
            payload: serde_json::json!({"kind": "ready"}),
        }
    }

    #[test]
    fn test_on_receives_every_event() {
        let registry = ListenerRegistry::new();
        let (count, callback) = counter();
        registry.on(EventKind::Ready, callback);

        registry.emit(&ready());
        registry.emit(&ready());
        registry.emit(&SocketEvent::Opened);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_once_fires_once() {
        let registry = ListenerRegistry::new();
        let (count, callback) = counter();
        registry.once(EventKind::Ready, callback);

        assert_eq!(registry.emit(&ready()), 1);
        assert_eq!(registry.emit(&ready()), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.listener_count(&EventKind::Ready), 0);
    }

    #[test]
    fn test_off_removes_listener() {
        let registry = ListenerRegistry::new();
        let (count, callback) = counter();
        let id = registry.on(EventKind::Closed, callback);

        assert!(registry.off(id));
        assert!(!registry.off(id));
        registry.emit(&SocketEvent::Closed);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_register_during_emit() {
        let registry = Arc::new(ListenerRegistry::new());
        let inner = registry.clone();
        registry.once(EventKind::Opened, move |_| {
            inner.on(EventKind::Opened, |_| {});
        });

        registry.emit(&SocketEvent::Opened);
        assert_eq!(registry.listener_count(&EventKind::Opened), 1);
    }
}
