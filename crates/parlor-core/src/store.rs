//! A minimal explicit state container with subscribe/notify.
//!
//! The UI layer registers listeners instead of reaching into ambient
//! globals; every mutation goes through [`Store::set`] or [`Store::update`]
//! and fans out to subscribers synchronously.

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Owned state plus its change listeners.
pub struct Store<T> {
    value: T,
    listeners: Vec<(SubscriptionId, Box<dyn Fn(&T) + Send>)>,
    next_id: u64,
}

impl<T> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and notify all subscribers.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place and notify all subscribers.
    pub fn update(&mut self, mutate: impl FnOnce(&mut T)) {
        mutate(&mut self.value);
        self.notify();
    }

    /// Register a listener invoked after every mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&T) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.value);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_set_and_update_notify_subscribers() {
        let mut store = Store::new(0u32);
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_clone = seen.clone();
        store.subscribe(move |value| {
            seen_clone.store(*value as usize, Ordering::SeqCst);
        });

        store.set(3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        store.update(|v| *v += 4);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(*store.get(), 7);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = Store::new(0u32);
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let id = store.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.set(1);
        store.unsubscribe(id);
        store.set(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
