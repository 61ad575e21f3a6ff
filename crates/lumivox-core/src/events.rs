//! Observer lists for analysis events
//!
//! Subscribers are notified in registration order and can be removed with
//! the id returned at subscription time. This replaces ad hoc multicast
//! callbacks with an explicit, ordered subscription abstraction.

/// Identifies a subscription within one [`ObserverList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// An ordered list of observers for values of type `T`
pub struct ObserverList<T> {
    next_id: u64,
    subscribers: Vec<(SubscriberId, Box<dyn FnMut(&T) + Send>)>,
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<T> ObserverList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; it will be notified after all earlier ones
    pub fn subscribe<F>(&mut self, f: F) -> SubscriberId
    where
        F: FnMut(&T) + Send + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Remove a subscription; returns false if the id was already gone
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Notify all observers in registration order
    pub fn emit(&mut self, value: &T) {
        for (_, f) in &mut self.subscribers {
            f(value);
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True when nobody is listening
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Drop all subscriptions
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}
