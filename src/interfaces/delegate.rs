use std::fmt;

/// Token returned by [`Multicast::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// Ordered observer list
///
/// Subscribers are called in subscription order, on the thread that
/// broadcasts (the game thread). They do not need to be `Send`.
pub struct Multicast<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionHandle, Subscriber<T>)>,
}

impl<T> Multicast<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionHandle
    where
        F: FnMut(&T) + 'static,
    {
        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;
        self.subscribers.push((handle, Box::new(subscriber)));
        handle
    }

    /// Returns false if `handle` was not subscribed
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(h, _)| *h != handle);
        self.subscribers.len() != before
    }

    pub fn broadcast(&mut self, value: &T) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(value);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl<T> Default for Multicast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Multicast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multicast")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_broadcast_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut delegate = Multicast::<u32>::new();

        let first = Rc::clone(&seen);
        delegate.subscribe(move |v| first.borrow_mut().push(("a", *v)));
        let second = Rc::clone(&seen);
        delegate.subscribe(move |v| second.borrow_mut().push(("b", *v)));

        delegate.broadcast(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut delegate = Multicast::<()>::new();

        let counter = Rc::clone(&count);
        let handle = delegate.subscribe(move |_| *counter.borrow_mut() += 1);
        assert_eq!(delegate.len(), 1);

        assert!(delegate.unsubscribe(handle));
        assert!(!delegate.unsubscribe(handle));
        assert!(delegate.is_empty());

        delegate.broadcast(&());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_clear() {
        let mut delegate = Multicast::<String>::default();
        delegate.subscribe(|_| {});
        delegate.subscribe(|_| {});
        delegate.clear();
        assert_eq!(delegate.len(), 0);
    }
}
