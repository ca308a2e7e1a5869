use std::sync::{Arc, Mutex};

use uuid::Uuid;

pub type Shared<T> = Arc<Mutex<T>>;

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(Uuid);

struct Inner<T> {
    value: T,
    subscribers: Vec<(Uuid, Subscriber<T>)>,
}

/// A mutable cell that notifies its subscribers synchronously on change.
///
/// Clones share the same cell. Subscribers run after the internal lock is
/// released, so a subscriber may read or even write the cell it watches.
pub struct Observable<T> {
    inner: Shared<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> Observable<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { value, subscribers: Vec::new() })),
        }
    }

    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Reads the value in place without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock().value)
    }

    /// Replaces the value. Returns false (and notifies nobody) when unchanged.
    pub fn set(&self, value: T) -> bool {
        self.update(|current| *current = value)
    }

    /// Mutates the value in place, notifying subscribers if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let (value, subscribers) = {
            let mut inner = self.lock();
            let before = inner.value.clone();
            f(&mut inner.value);
            if inner.value == before {
                return false;
            }
            let subscribers: Vec<Subscriber<T>> =
                inner.subscribers.iter().map(|(_, s)| s.clone()).collect();
            (inner.value.clone(), subscribers)
        };
        for subscriber in subscribers {
            subscriber(&value);
        }
        true
    }

    pub fn subscribe<F>(&self, subscriber: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.lock().subscribers.push((id, Arc::new(subscriber)));
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.lock().subscribers.retain(|(id, _)| *id != subscription.0);
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        // a panicking subscriber never runs under the lock, so poisoning only
        // happens if `f` in `update` panicked; the value is still usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + PartialEq + Send + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for Observable<T>
where
    T: Clone + PartialEq + Send + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|v| f.debug_tuple("Observable").field(v).finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_notifies_with_new_value() {
        let cell = Observable::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        cell.subscribe(move |v| s.lock().unwrap().push(*v));

        assert!(cell.set(2));
        assert!(cell.set(3));
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn test_unchanged_value_is_silent() {
        let cell = Observable::new("a".to_string());
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        cell.subscribe(move |_| *h.lock().unwrap() += 1);

        assert!(!cell.set("a".to_string()));
        assert!(!cell.update(|_| {}));
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let cell = Observable::new(0u32);
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        let sub = cell.subscribe(move |_| *h.lock().unwrap() += 1);

        cell.set(1);
        cell.unsubscribe(sub);
        cell.set(2);
        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_may_read_cell() {
        let cell = Observable::new(vec![1]);
        let reader = cell.clone();
        let seen = Arc::new(Mutex::new(0usize));
        let s = seen.clone();
        cell.subscribe(move |_| *s.lock().unwrap() = reader.with(|v| v.len()));

        cell.update(|v| v.push(2));
        assert_eq!(*seen.lock().unwrap(), 2);
    }
}
