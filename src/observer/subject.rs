use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::warn;

/// A registered callback. Identity is the `Arc` allocation.
pub type Observer<T> = Arc<dyn Fn(&T) -> anyhow::Result<()> + Send + Sync>;

type ObserverList<T> = Mutex<Vec<Observer<T>>>;

fn lock<T>(observers: &ObserverList<T>) -> MutexGuard<'_, Vec<Observer<T>>> {
    observers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes the first registration of `observer`.
fn remove<T>(observers: &ObserverList<T>, observer: &Observer<T>) -> bool {
    let mut observers = lock(observers);
    match observers.iter().position(|o| Arc::ptr_eq(o, observer)) {
        Some(idx) => {
            observers.remove(idx);
            true
        }
        None => false,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Publish/subscribe list. State containers call
/// [`ObserverSubject::notify_observers`] with a snapshot of their state; a
/// subscriber that returns `Err` or panics is logged and skipped.
pub struct ObserverSubject<T> {
    observers: Arc<ObserverList<T>>,
}

impl<T> ObserverSubject<T> {
    pub fn new() -> Self {
        ObserverSubject {
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription<T>
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe_observer(Arc::new(callback))
    }

    /// Registers an existing observer. Keep a clone of the `Arc` to remove it
    /// later with [`ObserverSubject::unsubscribe`]. Registering the same
    /// observer twice delivers to it twice.
    pub fn subscribe_observer(&self, observer: Observer<T>) -> Subscription<T> {
        lock(&self.observers).push(Arc::clone(&observer));
        Subscription {
            observers: Arc::downgrade(&self.observers),
            observer,
        }
    }

    /// Returns `true` if `observer` was registered and has been removed.
    pub fn unsubscribe(&self, observer: &Observer<T>) -> bool {
        remove(&self.observers, observer)
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.observers).len()
    }

    pub fn clear_observers(&self) {
        lock(&self.observers).clear();
    }

    /// Calls every observer with `snapshot`, in subscription order.
    ///
    /// The list is copied before the first call, so observers may subscribe
    /// or unsubscribe while being notified; changes apply to the next round.
    pub fn notify_observers(&self, snapshot: &T) {
        let observers: Vec<Observer<T>> = lock(&self.observers).clone();
        for (idx, observer) in observers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| observer(snapshot))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!("error notifying observer #{idx}: {err:#}"),
                Err(payload) => warn!(
                    "observer #{idx} panicked: {}",
                    panic_message(&*payload)
                ),
            }
        }
    }
}

impl<T> Default for ObserverSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObserverSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSubject")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Handle returned by `subscribe`. Dropping it leaves the observer
/// registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<T> {
    observers: Weak<ObserverList<T>>,
    observer: Observer<T>,
}

impl<T> Subscription<T> {
    /// The registered observer, usable with [`ObserverSubject::unsubscribe`].
    pub fn observer(&self) -> &Observer<T> {
        &self.observer
    }

    /// Removes this registration. Returns `false` if it was already removed
    /// or the subject no longer exists.
    pub fn unsubscribe(&self) -> bool {
        match self.observers.upgrade() {
            Some(observers) => remove(&observers, &self.observer),
            None => false,
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &(self.observers.strong_count() > 0))
            .finish()
    }
}
