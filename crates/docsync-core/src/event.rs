//! Single-threaded publish/subscribe primitives.
//!
//! An [`Emitter`] owns a list of listeners. Subscribing returns a
//! [`Subscription`]; dropping it (or calling [`Subscription::dispose`])
//! removes the listener again, so a holder of subscriptions releases them
//! deterministically when it goes away.
//!
//! Firing works on a copy of the listener list. Listeners may therefore
//! subscribe, unsubscribe, or fire other emitters (including this one) while
//! an event is being delivered.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

impl<T> Listeners<T> {
    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
    }
}

/// Event source for values of type `T`.
///
/// # Examples
///
/// ```
/// use docsync_core::event::Emitter;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let emitter = Emitter::<u32>::new();
/// let total = Rc::new(Cell::new(0));
///
/// let sink = Rc::clone(&total);
/// let subscription = emitter.subscribe(move |n| sink.set(sink.get() + n));
///
/// emitter.fire(&2);
/// emitter.fire(&3);
/// assert_eq!(total.get(), 5);
///
/// drop(subscription);
/// emitter.fire(&10);
/// assert_eq!(total.get(), 5);
/// assert_eq!(emitter.listener_count(), 0);
/// ```
pub struct Emitter<T> {
    listeners: Rc<Listeners<T>>,
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(Listeners {
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Registers `listener` and returns the handle that keeps it registered.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id + 1);
        self.listeners
            .entries
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<Listeners<T>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.remove(id);
            }
        })
    }

    /// Delivers `event` to every listener registered when the call started.
    pub fn fire(&self, event: &T) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.entries.borrow().len()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.entries.borrow().len())
            .finish()
    }
}

/// Keeps one listener registered until dropped or disposed.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Creates a subscription that runs `release` exactly once.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Unregisters the listener now.
    pub fn dispose(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// An owned group of subscriptions released together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Releases every subscription in the set, leaving it empty.
    pub fn clear(&mut self) {
        // Drained into a local first: releasing may re-enter the owner.
        let drained: Vec<Subscription> = self.subscriptions.drain(..).collect();
        drop(drained);
    }
}

impl FromIterator<Subscription> for SubscriptionSet {
    fn from_iter<I: IntoIterator<Item = Subscription>>(iter: I) -> Self {
        Self {
            subscriptions: iter.into_iter().collect(),
        }
    }
}
