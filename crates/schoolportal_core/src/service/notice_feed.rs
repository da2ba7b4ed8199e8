//! In-process notice subscription feed.
//!
//! # Invariants
//! - Every live subscriber receives the full list after each change.
//! - A dropped `Subscription` never receives another delivery.
//! - Listeners may drop subscriptions from inside a delivery.

use crate::model::notice::Notice;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn(&[Notice])>;

#[derive(Default)]
struct FeedInner {
    next_id: Cell<u64>,
    listeners: RefCell<BTreeMap<u64, Listener>>,
}

/// Cloneable handle to one feed.
#[derive(Clone, Default)]
pub struct NoticeFeed {
    inner: Rc<FeedInner>,
}

impl NoticeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&[Notice]) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .insert(id, Rc::new(listener));
        Subscription {
            feed: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Delivers `notices` to every current subscriber in subscription order.
    pub fn publish(&self, notices: &[Notice]) {
        let listeners = self
            .inner
            .listeners
            .borrow()
            .values()
            .cloned()
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(notices);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Unsubscribe handle; dropping it ends delivery.
pub struct Subscription {
    feed: Weak<FeedInner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.listeners.borrow_mut().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoticeFeed;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn dropped_subscription_stops_delivery() {
        let feed = NoticeFeed::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let subscription = feed.subscribe(move |_| counter.set(counter.get() + 1));

        feed.publish(&[]);
        subscription.unsubscribe();
        feed.publish(&[]);

        assert_eq!(calls.get(), 1);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outliving_feed_is_harmless() {
        let feed = NoticeFeed::new();
        let subscription = feed.subscribe(|_| {});
        drop(feed);
        drop(subscription);
    }
}
