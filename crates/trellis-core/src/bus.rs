// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-process subscription bus with bounded per-subscriber mailboxes.
//!
//! Delivery is synchronous and non-blocking from the writer's perspective:
//! `publish` pushes a clone of the event into each matching subscriber's
//! bounded mailbox and returns. A full mailbox drops its oldest undelivered
//! event and counts the drop — a slow subscriber can never stall a writer.
//!
//! Liveness is by handle: the bus holds a [`Weak`] reference to each
//! mailbox and the [`Subscriber`] handle holds the only strong one.
//! Dropping the handle invalidates the subscription, which is pruned before
//! the next delivery pass touches it.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::event::{Event, EventClass, Topic};

/// Default bound on undelivered events per subscriber.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Predicate applied to an event after its topic matches.
pub type EventFilter = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Identifier for one subscription within a bus.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options accepted by `subscribe`.
#[derive(Clone, Default)]
pub struct SubscribeOptions {
    /// Predicate evaluated after the topic matches; `None` accepts all.
    pub filter: Option<EventFilter>,
    /// Event classes to deliver; `None` accepts all.
    pub event_classes: Option<Vec<EventClass>>,
    /// Mailbox bound override; defaults to [`DEFAULT_MAILBOX_CAPACITY`].
    pub mailbox_capacity: Option<usize>,
}

impl SubscribeOptions {
    /// Attaches a filter predicate.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&Event) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Restricts delivery to the given event classes.
    #[must_use]
    pub fn with_event_classes(mut self, classes: impl IntoIterator<Item = EventClass>) -> Self {
        self.event_classes = Some(classes.into_iter().collect());
        self
    }

    /// Overrides the mailbox bound.
    #[must_use]
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }
}

impl std::fmt::Debug for SubscribeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscribeOptions")
            .field("filter", &self.filter.as_ref().map(|_| "<predicate>"))
            .field("event_classes", &self.event_classes)
            .field("mailbox_capacity", &self.mailbox_capacity)
            .finish()
    }
}

/// Bounded event queue shared between the bus (weakly) and its
/// [`Subscriber`] handle (strongly).
struct Mailbox {
    queue: Mutex<VecDeque<Event>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl Mailbox {
    fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueues an event, dropping the oldest undelivered one on overflow.
    fn push(&self, event: Event) {
        let mut queue = self.queue.lock();
        if queue.len() == self.capacity {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(event);
    }
}

/// Receiving end of a subscription.
///
/// Dropping the handle invalidates the subscription; the bus prunes it
/// before the next delivery pass.
pub struct Subscriber {
    mailbox: Arc<Mailbox>,
}

impl Subscriber {
    /// Takes the oldest undelivered event, if any.
    #[must_use]
    pub fn try_recv(&self) -> Option<Event> {
        self.mailbox.queue.lock().pop_front()
    }

    /// Takes every undelivered event in delivery order.
    #[must_use]
    pub fn drain(&self) -> Vec<Event> {
        self.mailbox.queue.lock().drain(..).collect()
    }

    /// Number of undelivered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mailbox.queue.lock().len()
    }

    /// Returns `true` when no events are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mailbox.queue.lock().is_empty()
    }

    /// Number of events dropped on mailbox overflow.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.mailbox.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("pending", &self.len())
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    filter: Option<EventFilter>,
    event_classes: Option<Vec<EventClass>>,
    mailbox: Weak<Mailbox>,
}

impl Subscription {
    fn wants(&self, event: &Event) -> bool {
        if !self.topic.matches(event) {
            return false;
        }
        if let Some(classes) = &self.event_classes {
            if !classes.contains(&event.kind.class()) {
                return false;
            }
        }
        self.filter.as_ref().is_none_or(|filter| filter(event))
    }
}

/// Observable state of one subscription, as returned by `list`.
#[derive(Clone, Debug)]
pub struct SubscriptionInfo {
    /// The subscription's id.
    pub id: SubscriptionId,
    /// The topic it selects.
    pub topic: Topic,
    /// Undelivered events waiting in the mailbox.
    pub pending: usize,
    /// Events dropped on mailbox overflow since subscribing.
    pub dropped: u64,
}

/// Topic/filter subscription registry with per-subscriber delivery.
#[derive(Default)]
pub struct SubscriptionBus {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl SubscriptionBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscription and returns its id plus the receiving handle.
    #[must_use]
    pub fn subscribe(&self, topic: Topic, opts: SubscribeOptions) -> (SubscriptionId, Subscriber) {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mailbox = Arc::new(Mailbox::new(
            opts.mailbox_capacity.unwrap_or(DEFAULT_MAILBOX_CAPACITY),
        ));
        self.subscriptions.lock().push(Subscription {
            id,
            topic,
            filter: opts.filter,
            event_classes: opts.event_classes,
            mailbox: Arc::downgrade(&mailbox),
        });
        (id, Subscriber { mailbox })
    }

    /// Removes a subscription by id. Returns `true` when one was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.lock();
        let before = subs.len();
        subs.retain(|sub| sub.id != id);
        subs.len() != before
    }

    /// Delivers `event` to every live matching subscription.
    ///
    /// Dead subscriptions (dropped [`Subscriber`] handles) are pruned before
    /// any delivery decision is made for them. Returns the number of
    /// mailboxes the event was pushed into.
    pub fn publish(&self, event: &Event) -> usize {
        let mut delivered = 0_usize;
        self.subscriptions.lock().retain(|sub| {
            let Some(mailbox) = sub.mailbox.upgrade() else {
                tracing::debug!(subscription = %sub.id, "pruning dead subscription");
                return false;
            };
            if sub.wants(event) {
                mailbox.push(event.clone());
                delivered += 1;
            }
            true
        });
        delivered
    }

    /// Lists live subscriptions, pruning dead ones.
    #[must_use]
    pub fn list(&self) -> Vec<SubscriptionInfo> {
        let mut infos = Vec::new();
        self.subscriptions.lock().retain(|sub| {
            let Some(mailbox) = sub.mailbox.upgrade() else {
                return false;
            };
            infos.push(SubscriptionInfo {
                id: sub.id,
                topic: sub.topic.clone(),
                pending: mailbox.queue.lock().len(),
                dropped: mailbox.dropped.load(Ordering::Relaxed),
            });
            true
        });
        infos
    }

    /// Number of registered subscriptions, live or not-yet-pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Returns `true` when no subscriptions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }

    /// Drops every subscription. Used on store stop.
    pub fn close(&self) {
        self.subscriptions.lock().clear();
    }
}

impl std::fmt::Debug for SubscriptionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionBus")
            .field("subscriptions", &self.len())
            .finish_non_exhaustive()
    }
}
