//! Cross-island message bus.
//!
//! Independently mounted islands never call each other; they publish typed
//! messages and subscribe to the ones they care about. Dispatch is synchronous
//! and runs in registration order on the calling thread.
//!
//! The handler list is snapshotted when a message is published, so a handler may
//! publish, subscribe or unsubscribe while it runs. A handler whose subscription
//! is cancelled during a dispatch is skipped for the rest of that dispatch.
//!
//! # Example
//!
//! ```rust
//! use hubshell::app::modes::ListKind;
//! use hubshell::bus::{IslandId, ListInvalidated, MessageBus};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let bus = MessageBus::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! let subscription = bus.subscribe::<ListInvalidated, _>(move |_| counter.set(counter.get() + 1));
//!
//! bus.publish(IslandId::RUNTIME, ListInvalidated { list: ListKind::Posts });
//! subscription.unsubscribe();
//! bus.publish(IslandId::RUNTIME, ListInvalidated { list: ListKind::Posts });
//! assert_eq!(seen.get(), 1);
//! ```

pub mod messages;

pub use messages::{
    ApplyListFilter, BusMessage, ListInvalidated, OpenDetail, OpenFilterSelector, ReturnToList,
    SetPostsScope, Topic, TopicMessage, ViewChanged,
};

use serde::Serialize;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Name of the island that published a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IslandId(pub &'static str);

impl IslandId {
    pub const NAVIGATOR: Self = Self("navigator");
    pub const PEOPLE_LIST: Self = Self("people_list");
    pub const POSTS_LIST: Self = Self("posts_list");
    pub const FILTER_SELECTOR: Self = Self("filter_selector");
    pub const DETAIL: Self = Self("detail");
    pub const RUNTIME: Self = Self("runtime");
}

impl fmt::Display for IslandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A published message together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<M> {
    pub origin: IslandId,
    pub payload: M,
}

type Handler = Rc<dyn Fn(&dyn Any)>;

struct HandlerEntry {
    id: u64,
    topic: Topic,
    active: Rc<Cell<bool>>,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<HandlerEntry>,
}

/// Process-wide publish/subscribe hub. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct MessageBus {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("MessageBus")
            .field("subscribers", &registry.entries.len())
            .finish()
    }
}

impl MessageBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to every current subscriber of `M`, in registration order.
    ///
    /// Payloads are not validated; an empty subscriber list is not an error.
    pub fn publish<M: TopicMessage>(&self, origin: IslandId, payload: M) {
        let snapshot: Vec<(Rc<Cell<bool>>, Handler)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.topic == M::TOPIC)
            .map(|entry| (Rc::clone(&entry.active), Rc::clone(&entry.handler)))
            .collect();

        tracing::debug!(
            topic = ?M::TOPIC,
            origin = %origin,
            subscribers = snapshot.len(),
            "publishing"
        );

        let envelope = Envelope { origin, payload };
        for (active, handler) in snapshot {
            if active.get() {
                handler(&envelope as &dyn Any);
            }
        }
    }

    /// Registers `handler` for messages of type `M`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    #[must_use = "dropping the subscription unsubscribes the handler"]
    pub fn subscribe<M, F>(&self, handler: F) -> Subscription
    where
        M: TopicMessage,
        F: Fn(&Envelope<M>) + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let erased: Handler = Rc::new(move |message: &dyn Any| {
            if let Some(envelope) = message.downcast_ref::<Envelope<M>>() {
                handler(envelope);
            }
        });

        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(HandlerEntry {
            id,
            topic: M::TOPIC,
            active: Rc::clone(&active),
            handler: erased,
        });
        tracing::trace!(topic = ?M::TOPIC, subscription = id, "subscribed");

        Subscription {
            id,
            topic: M::TOPIC,
            active,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Number of live handlers for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.topic == topic)
            .count()
    }

    /// A handle that does not keep the registry alive.
    ///
    /// Handlers that need to publish capture this instead of a `MessageBus`, since
    /// the registry owns the handlers.
    #[must_use]
    pub fn downgrade(&self) -> WeakBus {
        WeakBus {
            registry: Rc::downgrade(&self.registry),
        }
    }
}

/// Non-owning bus handle.
#[derive(Clone, Default)]
pub struct WeakBus {
    registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for WeakBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBus")
            .field("alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}

impl WeakBus {
    #[must_use]
    pub fn upgrade(&self) -> Option<MessageBus> {
        self.registry.upgrade().map(|registry| MessageBus { registry })
    }
}

/// Registration guard returned by [`MessageBus::subscribe`].
pub struct Subscription {
    id: u64,
    topic: Topic,
    active: Rc<Cell<bool>>,
    registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("active", &self.active.get())
            .finish()
    }
}

impl Subscription {
    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Removes the handler. Calling it again has no effect.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().entries.retain(|entry| entry.id != self.id);
        }
        tracing::trace!(topic = ?self.topic, subscription = self.id, "unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::modes::ListKind;

    fn invalidate(bus: &MessageBus, list: ListKind) {
        bus.publish(IslandId::RUNTIME, ListInvalidated { list });
    }

    #[test]
    fn delivers_in_registration_order() {
        let bus = MessageBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first_log = Rc::clone(&log);
        let _first = bus.subscribe::<ListInvalidated, _>(move |env| {
            first_log.borrow_mut().push(("first", env.payload.list));
        });
        let second_log = Rc::clone(&log);
        let _second = bus.subscribe::<ListInvalidated, _>(move |env| {
            second_log.borrow_mut().push(("second", env.payload.list));
        });

        invalidate(&bus, ListKind::People);
        assert_eq!(
            *log.borrow(),
            vec![("first", ListKind::People), ("second", ListKind::People)]
        );
    }

    #[test]
    fn topics_are_isolated() {
        let bus = MessageBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = bus.subscribe::<ReturnToList, _>(move |_| counter.set(counter.get() + 1));

        invalidate(&bus, ListKind::Posts);
        assert_eq!(hits.get(), 0);
        bus.publish(IslandId::RUNTIME, ReturnToList { list: ListKind::Posts });
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn envelope_carries_origin() {
        let bus = MessageBus::new();
        let origin = Rc::new(Cell::new(None));
        let seen = Rc::clone(&origin);
        let _sub = bus.subscribe::<ReturnToList, _>(move |env| seen.set(Some(env.origin)));

        bus.publish(IslandId::FILTER_SELECTOR, ReturnToList { list: ListKind::People });
        assert_eq!(origin.get(), Some(IslandId::FILTER_SELECTOR));
    }

    #[test]
    fn unsubscribe_is_idempotent_and_drop_unsubscribes() {
        let bus = MessageBus::new();
        let sub = bus.subscribe::<ListInvalidated, _>(|_| {});
        let other = bus.subscribe::<ListInvalidated, _>(|_| {});
        assert_eq!(bus.subscriber_count(Topic::ListInvalidated), 2);

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(bus.subscriber_count(Topic::ListInvalidated), 1);

        drop(other);
        drop(sub);
        assert_eq!(bus.subscriber_count(Topic::ListInvalidated), 0);
    }

    #[test]
    fn handler_unsubscribed_mid_dispatch_is_skipped() {
        let bus = MessageBus::new();
        let later_hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let victim = Rc::clone(&slot);
        let _killer = bus.subscribe::<ListInvalidated, _>(move |_| {
            if let Some(sub) = victim.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        let counter = Rc::clone(&later_hits);
        *slot.borrow_mut() =
            Some(bus.subscribe::<ListInvalidated, _>(move |_| counter.set(counter.get() + 1)));

        invalidate(&bus, ListKind::Posts);
        assert_eq!(later_hits.get(), 0);
        assert_eq!(bus.subscriber_count(Topic::ListInvalidated), 1);
    }

    #[test]
    fn handler_subscribed_mid_dispatch_waits_for_next_publish() {
        let bus = MessageBus::new();
        let hits = Rc::new(Cell::new(0));
        let added: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let weak = bus.downgrade();
        let counter = Rc::clone(&hits);
        let store = Rc::clone(&added);
        let _adder = bus.subscribe::<ListInvalidated, _>(move |_| {
            let Some(bus) = weak.upgrade() else { return };
            let counter = Rc::clone(&counter);
            store
                .borrow_mut()
                .push(bus.subscribe::<ListInvalidated, _>(move |_| counter.set(counter.get() + 1)));
        });

        invalidate(&bus, ListKind::People);
        assert_eq!(hits.get(), 0);
        invalidate(&bus, ListKind::People);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handlers_may_publish_reentrantly() {
        let bus = MessageBus::new();
        let returned = Rc::new(Cell::new(false));

        let weak = bus.downgrade();
        let _relay = bus.subscribe::<ListInvalidated, _>(move |env| {
            if let Some(bus) = weak.upgrade() {
                bus.publish(IslandId::RUNTIME, ReturnToList { list: env.payload.list });
            }
        });
        let flag = Rc::clone(&returned);
        let _sink = bus.subscribe::<ReturnToList, _>(move |_| flag.set(true));

        invalidate(&bus, ListKind::Posts);
        assert!(returned.get());
    }

    #[test]
    fn stored_message_publishes_under_its_topic() {
        let bus = MessageBus::new();
        let hit = Rc::new(Cell::new(false));
        let flag = Rc::clone(&hit);
        let _sub = bus.subscribe::<SetPostsScope, _>(move |env| flag.set(env.payload.mine_only));

        let message = BusMessage::from(SetPostsScope { mine_only: true });
        assert_eq!(message.topic(), Topic::SetPostsScope);
        message.publish_on(&bus, IslandId::RUNTIME);
        assert!(hit.get());
    }
}
