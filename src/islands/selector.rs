//! The full tag and status picker.
//!
//! The selector is opened for one source list by [`OpenFilterSelector`], edits
//! a private copy of that list's criteria and hands the result back as
//! [`ApplyListFilter`] followed by [`ReturnToList`]. It never touches the list's
//! pipeline directly.

use crate::app::modes::ListKind;
use crate::bus::{ApplyListFilter, MessageBus, OpenFilterSelector, ReturnToList, Subscription, ViewChanged};
use crate::domain::Millis;
use crate::nav::{registry, ViewId};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorState {
    source: Option<ListKind>,
    tags: Vec<String>,
    status: Option<String>,
    known_tags: Vec<String>,
}

impl SelectorState {
    /// List the selector was opened for, if it is open.
    #[must_use]
    pub fn source(&self) -> Option<ListKind> {
        self.source
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    #[must_use]
    pub fn known_tags(&self) -> &[String] {
        &self.known_tags
    }

    fn open(&mut self, message: &OpenFilterSelector) {
        self.source = Some(message.list);
        self.tags.clone_from(&message.tags);
        self.status = if message.list.has_status() {
            message.status.clone()
        } else {
            None
        };
        tracing::debug!(list = %message.list, tags = ?self.tags, "selector opened");
    }

    /// Adds or removes `tag`, matching case-insensitively.
    pub fn toggle(&mut self, tag: &str) {
        if self.source.is_none() {
            return;
        }
        let lower = tag.trim().to_lowercase();
        if lower.is_empty() {
            return;
        }
        if self.tags.iter().any(|t| t.to_lowercase() == lower) {
            self.tags.retain(|t| t.to_lowercase() != lower);
        } else {
            let canonical = self
                .known_tags
                .iter()
                .find(|known| known.to_lowercase() == lower)
                .cloned()
                .unwrap_or_else(|| tag.trim().to_string());
            self.tags.push(canonical);
            self.tags.sort_by_key(|t| t.to_lowercase());
        }
    }

    /// Sets the status. Ignored for lists without one.
    pub fn set_status(&mut self, status: Option<String>) {
        if self.source.is_some_and(ListKind::has_status) {
            self.status = status.filter(|s| !s.trim().is_empty());
        }
    }

    /// Builds the messages that hand the selection back to the source list.
    ///
    /// The caller publishes them, in order, after releasing the borrow.
    pub fn confirm(&mut self, now: Millis) -> Option<(ApplyListFilter, ReturnToList)> {
        let list = self.source?;
        tracing::debug!(list = %list, tags = ?self.tags, status = ?self.status, "selector confirmed");
        Some((
            ApplyListFilter {
                list,
                tags: self.tags.clone(),
                status: self.status.clone(),
                at: now,
            },
            ReturnToList { list },
        ))
    }

    fn close(&mut self) {
        self.source = None;
        self.tags.clear();
        self.status = None;
    }
}

/// The selector mounted on the bus.
#[derive(Debug)]
pub struct SelectorIsland {
    state: Rc<RefCell<SelectorState>>,
    _subscriptions: Vec<Subscription>,
}

impl SelectorIsland {
    #[must_use]
    pub fn mount(bus: &MessageBus, known_tags: Vec<String>) -> Self {
        let state = Rc::new(RefCell::new(SelectorState {
            known_tags,
            ..SelectorState::default()
        }));

        let open: Weak<RefCell<SelectorState>> = Rc::downgrade(&state);
        let leave = Rc::downgrade(&state);
        let subscriptions = vec![
            bus.subscribe::<OpenFilterSelector, _>(move |env| {
                if let Some(state) = open.upgrade() {
                    state.borrow_mut().open(&env.payload);
                }
            }),
            bus.subscribe::<ViewChanged, _>(move |env| {
                let selector = ViewId::new(registry::FILTER_SELECTOR);
                let left = env.payload.previous.as_ref() == Some(&selector) && env.payload.view != selector;
                if left {
                    if let Some(state) = leave.upgrade() {
                        state.borrow_mut().close();
                    }
                }
            }),
        ];

        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    pub fn borrow(&self) -> Ref<'_, SelectorState> {
        self.state.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, SelectorState> {
        self.state.borrow_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::IslandId;

    fn known() -> Vec<String> {
        vec!["Go".to_string(), "Python".to_string()]
    }

    #[test]
    fn seeds_from_the_source_list_and_confirms() {
        let bus = MessageBus::new();
        let selector = SelectorIsland::mount(&bus, known());
        bus.publish(
            IslandId::POSTS_LIST,
            OpenFilterSelector {
                list: ListKind::Posts,
                tags: vec!["Go".to_string()],
                status: Some("looking".to_string()),
            },
        );

        let mut state = selector.borrow_mut();
        state.toggle("python");
        state.toggle("GO");
        state.set_status(Some("offering".to_string()));
        let (apply, back) = state.confirm(2_000).unwrap();
        assert_eq!(apply.list, ListKind::Posts);
        assert_eq!(apply.tags, vec!["Python"]);
        assert_eq!(apply.status.as_deref(), Some("offering"));
        assert_eq!(apply.at, 2_000);
        assert_eq!(back.list, ListKind::Posts);
    }

    #[test]
    fn people_selector_has_no_status() {
        let bus = MessageBus::new();
        let selector = SelectorIsland::mount(&bus, known());
        bus.publish(
            IslandId::PEOPLE_LIST,
            OpenFilterSelector {
                list: ListKind::People,
                tags: vec![],
                status: Some("looking".to_string()),
            },
        );
        selector.borrow_mut().set_status(Some("offering".to_string()));
        assert_eq!(selector.borrow().status(), None);
    }

    #[test]
    fn leaving_the_overlay_discards_the_draft() {
        let bus = MessageBus::new();
        let selector = SelectorIsland::mount(&bus, known());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _watch = bus.subscribe::<ApplyListFilter, _>(move |env| sink.borrow_mut().push(env.payload.list));

        bus.publish(
            IslandId::POSTS_LIST,
            OpenFilterSelector {
                list: ListKind::Posts,
                tags: vec!["Go".to_string()],
                status: None,
            },
        );
        bus.publish(
            IslandId::NAVIGATOR,
            ViewChanged {
                view: ListKind::Posts.view_id(),
                previous: Some(ViewId::new(registry::FILTER_SELECTOR)),
            },
        );

        assert_eq!(selector.borrow().source(), None);
        assert!(selector.borrow_mut().confirm(10).is_none());
        assert!(seen.borrow().is_empty());
    }
}
