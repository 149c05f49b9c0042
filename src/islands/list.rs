//! A mounted, filterable list of records.
//!
//! The island owns the records, a [`FilterPipeline`], one [`CardGesture`] per
//! card currently under a finger and, for posts, the open context menu. It
//! reacts to bus messages on its own: selector results, scope switches,
//! invalidations and view changes.

use crate::app::modes::{ListKind, PostsScope};
use crate::bus::{
    ApplyListFilter, ListInvalidated, MessageBus, SetPostsScope, Subscription, ViewChanged,
};
use crate::domain::{Filterable, ItemKey, Millis, Post, Profile, ServiceError};
use crate::filter::FilterPipeline;
use crate::gesture::{CardGesture, MenuSession, PressConfig, PressOutcome, PressTarget};
use crate::host::HostShell;
use crate::nav::{registry, ViewId};
use crate::relevance::{RelevanceGuard, SubjectToken};
use crate::service::{messages, Outbox, RequestPurpose, ServiceRequest, SharedOutbox};
use crate::Config;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// A record type that can populate a list island.
pub trait ListRecord: Filterable + DeserializeOwned + Clone + 'static {
    const KIND: ListKind;

    /// Request that loads the list for `scope`.
    fn load_request(scope: PostsScope) -> ServiceRequest;
}

impl ListRecord for Post {
    const KIND: ListKind = ListKind::Posts;

    fn load_request(scope: PostsScope) -> ServiceRequest {
        match scope {
            PostsScope::Feed => ServiceRequest::LoadPostsFeed,
            PostsScope::Mine => ServiceRequest::LoadMyPosts,
        }
    }
}

impl ListRecord for Profile {
    const KIND: ListKind = ListKind::People;

    fn load_request(_scope: PostsScope) -> ServiceRequest {
        ServiceRequest::LoadProfiles
    }
}

/// One step of a pointer sequence on a card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PointerPhase {
    Down {
        x: f64,
        y: f64,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up {
        #[serde(default)]
        target: PressTarget,
    },
    Cancel,
}

/// What became of a list load response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// The list moved on (scope change, newer load) before the response arrived.
    Stale,
    Loaded {
        count: usize,
        /// A post id that was waiting for this load, and whether it is present.
        reveal: Option<(String, bool)>,
    },
    Failed(ServiceError),
}

/// State of one list island.
pub struct ListState<T> {
    items: Vec<T>,
    pipeline: FilterPipeline,
    gestures: HashMap<ItemKey, CardGesture>,
    press: PressConfig,
    host: Rc<dyn HostShell>,
    menu: Option<MenuSession>,
    scope: PostsScope,
    loading: bool,
    load_guard: RelevanceGuard,
    pending_reveal: Option<String>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ListState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListState")
            .field("items", &self.items.len())
            .field("filter", self.pipeline.state())
            .field("gestures", &self.gestures.len())
            .field("menu", &self.menu.is_some())
            .field("scope", &self.scope)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl<T: ListRecord> ListState<T> {
    fn new(config: &Config, host: Rc<dyn HostShell>) -> Self {
        Self {
            items: Vec::new(),
            pipeline: FilterPipeline::new(config.debounce_ms, config.known_tags.clone()),
            gestures: HashMap::new(),
            press: config.press_config(),
            host,
            menu: None,
            scope: PostsScope::Feed,
            loading: false,
            load_guard: RelevanceGuard::default(),
            pending_reveal: None,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Records passing the current filter, in source order.
    #[must_use]
    pub fn visible(&self) -> Vec<&T> {
        self.pipeline.filtered(&self.items)
    }

    #[must_use]
    pub fn find(&self, key: &ItemKey) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    #[must_use]
    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut FilterPipeline {
        &mut self.pipeline
    }

    #[must_use]
    pub fn scope(&self) -> PostsScope {
        self.scope
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn menu(&self) -> Option<&MenuSession> {
        self.menu.as_ref()
    }

    /// Queues a load for the current scope. Any earlier load in flight becomes stale.
    pub fn request_load(&mut self, outbox: &mut Outbox) {
        let token = self
            .load_guard
            .capture(format!("{}:{:?}", T::KIND, self.scope));
        self.loading = true;
        outbox.send(
            &T::load_request(self.scope),
            RequestPurpose::LoadList {
                list: T::KIND,
                token,
            },
        );
    }

    /// Applies a load response if it still belongs to the latest load.
    pub fn apply_load(&mut self, token: &SubjectToken, result: Result<Value, ServiceError>) -> LoadResult {
        if !self.load_guard.is_still_relevant(token) {
            tracing::trace!(list = %T::KIND, "stale list response dropped");
            return LoadResult::Stale;
        }
        self.loading = false;

        let records = result.and_then(|body| messages::decode_records::<T>(&body, T::KIND.response_field()));
        match records {
            Ok(records) => {
                self.items = records;
                let keys: Vec<ItemKey> = self.items.iter().map(Filterable::key).collect();
                self.gestures.retain(|card, _| keys.contains(card));
                if self.menu.as_ref().is_some_and(|menu| !keys.contains(&menu.card)) {
                    self.menu = None;
                }
                let reveal = self.pending_reveal.take().map(|post_id| {
                    let present = keys.contains(&ItemKey::new(post_id.clone()));
                    (post_id, present)
                });
                tracing::debug!(list = %T::KIND, count = self.items.len(), "list loaded");
                LoadResult::Loaded {
                    count: self.items.len(),
                    reveal,
                }
            }
            Err(error) => {
                tracing::warn!(list = %T::KIND, error = %error, "list load failed");
                LoadResult::Failed(error)
            }
        }
    }

    /// Switches scope. Returns `true` if the scope changed; the stale records are cleared.
    pub fn set_scope(&mut self, scope: PostsScope) -> bool {
        if self.scope == scope {
            return false;
        }
        self.scope = scope;
        self.items.clear();
        self.gestures.clear();
        self.menu = None;
        true
    }

    /// Remembers a post to open once the next load lands.
    pub fn reveal_after_load(&mut self, post_id: impl Into<String>) {
        self.pending_reveal = Some(post_id.into());
    }

    /// Feeds one pointer step to the card's gesture.
    ///
    /// Pointer input on a card that is not in the list is ignored, and so is a
    /// new press while the menu is open.
    pub fn pointer(&mut self, card: &ItemKey, phase: PointerPhase, now: Millis) -> Option<PressOutcome> {
        if self.menu.is_some() && matches!(phase, PointerPhase::Down { .. }) {
            tracing::trace!(card = %card, "press ignored while menu is open");
            return None;
        }
        if !self.items.iter().any(|item| &item.key() == card) {
            tracing::warn!(list = %T::KIND, card = %card, "pointer on unknown card");
            return None;
        }

        let press = self.press;
        let host = Rc::clone(&self.host);
        let gesture = self
            .gestures
            .entry(card.clone())
            .or_insert_with(|| CardGesture::new(card.clone(), press, host));

        let outcome = match phase {
            PointerPhase::Down { x, y } => {
                gesture.pointer_down(x, y, now);
                None
            }
            PointerPhase::Move { x, y } => gesture.pointer_move(x, y, now),
            PointerPhase::Up { target } => gesture.pointer_up(target, now),
            PointerPhase::Cancel => gesture.pointer_cancel(),
        };

        if matches!(phase, PointerPhase::Up { .. } | PointerPhase::Cancel) {
            self.gestures.remove(card);
        }
        outcome
    }

    /// Commits due filter changes and fires due long-presses.
    ///
    /// Returns whether the filter changed, and the resolved presses.
    pub fn poll(&mut self, now: Millis) -> (bool, Vec<(ItemKey, PressOutcome)>) {
        let changed = self.pipeline.poll(now);
        let presses = self
            .gestures
            .iter_mut()
            .filter_map(|(card, gesture)| gesture.poll(now).map(|outcome| (card.clone(), outcome)))
            .collect();
        (changed, presses)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.gestures
            .values()
            .filter_map(CardGesture::next_deadline)
            .chain(self.pipeline.next_deadline())
            .min()
    }

    pub fn open_menu(&mut self, session: MenuSession) {
        tracing::debug!(list = %T::KIND, card = %session.card, adjust = session.layout.vertical_adjust, "context menu opened");
        self.menu = Some(session);
    }

    /// Closes the context menu. Returns `false` if none was open.
    pub fn close_menu(&mut self) -> bool {
        let closed = self.menu.take().is_some();
        if closed {
            tracing::debug!(list = %T::KIND, "context menu closed");
        }
        closed
    }

    fn leave(&mut self) {
        self.pipeline.clear_text();
        self.menu = None;
        self.gestures.clear();
    }
}

/// A list island mounted on the bus.
pub struct ListIsland<T> {
    state: Rc<RefCell<ListState<T>>>,
    subscriptions: Vec<Subscription>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ListIsland<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListIsland")
            .field("state", &self.state)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl<T: ListRecord> ListIsland<T> {
    /// Mounts the island and subscribes it to the bus.
    ///
    /// The subscriptions live as long as the island.
    #[must_use]
    pub fn mount(bus: &MessageBus, outbox: &SharedOutbox, host: Rc<dyn HostShell>, config: &Config) -> Self {
        let state = Rc::new(RefCell::new(ListState::new(config, host)));
        let mut subscriptions = Vec::new();

        let weak = Rc::downgrade(&state);
        subscriptions.push(bus.subscribe::<ApplyListFilter, _>(move |env| {
            let message = &env.payload;
            if message.list != T::KIND {
                return;
            }
            with_state(&weak, |list| {
                let status = if T::KIND.has_status() {
                    message.status.clone()
                } else {
                    None
                };
                list.pipeline.apply_external(&message.tags, status, message.at);
            });
        }));

        let weak = Rc::downgrade(&state);
        let sink = Rc::clone(outbox);
        subscriptions.push(bus.subscribe::<ListInvalidated, _>(move |env| {
            if env.payload.list != T::KIND {
                return;
            }
            with_state(&weak, |list| list.request_load(&mut sink.borrow_mut()));
        }));

        let weak = Rc::downgrade(&state);
        let sink = Rc::clone(outbox);
        subscriptions.push(bus.subscribe::<ViewChanged, _>(move |env| {
            let own = T::KIND.view_id();
            let selector = ViewId::new(registry::FILTER_SELECTOR);
            let ViewChanged { view, previous } = &env.payload;
            with_state(&weak, |list| {
                if *view == own && previous.as_ref() != Some(&selector) {
                    list.request_load(&mut sink.borrow_mut());
                } else if previous.as_ref() == Some(&own) && *view != selector && *view != own {
                    list.leave();
                }
            });
        }));

        if T::KIND == ListKind::Posts {
            let weak = Rc::downgrade(&state);
            let sink = Rc::clone(outbox);
            subscriptions.push(bus.subscribe::<SetPostsScope, _>(move |env| {
                with_state(&weak, |list| {
                    if list.set_scope(PostsScope::from_mine_only(env.payload.mine_only)) {
                        list.request_load(&mut sink.borrow_mut());
                    }
                });
            }));
        }

        tracing::debug!(list = %T::KIND, subscriptions = subscriptions.len(), "list island mounted");
        Self {
            state,
            subscriptions,
        }
    }

    pub fn borrow(&self) -> Ref<'_, ListState<T>> {
        self.state.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ListState<T>> {
        self.state.borrow_mut()
    }

    #[must_use]
    pub fn downgrade(&self) -> Weak<RefCell<ListState<T>>> {
        Rc::downgrade(&self.state)
    }
}

fn with_state<T>(weak: &Weak<RefCell<ListState<T>>>, f: impl FnOnce(&mut ListState<T>)) {
    if let Some(state) = weak.upgrade() {
        f(&mut state.borrow_mut());
    }
}
