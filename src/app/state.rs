//! Application state and view model computation.
//!
//! [`AppState`] owns everything that lives for the whole session: the bus, the
//! navigator, the shared outbox and every mounted island. The islands keep
//! their own state; `AppState` only routes to them and derives view models.
//!
//! # Borrowing rule
//!
//! Bus handlers borrow island state. Nothing in this module publishes while it
//! holds an island borrow: reads are copied out first, then the message goes out.
//!
//! # Example
//!
//! ```rust
//! use hubshell::app::modes::ListKind;
//! use hubshell::app::AppState;
//! use hubshell::host::{HostShell, RecordingHost};
//! use hubshell::i18n::Labels;
//! use hubshell::Config;
//! use std::rc::Rc;
//!
//! let host: Rc<dyn HostShell> = Rc::new(RecordingHost::default());
//! let state = AppState::new(Config::default(), host, Rc::new(Labels::new()));
//! let viewmodel = state.compute_viewmodel(ListKind::People, chrono::Utc::now());
//! assert!(viewmodel.items.is_empty());
//! assert_eq!(viewmodel.chips[0].label, "All");
//! ```

use super::modes::ListKind;
use super::Action;
use crate::bus::{MessageBus, Subscription};
use crate::domain::{Filterable, ItemKey, Millis, Post, Profile, ServiceError};
use crate::filter::FilterPipeline;
use crate::gesture::{ContextMenuPositioner, MenuAction, MenuSession, PressOutcome};
use crate::host::HostShell;
use crate::i18n::Translate;
use crate::islands::{
    DetailContext, DetailIsland, ListIsland, ListRecord, ListState, LoadResult, PointerPhase,
    SelectorIsland,
};
use crate::nav::{NavController, Navigator, ViewRegistry};
use crate::relevance::SubjectToken;
use crate::service::{Outbox, SharedOutbox};
use crate::ui::viewmodel::{
    ChipItem, DisplayItem, EmptyState, ListViewModel, MenuEntry, MenuOverlay, SearchBarInfo,
};
use crate::Config;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::rc::Rc;

/// Characters of post content quoted in a share preview.
const SHARE_PREVIEW_CHARS: usize = 150;

/// Central application state container.
pub struct AppState {
    /// Configuration the state was built from.
    pub config: Config,

    /// Id of the viewing user, known after the start event.
    pub viewer_id: Option<String>,

    bus: MessageBus,
    navigator: Navigator,
    _nav_subscriptions: Vec<Subscription>,
    host: Rc<dyn HostShell>,
    labels: Rc<dyn Translate>,
    outbox: SharedOutbox,
    people: ListIsland<Profile>,
    posts: ListIsland<Post>,
    selector: SelectorIsland,
    detail: DetailIsland,
    positioner: ContextMenuPositioner,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("viewer_id", &self.viewer_id)
            .field("view", &self.navigator.current_view())
            .field("people", &self.people)
            .field("posts", &self.posts)
            .field("selector", &self.selector)
            .field("detail", &self.detail)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates the state and mounts every island.
    ///
    /// The navigator subscribes first, so it sees selector traffic before any
    /// island does.
    ///
    /// # Parameters
    ///
    /// * `config` - Runtime configuration
    /// * `host` - The host container
    /// * `labels` - Label lookup service
    #[must_use]
    pub fn new(config: Config, host: Rc<dyn HostShell>, labels: Rc<dyn Translate>) -> Self {
        let bus = MessageBus::new();
        let controller = NavController::new(ViewRegistry::default(), Rc::clone(&host), Rc::clone(&labels));
        let navigator = Navigator::new(controller, bus.clone());
        let nav_subscriptions = navigator.attach();

        let outbox = Outbox::shared();
        let people: ListIsland<Profile> = ListIsland::mount(&bus, &outbox, Rc::clone(&host), &config);
        let posts: ListIsland<Post> = ListIsland::mount(&bus, &outbox, Rc::clone(&host), &config);
        let selector = SelectorIsland::mount(&bus, config.known_tags.clone());
        let detail = DetailIsland::mount(
            &bus,
            DetailContext {
                outbox: Rc::clone(&outbox),
                host: Rc::clone(&host),
                people: people.downgrade(),
                posts: posts.downgrade(),
            },
        );
        let positioner = ContextMenuPositioner::new(config.menu);

        tracing::debug!(subscribers = ?bus, "application state created");

        Self {
            config,
            viewer_id: None,
            bus,
            navigator,
            _nav_subscriptions: nav_subscriptions,
            host,
            labels,
            outbox,
            people,
            posts,
            selector,
            detail,
            positioner,
        }
    }

    #[must_use]
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn host(&self) -> &dyn HostShell {
        self.host.as_ref()
    }

    #[must_use]
    pub fn people(&self) -> &ListIsland<Profile> {
        &self.people
    }

    #[must_use]
    pub fn posts(&self) -> &ListIsland<Post> {
        &self.posts
    }

    #[must_use]
    pub fn selector(&self) -> &SelectorIsland {
        &self.selector
    }

    #[must_use]
    pub fn detail(&self) -> &DetailIsland {
        &self.detail
    }

    pub fn outbox(&self) -> &SharedOutbox {
        &self.outbox
    }

    /// Translates a label without parameters.
    #[must_use]
    pub fn label(&self, key: &str) -> String {
        self.labels.translate(key, &[])
    }

    /// Whether the viewer wrote `post`.
    #[must_use]
    pub fn is_own(&self, post: &Post) -> bool {
        self.viewer_id
            .as_deref()
            .is_some_and(|viewer| viewer == post.author.user_id)
    }

    /// Drains the actions queued since the last call.
    pub fn take_actions(&self) -> Vec<Action> {
        self.outbox.borrow_mut().take_actions()
    }

    /// Runs `f` on the filter pipeline of `list`.
    pub fn with_pipeline<R>(&self, list: ListKind, f: impl FnOnce(&mut FilterPipeline) -> R) -> R {
        match list {
            ListKind::People => f(self.people.borrow_mut().pipeline_mut()),
            ListKind::Posts => f(self.posts.borrow_mut().pipeline_mut()),
        }
    }

    /// Selected tags and status of `list`, as the selector should start from.
    #[must_use]
    pub fn criteria_of(&self, list: ListKind) -> (Vec<String>, Option<String>) {
        self.with_pipeline(list, |pipeline| {
            let state = pipeline.state();
            (state.selected_tags.clone(), state.status.clone())
        })
    }

    /// Earliest pending timer across all lists.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        let people = self.people.borrow().next_deadline();
        let posts = self.posts.borrow().next_deadline();
        people.into_iter().chain(posts).min()
    }

    /// Fires due timers.
    ///
    /// Returns whether any filter changed, and the presses that resolved.
    pub fn poll(&self, now: Millis) -> (bool, Vec<(ListKind, ItemKey, PressOutcome)>) {
        let (people_changed, people_presses) = self.people.borrow_mut().poll(now);
        let (posts_changed, posts_presses) = self.posts.borrow_mut().poll(now);
        let presses = people_presses
            .into_iter()
            .map(|(card, outcome)| (ListKind::People, card, outcome))
            .chain(
                posts_presses
                    .into_iter()
                    .map(|(card, outcome)| (ListKind::Posts, card, outcome)),
            )
            .collect();
        (people_changed || posts_changed, presses)
    }

    /// Feeds one pointer step to a card of `list`.
    pub fn pointer(&self, list: ListKind, card: &ItemKey, phase: PointerPhase, now: Millis) -> Option<PressOutcome> {
        match list {
            ListKind::People => self.people.borrow_mut().pointer(card, phase, now),
            ListKind::Posts => self.posts.borrow_mut().pointer(card, phase, now),
        }
    }

    /// Applies a list load response.
    pub fn apply_load(&self, list: ListKind, token: &SubjectToken, result: Result<Value, ServiceError>) -> LoadResult {
        match list {
            ListKind::People => self.people.borrow_mut().apply_load(token, result),
            ListKind::Posts => self.posts.borrow_mut().apply_load(token, result),
        }
    }

    /// Closes the context menu of `list`. Returns `false` if none was open.
    pub fn close_menu(&self, list: ListKind) -> bool {
        match list {
            ListKind::People => self.people.borrow_mut().close_menu(),
            ListKind::Posts => self.posts.borrow_mut().close_menu(),
        }
    }

    /// A copy of the post with `card` as its key.
    #[must_use]
    pub fn find_post(&self, card: &ItemKey) -> Option<Post> {
        self.posts.borrow().find(card).cloned()
    }

    /// Opens the context menu for a long-pressed post.
    ///
    /// Declines (returns `false`) when the card is not loaded or cannot be measured.
    pub fn open_post_menu(&self, card: &ItemKey) -> bool {
        let Some(post) = self.find_post(card) else {
            tracing::warn!(card = %card, "long press on unknown post");
            return false;
        };
        let Some(layout) = self.positioner.position(self.host.as_ref(), card) else {
            return false;
        };
        let actions = MenuAction::for_post(self.is_own(&post)).to_vec();
        self.posts.borrow_mut().open_menu(MenuSession {
            card: card.clone(),
            layout,
            actions,
        });
        true
    }

    /// Share-sheet text for a post: title, a content preview and a call to action.
    #[must_use]
    pub fn share_text(&self, post: &Post) -> String {
        let mut preview: String = post.content.chars().take(SHARE_PREVIEW_CHARS).collect();
        if post.content.chars().count() > SHARE_PREVIEW_CHARS {
            preview.push_str("...");
        }
        format!(
            "{}\n{preview}\n\n{}",
            self.label("repost_request_title"),
            self.label("repost_request_cta")
        )
    }

    /// Computes the view model of one list.
    ///
    /// # Parameters
    ///
    /// * `list` - Which list to describe
    /// * `now` - Wall-clock time used for relative post ages
    #[must_use]
    pub fn compute_viewmodel(&self, list: ListKind, now: DateTime<Utc>) -> ListViewModel {
        match list {
            ListKind::People => {
                let people = self.people.borrow();
                self.list_viewmodel(&people, |profile| DisplayItem {
                    key: profile.key(),
                    name: profile.full_name(),
                    body: profile.body().to_string(),
                    tags: profile.skills.clone(),
                    status: None,
                    is_own: false,
                    age: None,
                })
            }
            ListKind::Posts => {
                let posts = self.posts.borrow();
                self.list_viewmodel(&posts, |post| DisplayItem {
                    key: post.key(),
                    name: post.display_name().into_owned(),
                    body: post.content.clone(),
                    tags: post.skill_tags.clone(),
                    status: post.post_type.clone(),
                    is_own: self.is_own(post),
                    age: post.age(now).map(|age| age.label(self.labels.as_ref())),
                })
            }
        }
    }

    fn list_viewmodel<T: ListRecord>(&self, list: &ListState<T>, display: impl Fn(&T) -> DisplayItem) -> ListViewModel {
        let filter = list.pipeline().state();

        let is_selected = |tag: &str| {
            filter
                .selected_tags
                .iter()
                .any(|selected| selected.eq_ignore_ascii_case(tag))
        };
        let chips = std::iter::once(ChipItem {
            label: self.label("filter_all"),
            tag: None,
            is_selected: filter.selected_tags.is_empty(),
        })
        .chain(self.config.quick_tags.iter().map(|tag| ChipItem {
            label: tag.clone(),
            tag: Some(tag.clone()),
            is_selected: is_selected(tag),
        }))
        .collect();

        let items: Vec<DisplayItem> = list.visible().into_iter().map(display).collect();

        let empty_state = (items.is_empty() && !list.is_loading()).then(|| EmptyState {
            message: self.label("feed_empty"),
            reset_label: filter.has_criteria().then(|| self.label("reset_filters")),
        });

        let menu = list.menu().map(|session| MenuOverlay {
            card: session.card.clone(),
            card_rect: session.layout.card,
            menu_rect: session.layout.menu,
            motions: session.layout.motions(self.config.transition),
            entries: session
                .actions
                .iter()
                .map(|action| MenuEntry {
                    action: *action,
                    label: self.label(action.label_key()),
                    is_destructive: action.is_destructive(),
                })
                .collect(),
        });

        ListViewModel {
            list: T::KIND,
            search: SearchBarInfo {
                query: filter.raw_text.clone(),
            },
            chips,
            status: filter.status.clone(),
            items,
            empty_state,
            menu,
            loading: list.is_loading(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use crate::i18n::Labels;
    use crate::service::RequestPurpose;
    use serde_json::json;

    fn state() -> (Rc<RecordingHost>, AppState) {
        let host = Rc::new(RecordingHost::default());
        let state = AppState::new(
            Config::default(),
            Rc::clone(&host) as Rc<dyn HostShell>,
            Rc::new(Labels::new()),
        );
        (host, state)
    }

    fn load(state: &AppState, list: ListKind, body: Value) {
        match list {
            ListKind::People => state.people.borrow_mut().request_load(&mut state.outbox.borrow_mut()),
            ListKind::Posts => state.posts.borrow_mut().request_load(&mut state.outbox.borrow_mut()),
        }
        let actions = state.take_actions();
        let Some(Action::Request { ticket, .. }) = actions.last() else {
            panic!("no request queued");
        };
        let Some(RequestPurpose::LoadList { token, .. }) = state.outbox.borrow_mut().complete(*ticket) else {
            panic!("not a list load");
        };
        state.apply_load(list, &token, Ok(body));
    }

    #[test]
    fn viewmodel_marks_chips_and_empty_state() {
        let (_, state) = state();
        load(
            &state,
            ListKind::People,
            json!({"ok": true, "profiles": [
                {"user_id": "1", "first_name": "Ann", "skills": ["Go"]},
                {"user_id": "2", "first_name": "Bo", "skills": ["Python"]},
            ]}),
        );
        state.with_pipeline(ListKind::People, |p| p.toggle_tag(Some("go")));

        let vm = state.compute_viewmodel(ListKind::People, Utc::now());
        assert!(!vm.chips[0].is_selected);
        assert!(vm.chips.iter().any(|chip| chip.tag.as_deref() == Some("Go") && chip.is_selected));
        assert_eq!(vm.items.len(), 1);
        assert_eq!(vm.items[0].name, "Ann");
        assert_eq!(vm.search.query, "Go");

        state.with_pipeline(ListKind::People, |p| p.toggle_tag(Some("Design")));
        let vm = state.compute_viewmodel(ListKind::People, Utc::now());
        let empty = vm.empty_state.unwrap();
        assert_eq!(empty.message, "Nothing found");
        assert_eq!(empty.reset_label.as_deref(), Some("Reset filters"));
    }

    #[test]
    fn own_posts_get_the_owner_menu() {
        let (host, mut state) = state();
        state.viewer_id = Some("7".to_string());
        load(
            &state,
            ListKind::Posts,
            json!({"ok": true, "posts": [
                {"post_id": "1", "author": {"user_id": "7", "first_name": "Me"}},
                {"post_id": "2", "author": {"user_id": "8", "first_name": "You"}},
            ]}),
        );
        host.place_card(ItemKey::new("1"), crate::domain::Rect::new(20.0, 700.0, 350.0, 100.0));

        assert!(state.open_post_menu(&ItemKey::new("1")));
        let vm = state.compute_viewmodel(ListKind::Posts, Utc::now());
        let menu = vm.menu.unwrap();
        let actions: Vec<MenuAction> = menu.entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![MenuAction::Edit, MenuAction::Repost, MenuAction::Delete]);
        assert!(menu.motions.clone.translate_y < 0.0);
        assert!((menu.motions.clone.translate_y - menu.motions.menu.translate_y).abs() < f64::EPSILON);
        assert!(vm.items[0].is_own && !vm.items[1].is_own);

        assert!(state.close_menu(ListKind::Posts));
        assert!(!state.open_post_menu(&ItemKey::new("2")), "unmeasured card must not open a menu");
    }

    #[test]
    fn share_text_truncates_long_content() {
        let (_, state) = state();
        let post: Post = serde_json::from_value(json!({"post_id": "1", "content": "x".repeat(200)})).unwrap();
        let text = state.share_text(&post);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Take a look at this request:");
        assert_eq!(lines[1].len(), SHARE_PREVIEW_CHARS + 3);
        assert!(lines[1].ends_with("..."));
        assert_eq!(lines[3], "Open it in the app");
    }
}
