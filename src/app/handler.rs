//! Event handling and state transition logic.
//!
//! This module implements the event handler that processes user input, host
//! callbacks, timer ticks and data-service responses, translating them into
//! island updates, navigation and action sequences.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the host runtime, each with the current logical time
//! 2. Timers that fell due before the event are fired first
//! 3. [`handle_event`] pattern-matches the event type and routes it to the
//!    navigator, an island, or the bus
//! 4. Actions queued along the way are drained and returned for execution
//!
//! # Event Types
//!
//! Events fall into several categories:
//! - **Navigation**: `Start`, `Navigate`, `BackPressed`, `ClosePressed`, `CloseOverlay`
//! - **Filtering**: `SearchInput`, `ChipToggled`, `StatusSelected`, `ResetFilters`,
//!   `OpenFilterSelector`, `Selector*`
//! - **Cards**: `Pointer`, `BackdropClicked`, `Scrolled`, `MenuChoice`, `DetailChoice`
//! - **Service**: `Response`, `DeleteConfirmed`, `ShowMyPosts`, `Invalidate`
//! - **Timers**: `Tick`
//!
//! # Example
//!
//! ```rust
//! use hubshell::app::{handle_event, AppState, Event};
//! use hubshell::host::{HostShell, RecordingHost};
//! use hubshell::i18n::Labels;
//! use hubshell::Config;
//! use std::rc::Rc;
//!
//! let host: Rc<dyn HostShell> = Rc::new(RecordingHost::default());
//! let mut state = AppState::new(Config::default(), host, Rc::new(Labels::new()));
//! let (render, actions) = handle_event(&mut state, &Event::Tick, 0)?;
//! assert!(!render && actions.is_empty());
//! # Ok::<(), hubshell::HubError>(())
//! ```

use crate::app::modes::{DetailSubject, ListKind, PostsScope};
use crate::app::{Action, AppState};
use crate::bus::{
    IslandId, ListInvalidated, OpenDetail, OpenFilterSelector, SetPostsScope,
};
use crate::domain::error::Result;
use crate::domain::{ItemKey, Millis, Post, ServiceError};
use crate::gesture::{MenuAction, PressOutcome, PressTarget};
use crate::host::{BackBinding, Impact, Notice};
use crate::islands::{LoadResult, PointerPhase, ProfileResult};
use crate::nav::{registry, NavigateOptions, ViewId};
use crate::service::{messages, RequestPurpose, ServiceRequest, Ticket};
use serde::Deserialize;
use serde_json::Value;

/// Events reported by the host runtime.
///
/// Each event is processed with the runtime's logical clock; the handler never
/// reads a clock of its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The mini-app was opened.
    ///
    /// Shows the root view; a launch parameter then opens a post or profile.
    Start {
        viewer_id: String,
        #[serde(default)]
        start_param: Option<String>,
    },

    /// Shows a registered view.
    Navigate { view: String },

    /// The host's back button was pressed with the given binding id.
    BackPressed { binding: u64 },

    /// The host's close control was pressed.
    ClosePressed,

    /// Dismisses the active overlay.
    CloseOverlay,

    /// A keystroke in a list's search field; the full current text.
    SearchInput { list: ListKind, text: String },

    /// A quick-filter chip was tapped. `None` is the "all" chip.
    ChipToggled {
        list: ListKind,
        #[serde(default)]
        tag: Option<String>,
    },

    /// A status tab was tapped. `None` clears the status.
    StatusSelected {
        list: ListKind,
        #[serde(default)]
        status: Option<String>,
    },

    /// Clears text, tags and status of a list.
    ResetFilters { list: ListKind },

    /// Opens the full tag and status picker for a list.
    OpenFilterSelector { list: ListKind },

    SelectorToggleTag { tag: String },

    SelectorSetStatus {
        #[serde(default)]
        status: Option<String>,
    },

    /// Hands the picker's selection back to its list.
    SelectorConfirm,

    /// One step of a pointer sequence on a card.
    Pointer {
        list: ListKind,
        card: ItemKey,
        phase: PointerPhase,
    },

    /// The context-menu backdrop was clicked.
    BackdropClicked { list: ListKind },

    /// The page scrolled under a list.
    Scrolled { list: ListKind },

    /// An entry of the open context menu was chosen.
    MenuChoice { action: MenuAction },

    /// An action button in the open post sheet was pressed.
    DetailChoice { action: MenuAction },

    /// The detail sheet was dismissed.
    CloseDetail,

    /// Timer tick; only fires due timers.
    Tick,

    /// Completion of a data-service request.
    Response {
        ticket: Ticket,
        result: std::result::Result<Value, ServiceError>,
    },

    /// Answer to an [`Action::ConfirmDelete`].
    DeleteConfirmed { post_id: String, confirmed: bool },

    /// Switches the posts list between the feed and the viewer's own posts.
    ShowMyPosts { mine_only: bool },

    /// Data behind a list changed elsewhere; reload it.
    Invalidate { list: ListKind },
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// # Parameters
///
/// * `state` - Mutable reference to application state
/// * `event` - Event to process
/// * `now` - Logical time of the event in milliseconds
///
/// # Returns
///
/// `(render, actions)`: whether any view model may have changed, and the
/// actions to execute in order. Host shell calls have already been made.
///
/// # Errors
///
/// No current event fails. Unknown views and cards are logged and ignored,
/// stale responses are dropped, and service failures become toasts.
#[allow(clippy::cognitive_complexity, clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event, now: Millis) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event, now).entered();

    let timers_fired = fire_timers(state, now);

    let render = match event {
        Event::Start {
            viewer_id,
            start_param,
        } => {
            tracing::debug!(viewer_id = %viewer_id, start_param = ?start_param, "starting");
            state.viewer_id = Some(viewer_id.clone());
            navigate(state, registry::PROFILE);

            match start_param.as_deref().and_then(DetailSubject::from_start_param) {
                Some(subject @ DetailSubject::Post { .. }) => {
                    navigate(state, registry::POSTS);
                    state.bus().publish(IslandId::RUNTIME, OpenDetail { subject });
                }
                Some(subject @ DetailSubject::Profile { .. }) => {
                    navigate(state, registry::PEOPLE);
                    state.bus().publish(IslandId::RUNTIME, OpenDetail { subject });
                }
                None => {}
            }
            true
        }
        Event::Navigate { view } => navigate(state, view),
        Event::BackPressed { binding } => {
            state.navigator().press_back(BackBinding(*binding));
            true
        }
        Event::ClosePressed => {
            let at_root = state
                .navigator()
                .with_controller(|nav| nav.frame().is_some_and(|frame| frame.binding.is_none()));
            if at_root {
                state.host().close_app();
            } else {
                tracing::warn!("close pressed outside the root view");
            }
            false
        }
        Event::CloseOverlay => state.navigator().close_overlay(),
        Event::SearchInput { list, text } => {
            state.with_pipeline(*list, |pipeline| pipeline.set_text(text, now));
            true
        }
        Event::ChipToggled { list, tag } => {
            state.host().impact(Impact::Light);
            state.with_pipeline(*list, |pipeline| pipeline.toggle_tag(tag.as_deref()))
        }
        Event::StatusSelected { list, status } => {
            if list.has_status() {
                state.with_pipeline(*list, |pipeline| pipeline.set_status(status.clone()))
            } else {
                tracing::debug!(list = %list, "list has no status filter");
                false
            }
        }
        Event::ResetFilters { list } => state.with_pipeline(*list, |pipeline| pipeline.reset()),
        Event::OpenFilterSelector { list } => {
            let (tags, status) = state.criteria_of(*list);
            state.bus().publish(
                list.island_id(),
                OpenFilterSelector {
                    list: *list,
                    tags,
                    status,
                },
            );
            true
        }
        Event::SelectorToggleTag { tag } => {
            state.selector().borrow_mut().toggle(tag);
            true
        }
        Event::SelectorSetStatus { status } => {
            state.selector().borrow_mut().set_status(status.clone());
            true
        }
        Event::SelectorConfirm => {
            let confirmed = state.selector().borrow_mut().confirm(now);
            match confirmed {
                Some((apply, back)) => {
                    state.bus().publish(IslandId::FILTER_SELECTOR, apply);
                    state.bus().publish(IslandId::FILTER_SELECTOR, back);
                    true
                }
                None => {
                    tracing::warn!("selector confirmed while closed");
                    false
                }
            }
        }
        Event::Pointer { list, card, phase } => {
            let outcome = state.pointer(*list, card, *phase, now);
            match outcome {
                Some(outcome) => on_press(state, *list, card, outcome),
                None => false,
            }
        }
        Event::BackdropClicked { list } | Event::Scrolled { list } => state.close_menu(*list),
        Event::MenuChoice { action } => {
            let chosen = state.posts().borrow().menu().and_then(|session| {
                session
                    .actions
                    .contains(action)
                    .then(|| session.card.clone())
            });
            state.close_menu(ListKind::Posts);
            match chosen.and_then(|card| state.find_post(&card)) {
                Some(post) => run_post_action(state, &post, *action),
                None => tracing::warn!(action = ?action, "menu choice without a matching menu entry"),
            }
            true
        }
        Event::DetailChoice { action } => {
            let post = state.detail().borrow().post().cloned();
            match post {
                Some(post) if MenuAction::for_post(state.is_own(&post)).contains(action) => {
                    run_post_action(state, &post, *action);
                }
                Some(_) => tracing::warn!(action = ?action, "action not offered for this post"),
                None => tracing::warn!(action = ?action, "no post sheet open"),
            }
            true
        }
        Event::CloseDetail => state.detail().borrow_mut().close(),
        Event::Tick => false,
        Event::Response { ticket, result } => on_response(state, *ticket, result.clone()),
        Event::DeleteConfirmed { post_id, confirmed } => {
            if *confirmed {
                state.outbox().borrow_mut().send(
                    &ServiceRequest::DeletePost {
                        post_id: post_id.clone(),
                    },
                    RequestPurpose::DeletePost {
                        post_id: post_id.clone(),
                    },
                );
            } else {
                tracing::debug!(post_id = %post_id, "delete declined");
            }
            false
        }
        Event::ShowMyPosts { mine_only } => {
            let current = state.posts().borrow().scope();
            if current == PostsScope::from_mine_only(*mine_only) {
                false
            } else {
                state
                    .bus()
                    .publish(IslandId::RUNTIME, SetPostsScope { mine_only: *mine_only });
                true
            }
        }
        Event::Invalidate { list } => {
            state.bus().publish(IslandId::RUNTIME, ListInvalidated { list: *list });
            true
        }
    };

    let actions = state.take_actions();
    tracing::debug!(render = render || timers_fired, actions = actions.len(), "event handled");
    Ok((render || timers_fired, actions))
}

fn navigate(state: &AppState, view: &str) -> bool {
    state
        .navigator()
        .navigate_to(&ViewId::new(view), NavigateOptions::default())
}

/// Commits due filter changes and resolves due long-presses.
fn fire_timers(state: &mut AppState, now: Millis) -> bool {
    let (filters_changed, presses) = state.poll(now);
    let mut render = filters_changed;
    for (list, card, outcome) in presses {
        render |= on_press(state, list, &card, outcome);
    }
    render
}

/// Routes a resolved press on a card.
fn on_press(state: &mut AppState, list: ListKind, card: &ItemKey, outcome: PressOutcome) -> bool {
    tracing::debug!(list = %list, card = %card, outcome = ?outcome, "press resolved");
    match (list, outcome) {
        (ListKind::People, PressOutcome::Tap(_)) => {
            open_detail(
                state,
                list,
                DetailSubject::Profile {
                    user_id: card.to_string(),
                },
            );
            true
        }
        (ListKind::Posts, PressOutcome::Tap(PressTarget::Primary)) => {
            state.host().impact(Impact::Medium);
            open_detail(
                state,
                list,
                DetailSubject::Post {
                    post_id: card.to_string(),
                },
            );
            true
        }
        (ListKind::Posts, PressOutcome::Tap(PressTarget::Secondary)) => {
            let Some(post) = state.find_post(card) else {
                return false;
            };
            open_detail(
                state,
                list,
                DetailSubject::Profile {
                    user_id: post.author.user_id,
                },
            );
            true
        }
        (ListKind::Posts, PressOutcome::LongPress) => state.open_post_menu(card),
        (ListKind::People, PressOutcome::LongPress) | (_, PressOutcome::Cancelled) => false,
    }
}

fn open_detail(state: &AppState, list: ListKind, subject: DetailSubject) {
    state.bus().publish(list.island_id(), OpenDetail { subject });
}

/// Carries out a context-menu or sheet action on `post`.
fn run_post_action(state: &mut AppState, post: &Post, action: MenuAction) {
    tracing::debug!(post_id = %post.post_id, action = ?action, "post action");
    match action {
        MenuAction::Respond => state.host().alert(&state.label("action_respond_toast")),
        MenuAction::Repost => match state.config.share_link(&post.post_id) {
            Some(link) => {
                let text = state.share_text(post);
                state.outbox().borrow_mut().push(Action::Share { link, text });
            }
            None => {
                tracing::warn!("share link settings missing");
                state.host().alert(&state.label("error_share_config"));
            }
        },
        MenuAction::ViewProfile => open_detail(
            state,
            ListKind::Posts,
            DetailSubject::Profile {
                user_id: post.author.user_id.clone(),
            },
        ),
        MenuAction::Edit => {
            navigate(state, registry::POST_EDITOR);
            state.outbox().borrow_mut().push(Action::OpenEditor {
                post_id: post.post_id.clone(),
            });
        }
        MenuAction::Delete => {
            let prompt = state.label("confirm_delete");
            state.outbox().borrow_mut().push(Action::ConfirmDelete {
                prompt,
                post_id: post.post_id.clone(),
            });
        }
    }
}

/// Routes a service completion by what its ticket was issued for.
fn on_response(state: &mut AppState, ticket: Ticket, result: std::result::Result<Value, ServiceError>) -> bool {
    let purpose = state.outbox().borrow_mut().complete(ticket);
    let Some(purpose) = purpose else {
        tracing::warn!(ticket = %ticket, "response for unknown ticket");
        return false;
    };

    match purpose {
        RequestPurpose::LoadList { list, token } => match state.apply_load(list, &token, result) {
            LoadResult::Stale => false,
            LoadResult::Loaded { reveal, .. } => {
                match reveal {
                    Some((post_id, true)) => open_detail(state, list, DetailSubject::Post { post_id }),
                    Some((post_id, false)) => {
                        tracing::debug!(post_id = %post_id, "revealed post is not in the feed");
                        let message = state.label("post_not_found");
                        state.outbox().borrow_mut().toast(message, true);
                    }
                    None => {}
                }
                true
            }
            LoadResult::Failed(_) => {
                let message = state.label("error_network");
                state.outbox().borrow_mut().toast(message, true);
                true
            }
        },
        RequestPurpose::ProfileDetail { token } => {
            let applied = state.detail().borrow_mut().apply_profile(&token, result);
            match applied {
                ProfileResult::Stale => false,
                ProfileResult::Applied => true,
                ProfileResult::Failed(_) => {
                    let message = state.label("error_network");
                    state.outbox().borrow_mut().toast(message, true);
                    true
                }
            }
        }
        RequestPurpose::DeletePost { post_id } => {
            match result.and_then(|body| messages::expect_ok(&body)) {
                Ok(()) => {
                    tracing::debug!(post_id = %post_id, "post deleted");
                    state.host().notify(Notice::Success);
                    state
                        .bus()
                        .publish(IslandId::RUNTIME, ListInvalidated { list: ListKind::Posts });
                }
                Err(error) => {
                    tracing::warn!(post_id = %post_id, error = %error, "delete failed");
                    state.host().alert(&state.label("delete_failed"));
                }
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rect;
    use crate::host::{HostCall, HostShell, RecordingHost};
    use crate::i18n::Labels;
    use crate::islands::DetailSheet;
    use crate::service::Endpoint;
    use crate::Config;
    use serde_json::json;
    use std::rc::Rc;

    fn setup(config: Config) -> (Rc<RecordingHost>, AppState) {
        let host = Rc::new(RecordingHost::default());
        let state = AppState::new(config, Rc::clone(&host) as Rc<dyn HostShell>, Rc::new(Labels::new()));
        (host, state)
    }

    fn run(state: &mut AppState, event: Event, now: Millis) -> (bool, Vec<Action>) {
        handle_event(state, &event, now).unwrap()
    }

    fn requests(actions: &[Action]) -> Vec<(Ticket, Endpoint)> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Request { ticket, endpoint, .. } => Some((*ticket, *endpoint)),
                _ => None,
            })
            .collect()
    }

    fn posts_body() -> Value {
        json!({"ok": true, "posts": [
            {"post_id": "1", "author": {"user_id": "7", "first_name": "Me"}, "content": "Need Go review", "skill_tags": ["Go"], "post_type": "looking"},
            {"post_id": "2", "author": {"user_id": "8", "first_name": "Kim"}, "content": "Offering Python lessons", "skill_tags": ["Python"], "post_type": "offering"},
        ]})
    }

    /// Starts, opens the posts list and answers its load.
    fn with_posts(host: &RecordingHost, state: &mut AppState) {
        run(
            state,
            Event::Start {
                viewer_id: "7".to_string(),
                start_param: None,
            },
            0,
        );
        let (_, actions) = run(
            state,
            Event::Navigate {
                view: "posts".to_string(),
            },
            10,
        );
        let (ticket, endpoint) = requests(&actions)[0];
        assert_eq!(endpoint, Endpoint::PostsFeed);
        run(
            state,
            Event::Response {
                ticket,
                result: Ok(posts_body()),
            },
            20,
        );
        host.place_card(ItemKey::new("1"), Rect::new(20.0, 100.0, 350.0, 120.0));
        host.place_card(ItemKey::new("2"), Rect::new(20.0, 240.0, 350.0, 120.0));
        host.take_calls();
    }

    fn long_press(state: &mut AppState, card: &str, at: Millis) {
        run(
            state,
            Event::Pointer {
                list: ListKind::Posts,
                card: ItemKey::new(card),
                phase: PointerPhase::Down { x: 50.0, y: 150.0 },
            },
            at,
        );
        run(state, Event::Tick, at + 400);
    }

    #[test]
    fn start_shows_root_with_close_control() {
        let (host, mut state) = setup(Config::default());
        let (render, actions) = run(
            &mut state,
            Event::Start {
                viewer_id: "7".to_string(),
                start_param: None,
            },
            0,
        );
        assert!(render);
        assert!(actions.is_empty());
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::PROFILE)));
        assert!(host.calls().contains(&HostCall::SetCloseVisible { visible: true }));
        assert_eq!(host.bound_back(), None);
    }

    #[test]
    fn unknown_view_keeps_the_current_one() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        let (render, actions) = run(
            &mut state,
            Event::Navigate {
                view: "nowhere".to_string(),
            },
            30,
        );
        assert!(!render);
        assert!(actions.is_empty());
        assert!(host.calls().is_empty());
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::POSTS)));
    }

    #[test]
    fn back_from_a_list_returns_to_root() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        let binding = host.bound_back().unwrap();
        run(&mut state, Event::BackPressed { binding: binding.0 }, 30);
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::PROFILE)));

        // A second press on the old binding is ignored.
        host.take_calls();
        run(&mut state, Event::BackPressed { binding: binding.0 }, 40);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn typing_commits_after_the_quiet_period() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        for (i, text) in ["p", "py", "pyt"].iter().enumerate() {
            run(
                &mut state,
                Event::SearchInput {
                    list: ListKind::Posts,
                    text: (*text).to_string(),
                },
                100 + i as Millis * 50,
            );
        }
        assert_eq!(state.next_deadline(), Some(500));
        let (render, _) = run(&mut state, Event::Tick, 499);
        assert!(!render);
        let (render, _) = run(&mut state, Event::Tick, 500);
        assert!(render);
        let posts = state.posts().borrow();
        assert_eq!(posts.pipeline().state().debounced_text, "pyt");
        let visible: Vec<&str> = posts.visible().iter().map(|p| p.post_id.as_str()).collect();
        assert_eq!(visible, vec!["2"]);
    }

    #[test]
    fn selector_round_trip_applies_after_debounce() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        run(&mut state, Event::OpenFilterSelector { list: ListKind::Posts }, 100);
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::FILTER_SELECTOR)));

        run(&mut state, Event::SelectorToggleTag { tag: "go".to_string() }, 110);
        run(
            &mut state,
            Event::SelectorSetStatus {
                status: Some("looking".to_string()),
            },
            120,
        );
        let (_, actions) = run(&mut state, Event::SelectorConfirm, 200);
        assert!(requests(&actions).is_empty(), "returning from the selector must not reload");
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::POSTS)));

        run(&mut state, Event::Tick, 500);
        let posts = state.posts().borrow();
        assert_eq!(posts.pipeline().state().selected_tags, vec!["Go"]);
        assert_eq!(posts.visible().len(), 1);
        assert!(state.selector().borrow().source().is_none());
    }

    #[test]
    fn selector_status_survives_typing_right_after_confirm() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        run(&mut state, Event::OpenFilterSelector { list: ListKind::Posts }, 100);
        run(
            &mut state,
            Event::SelectorSetStatus {
                status: Some("offering".to_string()),
            },
            110,
        );
        run(&mut state, Event::SelectorConfirm, 200);
        run(
            &mut state,
            Event::SearchInput {
                list: ListKind::Posts,
                text: "py".to_string(),
            },
            300,
        );
        run(&mut state, Event::Tick, 1_000);

        let posts = state.posts().borrow();
        let filter = posts.pipeline().state();
        assert_eq!(filter.status.as_deref(), Some("offering"));
        assert_eq!(filter.debounced_text, "py");
        assert_eq!(posts.visible().len(), 1);
    }

    #[test]
    fn tap_opens_post_sheet_and_long_press_opens_menu() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);

        run(
            &mut state,
            Event::Pointer {
                list: ListKind::Posts,
                card: ItemKey::new("2"),
                phase: PointerPhase::Down { x: 10.0, y: 10.0 },
            },
            100,
        );
        run(
            &mut state,
            Event::Pointer {
                list: ListKind::Posts,
                card: ItemKey::new("2"),
                phase: PointerPhase::Up {
                    target: PressTarget::Primary,
                },
            },
            150,
        );
        assert!(matches!(state.detail().borrow().sheet(), Some(DetailSheet::Post(post)) if post.post_id == "2"));
        assert!(host.calls().contains(&HostCall::Impact { strength: Impact::Medium }));

        long_press(&mut state, "2", 1_000);
        assert!(host.calls().contains(&HostCall::Impact { strength: Impact::Heavy }));
        assert!(host.swipes_enabled());
        let menu = state.posts().borrow().menu().cloned().unwrap();
        assert_eq!(menu.actions, MenuAction::for_post(false).to_vec());

        run(&mut state, Event::Scrolled { list: ListKind::Posts }, 1_500);
        assert!(state.posts().borrow().menu().is_none());
    }

    #[test]
    fn repost_builds_a_share_link() {
        let config = Config {
            bot_username: Some("hub_bot".to_string()),
            app_slug: Some("app".to_string()),
            ..Config::default()
        };
        let (host, mut state) = setup(config);
        with_posts(&host, &mut state);
        long_press(&mut state, "2", 100);
        let (_, actions) = run(
            &mut state,
            Event::MenuChoice {
                action: MenuAction::Repost,
            },
            600,
        );
        assert!(matches!(
            &actions[..],
            [Action::Share { link, text }]
                if link == "https://t.me/hub_bot/app?startapp=p_2" && text.contains("Offering Python lessons")
        ));
        assert!(state.posts().borrow().menu().is_none());
    }

    #[test]
    fn repost_without_settings_alerts() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        long_press(&mut state, "2", 100);
        let (_, actions) = run(
            &mut state,
            Event::MenuChoice {
                action: MenuAction::Repost,
            },
            600,
        );
        assert!(actions.is_empty());
        assert!(host.calls().contains(&HostCall::Alert {
            message: "Sharing is not configured".to_string()
        }));
    }

    #[test]
    fn delete_confirms_then_reloads() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        long_press(&mut state, "1", 100);

        let (_, actions) = run(
            &mut state,
            Event::MenuChoice {
                action: MenuAction::Delete,
            },
            600,
        );
        assert!(matches!(&actions[..], [Action::ConfirmDelete { post_id, .. }] if post_id == "1"));

        let (_, actions) = run(
            &mut state,
            Event::DeleteConfirmed {
                post_id: "1".to_string(),
                confirmed: true,
            },
            700,
        );
        let (ticket, endpoint) = requests(&actions)[0];
        assert_eq!(endpoint, Endpoint::DeletePost);

        let (_, actions) = run(
            &mut state,
            Event::Response {
                ticket,
                result: Ok(json!({"ok": true})),
            },
            800,
        );
        assert!(host.calls().contains(&HostCall::Notify {
            notice: Notice::Success
        }));
        assert_eq!(requests(&actions)[0].1, Endpoint::PostsFeed);
    }

    #[test]
    fn menu_choice_not_offered_is_ignored() {
        let (host, mut state) = setup(Config::default());
        with_posts(&host, &mut state);
        long_press(&mut state, "2", 100);
        let (_, actions) = run(
            &mut state,
            Event::MenuChoice {
                action: MenuAction::Delete,
            },
            600,
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn failed_load_toasts_without_blocking() {
        let (_, mut state) = setup(Config::default());
        run(
            &mut state,
            Event::Start {
                viewer_id: "7".to_string(),
                start_param: None,
            },
            0,
        );
        let (_, actions) = run(
            &mut state,
            Event::Navigate {
                view: "people".to_string(),
            },
            10,
        );
        let (ticket, _) = requests(&actions)[0];
        let (_, actions) = run(
            &mut state,
            Event::Response {
                ticket,
                result: Err(ServiceError::Network {
                    message: "offline".to_string(),
                }),
            },
            20,
        );
        assert_eq!(
            actions,
            vec![Action::Toast {
                message: "Network error. Please try again.".to_string(),
                is_error: true
            }]
        );
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::PEOPLE)));
    }

    #[test]
    fn post_deep_link_reveals_after_load() {
        let (_, mut state) = setup(Config::default());
        let (_, actions) = run(
            &mut state,
            Event::Start {
                viewer_id: "7".to_string(),
                start_param: Some("p_2".to_string()),
            },
            0,
        );
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::POSTS)));
        let (ticket, _) = requests(&actions)[0];
        run(
            &mut state,
            Event::Response {
                ticket,
                result: Ok(posts_body()),
            },
            50,
        );
        assert_eq!(state.detail().borrow().post().map(|p| p.post_id.clone()), Some("2".to_string()));
    }

    #[test]
    fn profile_deep_link_fetches_the_user() {
        let (host, mut state) = setup(Config::default());
        let (_, actions) = run(
            &mut state,
            Event::Start {
                viewer_id: "7".to_string(),
                start_param: Some("42".to_string()),
            },
            0,
        );
        assert_eq!(state.navigator().current_view(), Some(ViewId::new(registry::PEOPLE)));
        let endpoints: Vec<Endpoint> = requests(&actions).into_iter().map(|(_, e)| e).collect();
        assert_eq!(endpoints, vec![Endpoint::Profiles, Endpoint::UserById]);
        assert!(host.calls().contains(&HostCall::Impact { strength: Impact::Light }));
    }

    #[test]
    fn events_deserialize_from_runtime_json() {
        let event: Event = serde_json::from_value(json!({
            "event": "pointer",
            "list": "posts",
            "card": "5",
            "phase": {"phase": "up", "target": "secondary"}
        }))
        .unwrap();
        assert_eq!(
            event,
            Event::Pointer {
                list: ListKind::Posts,
                card: ItemKey::new("5"),
                phase: PointerPhase::Up {
                    target: PressTarget::Secondary
                },
            }
        );

        let event: Event = serde_json::from_value(json!({
            "event": "response",
            "ticket": 3,
            "result": {"Err": {"kind": "network", "message": "offline"}}
        }))
        .unwrap();
        assert!(matches!(event, Event::Response { result: Err(ServiceError::Network { .. }), .. }));
    }
}
