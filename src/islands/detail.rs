//! Post and profile detail sheets.
//!
//! A sheet opens on [`OpenDetail`]. Posts are shown from the loaded feed; a post
//! that is not loaded yet is handed to the posts list to reveal after its next
//! load. Profiles open at once with whatever is known locally and are completed
//! by a `/get-user-by-id` request, applied only if the same sheet is still open.

use super::list::ListState;
use crate::app::modes::DetailSubject;
use crate::bus::{MessageBus, OpenDetail, Subscription, ViewChanged};
use crate::domain::{ItemKey, Post, Profile, ServiceError};
use crate::host::{HostShell, Impact};
use crate::relevance::{RelevanceGuard, SubjectToken};
use crate::service::{messages, RequestPurpose, ServiceRequest, SharedOutbox};
use serde_json::Value;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// Contents of the open sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailSheet {
    Post(Post),
    Profile {
        profile: Profile,
        /// `false` while only the local placeholder is shown.
        complete: bool,
    },
}

/// Outcome of a profile response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileResult {
    Stale,
    Applied,
    Failed(ServiceError),
}

#[derive(Debug, Default)]
pub struct DetailState {
    guard: RelevanceGuard,
    sheet: Option<DetailSheet>,
}

impl DetailState {
    #[must_use]
    pub fn sheet(&self) -> Option<&DetailSheet> {
        self.sheet.as_ref()
    }

    /// The post shown in the sheet, if the sheet shows a post.
    #[must_use]
    pub fn post(&self) -> Option<&Post> {
        match &self.sheet {
            Some(DetailSheet::Post(post)) => Some(post),
            _ => None,
        }
    }

    /// Applies a `/get-user-by-id` response.
    pub fn apply_profile(&mut self, token: &SubjectToken, result: Result<Value, ServiceError>) -> ProfileResult {
        if !self.guard.is_still_relevant(token) {
            tracing::trace!(subject = token.subject(), "stale profile response dropped");
            return ProfileResult::Stale;
        }
        match result.and_then(|body| messages::decode_profile(&body)) {
            Ok(profile) => {
                tracing::debug!(user_id = %profile.user_id, "profile sheet completed");
                self.sheet = Some(DetailSheet::Profile {
                    profile,
                    complete: true,
                });
                ProfileResult::Applied
            }
            Err(error) => {
                tracing::warn!(subject = token.subject(), error = %error, "profile load failed");
                ProfileResult::Failed(error)
            }
        }
    }

    /// Closes the sheet; responses still in flight for it become stale.
    pub fn close(&mut self) -> bool {
        self.guard.clear();
        self.sheet.take().is_some()
    }
}

/// Detail sheets mounted on the bus.
pub struct DetailIsland {
    state: Rc<RefCell<DetailState>>,
    _subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for DetailIsland {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailIsland").field("state", &self.state).finish_non_exhaustive()
    }
}

/// Everything the detail island reads or writes besides its own state.
pub struct DetailContext {
    pub outbox: SharedOutbox,
    pub host: Rc<dyn HostShell>,
    pub people: Weak<RefCell<ListState<Profile>>>,
    pub posts: Weak<RefCell<ListState<Post>>>,
}

impl DetailIsland {
    #[must_use]
    pub fn mount(bus: &MessageBus, context: DetailContext) -> Self {
        let state = Rc::new(RefCell::new(DetailState::default()));

        let open = Rc::downgrade(&state);
        let leave = Rc::downgrade(&state);
        let subscriptions = vec![
            bus.subscribe::<OpenDetail, _>(move |env| {
                if let Some(state) = open.upgrade() {
                    open_subject(&mut state.borrow_mut(), &env.payload.subject, &context);
                }
            }),
            bus.subscribe::<ViewChanged, _>(move |_| {
                if let Some(state) = leave.upgrade() {
                    state.borrow_mut().close();
                }
            }),
        ];

        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    pub fn borrow(&self) -> Ref<'_, DetailState> {
        self.state.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, DetailState> {
        self.state.borrow_mut()
    }
}

fn open_subject(state: &mut DetailState, subject: &DetailSubject, context: &DetailContext) {
    match subject {
        DetailSubject::Post { post_id } => {
            let Some(posts) = context.posts.upgrade() else { return };
            let mut posts = posts.borrow_mut();
            let found = posts.find(&ItemKey::new(post_id.clone())).cloned();
            match found {
                Some(post) => {
                    state.guard.capture(subject.guard_key());
                    state.sheet = Some(DetailSheet::Post(post));
                    tracing::debug!(post_id = %post_id, "post sheet opened");
                }
                None => {
                    tracing::debug!(post_id = %post_id, "post not loaded, revealing after load");
                    posts.reveal_after_load(post_id.clone());
                }
            }
        }
        DetailSubject::Profile { user_id } => {
            context.host.impact(Impact::Light);
            let token = state.guard.capture(subject.guard_key());
            state.sheet = Some(DetailSheet::Profile {
                profile: placeholder_profile(user_id, context),
                complete: false,
            });
            context.outbox.borrow_mut().send(
                &ServiceRequest::LoadUser {
                    target_user_id: user_id.clone(),
                },
                RequestPurpose::ProfileDetail { token },
            );
            tracing::debug!(user_id = %user_id, "profile sheet opened");
        }
    }
}

/// Best local guess at a profile: the people list, then a post author, then the bare id.
fn placeholder_profile(user_id: &str, context: &DetailContext) -> Profile {
    let key = ItemKey::new(user_id);
    if let Some(people) = context.people.upgrade() {
        let people = people.borrow();
        if let Some(profile) = people.find(&key) {
            return profile.clone();
        }
    }

    let mut author = None;
    if let Some(posts) = context.posts.upgrade() {
        let posts = posts.borrow();
        author = posts
            .items()
            .iter()
            .find(|post| post.author.user_id == user_id)
            .map(|post| post.author.clone());
    }

    match author {
        Some(author) => Profile {
            user_id: author.user_id,
            first_name: author.first_name,
            last_name: author.last_name,
            username: author.username,
            bio: None,
            skills: Vec::new(),
        },
        None => Profile {
            user_id: user_id.to_string(),
            first_name: String::new(),
            last_name: None,
            username: None,
            bio: None,
            skills: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Action;
    use crate::bus::IslandId;
    use crate::host::{HostCall, RecordingHost};
    use crate::islands::{ListIsland, LoadResult};
    use crate::service::{Outbox, Ticket};
    use crate::Config;
    use serde_json::json;

    struct Fixture {
        bus: MessageBus,
        host: Rc<RecordingHost>,
        outbox: SharedOutbox,
        people: ListIsland<Profile>,
        posts: ListIsland<Post>,
        detail: DetailIsland,
    }

    fn fixture() -> Fixture {
        let bus = MessageBus::new();
        let host = Rc::new(RecordingHost::default());
        let shell: Rc<dyn HostShell> = Rc::clone(&host) as Rc<dyn HostShell>;
        let outbox = Outbox::shared();
        let config = Config::default();
        let people: ListIsland<Profile> = ListIsland::mount(&bus, &outbox, Rc::clone(&shell), &config);
        let posts: ListIsland<Post> = ListIsland::mount(&bus, &outbox, Rc::clone(&shell), &config);
        let detail = DetailIsland::mount(
            &bus,
            DetailContext {
                outbox: Rc::clone(&outbox),
                host: shell,
                people: people.downgrade(),
                posts: posts.downgrade(),
            },
        );
        Fixture {
            bus,
            host,
            outbox,
            people,
            posts,
            detail,
        }
    }

    fn open(f: &Fixture, subject: DetailSubject) {
        f.bus.publish(IslandId::RUNTIME, OpenDetail { subject });
    }

    fn profile_ticket(f: &Fixture) -> (Ticket, SubjectToken) {
        let actions = f.outbox.borrow_mut().take_actions();
        let ticket = actions
            .iter()
            .find_map(|action| match action {
                Action::Request { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .unwrap();
        match f.outbox.borrow_mut().complete(ticket) {
            Some(RequestPurpose::ProfileDetail { token }) => (ticket, token),
            other => panic!("unexpected purpose {other:?}"),
        }
    }

    fn load_posts(f: &Fixture, body: Value) -> LoadResult {
        f.posts.borrow_mut().request_load(&mut f.outbox.borrow_mut());
        let actions = f.outbox.borrow_mut().take_actions();
        let Some(Action::Request { ticket, .. }) = actions.last() else {
            panic!("no load queued");
        };
        let Some(RequestPurpose::LoadList { token, .. }) = f.outbox.borrow_mut().complete(*ticket) else {
            panic!("not a list load");
        };
        f.posts.borrow_mut().apply_load(&token, Ok(body))
    }

    #[test]
    fn profile_opens_with_author_placeholder_then_completes() {
        let f = fixture();
        let _ = load_posts(
            &f,
            json!({"ok": true, "posts": [{"post_id": "1", "author": {"user_id": "7", "first_name": "Ann"}}]}),
        );
        open(
            &f,
            DetailSubject::Profile {
                user_id: "7".to_string(),
            },
        );
        assert!(f.host.calls().contains(&HostCall::Impact { strength: Impact::Light }));
        assert!(matches!(
            f.detail.borrow().sheet(),
            Some(DetailSheet::Profile { profile, complete: false }) if profile.first_name == "Ann"
        ));

        let (_, token) = profile_ticket(&f);
        let result = f.detail.borrow_mut().apply_profile(
            &token,
            Ok(json!({"ok": true, "profile": {"user_id": "7", "first_name": "Ann", "bio": "Rustacean"}})),
        );
        assert_eq!(result, ProfileResult::Applied);
        assert!(matches!(
            f.detail.borrow().sheet(),
            Some(DetailSheet::Profile { profile, complete: true }) if profile.bio.as_deref() == Some("Rustacean")
        ));
    }

    #[test]
    fn response_for_a_switched_profile_is_dropped() {
        let f = fixture();
        open(
            &f,
            DetailSubject::Profile {
                user_id: "1".to_string(),
            },
        );
        let (_, first) = profile_ticket(&f);
        open(
            &f,
            DetailSubject::Profile {
                user_id: "2".to_string(),
            },
        );

        let result = f
            .detail
            .borrow_mut()
            .apply_profile(&first, Ok(json!({"ok": true, "profile": {"user_id": "1", "first_name": "Old"}})));
        assert_eq!(result, ProfileResult::Stale);
        assert!(matches!(
            f.detail.borrow().sheet(),
            Some(DetailSheet::Profile { profile, .. }) if profile.user_id == "2"
        ));
        assert!(f.people.borrow().items().is_empty());
    }

    #[test]
    fn closing_makes_in_flight_responses_stale() {
        let f = fixture();
        open(
            &f,
            DetailSubject::Profile {
                user_id: "1".to_string(),
            },
        );
        let (_, token) = profile_ticket(&f);
        assert!(f.detail.borrow_mut().close());
        let result = f
            .detail
            .borrow_mut()
            .apply_profile(&token, Err(ServiceError::Network { message: "offline".to_string() }));
        assert_eq!(result, ProfileResult::Stale);
        assert!(f.detail.borrow().sheet().is_none());
    }

    #[test]
    fn unloaded_post_is_revealed_after_the_next_load() {
        let f = fixture();
        open(
            &f,
            DetailSubject::Post {
                post_id: "5".to_string(),
            },
        );
        assert!(f.detail.borrow().sheet().is_none());

        let loaded = load_posts(&f, json!({"ok": true, "posts": [{"post_id": "5"}]}));
        assert_eq!(
            loaded,
            LoadResult::Loaded {
                count: 1,
                reveal: Some(("5".to_string(), true)),
            }
        );

        open(
            &f,
            DetailSubject::Post {
                post_id: "5".to_string(),
            },
        );
        assert_eq!(f.detail.borrow().post().map(|p| p.post_id.as_str()), Some("5"));
    }
}
