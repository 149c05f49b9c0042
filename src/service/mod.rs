//! Data-service plumbing: typed requests, ticket bookkeeping and response decoding.
//!
//! Islands never see the transport. They hand a [`ServiceRequest`] and a
//! [`RequestPurpose`] to the shared [`Outbox`], which assigns a [`Ticket`] and
//! queues an [`Action::Request`]. When the runtime reports the response, the
//! event handler asks the outbox what the ticket was for and routes the result.

pub mod messages;

pub use messages::{Endpoint, ServiceRequest, Ticket};

use crate::app::actions::Action;
use crate::app::modes::ListKind;
use crate::relevance::SubjectToken;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// What a pending request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPurpose {
    /// Contents of a list; applied only while `token` is still relevant.
    LoadList { list: ListKind, token: SubjectToken },
    /// Fuller profile for an open profile sheet.
    ProfileDetail { token: SubjectToken },
    /// Deletion of one of the viewer's posts.
    DeletePost { post_id: String },
}

/// Queue of outgoing actions plus the ledger of in-flight tickets.
#[derive(Debug, Default)]
pub struct Outbox {
    next_ticket: u64,
    pending: HashMap<Ticket, RequestPurpose>,
    actions: Vec<Action>,
}

/// The outbox as shared between islands.
pub type SharedOutbox = Rc<RefCell<Outbox>>;

impl Outbox {
    #[must_use]
    pub fn shared() -> SharedOutbox {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Queues `request` and remembers why it was sent.
    pub fn send(&mut self, request: &ServiceRequest, purpose: RequestPurpose) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        tracing::debug!(
            ticket = %ticket,
            endpoint = request.endpoint().path(),
            purpose = ?purpose,
            "request queued"
        );
        self.pending.insert(ticket, purpose);
        self.actions.push(Action::Request {
            ticket,
            endpoint: request.endpoint(),
            payload: request.payload(),
        });
        ticket
    }

    /// Queues an action with no response.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Queues a transient message.
    pub fn toast(&mut self, message: impl Into<String>, is_error: bool) {
        self.actions.push(Action::Toast {
            message: message.into(),
            is_error,
        });
    }

    /// Removes `ticket` from the ledger and returns its purpose.
    ///
    /// `None` means the ticket is unknown or was already completed.
    pub fn complete(&mut self, ticket: Ticket) -> Option<RequestPurpose> {
        self.pending.remove(&ticket)
    }

    /// Drains queued actions in the order they were queued.
    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::RelevanceGuard;

    #[test]
    fn tickets_are_unique_and_complete_once() {
        let mut outbox = Outbox::default();
        let mut guard = RelevanceGuard::default();
        let a = outbox.send(
            &ServiceRequest::LoadProfiles,
            RequestPurpose::LoadList {
                list: ListKind::People,
                token: guard.capture("people"),
            },
        );
        let b = outbox.send(
            &ServiceRequest::DeletePost {
                post_id: "3".to_string(),
            },
            RequestPurpose::DeletePost {
                post_id: "3".to_string(),
            },
        );
        assert_ne!(a, b);
        assert_eq!(outbox.in_flight(), 2);

        assert!(matches!(outbox.complete(b), Some(RequestPurpose::DeletePost { post_id }) if post_id == "3"));
        assert!(outbox.complete(b).is_none());
        assert_eq!(outbox.in_flight(), 1);
    }

    #[test]
    fn actions_drain_in_order() {
        let mut outbox = Outbox::default();
        outbox.toast("first", false);
        outbox.send(
            &ServiceRequest::LoadPostsFeed,
            RequestPurpose::DeletePost {
                post_id: "x".to_string(),
            },
        );
        let actions = outbox.take_actions();
        assert!(matches!(actions[0], Action::Toast { .. }));
        assert!(matches!(
            actions[1],
            Action::Request {
                endpoint: Endpoint::PostsFeed,
                ..
            }
        ));
        assert!(outbox.take_actions().is_empty());
    }
}
