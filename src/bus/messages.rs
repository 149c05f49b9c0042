//! Typed catalog of cross-island messages.
//!
//! Every payload is a plain struct bound to exactly one [`Topic`] through
//! [`TopicMessage`]. Subscribers name the payload type, never a topic string, so a
//! misspelled topic is a compile error.

use crate::app::modes::{DetailSubject, ListKind};
use crate::domain::Millis;
use crate::nav::ViewId;
use serde::{Deserialize, Serialize};

/// Closed set of bus topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ViewChanged,
    OpenFilterSelector,
    ApplyListFilter,
    ReturnToList,
    SetPostsScope,
    ListInvalidated,
    OpenDetail,
}

/// A payload type that travels on the bus under a fixed topic.
pub trait TopicMessage: Clone + std::fmt::Debug + 'static {
    const TOPIC: Topic;
}

/// Published by the navigator after every completed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewChanged {
    pub view: ViewId,
    pub previous: Option<ViewId>,
}

/// Asks for the filter selector overlay, seeded with the source list's criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFilterSelector {
    pub list: ListKind,
    pub tags: Vec<String>,
    pub status: Option<String>,
}

/// Criteria chosen in the selector, to be applied by the target list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyListFilter {
    pub list: ListKind,
    pub tags: Vec<String>,
    pub status: Option<String>,
    /// Logical time the selection was confirmed; starts the list's quiet period.
    pub at: Millis,
}

/// Asks the navigator to show a list screen again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnToList {
    pub list: ListKind,
}

/// Switches the posts list between the whole feed and the viewer's own posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPostsScope {
    pub mine_only: bool,
}

/// The list's server-side contents changed; it must reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInvalidated {
    pub list: ListKind,
}

/// Opens a detail sheet for a post or a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDetail {
    pub subject: DetailSubject,
}

macro_rules! bind_topics {
    ($($message:ident),* $(,)?) => {
        $(
            impl TopicMessage for $message {
                const TOPIC: Topic = Topic::$message;
            }

            impl From<$message> for BusMessage {
                fn from(message: $message) -> Self {
                    Self::$message(message)
                }
            }
        )*

        /// Any catalog message, for callers that store a message before publishing it.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "topic", rename_all = "snake_case")]
        pub enum BusMessage {
            $($message($message),)*
        }

        impl BusMessage {
            #[must_use]
            pub fn topic(&self) -> Topic {
                match self {
                    $(Self::$message(_) => Topic::$message,)*
                }
            }

            /// Publishes the wrapped payload under its own topic.
            pub fn publish_on(self, bus: &super::MessageBus, origin: super::IslandId) {
                match self {
                    $(Self::$message(message) => bus.publish(origin, message),)*
                }
            }
        }
    };
}

bind_topics!(
    ViewChanged,
    OpenFilterSelector,
    ApplyListFilter,
    ReturnToList,
    SetPostsScope,
    ListInvalidated,
    OpenDetail,
);
