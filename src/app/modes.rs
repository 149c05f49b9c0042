//! Small state enums shared by the islands and the event handler.
//!
//! # Example
//!
//! ```rust
//! use hubshell::app::modes::{ListKind, PostsScope};
//!
//! assert_eq!(ListKind::Posts.view_id().as_str(), "posts");
//! assert_eq!(PostsScope::from_mine_only(true), PostsScope::Mine);
//! ```

use crate::bus::IslandId;
use crate::nav::{registry, ViewId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two filterable lists of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Member profiles.
    People,
    /// Published requests.
    Posts,
}

impl ListKind {
    /// Screen that hosts the list.
    #[must_use]
    pub fn view_id(self) -> ViewId {
        match self {
            Self::People => ViewId::new(registry::PEOPLE),
            Self::Posts => ViewId::new(registry::POSTS),
        }
    }

    #[must_use]
    pub fn island_id(self) -> IslandId {
        match self {
            Self::People => IslandId::PEOPLE_LIST,
            Self::Posts => IslandId::POSTS_LIST,
        }
    }

    /// Whether the list filters by a status category.
    #[must_use]
    pub fn has_status(self) -> bool {
        matches!(self, Self::Posts)
    }

    /// Key under which the list's records arrive in a load response.
    #[must_use]
    pub fn response_field(self) -> &'static str {
        match self {
            Self::People => "profiles",
            Self::Posts => "posts",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::People => "people",
            Self::Posts => "posts",
        })
    }
}

/// Which posts the posts list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostsScope {
    /// Everyone's posts.
    #[default]
    Feed,
    /// Only the viewer's own posts.
    Mine,
}

impl PostsScope {
    #[must_use]
    pub fn from_mine_only(mine_only: bool) -> Self {
        if mine_only {
            Self::Mine
        } else {
            Self::Feed
        }
    }
}

/// What a detail sheet shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailSubject {
    Post { post_id: String },
    Profile { user_id: String },
}

impl DetailSubject {
    /// Parses a launch parameter: `p_<id>` names a post, anything else a user id.
    #[must_use]
    pub fn from_start_param(param: &str) -> Option<Self> {
        let param = param.trim();
        if param.is_empty() {
            return None;
        }
        match param.strip_prefix("p_") {
            Some(post_id) if !post_id.trim().is_empty() => Some(Self::Post {
                post_id: post_id.trim().to_string(),
            }),
            Some(_) => None,
            None => Some(Self::Profile {
                user_id: param.to_string(),
            }),
        }
    }

    /// Identity used by the relevance guard.
    #[must_use]
    pub fn guard_key(&self) -> String {
        match self {
            Self::Post { post_id } => format!("post:{post_id}"),
            Self::Profile { user_id } => format!("profile:{user_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_param_parsing() {
        assert_eq!(
            DetailSubject::from_start_param("p_17"),
            Some(DetailSubject::Post {
                post_id: "17".to_string()
            })
        );
        assert_eq!(
            DetailSubject::from_start_param("12345"),
            Some(DetailSubject::Profile {
                user_id: "12345".to_string()
            })
        );
        assert_eq!(DetailSubject::from_start_param("p_"), None);
        assert_eq!(DetailSubject::from_start_param("  "), None);
    }
}
