//! Request and response types exchanged with the data service.
//!
//! The core never performs I/O. It emits a [`ServiceRequest`] inside an
//! [`Action::Request`](crate::app::Action::Request) tagged with a [`Ticket`],
//! and the runtime reports completion through a single response event carrying
//! the same ticket. Success bodies are the service's JSON (`{"ok": true, ...}`);
//! failures arrive as [`ServiceError`].

use crate::domain::{Post, Profile, ServiceError};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// Correlates a request with its eventual response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Service endpoints used by the core. Serialized as their [`path`](Self::path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PostsFeed,
    MyPosts,
    Profiles,
    UserById,
    DeletePost,
}

impl Endpoint {
    pub const ALL: [Self; 5] = [
        Self::PostsFeed,
        Self::MyPosts,
        Self::Profiles,
        Self::UserById,
        Self::DeletePost,
    ];

    /// Looks up the endpoint served at `path`.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|endpoint| endpoint.path() == path)
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::PostsFeed => "/api/get-posts-feed",
            Self::MyPosts => "/api/get-my-posts",
            Self::Profiles => "/get-all-profiles",
            Self::UserById => "/get-user-by-id",
            Self::DeletePost => "/api/delete-post",
        }
    }
}

impl Serialize for Endpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        Self::from_path(&path)
            .ok_or_else(|| de::Error::custom(format!("unknown endpoint path `{path}`")))
    }
}

/// A request the core wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRequest {
    LoadPostsFeed,
    LoadMyPosts,
    LoadProfiles,
    LoadUser { target_user_id: String },
    DeletePost { post_id: String },
}

impl ServiceRequest {
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::LoadPostsFeed => Endpoint::PostsFeed,
            Self::LoadMyPosts => Endpoint::MyPosts,
            Self::LoadProfiles => Endpoint::Profiles,
            Self::LoadUser { .. } => Endpoint::UserById,
            Self::DeletePost { .. } => Endpoint::DeletePost,
        }
    }

    /// JSON body. Authentication fields are added by the runtime.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::LoadUser { target_user_id } => json!({ "target_user_id": target_user_id }),
            Self::DeletePost { post_id } => json!({ "post_id": post_id }),
            Self::LoadPostsFeed | Self::LoadMyPosts | Self::LoadProfiles => json!({}),
        }
    }
}

/// Checks the `ok` flag of a service body.
///
/// # Errors
///
/// Returns [`ServiceError::Rejected`] carrying the body's `error` text when `ok`
/// is missing or false.
pub fn expect_ok(body: &Value) -> Result<(), ServiceError> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unexpected response")
        .to_string();
    Err(ServiceError::Rejected { message })
}

/// Decodes the record array under `field`, skipping malformed records.
///
/// # Errors
///
/// Returns [`ServiceError::Rejected`] if the body is not ok or `field` is not an array.
pub fn decode_records<T: DeserializeOwned>(body: &Value, field: &str) -> Result<Vec<T>, ServiceError> {
    expect_ok(body)?;
    let Some(items) = body.get(field).and_then(Value::as_array) else {
        return Err(ServiceError::Rejected {
            message: format!("missing `{field}` array"),
        });
    };
    let records: Vec<T> = items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(field = %field, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();
    Ok(records)
}

/// Decodes a posts list body.
///
/// # Errors
///
/// See [`decode_records`].
pub fn decode_posts(body: &Value) -> Result<Vec<Post>, ServiceError> {
    decode_records(body, "posts")
}

/// Decodes a profiles list body.
///
/// # Errors
///
/// See [`decode_records`].
pub fn decode_profiles(body: &Value) -> Result<Vec<Profile>, ServiceError> {
    decode_records(body, "profiles")
}

/// Decodes a single-profile body.
///
/// # Errors
///
/// Returns [`ServiceError::Rejected`] if the body is not ok or holds no valid profile.
pub fn decode_profile(body: &Value) -> Result<Profile, ServiceError> {
    expect_ok(body)?;
    let profile = body.get("profile").cloned().unwrap_or(Value::Null);
    serde_json::from_value(profile).map_err(|e| ServiceError::Rejected {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_wire_form_is_its_path() {
        assert_eq!(
            serde_json::to_value(Endpoint::MyPosts).unwrap(),
            json!("/api/get-my-posts")
        );
        let parsed: Endpoint = serde_json::from_value(json!("/get-user-by-id")).unwrap();
        assert_eq!(parsed, Endpoint::UserById);
        assert!(serde_json::from_value::<Endpoint>(json!("UserById")).is_err());
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::from_path(endpoint.path()), Some(endpoint));
        }
    }

    #[test]
    fn request_payloads() {
        let request = ServiceRequest::DeletePost {
            post_id: "9".to_string(),
        };
        assert_eq!(request.endpoint(), Endpoint::DeletePost);
        assert_eq!(request.payload(), json!({"post_id": "9"}));
        assert_eq!(ServiceRequest::LoadProfiles.payload(), json!({}));
    }

    #[test]
    fn not_ok_is_rejected_with_server_text() {
        let err = expect_ok(&json!({"ok": false, "error": "User not found"})).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                message: "User not found".to_string()
            }
        );
        assert!(expect_ok(&json!({"posts": []})).is_err());
    }

    #[test]
    fn malformed_records_are_skipped() {
        let body = json!({
            "ok": true,
            "posts": [
                {"post_id": 1, "content": "kept"},
                {"content": "no id"},
            ]
        });
        let posts = decode_posts(&body).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "kept");
    }

    #[test]
    fn single_profile() {
        let body = json!({"ok": true, "profile": {"user_id": 5, "first_name": "Eve", "skills": "[\"Go\"]"}});
        let profile = decode_profile(&body).unwrap();
        assert_eq!(profile.user_id, "5");
        assert_eq!(profile.skills, vec!["Go"]);
        assert!(decode_profile(&json!({"ok": true, "profile": {}})).is_err());
    }
}
