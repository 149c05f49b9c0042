//! List records and the searchable view the filter pipeline needs of them.
//!
//! Two kinds of records populate the lists: [`Post`] (the request feed) and
//! [`Profile`] (the people feed). Both arrive from the data service as JSON and
//! both implement [`Filterable`], which exposes exactly the fields the filter
//! criteria look at.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86400;

/// Stable identity of a list item (post id or user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(pub String);

impl ItemKey {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of a record used by the filter criteria.
pub trait Filterable {
    /// Identity used for cards, detail sheets and relevance checks.
    fn key(&self) -> ItemKey;

    /// Name shown on the card (author name or full name).
    fn display_name(&self) -> Cow<'_, str>;

    /// Free-text body (post content or profile bio).
    fn body(&self) -> &str;

    /// Tags attached to the record.
    fn tags(&self) -> &[String];

    /// Status category, if the record kind has one.
    fn status(&self) -> Option<&str> {
        None
    }
}

/// Post author summary embedded in every post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub photo_path: Option<String>,
}

/// A request published to the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub post_id: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub full_description: Option<String>,
    /// One of `looking`, `offering`, `showcase`; anything else renders as a plain request.
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub skill_tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Post {
    /// Parses `created_at`, accepting RFC 3339 and the server's naive form.
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    /// Returns how long ago the post was created, or `None` if the timestamp is missing or invalid.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Option<RelativeAge> {
        self.created_at_utc()
            .map(|created| RelativeAge::between(created, now))
    }
}

impl Filterable for Post {
    fn key(&self) -> ItemKey {
        ItemKey::new(self.post_id.clone())
    }

    fn display_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.author.first_name)
    }

    fn body(&self) -> &str {
        &self.content
    }

    fn tags(&self) -> &[String] {
        &self.skill_tags
    }

    fn status(&self) -> Option<&str> {
        self.post_type.as_deref()
    }
}

/// A member profile shown in the people feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Stored server-side as a JSON-encoded string; accepted either way.
    #[serde(default, deserialize_with = "skills_from_array_or_json")]
    pub skills: Vec<String>,
}

impl Profile {
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

impl Filterable for Profile {
    fn key(&self) -> ItemKey {
        ItemKey::new(self.user_id.clone())
    }

    fn display_name(&self) -> Cow<'_, str> {
        Cow::Owned(self.full_name())
    }

    fn body(&self) -> &str {
        self.bio.as_deref().unwrap_or("")
    }

    fn tags(&self) -> &[String] {
        &self.skills
    }
}

/// Coarse age bucket used for post timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAge {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks(i64),
    Months(i64),
}

impl RelativeAge {
    #[must_use]
    pub fn between(then: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff = (now - then).num_seconds().max(0);
        if diff < SECONDS_PER_MINUTE {
            return Self::JustNow;
        }
        if diff < SECONDS_PER_HOUR {
            return Self::Minutes(diff / SECONDS_PER_MINUTE);
        }
        if diff < SECONDS_PER_DAY {
            return Self::Hours(diff / SECONDS_PER_HOUR);
        }
        let days = diff / SECONDS_PER_DAY;
        if days < 7 {
            Self::Days(days)
        } else if days < 30 {
            Self::Weeks(days / 7)
        } else {
            Self::Months(days / 30)
        }
    }

    /// Renders the age with the label service's unit suffixes.
    pub fn label(self, labels: &dyn crate::i18n::Translate) -> String {
        let (count, unit) = match self {
            Self::JustNow => return labels.translate("time_just_now", &[]),
            Self::Minutes(n) => (n, "time_m"),
            Self::Hours(n) => (n, "time_h"),
            Self::Days(n) => (n, "time_d"),
            Self::Weeks(n) => (n, "time_w"),
            Self::Months(n) => (n, "time_mo"),
        };
        format!("{count}{}", labels.translate(unit, &[]))
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn skills_from_array_or_json<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSkills {
        List(Vec<String>),
        Encoded(String),
        Missing(Option<()>),
    }

    Ok(match RawSkills::deserialize(deserializer)? {
        RawSkills::List(list) => list,
        RawSkills::Encoded(text) => serde_json::from_str::<Vec<String>>(&text).unwrap_or_else(|_| {
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        }),
        RawSkills::Missing(_) => Vec::new(),
    })
}
