//! Label lookup.
//!
//! The core never formats user-facing text itself; it asks a [`Translate`]
//! implementation for a label by key. A missing key comes back as the key itself
//! so untranslated strings stay visible instead of silently disappearing.

use crate::domain::Result;
use std::collections::HashMap;

/// Label lookup service.
pub trait Translate {
    /// Returns the label for `key` with `{name}` placeholders replaced from `params`.
    ///
    /// Never fails: an unknown key yields the key.
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Built-in labels used when the loaded table has no entry.
const FALLBACK_LABELS: &[(&str, &str)] = &[
    ("save_button", "Save"),
    ("publish", "Publish"),
    ("filter_all", "All"),
    ("feed_empty", "Nothing found"),
    ("reset_filters", "Reset filters"),
    ("time_just_now", "just now"),
    ("time_m", "m"),
    ("time_h", "h"),
    ("time_d", "d"),
    ("time_w", "w"),
    ("time_mo", "mo"),
    ("action_respond", "Respond"),
    ("action_repost", "Repost"),
    ("action_view_profile", "View profile"),
    ("action_edit", "Edit"),
    ("action_delete", "Delete"),
    ("action_respond_toast", "Responding is coming soon"),
    ("confirm_delete", "Delete this request?"),
    ("delete_failed", "Could not delete the request"),
    ("error_network", "Network error. Please try again."),
    ("post_not_found", "This request is no longer available"),
    ("error_share_config", "Sharing is not configured"),
    ("repost_request_title", "Take a look at this request:"),
    ("repost_request_cta", "Open it in the app"),
];

/// In-memory label table with built-in fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    table: HashMap<String, String>,
}

impl Labels {
    /// Creates a table with only the built-in fallbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a flat `{"key": "label"}` JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object of strings.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: HashMap<String, String> = serde_json::from_str(json)?;
        tracing::debug!(label_count = table.len(), "labels loaded");
        Ok(Self { table })
    }

    /// Adds or replaces a single label.
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.table.insert(key.into(), label.into());
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.table.get(key).map(String::as_str).or_else(|| {
            FALLBACK_LABELS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, label)| *label)
        })
    }
}

impl Translate for Labels {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(template) = self.lookup(key) else {
            tracing::trace!(key = %key, "missing label");
            return key.to_string();
        };
        params
            .iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}
