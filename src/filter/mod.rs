//! Debounced multi-criteria filter pipeline.
//!
//! A [`FilterPipeline`] owns one list's [`FilterState`]: the raw search text,
//! the committed (debounced) text, the selected tags and an optional status. The
//! filtered view is derived on demand from a source slice and never stored.
//!
//! # Update channels
//!
//! Keystrokes and bus-originated criteria are debounced on separate channels.
//! Within a channel the last write wins; a keystroke never discards a pending
//! selector result. When both channels are due at once they commit in deadline
//! order. Chip taps apply immediately and cancel anything still pending.
//!
//! # Text and tag sync
//!
//! Tags and text mirror each other, with exactly one authoritative [`Writer`] per
//! update:
//!
//! - a programmatic tag change rewrites the text to the comma-joined tag list and
//!   does not re-derive tags from it;
//! - a committed user keystroke re-derives tags when every comma-separated segment
//!   names a known tag, and clears the tag selection otherwise.
//!
//! # Example
//!
//! ```rust
//! use hubshell::filter::FilterPipeline;
//!
//! let mut pipeline = FilterPipeline::new(300, vec!["Go".into(), "Rust".into()]);
//! pipeline.set_text("rust, go", 0);
//! assert!(pipeline.state().selected_tags.is_empty());
//!
//! pipeline.poll(300);
//! assert_eq!(pipeline.state().selected_tags, vec!["Go", "Rust"]);
//! ```

pub mod debounce;
pub mod matcher;

pub use debounce::Debouncer;
pub use matcher::{tokenize, Criteria};

use crate::domain::{Filterable, Millis};
use serde::Serialize;

/// Criteria owned by one pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// Text as typed, shown in the search field.
    pub raw_text: String,
    /// Text the filter currently applies.
    pub debounced_text: String,
    /// Selected tags, sorted, in their known-tag casing.
    pub selected_tags: Vec<String>,
    pub status: Option<String>,
}

impl FilterState {
    #[must_use]
    pub fn criteria(&self) -> Criteria {
        Criteria::new(
            &self.debounced_text,
            &self.selected_tags,
            self.status.as_deref(),
        )
    }

    #[must_use]
    pub fn has_criteria(&self) -> bool {
        !self.criteria().is_empty()
    }
}

/// Who wrote the criteria last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Writer {
    /// The search field.
    #[default]
    User,
    /// Chips, the selector overlay, resets.
    Program,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExternalCriteria {
    tags: Vec<String>,
    status: Option<String>,
}

/// Debounced, cancellable filter over one list.
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    state: FilterState,
    known_tags: Vec<String>,
    pending_text: Debouncer<String>,
    pending_external: Debouncer<ExternalCriteria>,
    writer: Writer,
    revision: u64,
}

impl FilterPipeline {
    /// Creates an empty pipeline.
    ///
    /// # Parameters
    ///
    /// * `quiet_period` - Debounce delay in milliseconds
    /// * `known_tags` - Tag vocabulary used for canonical casing and text re-derivation
    #[must_use]
    pub fn new(quiet_period: Millis, known_tags: Vec<String>) -> Self {
        Self {
            state: FilterState::default(),
            known_tags,
            pending_text: Debouncer::new(quiet_period),
            pending_external: Debouncer::new(quiet_period),
            writer: Writer::User,
            revision: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub fn last_writer(&self) -> Writer {
        self.writer
    }

    /// Number of committed criteria changes so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        match (
            self.pending_text.next_deadline(),
            self.pending_external.next_deadline(),
        ) {
            (Some(text), Some(external)) => Some(text.min(external)),
            (text, external) => text.or(external),
        }
    }

    /// Records a keystroke. The text is applied once `now + quiet_period` passes
    /// without another keystroke.
    pub fn set_text(&mut self, value: &str, now: Millis) {
        self.state.raw_text = value.to_string();
        self.writer = Writer::User;
        self.pending_text.push(value.to_string(), now);
    }

    /// Queues criteria that arrived over the bus. A later bus update replaces
    /// this one; keystrokes do not.
    pub fn apply_external(&mut self, tags: &[String], status: Option<String>, now: Millis) {
        self.pending_external.push(
            ExternalCriteria {
                tags: tags.to_vec(),
                status,
            },
            now,
        );
    }

    /// Commits pending changes whose quiet period has elapsed.
    ///
    /// Returns `true` if the committed criteria changed.
    pub fn poll(&mut self, now: Millis) -> bool {
        let text_due = self.pending_text.next_deadline();
        let external_due = self.pending_external.next_deadline();
        let text = self.pending_text.poll(now);
        let external = self.pending_external.poll(now);
        if text.is_none() && external.is_none() {
            return false;
        }

        let before = self.state.clone();
        if text_due < external_due {
            if let Some(text) = text {
                self.commit_user_text(text);
            }
            if let Some(external) = external {
                self.commit_external(external);
            }
        } else {
            if let Some(external) = external {
                self.commit_external(external);
            }
            if let Some(text) = text {
                self.commit_user_text(text);
            }
        }
        self.finish(&before)
    }

    /// Replaces the tag selection immediately.
    pub fn set_tags(&mut self, tags: &[String]) -> bool {
        let before = self.state.clone();
        self.pending_text.cancel();
        self.pending_external.cancel();
        self.write_tags(tags);
        self.finish(&before)
    }

    /// Toggles a quick-filter chip. `None` is the "all" chip and clears the selection.
    pub fn toggle_tag(&mut self, tag: Option<&str>) -> bool {
        let Some(tag) = tag else {
            return self.set_tags(&[]);
        };
        let lower = tag.to_lowercase();
        let mut tags = self.state.selected_tags.clone();
        if tags.iter().any(|selected| selected.to_lowercase() == lower) {
            tags.retain(|selected| selected.to_lowercase() != lower);
        } else {
            tags.push(tag.to_string());
        }
        self.set_tags(&tags)
    }

    /// Sets or clears the status criterion immediately.
    pub fn set_status(&mut self, status: Option<String>) -> bool {
        let before = self.state.clone();
        self.state.status = status;
        self.writer = Writer::Program;
        self.finish(&before)
    }

    /// Clears the search text but keeps tags and status.
    pub fn clear_text(&mut self) -> bool {
        let before = self.state.clone();
        self.pending_text.cancel();
        self.state.raw_text.clear();
        self.state.debounced_text.clear();
        self.writer = Writer::Program;
        self.finish(&before)
    }

    /// Clears every criterion and anything pending.
    pub fn reset(&mut self) -> bool {
        let before = self.state.clone();
        self.pending_text.cancel();
        self.pending_external.cancel();
        self.state = FilterState::default();
        self.writer = Writer::Program;
        self.finish(&before)
    }

    /// Returns the items of `source` that pass every active criterion, in order.
    ///
    /// An empty source or a pipeline with no active criteria yields the source
    /// unchanged.
    pub fn filtered<'a, T: Filterable>(&self, source: &'a [T]) -> Vec<&'a T> {
        let criteria = self.state.criteria();
        if source.is_empty() || criteria.is_empty() {
            return source.iter().collect();
        }

        let _span = tracing::debug_span!(
            "filter_list",
            total = source.len(),
            query_len = self.state.debounced_text.len(),
            tags = self.state.selected_tags.len(),
            status = ?self.state.status
        )
        .entered();

        let filtered: Vec<&T> = source.iter().filter(|item| criteria.matches(*item)).collect();
        tracing::debug!(matched = filtered.len(), "list filtered");
        filtered
    }

    fn commit_user_text(&mut self, text: String) {
        let segments = matcher::comma_segments(&text);
        let derived: Option<Vec<String>> = if segments.is_empty() {
            None
        } else {
            segments
                .iter()
                .map(|segment| self.known_tag(segment).map(String::from))
                .collect()
        };
        self.state.selected_tags = derived.map(sorted_unique).unwrap_or_default();
        self.state.raw_text.clone_from(&text);
        self.state.debounced_text = text;
        self.writer = Writer::User;
    }

    fn commit_external(&mut self, external: ExternalCriteria) {
        self.write_tags(&external.tags);
        self.state.status = external.status;
    }

    fn write_tags(&mut self, tags: &[String]) {
        let canonical = sorted_unique(
            tags.iter()
                .map(|tag| self.known_tag(tag).unwrap_or(tag.as_str()).to_string())
                .collect(),
        );
        let text = canonical.join(", ");
        self.state.selected_tags = canonical;
        self.state.raw_text.clone_from(&text);
        self.state.debounced_text = text;
        self.writer = Writer::Program;
    }

    fn known_tag(&self, tag: &str) -> Option<&str> {
        let lower = tag.trim().to_lowercase();
        self.known_tags
            .iter()
            .find(|known| known.to_lowercase() == lower)
            .map(String::as_str)
    }

    fn finish(&mut self, before: &FilterState) -> bool {
        let changed = before.debounced_text != self.state.debounced_text
            || before.selected_tags != self.state.selected_tags
            || before.status != self.state.status;
        if changed {
            self.revision += 1;
            tracing::debug!(
                revision = self.revision,
                writer = ?self.writer,
                tags = ?self.state.selected_tags,
                status = ?self.state.status,
                "filter criteria committed"
            );
        }
        changed
    }
}

fn sorted_unique(mut tags: Vec<String>) -> Vec<String> {
    tags.sort_by_key(|tag| tag.to_lowercase());
    tags.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
    tags
}
