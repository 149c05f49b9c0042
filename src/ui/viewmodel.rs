//! View model types representing renderable list state.
//!
//! View models are computed from [`AppState`](crate::app::AppState) on demand
//! and handed to whatever renders the islands. They contain no behaviour, only
//! display-ready data with labels already translated.
//!
//! # Example
//!
//! ```rust
//! use hubshell::ui::viewmodel::{ChipItem, EmptyState};
//!
//! let all = ChipItem {
//!     label: "All".to_string(),
//!     tag: None,
//!     is_selected: true,
//! };
//! let empty = EmptyState {
//!     message: "Nothing found".to_string(),
//!     reset_label: Some("Reset filters".to_string()),
//! };
//! assert!(all.tag.is_none() && empty.reset_label.is_some());
//! ```

use crate::app::modes::ListKind;
use crate::domain::{ItemKey, Rect};
use crate::gesture::{MenuAction, OverlayMotions};
use serde::Serialize;

/// Complete view model of one list island.
#[derive(Debug, Clone, Serialize)]
pub struct ListViewModel {
    pub list: ListKind,

    /// Text shown in the search field (raw, not debounced).
    pub search: SearchBarInfo,

    /// Quick-filter chips, starting with the "all" chip.
    pub chips: Vec<ChipItem>,

    /// Status criterion, for lists that have one.
    pub status: Option<String>,

    /// Cards that pass the current filter, in source order.
    pub items: Vec<DisplayItem>,

    /// Set when nothing passes the filter and the list is not loading.
    pub empty_state: Option<EmptyState>,

    /// The open context menu, if any.
    pub menu: Option<MenuOverlay>,

    pub loading: bool,
}

/// Current search query for the search input.
#[derive(Debug, Clone, Serialize)]
pub struct SearchBarInfo {
    pub query: String,
}

/// One quick-filter chip.
#[derive(Debug, Clone, Serialize)]
pub struct ChipItem {
    pub label: String,
    /// `None` for the "all" chip.
    pub tag: Option<String>,
    pub is_selected: bool,
}

/// One card.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayItem {
    pub key: ItemKey,
    pub name: String,
    pub body: String,
    pub tags: Vec<String>,
    pub status: Option<String>,
    /// Posts written by the viewer.
    pub is_own: bool,
    /// Relative age label, for records with a timestamp.
    pub age: Option<String>,
}

/// Shown instead of the cards when the filtered list is empty.
#[derive(Debug, Clone, Serialize)]
pub struct EmptyState {
    pub message: String,
    /// Label of the reset button, offered only while criteria are active.
    pub reset_label: Option<String>,
}

/// Context menu overlay: the highlighted clone plus the menu itself.
#[derive(Debug, Clone, Serialize)]
pub struct MenuOverlay {
    pub card: ItemKey,
    pub card_rect: Rect,
    pub menu_rect: Rect,
    pub motions: OverlayMotions,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuEntry {
    pub action: MenuAction,
    pub label: String,
    pub is_destructive: bool,
}
