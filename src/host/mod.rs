//! Host shell abstraction.
//!
//! The mini-app runs inside a host container that owns a few native controls: a
//! back button, a close control, a primary action button, haptics, the vertical
//! swipe-to-dismiss gesture and modal dialogs. From the core's point of view all of
//! these are synchronous fire-and-forget calls, so [`HostShell`] methods take
//! `&self` and return nothing; implementations use interior mutability.
//!
//! Element measurement also lives here because only the host can answer it, and
//! it must be answered at the moment of asking (never from a stored value).
//!
//! - [`recording`]: a host that records every call, used by the headless runtime
//!   and by tests

pub mod recording;

pub use recording::{HostCall, RecordingHost};

use crate::domain::{ItemKey, Rect, Viewport};
use serde::{Deserialize, Serialize};

/// Identifier of one back-button registration.
///
/// A fresh id is minted on every navigation; the host reports it back with each
/// press so a press aimed at an unbound handler can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackBinding(pub u64);

/// Strength of a haptic impact pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Light,
    Medium,
    Heavy,
}

/// Outcome class of a haptic notification pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    Success,
}

/// Native controls and measurement offered by the host container.
pub trait HostShell {
    /// Shows the native back button wired to `binding`.
    fn bind_back(&self, binding: BackBinding);
    /// Removes the handler registered as `binding` and hides the back button.
    fn unbind_back(&self, binding: BackBinding);
    /// Shows or hides the host's close control (root screens only).
    fn set_close_visible(&self, visible: bool);
    /// Shows the primary action button with `label`.
    fn show_primary_action(&self, label: &str);
    /// Hides the primary action button.
    fn hide_primary_action(&self);
    /// Fires a haptic impact pulse.
    fn impact(&self, strength: Impact);
    /// Fires a haptic notification pulse.
    fn notify(&self, notice: Notice);
    /// Enables or disables the container's vertical swipe-to-dismiss gesture.
    fn set_vertical_swipes(&self, enabled: bool);
    /// Shows a modal alert.
    fn alert(&self, message: &str);
    /// Closes the mini-app.
    fn close_app(&self);
    /// Current bounding rectangle of a card, or a zero rect if it is not in the view tree.
    fn measure_card(&self, card: &ItemKey) -> Rect;
    /// Current viewport size.
    fn viewport(&self) -> Viewport;
}
