//! Card gestures and the context menu they open.
//!
//! - [`press`]: per-card tap / long-press state machine
//! - [`menu`]: context-menu placement and entries

pub mod menu;
pub mod press;

pub use menu::{
    ContextMenuLayout, ContextMenuPositioner, MenuAction, MenuGeometry, MenuSession, Motion,
    OverlayMotions, SpringTransition,
};
pub use press::{CardGesture, PressConfig, PressOutcome, PressTarget};
