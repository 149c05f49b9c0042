//! Application layer coordinating islands, events, and actions.
//!
//! This module sits between the headless runtime (main.rs) and the islands,
//! navigator and bus. Every input from the host arrives as an [`Event`]; the
//! handler routes it and returns the [`Action`]s the runtime must carry out.
//!
//! # Architecture
//!
//! ```text
//! Host Input → Events → Event Handler → Islands / Navigator / Bus → Actions
//!                            ↑                                         ↓
//!                            └──────────── Service Responses ──────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Commands emitted for the runtime
//! - [`handler`]: Event processing and routing
//! - [`modes`]: List kinds, the posts scope and detail subjects
//! - [`state`]: Application state container and view model computation

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{DetailSubject, ListKind, PostsScope};
pub use state::AppState;
