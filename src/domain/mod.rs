//! Domain layer for the hubshell core.
//!
//! This module contains the data types shared by every other layer, independent of
//! the host shell and of any particular island.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`geometry`]: Rectangles and viewport sizes used for overlay placement
//! - [`record`]: Post and profile records and their searchable view

pub mod error;
pub mod geometry;
pub mod record;

pub use error::{HubError, Result, ServiceError};
pub use geometry::{Rect, Viewport};
pub use record::{Author, Filterable, ItemKey, Post, Profile, RelativeAge};

/// Logical clock value in milliseconds, supplied by the host runtime.
pub type Millis = u64;
