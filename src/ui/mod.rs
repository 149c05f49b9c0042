//! Presentation data for the islands.
//!
//! Rendering itself belongs to the embedding page; the core only produces
//! [`ListViewModel`]s.
//!
//! # Modules
//!
//! - [`viewmodel`]: View model type definitions

pub mod viewmodel;

pub use viewmodel::{
    ChipItem, DisplayItem, EmptyState, ListViewModel, MenuEntry, MenuOverlay, SearchBarInfo,
};
