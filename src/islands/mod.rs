//! Independently mounted UI islands.
//!
//! Each island owns its state behind an `Rc<RefCell<_>>` and talks to the rest
//! of the application only through the [`MessageBus`](crate::bus::MessageBus).
//! Bus handlers hold weak references, so dropping an island unmounts it.
//!
//! - [`list`]: the people and posts lists
//! - [`selector`]: the full tag and status picker
//! - [`detail`]: post and profile sheets

pub mod detail;
pub mod list;
pub mod selector;

pub use detail::{DetailContext, DetailIsland, DetailSheet, DetailState, ProfileResult};
pub use list::{ListIsland, ListRecord, ListState, LoadResult, PointerPhase};
pub use selector::{SelectorIsland, SelectorState};
