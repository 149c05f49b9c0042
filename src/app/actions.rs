//! Actions representing side effects to be executed by the host runtime.
//!
//! The event handler returns a `Vec<Action>` after processing each event. Host
//! shell calls (back button, haptics, swipe control, alerts) are synchronous and
//! go straight through [`HostShell`](crate::host::HostShell); everything that
//! needs the network, the share sheet, a confirmation dialog or an external
//! editor is returned as an `Action` instead.
//!
//! # Example
//!
//! ```rust
//! use hubshell::app::Action;
//!
//! let action = Action::Toast {
//!     message: "Network error. Please try again.".to_string(),
//!     is_error: true,
//! };
//! assert!(serde_json::to_string(&action).unwrap().contains("\"action\":\"toast\""));
//! ```

use crate::service::{Endpoint, Ticket};
use serde::Serialize;
use serde_json::Value;

/// Commands for the runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Performs a data-service request.
    ///
    /// The runtime must answer with exactly one response event carrying `ticket`.
    Request {
        ticket: Ticket,
        endpoint: Endpoint,
        payload: Value,
    },

    /// Shows a transient message that does not block navigation.
    Toast {
        message: String,
        is_error: bool,
    },

    /// Opens the platform share sheet for `link` with a preview `text`.
    Share {
        link: String,
        text: String,
    },

    /// Asks the user to confirm deleting a post.
    ///
    /// The runtime answers with a delete-confirmation event for `post_id`.
    ConfirmDelete {
        prompt: String,
        post_id: String,
    },

    /// Opens the external post editor for one of the viewer's posts.
    OpenEditor {
        post_id: String,
    },
}
