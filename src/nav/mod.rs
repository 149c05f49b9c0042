//! Navigation stack controller.
//!
//! Exactly one registered view is visible at a time. Navigating replaces the
//! active frame instead of stacking it; overlays remember the view they were
//! opened from so closing them restores it.
//!
//! The host back button is bound only here. Every navigation unbinds the old
//! handler before binding a new one, and every binding carries a generation id so
//! a press that reaches a superseded handler is ignored.
//!
//! # Modules
//!
//! - [`controller`]: frame state and host bindings ([`NavController`])
//! - [`registry`]: the fixed view set ([`ViewRegistry`])
//!
//! [`Navigator`] wraps the controller with the message bus: it publishes
//! [`ViewChanged`] after every transition and follows selector requests.

pub mod controller;
pub mod registry;

pub use controller::{NavController, NavigationFrame, Transition};
pub use registry::ViewRegistry;

use crate::bus::{
    BusMessage, IslandId, MessageBus, OpenFilterSelector, ReturnToList, Subscription, ViewChanged,
    WeakBus,
};
use crate::host::BackBinding;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier of a registered view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full screen or overlay on top of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Screen,
    Overlay,
}

/// What a host back press does.
#[derive(Clone)]
pub enum BackAction {
    /// Show another view.
    Navigate(ViewId),
    /// Close the mini-app.
    ExitApp,
    /// Publish a message on the bus (used by overlays to hand control back).
    Publish(BusMessage),
    /// Run caller-supplied code.
    Callback(Rc<dyn Fn()>),
}

impl fmt::Debug for BackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(view) => f.debug_tuple("Navigate").field(view).finish(),
            Self::ExitApp => f.write_str("ExitApp"),
            Self::Publish(message) => f.debug_tuple("Publish").field(&message.topic()).finish(),
            Self::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// Static description of a view, registered once at startup.
#[derive(Debug, Clone)]
pub struct ViewDescriptor {
    pub id: ViewId,
    pub kind: ViewKind,
    pub back: Option<BackAction>,
    /// Label key of the host primary action button, if the view shows it.
    pub primary_action: Option<String>,
    pub is_root: bool,
}

impl ViewDescriptor {
    #[must_use]
    pub fn screen(id: &str) -> Self {
        Self::with_kind(id, ViewKind::Screen)
    }

    #[must_use]
    pub fn overlay(id: &str) -> Self {
        Self::with_kind(id, ViewKind::Overlay)
    }

    fn with_kind(id: &str, kind: ViewKind) -> Self {
        Self {
            id: ViewId::new(id),
            kind,
            back: None,
            primary_action: None,
            is_root: false,
        }
    }

    #[must_use]
    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    #[must_use]
    pub fn with_back(mut self, back: Option<BackAction>) -> Self {
        self.back = back;
        self
    }

    #[must_use]
    pub fn with_primary_action(mut self, label_key: &str) -> Self {
        self.primary_action = Some(label_key.to_string());
        self
    }
}

/// Per-call overrides for the back route.
#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
    /// Navigate to this view on back. Takes precedence over everything else.
    pub back_target: Option<ViewId>,
    /// Run this action on back.
    pub on_back: Option<BackAction>,
}

impl NavigateOptions {
    #[must_use]
    pub fn on_back(action: BackAction) -> Self {
        Self {
            back_target: None,
            on_back: Some(action),
        }
    }
}

/// Shared handle over the [`NavController`] that also talks to the bus.
#[derive(Debug, Clone)]
pub struct Navigator {
    controller: Rc<RefCell<NavController>>,
    bus: MessageBus,
}

impl Navigator {
    #[must_use]
    pub fn new(controller: NavController, bus: MessageBus) -> Self {
        Self {
            controller: Rc::new(RefCell::new(controller)),
            bus,
        }
    }

    /// Navigates and, on success, publishes [`ViewChanged`].
    ///
    /// Returns `false` if the view is not registered.
    pub fn navigate_to(&self, view: &ViewId, options: NavigateOptions) -> bool {
        let transition = self.controller.borrow_mut().navigate_to(view, options);
        match transition {
            Some(Transition { view, previous }) => {
                self.bus
                    .publish(IslandId::NAVIGATOR, ViewChanged { view, previous });
                true
            }
            None => false,
        }
    }

    /// Handles a host back press carrying `binding`.
    ///
    /// Only the currently bound action runs; a stale binding is ignored.
    pub fn press_back(&self, binding: BackBinding) {
        let action = self.controller.borrow().bound_action(binding);
        if let Some(action) = action {
            self.run(action);
        }
    }

    /// Closes the active overlay, returning to the view it was opened from.
    pub fn close_overlay(&self) -> bool {
        let target = self.controller.borrow().overlay_return_target();
        target.is_some_and(|target| self.navigate_to(&target, NavigateOptions::default()))
    }

    #[must_use]
    pub fn current_view(&self) -> Option<ViewId> {
        self.controller.borrow().current_view().cloned()
    }

    /// Read access to the controller, for inspection.
    pub fn with_controller<R>(&self, f: impl FnOnce(&NavController) -> R) -> R {
        f(&self.controller.borrow())
    }

    fn run(&self, action: BackAction) {
        tracing::debug!(action = ?action, "back pressed");
        match action {
            BackAction::Navigate(view) => {
                self.navigate_to(&view, NavigateOptions::default());
            }
            BackAction::ExitApp => {
                let host = self.controller.borrow().host();
                host.close_app();
            }
            BackAction::Publish(message) => message.publish_on(&self.bus, IslandId::NAVIGATOR),
            BackAction::Callback(callback) => callback(),
        }
    }

    /// Subscribes the navigator to the messages that move between views.
    ///
    /// - [`OpenFilterSelector`] shows the selector overlay; back from it publishes
    ///   [`ReturnToList`] for the source list.
    /// - [`ReturnToList`] shows the list's screen.
    #[must_use = "the navigator stops following the bus when the subscriptions drop"]
    pub fn attach(&self) -> Vec<Subscription> {
        let open = self.downgrade();
        let back = self.downgrade();
        vec![
            self.bus.subscribe::<OpenFilterSelector, _>(move |env| {
                let Some(nav) = open.upgrade() else { return };
                let cancel = BusMessage::from(ReturnToList {
                    list: env.payload.list,
                });
                nav.navigate_to(
                    &ViewId::new(registry::FILTER_SELECTOR),
                    NavigateOptions::on_back(BackAction::Publish(cancel)),
                );
            }),
            self.bus.subscribe::<ReturnToList, _>(move |env| {
                let Some(nav) = back.upgrade() else { return };
                nav.navigate_to(&env.payload.list.view_id(), NavigateOptions::default());
            }),
        ]
    }

    fn downgrade(&self) -> WeakNavigator {
        WeakNavigator {
            controller: Rc::downgrade(&self.controller),
            bus: self.bus.downgrade(),
        }
    }
}

struct WeakNavigator {
    controller: Weak<RefCell<NavController>>,
    bus: WeakBus,
}

impl WeakNavigator {
    fn upgrade(&self) -> Option<Navigator> {
        Some(Navigator {
            controller: self.controller.upgrade()?,
            bus: self.bus.upgrade()?,
        })
    }
}
