//! Host shell that records calls instead of touching a real container.
//!
//! The headless runtime drains the recorded calls after every event and prints
//! them; tests inspect them directly. Card geometry and the viewport are set by
//! whoever drives the host.

use super::{BackBinding, HostShell, Impact, Notice};
use crate::domain::{ItemKey, Rect, Viewport};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// One call made on the host shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    BindBack { binding: BackBinding },
    UnbindBack { binding: BackBinding },
    SetCloseVisible { visible: bool },
    ShowPrimaryAction { label: String },
    HidePrimaryAction,
    Impact { strength: Impact },
    Notify { notice: Notice },
    SetVerticalSwipes { enabled: bool },
    Alert { message: String },
    CloseApp,
}

/// Recording [`HostShell`] with settable geometry.
#[derive(Debug)]
pub struct RecordingHost {
    calls: RefCell<Vec<HostCall>>,
    cards: RefCell<HashMap<ItemKey, Rect>>,
    viewport: Cell<Viewport>,
    bound: Cell<Option<BackBinding>>,
    swipes_enabled: Cell<bool>,
    primary_label: RefCell<Option<String>>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new(Viewport::new(390.0, 844.0))
    }
}

impl RecordingHost {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            cards: RefCell::new(HashMap::new()),
            viewport: Cell::new(viewport),
            bound: Cell::new(None),
            swipes_enabled: Cell::new(true),
            primary_label: RefCell::new(None),
        }
    }

    /// Records the on-screen rectangle of a card.
    pub fn place_card(&self, card: ItemKey, rect: Rect) {
        self.cards.borrow_mut().insert(card, rect);
    }

    /// Forgets a card, as if it had left the view tree.
    pub fn remove_card(&self, card: &ItemKey) {
        self.cards.borrow_mut().remove(card);
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    /// All calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Removes and returns all recorded calls.
    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// The back binding currently registered, if any.
    #[must_use]
    pub fn bound_back(&self) -> Option<BackBinding> {
        self.bound.get()
    }

    #[must_use]
    pub fn swipes_enabled(&self) -> bool {
        self.swipes_enabled.get()
    }

    #[must_use]
    pub fn primary_label(&self) -> Option<String> {
        self.primary_label.borrow().clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl HostShell for RecordingHost {
    fn bind_back(&self, binding: BackBinding) {
        if let Some(previous) = self.bound.get() {
            tracing::warn!(previous = previous.0, binding = binding.0, "back bound over a live binding");
        }
        self.bound.set(Some(binding));
        self.record(HostCall::BindBack { binding });
    }

    fn unbind_back(&self, binding: BackBinding) {
        if self.bound.get() == Some(binding) {
            self.bound.set(None);
        }
        self.record(HostCall::UnbindBack { binding });
    }

    fn set_close_visible(&self, visible: bool) {
        self.record(HostCall::SetCloseVisible { visible });
    }

    fn show_primary_action(&self, label: &str) {
        *self.primary_label.borrow_mut() = Some(label.to_string());
        self.record(HostCall::ShowPrimaryAction {
            label: label.to_string(),
        });
    }

    fn hide_primary_action(&self) {
        *self.primary_label.borrow_mut() = None;
        self.record(HostCall::HidePrimaryAction);
    }

    fn impact(&self, strength: Impact) {
        self.record(HostCall::Impact { strength });
    }

    fn notify(&self, notice: Notice) {
        self.record(HostCall::Notify { notice });
    }

    fn set_vertical_swipes(&self, enabled: bool) {
        self.swipes_enabled.set(enabled);
        self.record(HostCall::SetVerticalSwipes { enabled });
    }

    fn alert(&self, message: &str) {
        self.record(HostCall::Alert {
            message: message.to_string(),
        });
    }

    fn close_app(&self) {
        self.record(HostCall::CloseApp);
    }

    fn measure_card(&self, card: &ItemKey) -> Rect {
        self.cards.borrow().get(card).copied().unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }
}
