//! Tap versus long-press disambiguation for one card.
//!
//! ```text
//! Idle ──down──▶ Pressed ──up (in slop, before deadline)──▶ Tap        ──▶ Idle
//!                   │──deadline reached──────────────────▶ LongPress  ──up──▶ Idle
//!                   └──moved beyond slop─────────────────▶ Cancelled  ──up──▶ Idle
//! ```
//!
//! The deadline is observed either by [`CardGesture::poll`] or by any later
//! pointer event whose timestamp is past it. While a press is live the host's
//! vertical swipe-to-dismiss is suspended; it is restored on every exit path,
//! including dropping the gesture mid-press.

use crate::domain::{ItemKey, Millis};
use crate::host::{HostShell, Impact};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Which part of the card a tap landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressTarget {
    /// The card body.
    #[default]
    Primary,
    /// A secondary hit area such as the author avatar.
    Secondary,
}

/// Result of a resolved press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressOutcome {
    Tap(PressTarget),
    LongPress,
    Cancelled,
}

/// Timing and movement thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressConfig {
    /// Hold time after which a press becomes a long-press.
    pub long_press: Millis,
    /// Movement on either axis tolerated before the press is cancelled.
    pub slop: f64,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            long_press: 300,
            slop: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PressState {
    Idle,
    Pressed { x: f64, y: f64, deadline: Millis },
    /// Long-pressed or cancelled; waiting for the pointer to lift.
    Resolved,
}

/// Pointer state machine for a single card.
pub struct CardGesture {
    card: ItemKey,
    config: PressConfig,
    host: Rc<dyn HostShell>,
    state: PressState,
    swipe_suspended: bool,
    disabled: bool,
}

impl std::fmt::Debug for CardGesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardGesture")
            .field("card", &self.card)
            .field("state", &self.state)
            .field("swipe_suspended", &self.swipe_suspended)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl CardGesture {
    #[must_use]
    pub fn new(card: ItemKey, config: PressConfig, host: Rc<dyn HostShell>) -> Self {
        Self {
            card,
            config,
            host,
            state: PressState::Idle,
            swipe_suspended: false,
            disabled: false,
        }
    }

    /// A gesture that ignores all input, used for the highlighted clone of a card.
    #[must_use]
    pub fn disabled(card: ItemKey, host: Rc<dyn HostShell>) -> Self {
        let mut gesture = Self::new(card, PressConfig::default(), host);
        gesture.disabled = true;
        gesture
    }

    #[must_use]
    pub fn card(&self) -> &ItemKey {
        &self.card
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, PressState::Pressed { .. })
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        match self.state {
            PressState::Pressed { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Starts a press at `(x, y)`.
    pub fn pointer_down(&mut self, x: f64, y: f64, now: Millis) {
        if self.disabled {
            return;
        }
        self.suspend_swipe();
        self.state = PressState::Pressed {
            x,
            y,
            deadline: now.saturating_add(self.config.long_press),
        };
        tracing::trace!(card = %self.card, x, y, "press started");
    }

    /// Fires the long-press if the deadline has passed.
    pub fn poll(&mut self, now: Millis) -> Option<PressOutcome> {
        if self.disabled {
            return None;
        }
        match self.state {
            PressState::Pressed { deadline, .. } if now >= deadline => {
                self.state = PressState::Resolved;
                self.host.impact(Impact::Heavy);
                self.resume_swipe();
                tracing::debug!(card = %self.card, "long press");
                Some(PressOutcome::LongPress)
            }
            _ => None,
        }
    }

    /// Tracks movement; cancels the press once it leaves the slop box.
    pub fn pointer_move(&mut self, x: f64, y: f64, now: Millis) -> Option<PressOutcome> {
        if let Some(outcome) = self.poll(now) {
            return Some(outcome);
        }
        match self.state {
            PressState::Pressed {
                x: start_x,
                y: start_y,
                ..
            } if (x - start_x).abs() > self.config.slop || (y - start_y).abs() > self.config.slop => {
                self.state = PressState::Resolved;
                self.resume_swipe();
                tracing::trace!(card = %self.card, "press cancelled by movement");
                Some(PressOutcome::Cancelled)
            }
            _ => None,
        }
    }

    /// Ends the press. A tap is reported only if the press is still live.
    pub fn pointer_up(&mut self, target: PressTarget, now: Millis) -> Option<PressOutcome> {
        if let Some(outcome) = self.poll(now) {
            self.state = PressState::Idle;
            return Some(outcome);
        }
        let outcome = match self.state {
            PressState::Pressed { .. } => Some(PressOutcome::Tap(target)),
            PressState::Idle | PressState::Resolved => None,
        };
        self.state = PressState::Idle;
        self.resume_swipe();
        outcome
    }

    /// The platform aborted the pointer sequence.
    pub fn pointer_cancel(&mut self) -> Option<PressOutcome> {
        let outcome = match self.state {
            PressState::Pressed { .. } => Some(PressOutcome::Cancelled),
            PressState::Idle | PressState::Resolved => None,
        };
        self.state = PressState::Idle;
        self.resume_swipe();
        outcome
    }

    fn suspend_swipe(&mut self) {
        if !self.swipe_suspended {
            self.host.set_vertical_swipes(false);
            self.swipe_suspended = true;
        }
    }

    fn resume_swipe(&mut self) {
        if self.swipe_suspended {
            self.host.set_vertical_swipes(true);
            self.swipe_suspended = false;
        }
    }
}

impl Drop for CardGesture {
    fn drop(&mut self) {
        self.resume_swipe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};

    fn gesture() -> (Rc<RecordingHost>, CardGesture) {
        let host = Rc::new(RecordingHost::default());
        let g = CardGesture::new(
            ItemKey::new("p1"),
            PressConfig::default(),
            Rc::clone(&host) as Rc<dyn HostShell>,
        );
        (host, g)
    }

    #[test]
    fn quick_release_is_a_tap() {
        let (host, mut g) = gesture();
        g.pointer_down(10.0, 10.0, 1_000);
        assert!(!host.swipes_enabled());
        assert_eq!(
            g.pointer_up(PressTarget::Primary, 1_100),
            Some(PressOutcome::Tap(PressTarget::Primary))
        );
        assert!(host.swipes_enabled());
        assert!(!host.calls().iter().any(|c| matches!(c, HostCall::Impact { .. })));
    }

    #[test]
    fn secondary_target_is_reported() {
        let (_host, mut g) = gesture();
        g.pointer_down(0.0, 0.0, 0);
        assert_eq!(
            g.pointer_up(PressTarget::Secondary, 50),
            Some(PressOutcome::Tap(PressTarget::Secondary))
        );
    }

    #[test]
    fn holding_past_deadline_is_a_long_press() {
        let (host, mut g) = gesture();
        g.pointer_down(10.0, 10.0, 0);
        assert_eq!(g.poll(299), None);
        assert_eq!(g.poll(400), Some(PressOutcome::LongPress));
        assert!(host.swipes_enabled());
        assert!(host.calls().contains(&HostCall::Impact {
            strength: Impact::Heavy
        }));
        assert_eq!(g.pointer_up(PressTarget::Primary, 450), None);
    }

    #[test]
    fn late_pointer_up_observes_the_deadline() {
        let (_host, mut g) = gesture();
        g.pointer_down(10.0, 10.0, 0);
        assert_eq!(
            g.pointer_up(PressTarget::Primary, 400),
            Some(PressOutcome::LongPress)
        );
        assert!(!g.is_pressed());
    }

    #[test]
    fn movement_beyond_slop_cancels() {
        let (host, mut g) = gesture();
        g.pointer_down(10.0, 10.0, 0);
        assert_eq!(g.pointer_move(13.0, 14.0, 50), None);
        assert_eq!(g.pointer_move(10.0, 20.0, 100), Some(PressOutcome::Cancelled));
        assert!(host.swipes_enabled());
        assert_eq!(g.poll(1_000), None);
        assert_eq!(g.pointer_up(PressTarget::Primary, 150), None);
    }

    #[test]
    fn cancel_and_drop_restore_swipe() {
        let (host, mut g) = gesture();
        g.pointer_down(0.0, 0.0, 0);
        assert_eq!(g.pointer_cancel(), Some(PressOutcome::Cancelled));
        assert!(host.swipes_enabled());

        g.pointer_down(0.0, 0.0, 10);
        assert!(!host.swipes_enabled());
        drop(g);
        assert!(host.swipes_enabled());
    }

    #[test]
    fn disabled_clone_ignores_input() {
        let host = Rc::new(RecordingHost::default());
        let mut g = CardGesture::disabled(ItemKey::new("clone"), Rc::clone(&host) as Rc<dyn HostShell>);
        g.pointer_down(0.0, 0.0, 0);
        assert_eq!(g.poll(1_000), None);
        assert_eq!(g.pointer_up(PressTarget::Primary, 1_000), None);
        assert!(host.calls().is_empty());
    }
}
