//! Context-menu placement for a long-pressed card.
//!
//! The menu opens centred under the card. When the space below the card cannot
//! hold the gap, the menu and the bottom safe area, the highlighted clone and the menu
//! are lifted together by the same negative vertical adjustment, so the menu
//! bottom lands on the safe area.

use crate::domain::{ItemKey, Rect, Viewport};
use crate::host::HostShell;
use serde::{Deserialize, Serialize};

/// Menu dimensions and screen insets, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MenuGeometry {
    pub width: f64,
    /// Height used for placement before the menu has been measured.
    pub height_estimate: f64,
    pub margin: f64,
    /// Distance between the card bottom and the menu top.
    pub gap: f64,
    pub bottom_safe_area: f64,
}

impl Default for MenuGeometry {
    fn default() -> Self {
        Self {
            width: 250.0,
            height_estimate: 200.0,
            margin: 16.0,
            gap: 12.0,
            bottom_safe_area: 40.0,
        }
    }
}

/// Spring used for both the clone and the menu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringTransition {
    pub stiffness: f64,
    pub damping: f64,
}

impl Default for SpringTransition {
    fn default() -> Self {
        Self {
            stiffness: 300.0,
            damping: 25.0,
        }
    }
}

/// Target of one animated element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Motion {
    pub translate_y: f64,
    pub scale: f64,
    pub transition: SpringTransition,
}

/// Clone and menu motion derived from one layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayMotions {
    pub clone: Motion,
    pub menu: Motion,
}

/// Placement computed once when the menu opens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextMenuLayout {
    pub card: Rect,
    pub menu: Rect,
    /// Zero or negative; applied to both the clone and the menu.
    pub vertical_adjust: f64,
}

impl ContextMenuLayout {
    /// Highlight scale of the card clone.
    pub const CLONE_SCALE: f64 = 1.02;

    #[must_use]
    pub fn motions(&self, transition: SpringTransition) -> OverlayMotions {
        OverlayMotions {
            clone: Motion {
                translate_y: self.vertical_adjust,
                scale: Self::CLONE_SCALE,
                transition,
            },
            menu: Motion {
                translate_y: self.vertical_adjust,
                scale: 1.0,
                transition,
            },
        }
    }
}

/// Computes [`ContextMenuLayout`]s from live measurements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextMenuPositioner {
    geometry: MenuGeometry,
}

impl ContextMenuPositioner {
    #[must_use]
    pub fn new(geometry: MenuGeometry) -> Self {
        Self { geometry }
    }

    /// Measures `card` through the host right now and places the menu.
    ///
    /// Returns `None` if the card cannot be measured (detached or zero-sized).
    pub fn position(&self, host: &dyn HostShell, card: &ItemKey) -> Option<ContextMenuLayout> {
        let rect = host.measure_card(card);
        let layout = self.compute(rect, host.viewport());
        if layout.is_none() {
            tracing::debug!(card = %card, "card not measurable, context menu not opened");
        }
        layout
    }

    /// Places the menu for a card at `card` inside `viewport`.
    #[must_use]
    pub fn compute(&self, card: Rect, viewport: Viewport) -> Option<ContextMenuLayout> {
        if card.is_unmeasurable() {
            return None;
        }
        let g = &self.geometry;

        let centred = card.left + card.width / 2.0 - g.width / 2.0;
        let left = centred.min(viewport.width - g.width - g.margin).max(g.margin);

        let space_below = viewport.height - card.bottom();
        let needed = g.gap + g.height_estimate + g.bottom_safe_area;
        let vertical_adjust = if space_below < needed {
            space_below - needed
        } else {
            0.0
        };

        Some(ContextMenuLayout {
            card,
            menu: Rect::new(left, card.bottom() + g.gap, g.width, g.height_estimate),
            vertical_adjust,
        })
    }
}

/// Entries offered by the post context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    Respond,
    Repost,
    ViewProfile,
    Edit,
    Delete,
}

impl MenuAction {
    /// Entries for a post, depending on whether the viewer wrote it.
    #[must_use]
    pub fn for_post(own: bool) -> &'static [Self] {
        if own {
            &[Self::Edit, Self::Repost, Self::Delete]
        } else {
            &[Self::Respond, Self::Repost, Self::ViewProfile]
        }
    }

    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Respond => "action_respond",
            Self::Repost => "action_repost",
            Self::ViewProfile => "action_view_profile",
            Self::Edit => "action_edit",
            Self::Delete => "action_delete",
        }
    }

    #[must_use]
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSession {
    pub card: ItemKey,
    pub layout: ContextMenuLayout,
    pub actions: Vec<MenuAction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    const VIEWPORT: Viewport = Viewport::new(390.0, 844.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn centres_under_card_with_room_below() {
        let layout = ContextMenuPositioner::default()
            .compute(Rect::new(20.0, 100.0, 350.0, 120.0), VIEWPORT)
            .unwrap();
        assert!(close(layout.menu.left, 20.0 + 175.0 - 125.0));
        assert!(close(layout.menu.top, 232.0));
        assert!(close(layout.vertical_adjust, 0.0));
    }

    #[test]
    fn clamps_at_the_right_edge() {
        let layout = ContextMenuPositioner::default()
            .compute(Rect::new(300.0, 100.0, 80.0, 60.0), VIEWPORT)
            .unwrap();
        assert!(close(layout.menu.left, 390.0 - 250.0 - 16.0));
        assert!(layout.menu.right() <= VIEWPORT.width - 16.0 + 1e-9);
    }

    #[test]
    fn clamps_at_the_left_edge_and_on_narrow_screens() {
        let positioner = ContextMenuPositioner::default();
        let layout = positioner
            .compute(Rect::new(0.0, 100.0, 40.0, 60.0), VIEWPORT)
            .unwrap();
        assert!(close(layout.menu.left, 16.0));

        let narrow = positioner
            .compute(Rect::new(0.0, 100.0, 200.0, 60.0), Viewport::new(240.0, 800.0))
            .unwrap();
        assert!(close(narrow.menu.left, 16.0));
    }

    #[test]
    fn lifts_clone_and_menu_near_the_bottom() {
        let card = Rect::new(20.0, 600.0, 350.0, 120.0);
        let layout = ContextMenuPositioner::default().compute(card, VIEWPORT).unwrap();
        // space below 124, needs 252
        assert!(close(layout.vertical_adjust, -(252.0 - 124.0)));
        let menu_bottom = layout.menu.top + layout.vertical_adjust + layout.menu.height;
        assert!(close(menu_bottom, 844.0 - 40.0));

        let motions = layout.motions(SpringTransition::default());
        assert!(close(motions.clone.translate_y, motions.menu.translate_y));
        assert_eq!(motions.clone.transition, motions.menu.transition);
        assert!(close(motions.clone.scale, 1.02));
    }

    #[test]
    fn counts_the_gap_when_deciding_to_lift() {
        let positioner = ContextMenuPositioner::default();
        let safe_bottom = VIEWPORT.height - 40.0;

        // space below 245: enough for menu and safe area, not for the gap too
        let card = Rect::new(20.0, 479.0, 350.0, 120.0);
        let layout = positioner.compute(card, VIEWPORT).unwrap();
        assert!(close(layout.vertical_adjust, -7.0));
        let menu_bottom = layout.menu.top + layout.vertical_adjust + layout.menu.height;
        assert!(close(menu_bottom, safe_bottom));

        // exactly 252 below: fits without lifting
        let card = Rect::new(20.0, 472.0, 350.0, 120.0);
        let layout = positioner.compute(card, VIEWPORT).unwrap();
        assert!(close(layout.vertical_adjust, 0.0));
        assert!(layout.menu.top + layout.menu.height <= safe_bottom + 1e-9);
    }

    #[test]
    fn declines_unmeasurable_cards() {
        let host = RecordingHost::default();
        let positioner = ContextMenuPositioner::default();
        assert!(positioner.position(&host, &ItemKey::new("gone")).is_none());

        host.place_card(ItemKey::new("p1"), Rect::new(10.0, 10.0, 100.0, 50.0));
        let layout = positioner.position(&host, &ItemKey::new("p1")).unwrap();
        assert!(close(layout.card.top, 10.0));
    }

    #[test]
    fn menu_entries_depend_on_ownership() {
        assert_eq!(
            MenuAction::for_post(true),
            &[MenuAction::Edit, MenuAction::Repost, MenuAction::Delete]
        );
        assert_eq!(
            MenuAction::for_post(false),
            &[MenuAction::Respond, MenuAction::Repost, MenuAction::ViewProfile]
        );
        assert!(MenuAction::Delete.is_destructive());
    }
}
