//! Single-frame navigation state and host back-button ownership.

use super::registry::ViewRegistry;
use super::{BackAction, NavigateOptions, ViewId, ViewKind};
use crate::host::{BackBinding, HostShell};
use crate::i18n::Translate;
use std::rc::Rc;

/// The one active view and how to leave it.
#[derive(Debug, Clone)]
pub struct NavigationFrame {
    pub view: ViewId,
    pub kind: ViewKind,
    /// Host registration for the back button; `None` on the root view.
    pub binding: Option<BackBinding>,
    /// What a back press does while this frame is active.
    pub back: BackAction,
    /// Where [`NavController::close_overlay`] goes; set for overlays only.
    pub return_target: Option<ViewId>,
}

/// A completed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub view: ViewId,
    pub previous: Option<ViewId>,
}

/// Owns the active [`NavigationFrame`] and is the only code that binds the host
/// back button.
pub struct NavController {
    registry: ViewRegistry,
    host: Rc<dyn HostShell>,
    labels: Rc<dyn Translate>,
    frame: Option<NavigationFrame>,
    generation: u64,
}

impl std::fmt::Debug for NavController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavController")
            .field("frame", &self.frame)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl NavController {
    #[must_use]
    pub fn new(registry: ViewRegistry, host: Rc<dyn HostShell>, labels: Rc<dyn Translate>) -> Self {
        Self {
            registry,
            host,
            labels,
            frame: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn host(&self) -> Rc<dyn HostShell> {
        Rc::clone(&self.host)
    }

    #[must_use]
    pub fn frame(&self) -> Option<&NavigationFrame> {
        self.frame.as_ref()
    }

    /// The visible view, or `None` before the first navigation.
    #[must_use]
    pub fn current_view(&self) -> Option<&ViewId> {
        self.frame.as_ref().map(|frame| &frame.view)
    }

    #[must_use]
    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Makes `view` the only visible view and rebinds the host controls for it.
    ///
    /// The back route is, in order of precedence: `options.back_target`,
    /// `options.on_back`, the descriptor's own back action, application exit for
    /// the root view, the recorded return target for an overlay, and finally the
    /// root view.
    ///
    /// # Returns
    ///
    /// The transition, or `None` if `view` is not registered. In that case the
    /// previous frame stays active and no host call is made.
    pub fn navigate_to(&mut self, view: &ViewId, options: NavigateOptions) -> Option<Transition> {
        let Some(descriptor) = self.registry.get(view).cloned() else {
            tracing::warn!(view = %view, "navigation to unregistered view ignored");
            return None;
        };

        let previous = self.frame.take();
        let previous_view = previous.as_ref().map(|frame| frame.view.clone());

        let return_target = match descriptor.kind {
            ViewKind::Screen => None,
            ViewKind::Overlay => previous.as_ref().and_then(|frame| match frame.kind {
                ViewKind::Overlay => frame.return_target.clone(),
                ViewKind::Screen => Some(frame.view.clone()),
            }),
        };

        let back = options
            .back_target
            .map(BackAction::Navigate)
            .or(options.on_back)
            .or_else(|| descriptor.back.clone())
            .unwrap_or_else(|| {
                if descriptor.is_root {
                    BackAction::ExitApp
                } else if let Some(target) = return_target.clone() {
                    BackAction::Navigate(target)
                } else {
                    self.registry.root().map_or(BackAction::ExitApp, |root| {
                        BackAction::Navigate(root.id.clone())
                    })
                }
            });

        if let Some(old) = previous.as_ref().and_then(|frame| frame.binding) {
            self.host.unbind_back(old);
        }

        let binding = if descriptor.is_root {
            self.host.set_close_visible(true);
            None
        } else {
            self.generation += 1;
            let binding = BackBinding(self.generation);
            self.host.set_close_visible(false);
            self.host.bind_back(binding);
            Some(binding)
        };

        match descriptor.primary_action.as_deref() {
            Some(key) => self.host.show_primary_action(&self.labels.translate(key, &[])),
            None => self.host.hide_primary_action(),
        }

        tracing::debug!(
            view = %view,
            previous = ?previous_view,
            back = ?back,
            binding = ?binding,
            "view activated"
        );

        self.frame = Some(NavigationFrame {
            view: view.clone(),
            kind: descriptor.kind,
            binding,
            back,
            return_target,
        });

        Some(Transition {
            view: view.clone(),
            previous: previous_view,
        })
    }

    /// Returns the action bound to `binding`, or `None` if the binding is stale.
    #[must_use]
    pub fn bound_action(&self, binding: BackBinding) -> Option<BackAction> {
        match &self.frame {
            Some(frame) if frame.binding == Some(binding) => Some(frame.back.clone()),
            _ => {
                tracing::trace!(binding = binding.0, "stale back press dropped");
                None
            }
        }
    }

    /// Target to return to when the active overlay closes.
    #[must_use]
    pub fn overlay_return_target(&self) -> Option<ViewId> {
        let frame = self.frame.as_ref()?;
        if frame.kind != ViewKind::Overlay {
            tracing::warn!(view = %frame.view, "close requested but no overlay is active");
            return None;
        }
        frame.return_target.clone().or_else(|| {
            self.registry.root().map(|root| root.id.clone())
        })
    }
}
