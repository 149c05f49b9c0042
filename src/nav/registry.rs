//! The application's fixed set of views.

use super::{BackAction, ViewDescriptor, ViewId};

pub const PROFILE: &str = "profile";
pub const PEOPLE: &str = "people";
pub const POSTS: &str = "posts";
pub const PROFILE_FORM: &str = "profile_form";
pub const SETTINGS: &str = "settings";
pub const POST_EDITOR: &str = "post_editor";
pub const FILTER_SELECTOR: &str = "filter_selector";

/// Registered view descriptors, looked up by id.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: Vec<ViewDescriptor>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        let to_profile = || Some(BackAction::Navigate(ViewId::new(PROFILE)));
        Self::new(vec![
            ViewDescriptor::screen(PROFILE).root(),
            ViewDescriptor::screen(PEOPLE).with_back(to_profile()),
            ViewDescriptor::screen(POSTS).with_back(to_profile()),
            ViewDescriptor::screen(PROFILE_FORM)
                .with_back(to_profile())
                .with_primary_action("save_button"),
            ViewDescriptor::screen(SETTINGS).with_back(to_profile()),
            ViewDescriptor::overlay(POST_EDITOR)
                .with_back(Some(BackAction::Navigate(ViewId::new(POSTS))))
                .with_primary_action("publish"),
            ViewDescriptor::overlay(FILTER_SELECTOR),
        ])
    }
}

impl ViewRegistry {
    /// Builds a registry from `views`. The first view marked root becomes the root.
    #[must_use]
    pub fn new(views: Vec<ViewDescriptor>) -> Self {
        Self { views }
    }

    #[must_use]
    pub fn get(&self, id: &ViewId) -> Option<&ViewDescriptor> {
        self.views.iter().find(|view| &view.id == id)
    }

    #[must_use]
    pub fn root(&self) -> Option<&ViewDescriptor> {
        self.views.iter().find(|view| view.is_root)
    }
}
