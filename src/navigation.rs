//! The collapsible navigation menu behind the hamburger button.

/// Whether the navigation menu is expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavMenu {
    expanded: bool,
}

impl NavMenu {
    /// Create a collapsed menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on the hamburger button.
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Handle a click anywhere in the document. The menu collapses when the
    /// click lands outside both the button and the menu.
    pub fn on_document_click(&mut self, in_toggler: bool, in_menu: bool) {
        if !in_toggler && !in_menu {
            self.expanded = false;
        }
    }

    /// Whether the menu is expanded.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The CSS classes for the menu element.
    pub fn class(&self) -> &'static str {
        if self.expanded {
            "collapse navbar-collapse show"
        } else {
            "collapse navbar-collapse"
        }
    }
}
