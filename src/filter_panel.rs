//! The collapsible filter panel above the transactions table.

use reqwest::Url;

use crate::{Storage, page::query_pairs, storage::FILTER_VISIBLE_KEY};

/// The query parameters produced by the transaction filter form.
pub const FILTER_PARAMETERS: [&str; 8] = [
    "amount_min",
    "amount_max",
    "type",
    "datestamp__gte",
    "datestamp__lte",
    "category",
    "tags",
    "description",
];

/// Whether the filter panel is expanded.
///
/// The state is remembered in storage while a filter is applied, so the
/// panel stays open when paging through filtered results. Landing on the
/// page without any filter forgets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPanel {
    visible: bool,
}

impl FilterPanel {
    /// Restore the panel's state for the page at `url`.
    pub fn load(storage: &mut impl Storage, url: &Url) -> Self {
        if !has_active_filters(url) {
            if let Err(error) = storage.remove_item(FILTER_VISIBLE_KEY) {
                tracing::warn!("could not reset filter panel state: {error}");
            }
        }

        let visible = match storage.get_item(FILTER_VISIBLE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(error) => {
                tracing::warn!("could not read filter panel state: {error}");
                false
            }
        };

        Self { visible }
    }

    /// Whether the panel is expanded.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Expand or collapse the panel and remember the new state.
    pub fn toggle(&mut self, storage: &mut impl Storage) {
        self.visible = !self.visible;

        let value = if self.visible { "true" } else { "false" };
        if let Err(error) = storage.set_item(FILTER_VISIBLE_KEY, value) {
            tracing::warn!("could not save filter panel state: {error}");
        }
    }

    /// The text for the button that toggles the panel.
    pub fn button_label(&self) -> &'static str {
        if self.visible {
            "Hide filters"
        } else {
            "Filter transactions"
        }
    }
}

/// Whether `url` carries any of the [FILTER_PARAMETERS].
pub fn has_active_filters(url: &Url) -> bool {
    query_pairs(url)
        .iter()
        .any(|(name, _)| FILTER_PARAMETERS.contains(&name.as_str()))
}
