//! Client-side behaviour for the budgetlog transaction list and chart views.
//!
//! The browser is modelled as a set of injected seams:
//! - [Page] answers DOM queries and applies checkbox/field updates,
//! - [Storage] plays the role of the browser's local storage,
//! - [TransactionIdSource] and [BulkActionSink] perform the HTTP calls.
//!
//! [SelectionSetManager] keeps a set of selected transactions alive across
//! page navigation, and [submit_bulk_action] hands that set to the server.
//! The remaining modules hold the small amount of state behind the filter
//! panel, the amount slider, the chart modal and the navigation menu.

#![warn(missing_docs)]

mod amount_slider;
mod bulk_action;
mod chart;
mod chart_modal;
mod client;
mod config;
mod filter_panel;
mod logging;
mod navigation;
mod page;
mod selection;
mod storage;
mod transaction_id;
mod transactions_page;

#[cfg(test)]
mod test_utils;

pub use amount_slider::AmountSlider;
pub use bulk_action::{BulkAction, BulkActionForm, BulkActionResponse, submit_bulk_action};
pub use chart::{ChartCategory, ChartData, ChartSource, Dataset, chart_view};
pub use chart_modal::{ChartModal, DragScroll};
pub use client::{BulkActionSink, HttpClient, TransactionIdSource};
pub use config::ClientConfig;
pub use filter_panel::FilterPanel;
pub use logging::setup_logging;
pub use navigation::NavMenu;
pub use page::{HtmlPage, Page, TransactionsArea, element_ids};
pub use selection::{Expansion, SelectionSet, SelectionSetManager};
pub use storage::{
    FILTER_VISIBLE_KEY, JsonFileStorage, MemoryStorage, SELECTED_TRANSACTIONS_KEY, Storage,
};
pub use transaction_id::TransactionId;
pub use transactions_page::TransactionsPage;

/// The errors that may occur in the client.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// A string could not be used as a transaction identifier, e.g., it was
    /// empty or only whitespace.
    #[error("\"{0}\" is not a valid transaction ID")]
    InvalidTransactionId(String),

    /// The storage backend rejected a read or write.
    ///
    /// Storage may be disabled, full or backed by a file that cannot be
    /// written. Callers on the page-load path should log this error and
    /// carry on as if nothing was stored.
    #[error("storage is unavailable: {0}")]
    Storage(String),

    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status code.
    #[error("the server responded with status {0}")]
    HttpStatus(u16),

    /// The server answered with a body that did not have the expected shape.
    #[error("unexpected response from the server: {0}")]
    InvalidResponse(String),

    /// A bulk action was submitted while a "select all matching filter"
    /// request was still in flight.
    ///
    /// The selection is incomplete until the request resolves, so the
    /// submission is refused rather than sent with a partial selection.
    #[error("cannot submit while the selection is still being expanded")]
    SelectAllPending,

    /// The page does not carry a CSRF token, which the server requires for
    /// every bulk action.
    #[error("the page does not contain a CSRF token")]
    MissingCsrfToken,

    /// The page has no bulk action form, or its `action` attribute is not a
    /// usable URL.
    #[error("could not determine where to submit the bulk action form")]
    MissingFormAction,

    /// A data attribute needed to set up the amount slider is missing or is
    /// not a number.
    #[error("invalid amount slider attribute \"{0}\"")]
    InvalidSliderAttribute(String),

    /// A URL could not be parsed.
    #[error("invalid URL \"{0}\"")]
    InvalidUrl(String),

    /// A file named by the user, e.g., a saved page or a download
    /// destination, could not be read or written.
    #[error("could not access file {path}: {reason}")]
    File {
        /// The file that was accessed.
        path: String,
        /// Why the access failed.
        reason: String,
    },

    /// An error occurred while serializing a value as JSON or as a form.
    #[error("could not serialize: {0}")]
    SerializationError(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Error::HttpStatus(status.as_u16()),
            None => Error::Network(value.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::SerializationError(value.to_string())
    }
}

impl Error {
    pub(crate) fn file(path: &std::path::Path, error: std::io::Error) -> Self {
        Error::File {
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Storage(value.to_string())
    }
}
