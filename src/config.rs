//! Settings shared by the page components and the HTTP client.

use crate::TransactionsArea;

/// The config for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The part of the site in which the selection is kept between pages.
    pub transactions_area: TransactionsArea,
    /// The filename to save an export under when the server does not name it.
    pub default_export_filename: String,
    /// The `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transactions_area: TransactionsArea::default(),
            default_export_filename: "transactions.csv".to_owned(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}
