//! The HTTP seam: fetching the IDs behind "select all" and submitting bulk
//! actions.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{
    StatusCode, Url,
    header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap},
};
use serde::Deserialize;

use crate::{
    BulkActionForm, BulkActionResponse, ClientConfig, Error, HtmlPage, TransactionId, logging,
};

/// The header the server checks to decide whether to answer with JSON
/// instead of rendering the page.
const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// The header carrying the CSRF token on form submissions.
const CSRF_TOKEN_HEADER: &str = "X-CSRFToken";

/// Looks up every transaction matching the filter of a transactions page.
#[async_trait]
pub trait TransactionIdSource: Send + Sync {
    /// Get the IDs of all transactions matching the filter in `page_url`,
    /// across every page of results.
    async fn matching_transaction_ids(&self, page_url: &Url) -> Result<Vec<TransactionId>, Error>;
}

/// Sends a bulk action form to the server.
#[async_trait]
pub trait BulkActionSink: Send + Sync {
    /// Submit `form` to `action_url`.
    async fn submit(
        &self,
        action_url: &Url,
        form: &BulkActionForm,
        csrf_token: &str,
    ) -> Result<BulkActionResponse, Error>;
}

#[derive(Debug, Deserialize)]
struct TransactionIdsResponse {
    transaction_ids: Vec<TransactionId>,
}

#[derive(Debug, Deserialize)]
struct RedirectResponse {
    redirect_url: Option<String>,
}

/// Talks to the budgetlog server over HTTP.
///
/// Cookies set by the server (e.g., the CSRF cookie) are kept for the
/// lifetime of the client. No request timeout is configured.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    default_export_filename: String,
}

impl HttpClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Network] if the underlying HTTP client cannot be
    /// initialised, e.g., the TLS backend fails to load.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            default_export_filename: config.default_export_filename.clone(),
        })
    }

    /// Fetch and parse the HTML page at `url`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HttpStatus] for a non-success response and an
    /// [Error::Network] if the request fails.
    pub async fn fetch_page(&self, url: &Url) -> Result<HtmlPage, Error> {
        tracing::debug!("fetching page {url}");
        let response = self.client.get(url.clone()).send().await?;
        check_status(response.status())?;

        // Follow redirects so the page knows where it really ended up.
        let final_url = response.url().clone();
        let html = response.text().await?;

        Ok(HtmlPage::parse(final_url, &html))
    }
}

#[async_trait]
impl TransactionIdSource for HttpClient {
    async fn matching_transaction_ids(&self, page_url: &Url) -> Result<Vec<TransactionId>, Error> {
        tracing::debug!("requesting all transaction IDs matching {page_url}");

        let response = self
            .client
            .get(page_url.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        check_status(response.status())?;

        let body = response.bytes().await?;
        let parsed: TransactionIdsResponse = serde_json::from_slice(&body)
            .map_err(|error| Error::InvalidResponse(error.to_string()))?;

        tracing::debug!(
            "server returned {} matching transaction IDs",
            parsed.transaction_ids.len()
        );
        Ok(parsed.transaction_ids)
    }
}

#[async_trait]
impl BulkActionSink for HttpClient {
    async fn submit(
        &self,
        action_url: &Url,
        form: &BulkActionForm,
        csrf_token: &str,
    ) -> Result<BulkActionResponse, Error> {
        let body = form.to_urlencoded()?;
        logging::log_request_body(action_url, &body);

        let response = self
            .client
            .post(action_url.clone())
            .header(CSRF_TOKEN_HEADER, csrf_token)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;
        check_status(response.status())?;

        let content_type = header_text(response.headers(), CONTENT_TYPE.as_str());

        if content_type.contains("application/json") {
            let body = response.bytes().await?;
            let redirect: RedirectResponse = serde_json::from_slice(&body)
                .map_err(|error| Error::InvalidResponse(error.to_string()))?;

            Ok(BulkActionResponse::Redirect(redirect.redirect_url))
        } else {
            let filename = attachment_filename(&header_text(
                response.headers(),
                CONTENT_DISPOSITION.as_str(),
            ))
            .unwrap_or_else(|| self.default_export_filename.clone());
            let bytes = response.bytes().await?.to_vec();

            tracing::debug!("received {} byte download {filename}", bytes.len());
            Ok(BulkActionResponse::Download { filename, bytes })
        }
    }
}

fn check_status(status: StatusCode) -> Result<(), Error> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::HttpStatus(status.as_u16()))
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Extract the filename from a `Content-Disposition` header value such as
/// `attachment; filename="transactions.csv"`.
///
/// Only the final path component is kept, so the name can never point
/// outside the directory it is saved in.
fn attachment_filename(content_disposition: &str) -> Option<String> {
    content_disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .and_then(|filename| filename.trim_matches('"').rsplit('\\').next())
        .and_then(|filename| Path::new(filename).file_name()?.to_str())
        .filter(|filename| !matches!(*filename, "" | "." | ".."))
        .map(str::to_owned)
}
