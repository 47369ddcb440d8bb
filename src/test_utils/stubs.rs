use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Url;

use crate::{
    BulkActionForm, BulkActionResponse, BulkActionSink, Error, TransactionId,
    TransactionIdSource,
};

/// Answers every "select all" request with the same result and records the
/// URLs it was asked about.
pub(crate) struct StubIdSource {
    result: Result<Vec<TransactionId>, Error>,
    requested_urls: Mutex<Vec<Url>>,
}

impl StubIdSource {
    pub(crate) fn returning(ids: Vec<TransactionId>) -> Self {
        Self {
            result: Ok(ids),
            requested_urls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: Error) -> Self {
        Self {
            result: Err(error),
            requested_urls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requested_urls(&self) -> Vec<Url> {
        self.requested_urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionIdSource for StubIdSource {
    async fn matching_transaction_ids(&self, page_url: &Url) -> Result<Vec<TransactionId>, Error> {
        self.requested_urls.lock().unwrap().push(page_url.clone());
        self.result.clone()
    }
}

/// Answers every bulk action with the same result and records what was
/// submitted.
pub(crate) struct StubBulkActionSink {
    result: Result<BulkActionResponse, Error>,
    submissions: Mutex<Vec<(Url, BulkActionForm, String)>>,
}

impl StubBulkActionSink {
    pub(crate) fn returning(response: BulkActionResponse) -> Self {
        Self {
            result: Ok(response),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: Error) -> Self {
        Self {
            result: Err(error),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn submissions(&self) -> Vec<(Url, BulkActionForm, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BulkActionSink for StubBulkActionSink {
    async fn submit(
        &self,
        action_url: &Url,
        form: &BulkActionForm,
        csrf_token: &str,
    ) -> Result<BulkActionResponse, Error> {
        self.submissions.lock().unwrap().push((
            action_url.clone(),
            form.clone(),
            csrf_token.to_owned(),
        ));
        self.result.clone()
    }
}
