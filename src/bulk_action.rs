//! Submitting the selected transactions to the server's bulk action endpoint.

use std::{
    fs,
    path::{Path, PathBuf},
};

use reqwest::Url;

use crate::{
    BulkActionSink, Error, Page, SelectionSetManager, Storage,
    page::{element_ids, query_pairs},
};

/// Form fields that are always set by the client and must not be copied
/// from the page's query string.
const RESERVED_FIELDS: [&str; 8] = [
    "csrfmiddlewaretoken",
    "selected_transactions",
    "select-all-input",
    "action",
    "bulk_tag",
    "bulk_remove_tag",
    "bulk_category",
    "bulk_book",
];

/// The operations the server can apply to every selected transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    /// Delete the transactions.
    Delete,
    /// Download the transactions as a CSV file.
    ExportCsv,
    /// Add the tag with the given ID.
    AssignTag(i64),
    /// Remove the tag with the given ID.
    RemoveTag(i64),
    /// Set the category to the one with the given ID.
    ChangeCategory(i64),
    /// Move the transactions to the book with the given ID.
    MoveToBook(i64),
}

impl BulkAction {
    /// The value of the form's `action` field.
    pub fn name(&self) -> &'static str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::ExportCsv => "export_csv",
            BulkAction::AssignTag(_) => "assign_tag",
            BulkAction::RemoveTag(_) => "remove_tag",
            BulkAction::ChangeCategory(_) => "change_category",
            BulkAction::MoveToBook(_) => "move_to_book",
        }
    }

    fn target_field(&self) -> Option<(&'static str, i64)> {
        match *self {
            BulkAction::Delete | BulkAction::ExportCsv => None,
            BulkAction::AssignTag(tag_id) => Some(("bulk_tag", tag_id)),
            BulkAction::RemoveTag(tag_id) => Some(("bulk_remove_tag", tag_id)),
            BulkAction::ChangeCategory(category_id) => Some(("bulk_category", category_id)),
            BulkAction::MoveToBook(book_id) => Some(("bulk_book", book_id)),
        }
    }
}

/// The body of a bulk action submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionForm {
    /// The selected transaction IDs joined with commas.
    pub selected_transactions: String,
    /// Whether the user selected every transaction matching the filter.
    pub select_all: bool,
    /// The action to apply.
    pub action: BulkAction,
    /// The page's filter parameters. The server uses these to send the user
    /// back to the same filtered view.
    pub filters: Vec<(String, String)>,
}

impl BulkActionForm {
    /// The form's fields as name-value pairs, in submission order.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .filters
            .iter()
            .filter(|(name, _)| !RESERVED_FIELDS.contains(&name.as_str()))
            .cloned()
            .collect();

        fields.push((
            "selected_transactions".to_owned(),
            self.selected_transactions.clone(),
        ));
        fields.push((
            element_ids::SELECT_ALL_INPUT.to_owned(),
            self.select_all.to_string(),
        ));
        fields.push(("action".to_owned(), self.action.name().to_owned()));

        if let Some((name, id)) = self.action.target_field() {
            fields.push((name.to_owned(), id.to_string()));
        }

        fields
    }

    /// The form encoded as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SerializationError] if the fields cannot be encoded.
    pub fn to_urlencoded(&self) -> Result<String, Error> {
        serde_urlencoded::to_string(self.fields())
            .map_err(|error| Error::SerializationError(error.to_string()))
    }
}

/// What the server sent back for a bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkActionResponse {
    /// The action was applied and the user should be sent to the given URL,
    /// or back to the current page if none was given.
    Redirect(Option<String>),
    /// The action produced a file for the user to save.
    Download {
        /// The name the server suggested for the file.
        filename: String,
        /// The file contents.
        bytes: Vec<u8>,
    },
}

impl BulkActionResponse {
    /// Where to navigate after a redirect, resolved against `current_url`.
    /// Returns `None` for downloads or unusable redirect URLs.
    pub fn redirect_target(&self, current_url: &Url) -> Option<Url> {
        match self {
            BulkActionResponse::Redirect(Some(url)) => current_url.join(url).ok(),
            BulkActionResponse::Redirect(None) => Some(current_url.clone()),
            BulkActionResponse::Download { .. } => None,
        }
    }

    /// Write a download to `destination`, or to the server's suggested
    /// filename in the working directory. Returns where the file was saved,
    /// or `None` for a redirect.
    ///
    /// # Errors
    ///
    /// Returns an [Error::File] if the file cannot be written.
    pub fn save_download(&self, destination: Option<&Path>) -> Result<Option<PathBuf>, Error> {
        let BulkActionResponse::Download { filename, bytes } = self else {
            return Ok(None);
        };

        let path = destination.map_or_else(|| PathBuf::from(filename), Path::to_path_buf);
        fs::write(&path, bytes).map_err(|error| Error::file(&path, error))?;
        tracing::info!("saved {} bytes to {}", bytes.len(), path.display());

        Ok(Some(path))
    }
}

/// Submit `action` for the current selection.
///
/// After a redirect response the selection is cleared, since the server has
/// applied the action. A download leaves the selection as it is so the same
/// transactions can be acted on again. On error nothing changes.
///
/// # Errors
///
/// - [Error::SelectAllPending] if a "select all matching filter" request is
///   still in flight,
/// - [Error::MissingCsrfToken] if the page has no CSRF token,
/// - [Error::MissingFormAction] if the page has no usable bulk action form,
/// - any error returned by `sink`.
pub async fn submit_bulk_action<S, P, T>(
    manager: &mut SelectionSetManager<S, P>,
    sink: &T,
    action: BulkAction,
) -> Result<BulkActionResponse, Error>
where
    S: Storage,
    P: Page,
    T: BulkActionSink + ?Sized,
{
    if manager.is_expansion_pending() {
        tracing::warn!("refusing to submit {} while select all is pending", action.name());
        return Err(Error::SelectAllPending);
    }

    let csrf_token = manager.page().csrf_token().ok_or(Error::MissingCsrfToken)?;
    let action_url = form_action_url(manager.page())?;

    let form = BulkActionForm {
        selected_transactions: manager.export_for_submission(),
        select_all: manager.selection().is_select_all(),
        action,
        filters: query_pairs(manager.page().url()),
    };

    match sink.submit(&action_url, &form, &csrf_token).await {
        Ok(response @ BulkActionResponse::Redirect(_)) => {
            tracing::info!(
                "{} applied to {} transactions",
                form.action.name(),
                manager.selection().len()
            );
            manager.clear();
            Ok(response)
        }
        Ok(response) => Ok(response),
        Err(error) => {
            tracing::error!("bulk action {} failed: {error}", form.action.name());
            Err(error)
        }
    }
}

/// The URL the bulk action form posts to. An empty `action` attribute posts
/// back to the page itself, as a browser would.
fn form_action_url(page: &impl Page) -> Result<Url, Error> {
    let action = page
        .attribute(element_ids::BULK_ACTION_FORM, "action")
        .ok_or(Error::MissingFormAction)?;
    let action = action.trim();

    if action.is_empty() {
        return Ok(page.url().clone());
    }

    page.url()
        .join(action)
        .map_err(|_| Error::MissingFormAction)
}

#[cfg(test)]
mod tests {
    use crate::{
        BulkAction, BulkActionForm, BulkActionResponse, Error, HtmlPage, MemoryStorage, Page,
        SelectionSetManager, TransactionId, TransactionsArea, submit_bulk_action,
        test_utils::{StubBulkActionSink, page_url, transactions_page_html},
    };

    fn manager<'a>(
        storage: &'a mut MemoryStorage,
        path: &str,
        html: &str,
    ) -> SelectionSetManager<&'a mut MemoryStorage, HtmlPage> {
        let mut manager = SelectionSetManager::new(
            storage,
            HtmlPage::parse(page_url(path), html),
            TransactionsArea::default(),
        );
        manager.load();
        manager
    }

    fn id(raw: i64) -> TransactionId {
        TransactionId::from(raw)
    }

    #[test]
    fn form_fields_include_target_and_filters() {
        let form = BulkActionForm {
            selected_transactions: "1,2".to_owned(),
            select_all: true,
            action: BulkAction::AssignTag(7),
            filters: vec![
                ("type".to_owned(), "expense".to_owned()),
                ("action".to_owned(), "sneaky".to_owned()),
            ],
        };

        assert_eq!(
            form.to_urlencoded(),
            Ok(
                "type=expense&selected_transactions=1%2C2&select-all-input=true\
                &action=assign_tag&bulk_tag=7"
                    .to_owned()
            )
        );
    }

    #[test]
    fn action_names_match_server() {
        assert_eq!(BulkAction::Delete.name(), "delete");
        assert_eq!(BulkAction::ExportCsv.name(), "export_csv");
        assert_eq!(BulkAction::RemoveTag(1).name(), "remove_tag");
        assert_eq!(BulkAction::ChangeCategory(1).name(), "change_category");
        assert_eq!(BulkAction::MoveToBook(1).name(), "move_to_book");
    }

    #[test]
    fn redirect_target_resolves_relative_url() {
        let current = page_url("/transactions/?page=3");

        assert_eq!(
            BulkActionResponse::Redirect(Some("/transactions/?page=1".to_owned()))
                .redirect_target(&current),
            Some(page_url("/transactions/?page=1"))
        );
        assert_eq!(
            BulkActionResponse::Redirect(None).redirect_target(&current),
            Some(current.clone())
        );
        assert_eq!(
            BulkActionResponse::Download {
                filename: "transactions.csv".to_owned(),
                bytes: Vec::new()
            }
            .redirect_target(&current),
            None
        );
    }

    #[test]
    fn saves_download_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("export.csv");
        let download = BulkActionResponse::Download {
            filename: "transactions.csv".to_owned(),
            bytes: b"ID\n1\n".to_vec(),
        };

        let saved = download.save_download(Some(&destination));

        assert_eq!(saved, Ok(Some(destination.clone())));
        assert_eq!(std::fs::read(&destination).unwrap(), b"ID\n1\n");
    }

    #[test]
    fn redirect_has_nothing_to_save() {
        assert_eq!(
            BulkActionResponse::Redirect(None).save_download(None),
            Ok(None)
        );
    }

    #[test]
    fn unwritable_destination_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing-dir").join("export.csv");
        let download = BulkActionResponse::Download {
            filename: "transactions.csv".to_owned(),
            bytes: Vec::new(),
        };

        let saved = download.save_download(Some(&destination));

        assert!(matches!(saved, Err(Error::File { .. })), "got {saved:?}");
    }

    #[tokio::test]
    async fn redirect_clears_selection() {
        let mut storage = MemoryStorage::new();
        let mut manager = manager(
            &mut storage,
            "/transactions/?type=expense",
            &transactions_page_html(&["1", "2"], &[]),
        );
        manager.toggle(id(1), true);
        manager.toggle(id(2), true);
        let sink = StubBulkActionSink::returning(BulkActionResponse::Redirect(None));

        let response = submit_bulk_action(&mut manager, &sink, BulkAction::Delete).await;

        assert_eq!(response, Ok(BulkActionResponse::Redirect(None)));
        assert!(manager.selection().is_empty());
        assert!(!manager.page().is_checked(&id(1)));

        let submissions = sink.submissions();
        assert_eq!(submissions.len(), 1);
        let (url, form, token) = &submissions[0];
        assert_eq!(*url, page_url("/transactions/bulk-action/"));
        assert_eq!(token, "test-csrf-token");
        assert_eq!(form.selected_transactions, "1,2");
        assert_eq!(
            form.filters,
            vec![("type".to_owned(), "expense".to_owned())]
        );
    }

    #[tokio::test]
    async fn download_keeps_selection() {
        let mut storage = MemoryStorage::new();
        let mut manager = manager(
            &mut storage,
            "/transactions/",
            &transactions_page_html(&["1"], &[]),
        );
        manager.toggle(id(1), true);
        let download = BulkActionResponse::Download {
            filename: "transactions.csv".to_owned(),
            bytes: b"ID\n1\n".to_vec(),
        };
        let sink = StubBulkActionSink::returning(download.clone());

        let response = submit_bulk_action(&mut manager, &sink, BulkAction::ExportCsv).await;

        assert_eq!(response, Ok(download));
        assert_eq!(manager.selection().len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_keeps_selection() {
        let mut storage = MemoryStorage::new();
        let mut manager = manager(
            &mut storage,
            "/transactions/",
            &transactions_page_html(&["1"], &[]),
        );
        manager.toggle(id(1), true);
        let sink = StubBulkActionSink::failing(Error::Network("connection reset".to_owned()));

        let response = submit_bulk_action(&mut manager, &sink, BulkAction::Delete).await;

        assert_eq!(
            response,
            Err(Error::Network("connection reset".to_owned()))
        );
        assert_eq!(manager.selection().len(), 1);
        assert!(manager.page().is_checked(&id(1)));
    }

    #[tokio::test]
    async fn refuses_to_submit_while_select_all_is_pending() {
        let mut storage = MemoryStorage::new();
        let mut manager = manager(
            &mut storage,
            "/transactions/",
            &transactions_page_html(&["1"], &[]),
        );
        let _expansion = manager.begin_select_all();
        let sink = StubBulkActionSink::returning(BulkActionResponse::Redirect(None));

        let response = submit_bulk_action(&mut manager, &sink, BulkAction::Delete).await;

        assert_eq!(response, Err(Error::SelectAllPending));
        assert!(sink.submissions().is_empty());
    }

    #[tokio::test]
    async fn requires_csrf_token() {
        let mut storage = MemoryStorage::new();
        let html = r#"<form id="bulk-action-form" action="/transactions/bulk-action/"></form>"#;
        let mut manager = manager(&mut storage, "/transactions/", html);
        let sink = StubBulkActionSink::returning(BulkActionResponse::Redirect(None));

        let response = submit_bulk_action(&mut manager, &sink, BulkAction::Delete).await;

        assert_eq!(response, Err(Error::MissingCsrfToken));
    }

    #[tokio::test]
    async fn requires_bulk_action_form() {
        let mut storage = MemoryStorage::new();
        let html = r#"<input type="hidden" name="csrfmiddlewaretoken" value="token">"#;
        let mut manager = manager(&mut storage, "/transactions/", html);
        let sink = StubBulkActionSink::returning(BulkActionResponse::Redirect(None));

        let response = submit_bulk_action(&mut manager, &sink, BulkAction::Delete).await;

        assert_eq!(response, Err(Error::MissingFormAction));
    }

    #[tokio::test]
    async fn empty_form_action_posts_to_current_page() {
        let mut storage = MemoryStorage::new();
        let html = r#"
            <input type="hidden" name="csrfmiddlewaretoken" value="token">
            <form id="bulk-action-form" action=""></form>
        "#;
        let mut manager = manager(&mut storage, "/transactions/?page=2", html);
        let sink = StubBulkActionSink::returning(BulkActionResponse::Redirect(None));

        submit_bulk_action(&mut manager, &sink, BulkAction::Delete)
            .await
            .unwrap();

        assert_eq!(
            sink.submissions()[0].0,
            page_url("/transactions/?page=2")
        );
    }
}
