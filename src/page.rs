//! The DOM-query seam and an implementation backed by server-rendered HTML.

use std::{collections::HashMap, fs, path::Path};

use reqwest::Url;
use scraper::{Html, Selector};

use crate::{Error, TransactionId};

/// The IDs of the page elements the client reads from and writes to.
pub mod element_ids {
    /// Hidden input carrying the comma-joined selected transaction IDs.
    pub const SELECTED_TRANSACTIONS: &str = "selected-transactions";
    /// Hidden input carrying `"true"` when every matching record is selected.
    pub const SELECT_ALL_INPUT: &str = "select-all-input";
    /// The "select all" checkbox in the table header.
    pub const SELECT_ALL: &str = "select-all";
    /// The form that bulk actions are submitted from.
    pub const BULK_ACTION_FORM: &str = "bulk-action-form";
    /// The element holding the amount slider's data attributes.
    pub const AMOUNT_RANGE_SLIDER: &str = "amount-range-slider";
    /// Input receiving the slider's lower handle.
    pub const AMOUNT_MIN: &str = "amount_min";
    /// Input receiving the slider's upper handle.
    pub const AMOUNT_MAX: &str = "amount_max";
    /// The element holding the chart data attributes.
    pub const CHART_DATA: &str = "chartData";
    /// The collapsible filter section.
    pub const FILTER_SECTION: &str = "filter-section";
}

/// The name of the CSRF token input rendered into every form.
const CSRF_TOKEN_NAME: &str = "csrfmiddlewaretoken";

/// Queries and updates the elements of the currently loaded page.
pub trait Page {
    /// The URL the page was loaded from.
    fn url(&self) -> &Url;

    /// The IDs of the transaction checkboxes rendered on the page, in
    /// document order.
    fn checkbox_ids(&self) -> Vec<TransactionId>;

    /// Whether the checkbox for `id` is checked. Returns `false` if the
    /// transaction is not on the page.
    fn is_checked(&self, id: &TransactionId) -> bool;

    /// Check or uncheck the checkbox for `id`. Does nothing if the
    /// transaction is not on the page.
    fn set_checked(&mut self, id: &TransactionId, checked: bool);

    /// The value of the input with the given element ID.
    fn field_value(&self, element_id: &str) -> Option<String>;

    /// Set the value of the input with the given element ID. Does nothing if
    /// the page has no such input.
    fn set_field_value(&mut self, element_id: &str, value: &str);

    /// The value of attribute `name` on the element with the given ID.
    fn attribute(&self, element_id: &str, name: &str) -> Option<String>;

    /// The CSRF token rendered into the page's forms.
    fn csrf_token(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
struct Checkbox {
    id: TransactionId,
    checked: bool,
}

/// A [Page] built by parsing an HTML document.
///
/// Only the state the client cares about is extracted: the transaction
/// checkboxes, inputs with an `id`, the attributes of every element with an
/// `id`, and the CSRF token.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    url: Url,
    checkboxes: Vec<Checkbox>,
    fields: HashMap<String, String>,
    attributes: HashMap<String, HashMap<String, String>>,
    csrf_token: Option<String>,
}

impl HtmlPage {
    /// Parse `html` as the document served at `url`.
    ///
    /// Checkboxes whose value is not a valid transaction ID are skipped.
    pub fn parse(url: Url, html: &str) -> Self {
        let document = Html::parse_document(html);

        let checkboxes = document
            .select(&selector("input.transaction-checkbox"))
            .filter_map(|element| {
                let raw = element.value().attr("value").unwrap_or_default();

                match TransactionId::new(raw) {
                    Ok(id) => Some(Checkbox {
                        id,
                        checked: element.value().attr("checked").is_some(),
                    }),
                    Err(error) => {
                        tracing::warn!("skipping transaction checkbox: {error}");
                        None
                    }
                }
            })
            .collect();

        let fields = document
            .select(&selector("input[id]"))
            .filter_map(|element| {
                let id = element.value().id()?;
                let value = element.value().attr("value").unwrap_or_default();
                Some((id.to_owned(), value.to_owned()))
            })
            .collect();

        let attributes = document
            .select(&selector("[id]"))
            .filter_map(|element| {
                let id = element.value().id()?;
                let attributes = element
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .collect();
                Some((id.to_owned(), attributes))
            })
            .collect();

        let csrf_token = document
            .select(&selector(&format!("[name={CSRF_TOKEN_NAME}]")))
            .find_map(|element| element.value().attr("value"))
            .map(str::to_owned);

        Self {
            url,
            checkboxes,
            fields,
            attributes,
            csrf_token,
        }
    }
}

impl HtmlPage {
    /// Parse the HTML document saved at `path` as the page served at `url`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::File] if the file cannot be read.
    pub fn read_file(url: Url, path: &Path) -> Result<Self, Error> {
        let html = fs::read_to_string(path).map_err(|error| Error::file(path, error))?;

        Ok(Self::parse(url, &html))
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("selectors in this module are valid CSS")
}

impl Page for HtmlPage {
    fn url(&self) -> &Url {
        &self.url
    }

    fn checkbox_ids(&self) -> Vec<TransactionId> {
        self.checkboxes
            .iter()
            .map(|checkbox| checkbox.id.clone())
            .collect()
    }

    fn is_checked(&self, id: &TransactionId) -> bool {
        self.checkboxes
            .iter()
            .any(|checkbox| checkbox.id == *id && checkbox.checked)
    }

    fn set_checked(&mut self, id: &TransactionId, checked: bool) {
        self.checkboxes
            .iter_mut()
            .filter(|checkbox| checkbox.id == *id)
            .for_each(|checkbox| checkbox.checked = checked);
    }

    fn field_value(&self, element_id: &str) -> Option<String> {
        self.fields.get(element_id).cloned()
    }

    fn set_field_value(&mut self, element_id: &str, value: &str) {
        match self.fields.get_mut(element_id) {
            Some(field) => *field = value.to_owned(),
            None => tracing::debug!("page has no input #{element_id}, ignoring update"),
        }
    }

    fn attribute(&self, element_id: &str, name: &str) -> Option<String> {
        self.attributes
            .get(element_id)
            .and_then(|attributes| attributes.get(name))
            .cloned()
    }

    fn csrf_token(&self) -> Option<String> {
        self.csrf_token.clone()
    }
}

/// The part of the site in which a selection is kept between page loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsArea {
    path_marker: String,
}

impl TransactionsArea {
    /// Create an area that covers every URL whose path contains `path_marker`.
    pub fn new(path_marker: &str) -> Self {
        Self {
            path_marker: path_marker.to_owned(),
        }
    }

    /// Whether `url` belongs to the area.
    ///
    /// Only the path is inspected, so a query string that mentions the
    /// marker (e.g., `?next=/transactions/`) does not count.
    pub fn contains(&self, url: &Url) -> bool {
        url.path().contains(&self.path_marker)
    }
}

impl Default for TransactionsArea {
    fn default() -> Self {
        Self::new("/transaction")
    }
}

/// The query parameters of `url` as key-value pairs, in order.
pub(crate) fn query_pairs(url: &Url) -> Vec<(String, String)> {
    url.query()
        .and_then(|query| serde_urlencoded::from_str(query).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::{
        Error, TransactionId,
        page::{HtmlPage, Page, TransactionsArea, element_ids, query_pairs},
        test_utils::{page_url, transactions_page_html},
    };

    #[test]
    fn parses_checkboxes_in_document_order() {
        let page = HtmlPage::parse(
            page_url("/transactions/"),
            &transactions_page_html(&["3", "1", "2"], &["1"]),
        );

        assert_eq!(
            page.checkbox_ids(),
            vec![
                TransactionId::from(3),
                TransactionId::from(1),
                TransactionId::from(2)
            ]
        );
        assert!(page.is_checked(&TransactionId::from(1)));
        assert!(!page.is_checked(&TransactionId::from(3)));
    }

    #[test]
    fn skips_checkboxes_without_a_value() {
        let page = HtmlPage::parse(
            page_url("/transactions/"),
            &transactions_page_html(&["1", " "], &[]),
        );

        assert_eq!(page.checkbox_ids(), vec![TransactionId::from(1)]);
    }

    #[test]
    fn set_checked_updates_only_matching_checkbox() {
        let mut page = HtmlPage::parse(
            page_url("/transactions/"),
            &transactions_page_html(&["1", "2"], &[]),
        );

        page.set_checked(&TransactionId::from(2), true);

        assert!(!page.is_checked(&TransactionId::from(1)));
        assert!(page.is_checked(&TransactionId::from(2)));
    }

    #[test]
    fn reads_hidden_fields_and_csrf_token() {
        let page = HtmlPage::parse(
            page_url("/transactions/"),
            &transactions_page_html(&["1"], &[]),
        );

        assert_eq!(
            page.field_value(element_ids::SELECTED_TRANSACTIONS),
            Some(String::new())
        );
        assert_eq!(
            page.field_value(element_ids::SELECT_ALL_INPUT),
            Some("false".to_owned())
        );
        assert_eq!(page.csrf_token(), Some("test-csrf-token".to_owned()));
        assert_eq!(
            page.attribute(element_ids::BULK_ACTION_FORM, "action"),
            Some("/transactions/bulk-action/".to_owned())
        );
    }

    #[test]
    fn set_field_value_ignores_unknown_inputs() {
        let mut page = HtmlPage::parse(
            page_url("/transactions/"),
            &transactions_page_html(&["1"], &[]),
        );

        page.set_field_value("does-not-exist", "foo");

        assert_eq!(page.field_value("does-not-exist"), None);
    }

    #[test]
    fn reads_page_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.html");
        std::fs::write(&path, transactions_page_html(&["7"], &["7"])).unwrap();

        let page = HtmlPage::read_file(page_url("/transactions/"), &path).unwrap();

        assert!(page.is_checked(&TransactionId::from(7)));
    }

    #[test]
    fn missing_page_file_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");

        let result = HtmlPage::read_file(page_url("/transactions/"), &path);

        match result {
            Err(Error::File { path: reported, .. }) => assert!(reported.ends_with("missing.html")),
            other => panic!("expected a file error, got {other:?}"),
        }
    }

    #[test]
    fn transactions_area_matches_on_path_only() {
        let area = TransactionsArea::default();

        assert!(area.contains(&page_url("/transactions/?page=2")));
        assert!(area.contains(&page_url("/transaction/12/edit")));
        assert!(!area.contains(&page_url("/dashboard")));
        assert!(!area.contains(&page_url("/dashboard?next=/transactions/")));
    }

    #[test]
    fn query_pairs_decodes_parameters() {
        let url = page_url("/transactions/?page=2&description=rent%20%26%20bills");

        assert_eq!(
            query_pairs(&url),
            vec![
                ("page".to_owned(), "2".to_owned()),
                ("description".to_owned(), "rent & bills".to_owned()),
            ]
        );
    }
}
