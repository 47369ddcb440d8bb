//! Keeps the selection set mirrored to storage and to the page's checkboxes.

use reqwest::Url;

use crate::{
    Error, Storage, TransactionId, TransactionIdSource,
    page::{Page, TransactionsArea, element_ids},
    selection::SelectionSet,
    storage::SELECTED_TRANSACTIONS_KEY,
};

/// A "select all matching filter" request that has been started but not yet
/// applied.
///
/// Returned by [SelectionSetManager::begin_select_all] and consumed by
/// [SelectionSetManager::finish_select_all].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an expansion must be passed to `finish_select_all`"]
pub struct Expansion {
    generation: u64,
    url: Url,
    previous_select_all: bool,
}

impl Expansion {
    /// The URL to request the matching transaction IDs from.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Owns the selection for one page load.
///
/// The manager is constructed once per page load with the page's storage and
/// DOM. After every mutation the selection is written back to storage, so
/// the next page load in the transactions area picks it up again.
///
/// Storage failures never abort an operation: they are logged and the
/// in-memory selection carries on as the source of truth for this page.
#[derive(Debug)]
pub struct SelectionSetManager<S, P> {
    storage: S,
    page: P,
    area: TransactionsArea,
    selection: SelectionSet,
    generation: u64,
    pending: Option<u64>,
}

impl<S: Storage, P: Page> SelectionSetManager<S, P> {
    /// Create a manager with an empty selection. Call [Self::load] to pick up
    /// the selection persisted by earlier page loads.
    pub fn new(storage: S, page: P, area: TransactionsArea) -> Self {
        Self {
            storage,
            page,
            area,
            selection: SelectionSet::new(),
            generation: 0,
            pending: None,
        }
    }

    /// Read the persisted selection and check the matching checkboxes.
    ///
    /// A missing, unreadable or malformed entry is treated as no prior
    /// selection. Invalid IDs inside an otherwise valid list are skipped.
    pub fn load(&mut self) {
        let ids: Vec<TransactionId> = match self.storage.get_item(SELECTED_TRANSACTIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
                Ok(values) => values.into_iter().filter_map(parse_persisted_id).collect(),
                Err(error) => {
                    tracing::warn!("ignoring malformed persisted selection: {error}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!("could not read persisted selection: {error}");
                Vec::new()
            }
        };

        self.selection = ids.into_iter().collect();
        tracing::debug!("loaded {} selected transactions", self.selection.len());

        for id in self.page.checkbox_ids() {
            let checked = self.selection.contains(&id);
            self.page.set_checked(&id, checked);
        }

        self.sync_hidden_fields();
    }

    /// Add `id` to or remove it from the selection and check or uncheck its
    /// checkbox if it is on the page.
    pub fn toggle(&mut self, id: TransactionId, checked: bool) {
        self.page.set_checked(&id, checked);

        if checked {
            self.selection.insert(id);
        } else {
            self.selection.remove(&id);
        }

        self.persist();
        self.sync_hidden_fields();
    }

    /// Check or uncheck every transaction on the current page and update the
    /// selection to match.
    pub fn select_all_on_page(&mut self, checked: bool) {
        for id in self.page.checkbox_ids() {
            self.page.set_checked(&id, checked);

            if checked {
                self.selection.insert(id);
            } else {
                self.selection.remove(&id);
            }
        }

        self.persist();
        self.sync_hidden_fields();
    }

    /// Expand the selection to every transaction matching the page's filter.
    ///
    /// Makes one request to `source` for the current page URL. On success the
    /// returned IDs are added to the selection and every checkbox on the page
    /// is checked; the number of newly selected IDs is returned. On failure
    /// the selection is left as it was and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns whatever error `source` produced.
    pub async fn select_all_matching_filter<T>(&mut self, source: &T) -> Result<usize, Error>
    where
        T: TransactionIdSource + ?Sized,
    {
        let expansion = self.begin_select_all();
        let result = source.matching_transaction_ids(expansion.url()).await;
        self.finish_select_all(expansion, result)
    }

    /// Start a "select all matching filter" expansion.
    ///
    /// Sets the "select all" flag immediately. Until the returned ticket is
    /// passed to [Self::finish_select_all], [Self::is_expansion_pending]
    /// returns `true`.
    pub fn begin_select_all(&mut self) -> Expansion {
        self.generation += 1;
        self.pending = Some(self.generation);

        let previous_select_all = self.selection.is_select_all();
        self.selection.set_select_all(true);
        self.sync_hidden_fields();

        Expansion {
            generation: self.generation,
            url: self.page.url().clone(),
            previous_select_all,
        }
    }

    /// Apply the outcome of an expansion started with [Self::begin_select_all].
    ///
    /// An expansion that was superseded by [Self::clear] or a newer
    /// [Self::begin_select_all] is discarded and `Ok(0)` is returned.
    ///
    /// # Errors
    ///
    /// Returns the error in `result` after restoring the "select all" flag.
    pub fn finish_select_all(
        &mut self,
        expansion: Expansion,
        result: Result<Vec<TransactionId>, Error>,
    ) -> Result<usize, Error> {
        if self.pending != Some(expansion.generation) {
            tracing::debug!("discarding superseded select-all response");
            return Ok(0);
        }

        self.pending = None;

        match result {
            Ok(ids) => {
                let before = self.selection.len();
                self.selection.extend(ids);
                let added = self.selection.len() - before;
                tracing::debug!("select all added {added} transactions");

                self.select_all_on_page(true);
                Ok(added)
            }
            Err(error) => {
                tracing::error!("could not fetch transactions matching the filter: {error}");
                self.selection.set_select_all(expansion.previous_select_all);
                self.sync_hidden_fields();
                Err(error)
            }
        }
    }

    /// Whether a "select all matching filter" expansion is in flight.
    pub fn is_expansion_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Empty the selection, persist the empty list and uncheck every
    /// checkbox on the page. Any pending expansion is superseded.
    pub fn clear(&mut self) {
        self.pending = None;
        self.selection.clear();

        for id in self.page.checkbox_ids() {
            self.page.set_checked(&id, false);
        }

        self.persist();
        self.sync_hidden_fields();
    }

    /// The selected IDs joined with commas.
    ///
    /// The same string is written into the hidden `selected-transactions`
    /// input so that it is submitted with the bulk action form.
    pub fn export_for_submission(&mut self) -> String {
        self.sync_hidden_fields();
        self.selection.to_comma_separated()
    }

    /// Delete the persisted selection if the page is outside the
    /// transactions area. Returns `true` if the selection was purged.
    pub fn purge_if_outside_scope(&mut self) -> bool {
        if self.area.contains(self.page.url()) {
            tracing::debug!("{} is in the transactions area", self.page.url());
            return false;
        }

        tracing::debug!(
            "{} is outside the transactions area, clearing selection",
            self.page.url()
        );

        if let Err(error) = self.storage.remove_item(SELECTED_TRANSACTIONS_KEY) {
            tracing::warn!("could not remove persisted selection: {error}");
        }

        self.selection.clear();
        true
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// The page this manager was loaded for.
    pub fn page(&self) -> &P {
        &self.page
    }

    /// Mutable access to the page.
    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// Mutable access to the storage, for other components on the page that
    /// persist their own state.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the manager and return its storage and page.
    pub fn into_parts(self) -> (S, P) {
        (self.storage, self.page)
    }

    fn persist(&mut self) {
        let ids: Vec<&TransactionId> = self.selection.iter().collect();

        let result = serde_json::to_string(&ids)
            .map_err(Error::from)
            .and_then(|json| self.storage.set_item(SELECTED_TRANSACTIONS_KEY, &json));

        if let Err(error) = result {
            tracing::warn!("could not persist selection: {error}");
        }
    }

    fn sync_hidden_fields(&mut self) {
        self.page.set_field_value(
            element_ids::SELECTED_TRANSACTIONS,
            &self.selection.to_comma_separated(),
        );
        self.page.set_field_value(
            element_ids::SELECT_ALL_INPUT,
            if self.selection.is_select_all() {
                "true"
            } else {
                "false"
            },
        );
    }
}

fn parse_persisted_id(value: serde_json::Value) -> Option<TransactionId> {
    match serde_json::from_value::<TransactionId>(value.clone()) {
        Ok(id) => Some(id),
        Err(error) => {
            tracing::warn!("skipping invalid persisted transaction ID {value}: {error}");
            None
        }
    }
}
