//! Wires the page components together for one page load.

use crate::{
    AmountSlider, BulkAction, BulkActionResponse, BulkActionSink, ChartModal, ClientConfig,
    Error, FilterPanel, NavMenu, Page, SelectionSetManager, Storage, TransactionId,
    TransactionIdSource, submit_bulk_action,
};

/// The interactive state of a page in the budgetlog app.
///
/// Construct one with [TransactionsPage::on_load] each time a page loads,
/// then forward user events to the `on_*` handlers.
#[derive(Debug)]
pub struct TransactionsPage<S, P> {
    selection: SelectionSetManager<S, P>,
    filter_panel: FilterPanel,
    amount_slider: Option<AmountSlider>,
    nav_menu: NavMenu,
    chart_modal: ChartModal,
}

impl<S: Storage, P: Page> TransactionsPage<S, P> {
    /// Restore the page state from storage.
    ///
    /// A selection persisted by an earlier page is dropped if this page is
    /// outside the transactions area, otherwise its checkboxes are checked.
    /// The amount slider is only set up if the page has one.
    pub fn on_load(storage: S, page: P, config: &ClientConfig) -> Self {
        let mut selection =
            SelectionSetManager::new(storage, page, config.transactions_area.clone());
        selection.purge_if_outside_scope();

        let url = selection.page().url().clone();
        let filter_panel = FilterPanel::load(selection.storage_mut(), &url);

        selection.load();

        let amount_slider = match AmountSlider::from_page(selection.page()) {
            Ok(slider) => {
                slider.write_to(selection.page_mut());
                Some(slider)
            }
            Err(error) => {
                tracing::debug!("amount slider not set up: {error}");
                None
            }
        };

        Self {
            selection,
            filter_panel,
            amount_slider,
            nav_menu: NavMenu::new(),
            chart_modal: ChartModal::new(),
        }
    }

    /// A transaction checkbox was checked or unchecked.
    pub fn on_checkbox_change(&mut self, id: TransactionId, checked: bool) {
        self.selection.toggle(id, checked);
    }

    /// The "select all" checkbox was clicked.
    ///
    /// Checking it selects every transaction matching the current filter;
    /// unchecking it clears the whole selection. Returns the number of newly
    /// selected transactions.
    ///
    /// # Errors
    ///
    /// Returns the error from `source` if the matching IDs could not be
    /// fetched. The selection is unchanged in that case.
    pub async fn on_select_all_click<T>(&mut self, checked: bool, source: &T) -> Result<usize, Error>
    where
        T: TransactionIdSource + ?Sized,
    {
        if checked {
            self.selection.select_all_matching_filter(source).await
        } else {
            self.selection.clear();
            Ok(0)
        }
    }

    /// The filter panel's toggle button was clicked.
    pub fn on_filter_toggle(&mut self) {
        self.filter_panel.toggle(self.selection.storage_mut());
    }

    /// The amount slider's handles moved. Does nothing if the page has no
    /// slider.
    pub fn on_amount_change(&mut self, lower: i64, upper: i64) {
        if let Some(slider) = &mut self.amount_slider {
            slider.set_upper(upper);
            slider.set_lower(lower);
            slider.set_upper(upper);
            slider.write_to(self.selection.page_mut());
        }
    }

    /// The "show chart" button was clicked.
    pub fn on_open_chart(&mut self) {
        self.chart_modal.open(self.selection.page());
    }

    /// A bulk action button was clicked. See [submit_bulk_action].
    ///
    /// # Errors
    ///
    /// Returns any error from [submit_bulk_action].
    pub async fn on_bulk_action<T>(
        &mut self,
        sink: &T,
        action: BulkAction,
    ) -> Result<BulkActionResponse, Error>
    where
        T: BulkActionSink + ?Sized,
    {
        submit_bulk_action(&mut self.selection, sink, action).await
    }

    /// The selection manager.
    pub fn selection(&self) -> &SelectionSetManager<S, P> {
        &self.selection
    }

    /// Mutable access to the selection manager.
    pub fn selection_mut(&mut self) -> &mut SelectionSetManager<S, P> {
        &mut self.selection
    }

    /// The filter panel.
    pub fn filter_panel(&self) -> &FilterPanel {
        &self.filter_panel
    }

    /// The amount slider, if the page has one.
    pub fn amount_slider(&self) -> Option<&AmountSlider> {
        self.amount_slider.as_ref()
    }

    /// The navigation menu.
    pub fn nav_menu_mut(&mut self) -> &mut NavMenu {
        &mut self.nav_menu
    }

    /// The chart modal.
    pub fn chart_modal_mut(&mut self) -> &mut ChartModal {
        &mut self.chart_modal
    }

    /// Consume the page and return its storage and DOM.
    pub fn into_parts(self) -> (S, P) {
        self.selection.into_parts()
    }
}
