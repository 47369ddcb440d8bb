use maud::{DOCTYPE, Markup, html};
use scraper::Html;

use crate::page::element_ids;

fn document(body: Markup) -> String {
    html!(
        (DOCTYPE)
        html lang="en" {
            head { title { "Transactions" } }
            body { (body) }
        }
    )
    .into_string()
}

/// A transactions page with one checkbox per ID in `ids`, of which those in
/// `checked` are rendered as checked.
pub(crate) fn transactions_page_html(ids: &[&str], checked: &[&str]) -> String {
    document(html!(
        form id=(element_ids::BULK_ACTION_FORM) action="/transactions/bulk-action/" method="post" {
            input type="hidden" name="csrfmiddlewaretoken" value="test-csrf-token";
            input
                type="hidden"
                id=(element_ids::SELECTED_TRANSACTIONS)
                name="selected_transactions"
                value="";
            input
                type="hidden"
                id=(element_ids::SELECT_ALL_INPUT)
                name="select-all-input"
                value="false";

            table {
                thead {
                    tr {
                        th { input type="checkbox" id=(element_ids::SELECT_ALL); }
                        th { "Description" }
                    }
                }
                tbody {
                    @for id in ids {
                        tr {
                            td {
                                input
                                    type="checkbox"
                                    class="transaction-checkbox"
                                    name="transaction"
                                    value=(id)
                                    checked[checked.contains(id)];
                            }
                            td { "Transaction " (id) }
                        }
                    }
                }
            }

            button type="submit" name="action" value="delete" { "Delete" }
        }
    ))
}

/// A filter form containing the amount slider with the given data attributes.
pub(crate) fn amount_slider_html(
    max_amount: Option<&str>,
    current_min: Option<&str>,
    current_max: Option<&str>,
) -> String {
    document(html!(
        div id=(element_ids::FILTER_SECTION) class="d-none" {
            div
                id=(element_ids::AMOUNT_RANGE_SLIDER)
                data-max-amount=[max_amount]
                data-current-min=[current_min]
                data-current-max=[current_max]
            {}
            input type="hidden" id=(element_ids::AMOUNT_MIN) name="amount_min" value="";
            input type="hidden" id=(element_ids::AMOUNT_MAX) name="amount_max" value="";
        }
    ))
}

/// A page carrying chart data in the given (raw JSON) data attributes.
pub(crate) fn chart_page_html(
    categories: Option<&str>,
    months: Option<&str>,
    monthly_data: Option<&str>,
) -> String {
    document(html!(
        div
            id=(element_ids::CHART_DATA)
            data-categories=[categories]
            data-months=[months]
            data-monthly-data=[monthly_data]
        {}
    ))
}

pub(crate) fn parse_html_fragment(text: &str) -> Html {
    Html::parse_fragment(text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}
