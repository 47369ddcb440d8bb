#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod stubs;

pub(crate) use html::{
    amount_slider_html, assert_valid_html, chart_page_html, parse_html_fragment,
    transactions_page_html,
};
pub(crate) use http::{page_url, spawn_server};
pub(crate) use stubs::{StubBulkActionSink, StubIdSource};
