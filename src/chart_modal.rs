//! The modal dialog that shows the monthly balance chart.

use maud::Markup;

use crate::{ChartData, ChartSource, Page, chart_view};

/// How far the chart scrolls per pixel dragged.
const DRAG_SPEED: f64 = 1.5;

/// The chart modal's visibility and the chart it currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartModal {
    open: bool,
    source: Option<ChartSource>,
    data: Option<ChartData>,
}

impl ChartModal {
    /// Create a closed modal with no chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the modal and rebuild the chart from the page's chart data,
    /// replacing any chart drawn earlier.
    ///
    /// If the chart data is missing or malformed the modal still opens but
    /// no chart is drawn.
    pub fn open(&mut self, page: &impl Page) {
        self.open = true;
        self.source = ChartSource::from_page(page);
        self.data = self.source.as_ref().map(ChartSource::chart_data);
    }

    /// Hide the modal. The chart is kept until the modal is opened again.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Handle a click anywhere in the window. Clicking the backdrop around
    /// the dialog closes it; clicks inside the dialog are ignored.
    pub fn on_window_click(&mut self, target_is_backdrop: bool) {
        if target_is_backdrop {
            self.close();
        }
    }

    /// Show only the categories named in `selected`.
    pub fn filter_categories(&mut self, selected: &[&str]) {
        if let Some(source) = &self.source {
            self.data = Some(source.filtered(selected));
        }
    }

    /// Whether the modal is showing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The chart currently drawn, if any.
    pub fn chart_data(&self) -> Option<&ChartData> {
        self.data.as_ref()
    }

    /// The chart markup for the container with the given ID, or `None` if
    /// there is nothing to draw.
    pub fn view(&self, id: &str) -> Option<Markup> {
        self.data.as_ref().map(|data| chart_view(id, data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragStart {
    x: f64,
    scroll_left: f64,
}

/// Click-and-drag horizontal scrolling for the chart container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragScroll {
    start: Option<DragStart>,
}

impl DragScroll {
    /// Start dragging. `page_x` is the pointer position, `offset_left` the
    /// container's left offset and `scroll_left` its current scroll offset.
    pub fn press(&mut self, page_x: f64, offset_left: f64, scroll_left: f64) {
        self.start = Some(DragStart {
            x: page_x - offset_left,
            scroll_left,
        });
    }

    /// The container's new scroll offset for a pointer at `page_x`, or
    /// `None` when not dragging.
    pub fn drag_to(&self, page_x: f64, offset_left: f64) -> Option<f64> {
        self.start.map(|start| {
            let walk = (page_x - offset_left - start.x) * DRAG_SPEED;
            start.scroll_left - walk
        })
    }

    /// Stop dragging, on pointer release or when the pointer leaves the
    /// container.
    pub fn release(&mut self) {
        self.start = None;
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    /// The CSS cursor for the container.
    pub fn cursor(&self) -> &'static str {
        if self.is_dragging() { "grabbing" } else { "grab" }
    }
}
