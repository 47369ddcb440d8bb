//! The monthly balance bar chart shown in the chart modal.
//!
//! The server renders the chart's inputs as JSON into data attributes of
//! `#chartData`. [ChartSource] parses them, [ChartData] is the declarative
//! dataset handed to the rendering widget, and [chart_view] renders the
//! container and ECharts initialisation script for it.

use std::collections::HashMap;

use charming::{
    Chart,
    component::{Axis, Legend},
    element::{AxisType, ItemStyle, Tooltip, Trigger},
    series::bar,
};
use maud::{Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};

use crate::{Error, Page, page::element_ids};

/// A transaction category as rendered into `data-categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartCategory {
    /// The category name, also the key into the monthly data.
    pub name: String,
    /// The CSS colour used for the category's bars.
    pub color: String,
}

/// The raw chart inputs provided by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSource {
    categories: Vec<ChartCategory>,
    months: Vec<String>,
    monthly_data: HashMap<String, Vec<f64>>,
}

impl ChartSource {
    /// Parse the three JSON documents the server renders for the chart.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidResponse] naming the first input that could
    /// not be parsed.
    pub fn from_json(categories: &str, months: &str, monthly_data: &str) -> Result<Self, Error> {
        fn parse<T: for<'de> Deserialize<'de>>(name: &str, json: &str) -> Result<T, Error> {
            serde_json::from_str(json)
                .map_err(|error| Error::InvalidResponse(format!("{name}: {error}")))
        }

        Ok(Self {
            categories: parse("categories", categories)?,
            months: parse("months", months)?,
            monthly_data: parse("monthly data", monthly_data)?,
        })
    }

    /// Read the chart inputs from the data attributes of `#chartData`.
    ///
    /// Returns `None` if any attribute is missing or malformed, in which case
    /// the chart should not be rendered at all.
    pub fn from_page(page: &impl Page) -> Option<Self> {
        let attribute = |name: &str| page.attribute(element_ids::CHART_DATA, name);

        let (Some(categories), Some(months), Some(monthly_data)) = (
            attribute("data-categories"),
            attribute("data-months"),
            attribute("data-monthly-data"),
        ) else {
            tracing::error!("chart data is missing from the page, skipping chart");
            return None;
        };

        match Self::from_json(&categories, &months, &monthly_data) {
            Ok(source) => Some(source),
            Err(error) => {
                tracing::error!("could not parse chart data, skipping chart: {error}");
                None
            }
        }
    }

    /// The names of every category, in the order the server sent them.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.name.as_str())
    }

    /// A dataset for every category.
    pub fn chart_data(&self) -> ChartData {
        self.build(|_| true)
    }

    /// A dataset for each category named in `selected`, kept in the server's
    /// order rather than the order of `selected`.
    pub fn filtered(&self, selected: &[&str]) -> ChartData {
        self.build(|category| selected.contains(&category.name.as_str()))
    }

    fn build(&self, include: impl Fn(&ChartCategory) -> bool) -> ChartData {
        let datasets = self
            .categories
            .iter()
            .filter(|category| include(category))
            .map(|category| Dataset {
                label: category.name.clone(),
                data: self
                    .monthly_data
                    .get(&category.name)
                    .cloned()
                    .unwrap_or_default(),
                background_color: category.color.clone(),
            })
            .collect();

        ChartData {
            labels: self.months.clone(),
            datasets,
        }
    }
}

/// One series of bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// The series name shown in the legend.
    pub label: String,
    /// One value per label.
    pub data: Vec<f64>,
    /// The bar colour.
    pub background_color: String,
}

/// The declarative input for the rendering widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// The x-axis labels, one per month.
    pub labels: Vec<String>,
    /// One dataset per category.
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// Build the ECharts configuration for a grouped bar chart.
    pub fn to_chart(&self) -> Chart {
        let mut chart = Chart::new()
            .tooltip(Tooltip::new().trigger(Trigger::Axis))
            .legend(Legend::new())
            .x_axis(
                Axis::new()
                    .type_(AxisType::Category)
                    .name("Months")
                    .data(self.labels.clone()),
            )
            .y_axis(Axis::new().type_(AxisType::Value).name("Balance"));

        for dataset in &self.datasets {
            chart = chart.series(
                bar::Bar::new()
                    .name(dataset.label.as_str())
                    .item_style(ItemStyle::new().color(dataset.background_color.as_str()))
                    .data(dataset.data.clone()),
            );
        }

        chart
    }
}

/// Renders the chart container and the script that draws `data` into it.
///
/// Rendering again with the same `id` replaces the previous chart instance.
pub fn chart_view(id: &str, data: &ChartData) -> Markup {
    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{id}");
            const existing = echarts.getInstanceByDom(chartDom);
            if (existing) {{
                existing.dispose();
            }}
            const chart = echarts.init(chartDom);
            chart.setOption({options});
            window.addEventListener('resize', chart.resize);
        }})();"#,
        options = data.to_chart()
    );

    html!(
        div id=(id) class="min-h-[380px] w-full" {}
        script { (PreEscaped(script)) }
    )
}
