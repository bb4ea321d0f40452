// Plain-language description of the chart currently on screen

use crate::aggregate::Aggregation;
use crate::profile::Vocabulary;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    BarChart,
    Scatterplot,
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartType::BarChart => "bar chart",
            ChartType::Scatterplot => "scatterplot",
        })
    }
}

/// "This bar chart shows <x> compared across <y> based on <aggregation>, ..."
///
/// Fields without a phrase fall back to their title form.
pub fn chart_summary(
    vocabulary: &Vocabulary,
    x_attr: &str,
    y_attr: &str,
    chart_type: ChartType,
    aggregation: Aggregation,
) -> String {
    let x_phrase = vocabulary
        .key_phrases
        .get(x_attr)
        .cloned()
        .unwrap_or_else(|| Vocabulary::measure_title(x_attr));
    let y_phrase = vocabulary
        .measure_phrases
        .get(y_attr)
        .cloned()
        .unwrap_or_else(|| Vocabulary::measure_title(y_attr));
    let agg_phrase = match aggregation {
        Aggregation::Sum => &vocabulary.sum_phrase,
        Aggregation::Count => &vocabulary.count_phrase,
    };

    format!(
        "This {} shows {} compared across {} based on {}, helping you explore patterns and trends in {}.",
        chart_type, x_phrase, y_phrase, agg_phrase, vocabulary.subject
    )
}
