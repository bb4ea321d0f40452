//! Hover payloads.
//!
//! Positioning is the host's job; these are only the contents.

use crate::aggregate::{top_entries, AggregatedPoint};
use crate::data::{format_significant, Record};
use crate::profile::Vocabulary;
use crate::resolve::ResolvedFields;
use serde::Serialize;

/// Records listed under a hovered mark
pub const TOP_ENTRY_COUNT: usize = 3;

/// What the pointer is over: a mark by key, or a pixel position on the page
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTarget {
    Key(String),
    Point { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipPayload {
    pub title: String,
    pub metric_label: String,
    pub metric_value: String,
    pub entries_heading: String,
    pub top_entries: Vec<TopEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub name: String,
    pub platform_or_category: String,
    pub value: f64,
}

fn entries<'a, I>(records: I, point: &AggregatedPoint, fields: &ResolvedFields) -> Vec<TopEntry>
where
    I: IntoIterator<Item = &'a Record>,
{
    top_entries(records, fields.key_idx, &point.key, fields.measure_idx, TOP_ENTRY_COUNT)
        .into_iter()
        .map(|r| TopEntry {
            name: fields.name_idx.map(|i| r.text(i)).unwrap_or_default(),
            platform_or_category: fields.detail_idx.map(|i| r.text(i)).unwrap_or_default(),
            value: r.number(fields.measure_idx),
        })
        .collect()
}

/// Payload for a hovered bar: `<key field>: <full name>`, the value to two decimals
pub fn bar_tooltip<'a, I>(vocabulary: &Vocabulary, fields: &ResolvedFields, point: &AggregatedPoint, records: I) -> TooltipPayload
where
    I: IntoIterator<Item = &'a Record>,
{
    let key = point.key.label();
    TooltipPayload {
        title: format!("{}: {}", fields.key_field, vocabulary.full_name(&key)),
        metric_label: vocabulary.metric_label(&fields.measure_field, fields.is_summed()),
        metric_value: format!("{:.2}", point.value),
        entries_heading: format!(
            "Top {} {} {} {}",
            TOP_ENTRY_COUNT,
            vocabulary.item_plural,
            vocabulary.preposition(&fields.key_field),
            key
        ),
        top_entries: entries(records, point, fields),
    }
}

/// Payload for a hovered scatter symbol
pub fn scatter_tooltip<'a, I>(vocabulary: &Vocabulary, fields: &ResolvedFields, point: &AggregatedPoint, records: I) -> TooltipPayload
where
    I: IntoIterator<Item = &'a Record>,
{
    let key = point.key.label();
    let value = format_significant(point.value, 4);
    let (metric_label, metric_value) = if fields.is_summed() {
        (
            vocabulary.metric_label(&fields.measure_field, true),
            format!("{} {}", value, vocabulary.quantity_unit),
        )
    } else {
        ("Count".to_string(), format!("Count: {}", value))
    };

    TooltipPayload {
        title: key.clone(),
        metric_label,
        metric_value,
        entries_heading: format!("Top {} {} in {}", TOP_ENTRY_COUNT, vocabulary.item_plural, key),
        top_entries: entries(records, point, fields),
    }
}
