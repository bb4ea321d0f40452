// Grouping, reduction and ranking of records

use crate::data::{Dataset, GroupKey, Record};
use crate::error::DashError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How a group is reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for Aggregation {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "count" => Ok(Aggregation::Count),
            _ => Err(DashError::invalid_option("aggregation", s, &["sum", "count"])),
        }
    }
}

impl FromStr for SortOrder {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(DashError::invalid_option("sort", s, &["asc", "desc"])),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
        })
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// One row of aggregated output
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPoint {
    pub key: GroupKey,
    pub value: f64,
}

/// Group `records` by `key_field` and reduce each group.
///
/// `value_field` is only consulted for `Aggregation::Sum`. Field names are
/// resolved against `dataset`, which also supplies the column types.
pub fn aggregate<'a, I>(
    dataset: &Dataset,
    records: I,
    key_field: &str,
    value_field: Option<&str>,
    mode: Aggregation,
) -> Result<Vec<AggregatedPoint>, DashError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let key_idx = dataset.field_index(key_field)?;
    let value_idx = match mode {
        Aggregation::Sum => {
            let field = value_field.ok_or(DashError::MissingValueField)?;
            let idx = dataset.field_index(field)?;
            if !dataset.is_numeric(idx) {
                return Err(DashError::NonNumericField {
                    field: field.to_string(),
                });
            }
            Some(idx)
        }
        Aggregation::Count => None,
    };

    Ok(aggregate_columns(records, key_idx, value_idx))
}

/// Column-index form of [`aggregate`]; groups come out in first-seen order.
///
/// With `value_idx = None` each group is counted, otherwise summed.
pub fn aggregate_columns<'a, I>(records: I, key_idx: usize, value_idx: Option<usize>) -> Vec<AggregatedPoint>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut points: Vec<AggregatedPoint> = Vec::new();

    for record in records {
        let key = record.key(key_idx);
        let increment = match value_idx {
            Some(idx) => record.number(idx),
            None => 1.0,
        };

        match slots.get(&key) {
            Some(&slot) => points[slot].value += increment,
            None => {
                slots.insert(key.clone(), points.len());
                points.push(AggregatedPoint { key, value: increment });
            }
        }
    }

    points
}

/// Stable sort by value then truncate to `limit`.
///
/// Equal values keep their incoming (first-seen) order in both directions.
pub fn rank_and_trim(mut points: Vec<AggregatedPoint>, order: SortOrder, limit: usize) -> Vec<AggregatedPoint> {
    match order {
        SortOrder::Asc => points.sort_by(|a, b| a.value.total_cmp(&b.value)),
        SortOrder::Desc => points.sort_by(|a, b| b.value.total_cmp(&a.value)),
    }
    points.truncate(limit);
    points
}

/// Order points by key (numeric keys numerically, text keys lexically)
pub fn sort_by_key(points: &mut [AggregatedPoint]) {
    points.sort_by(|a, b| match (&a.key, &b.key) {
        (GroupKey::Number(x), GroupKey::Number(y)) => x.total_cmp(y),
        (GroupKey::Number(_), GroupKey::Text(_)) => std::cmp::Ordering::Less,
        (GroupKey::Text(_), GroupKey::Number(_)) => std::cmp::Ordering::Greater,
        (GroupKey::Text(x), GroupKey::Text(y)) => x.cmp(y),
    });
}

/// The `n` records of group `key` with the largest measure, ties in record order
pub fn top_entries<'a, I>(records: I, key_idx: usize, key: &GroupKey, measure_idx: usize, n: usize) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut members: Vec<&Record> = records
        .into_iter()
        .filter(|r| &r.key(key_idx) == key)
        .collect();
    members.sort_by(|a, b| b.number(measure_idx).total_cmp(&a.number(measure_idx)));
    members.truncate(n);
    members
}
