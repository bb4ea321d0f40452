use crate::csv_reader::CsvData;
use crate::error::DashError;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::{info, warn};

/// A single cell after load-time coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn to_key(&self) -> GroupKey {
        match self {
            Value::Number(n) => GroupKey::number(*n),
            Value::Text(s) => GroupKey::Text(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Grouping key. Numeric keys compare by exact value, never by their string form.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Text(String),
    Number(f64),
}

impl GroupKey {
    pub fn number(n: f64) -> Self {
        // -0.0 and 0.0 are the same group
        GroupKey::Number(if n == 0.0 { 0.0 } else { n })
    }

    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupKey::Number(n) => Some(*n),
            GroupKey::Text(_) => None,
        }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GroupKey::Text(a), GroupKey::Text(b)) => a == b,
            (GroupKey::Number(a), GroupKey::Number(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            GroupKey::Text(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            GroupKey::Number(n) => {
                1u8.hash(state);
                n.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Text(s) => f.write_str(s),
            GroupKey::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

/// Integers print without a fractional part (`2006`, not `2006.0`)
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// `digits` significant digits with trailing zeros trimmed, exponent form for
/// very large or small magnitudes
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format_number(if value.is_finite() { 0.0 } else { value });
    }
    let digits = digits.max(1);

    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -6 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{}", trim_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// One row, aligned with `Dataset::headers`
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Numeric cell, 0.0 when the cell is text or missing
    pub fn number(&self, idx: usize) -> f64 {
        self.get(idx).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn key(&self, idx: usize) -> GroupKey {
        self.get(idx)
            .map(Value::to_key)
            .unwrap_or_else(|| GroupKey::Text(String::new()))
    }

    pub fn text(&self, idx: usize) -> String {
        self.get(idx).map(|v| v.to_string()).unwrap_or_default()
    }
}

/// The loaded table. Read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    numeric: Vec<bool>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build from raw CSV cells, coercing `numeric_fields` to numbers.
    ///
    /// Cells that do not parse, are not finite, or are negative become 0.0; the
    /// number of such cells is logged once per field.
    pub fn from_csv<S: AsRef<str>>(csv: CsvData, numeric_fields: &[S]) -> Result<Self, DashError> {
        let CsvData { headers, rows } = csv;

        let mut numeric = vec![false; headers.len()];
        for field in numeric_fields {
            let idx = find_col_index(&headers, field.as_ref())?;
            numeric[idx] = true;
        }

        let mut coerced: HashMap<usize, usize> = HashMap::new();
        let records = rows
            .into_iter()
            .map(|row| {
                let values = row
                    .into_iter()
                    .enumerate()
                    .map(|(idx, cell)| {
                        if numeric.get(idx).copied().unwrap_or(false) {
                            let (n, clean) = coerce_number(&cell);
                            if !clean {
                                *coerced.entry(idx).or_insert(0) += 1;
                            }
                            Value::Number(n)
                        } else {
                            Value::Text(cell)
                        }
                    })
                    .collect();
                Record::new(values)
            })
            .collect::<Vec<_>>();

        let mut fields: Vec<_> = coerced.into_iter().collect();
        fields.sort();
        for (idx, count) in fields {
            warn!(field = %headers[idx], cells = count, "non-numeric values coerced to 0");
        }
        info!(rows = records.len(), columns = headers.len(), "dataset loaded");

        Ok(Self { headers, numeric, records })
    }

    /// Build from a JSON array of objects; headers come from the first object
    pub fn from_json<S: AsRef<str>>(value: &Json, numeric_fields: &[S]) -> Result<Self, DashError> {
        let array = value
            .as_array()
            .ok_or_else(|| DashError::load_failure("json", "input data must be a JSON array of objects"))?;

        let first = match array.first() {
            Some(first) => first
                .as_object()
                .ok_or_else(|| DashError::load_failure("json", "items in array must be objects"))?,
            None => return Err(DashError::load_failure("json", "input data array is empty")),
        };
        let headers: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| DashError::load_failure("json", "items in array must be objects"))?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(Json::String(s)) => s.clone(),
                    Some(Json::Number(n)) => n.to_string(),
                    Some(Json::Bool(b)) => b.to_string(),
                    Some(Json::Null) | None => String::new(),
                    _ => {
                        return Err(DashError::load_failure(
                            "json",
                            format!("unsupported value type for field '{}'", header),
                        ))
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Self::from_csv(CsvData { headers, rows }, numeric_fields)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive column lookup
    pub fn field_index(&self, name: &str) -> Result<usize, DashError> {
        find_col_index(&self.headers, name)
    }

    pub fn is_numeric(&self, idx: usize) -> bool {
        self.numeric.get(idx).copied().unwrap_or(false)
    }
}

fn find_col_index(headers: &[String], name: &str) -> Result<usize, DashError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| DashError::UnknownField {
            field: name.to_string(),
            available: headers.to_vec(),
        })
}

/// Returns the coerced value and whether the cell was a clean non-negative number
fn coerce_number(cell: &str) -> (f64, bool) {
    match cell.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => (n, true),
        _ => (0.0, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_csv(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> CsvData {
        CsvData {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_numeric_coercion() {
        let csv = make_csv(
            vec!["Name", "Year", "Global_Sales"],
            vec![vec!["A", "2006", "1.5"], vec!["B", "N/A", "-3"], vec!["C", "2007", "inf"]],
        );
        let ds = Dataset::from_csv(csv, &["Year", "Global_Sales"]).unwrap();
        let recs = ds.records();
        assert_eq!(recs[0].get(1), Some(&Value::Number(2006.0)));
        assert_eq!(recs[1].number(1), 0.0);
        assert_eq!(recs[1].number(2), 0.0);
        assert_eq!(recs[2].number(2), 0.0);
        assert_eq!(recs[0].get(0), Some(&Value::Text("A".to_string())));
        assert!(ds.is_numeric(1));
        assert!(!ds.is_numeric(0));
    }

    #[test]
    fn test_missing_numeric_field_fails() {
        let csv = make_csv(vec!["Name"], vec![vec!["A"]]);
        let err = Dataset::from_csv(csv, &["Year"]).unwrap_err();
        assert!(matches!(err, DashError::UnknownField { .. }));
    }

    #[test]
    fn test_field_index_case_insensitive() {
        let csv = make_csv(vec!["Genre"], vec![vec!["RPG"]]);
        let ds = Dataset::from_csv(csv, &[] as &[&str]).unwrap();
        assert_eq!(ds.field_index("genre").unwrap(), 0);
        assert!(ds.field_index("Platform").is_err());
    }

    #[test]
    fn test_format_significant() {
        assert_eq!(format_significant(65.7, 4), "65.7");
        assert_eq!(format_significant(1234.56, 4), "1235");
        assert_eq!(format_significant(12346.0, 4), "1.235e+4");
        assert_eq!(format_significant(0.000123456, 4), "0.0001235");
        assert_eq!(format_significant(3.0, 4), "3");
        assert_eq!(format_significant(0.0, 4), "0");
    }

    #[test]
    fn test_group_key_numeric_equality() {
        assert_eq!(GroupKey::number(2006.0), GroupKey::number(2006.0));
        assert_eq!(GroupKey::number(-0.0), GroupKey::number(0.0));
        assert_ne!(GroupKey::number(2006.0), GroupKey::Text("2006".to_string()));
        assert_eq!(GroupKey::number(2006.0).label(), "2006");
        assert_eq!(GroupKey::number(1.5).label(), "1.5");
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"Name": "Tetris", "Year": 1989, "Global_Sales": "30.26"},
            {"Name": "Doom", "Year": null, "Global_Sales": 2.5}
        ]);
        let ds = Dataset::from_json(&value, &["Year", "Global_Sales"]).unwrap();
        assert_eq!(ds.len(), 2);
        let year = ds.field_index("Year").unwrap();
        assert_eq!(ds.records()[0].number(year), 1989.0);
        assert_eq!(ds.records()[1].number(year), 0.0);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let err = Dataset::from_json(&json!({"a": 1}), &[] as &[&str]).unwrap_err();
        assert!(matches!(err, DashError::LoadFailure { .. }));
    }

    #[test]
    fn test_from_json_rejects_empty() {
        assert!(Dataset::from_json(&json!([]), &[] as &[&str]).is_err());
    }
}
