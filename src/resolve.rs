use crate::aggregate::Aggregation;
use crate::data::Dataset;
use crate::error::DashError;
use crate::profile::Profile;

/// Chart parameters resolved against a dataset's columns
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
    /// Canonical header of the grouping column
    pub key_field: String,
    pub key_idx: usize,
    /// Canonical header of the measure column
    pub measure_field: String,
    pub measure_idx: usize,
    pub name_idx: Option<usize>,
    pub detail_idx: Option<usize>,
    pub aggregation: Aggregation,
}

impl ResolvedFields {
    /// The column reduced by `aggregate`, if any
    pub fn value_field(&self) -> Option<&str> {
        match self.aggregation {
            Aggregation::Sum => Some(self.measure_field.as_str()),
            Aggregation::Count => None,
        }
    }

    pub fn is_summed(&self) -> bool {
        matches!(self.aggregation, Aggregation::Sum)
    }
}

/// Resolve a key/measure pair for one chart update.
///
/// Both fields must exist and the measure must be one of the profile's
/// measure fields. It must be numeric when summing; with `count` it is still
/// required because tooltips rank records by it.
pub fn resolve_fields(
    dataset: &Dataset,
    profile: &Profile,
    key_field: &str,
    measure_field: &str,
    aggregation: Aggregation,
) -> Result<ResolvedFields, DashError> {
    let key_idx = dataset.field_index(key_field)?;
    let measure_idx = dataset.field_index(measure_field)?;

    if !profile.is_measure(measure_field) {
        let expected: Vec<&str> = profile.measure_fields.iter().map(String::as_str).collect();
        return Err(DashError::invalid_option("y", measure_field, &expected));
    }
    if matches!(aggregation, Aggregation::Sum) && !dataset.is_numeric(measure_idx) {
        return Err(DashError::NonNumericField {
            field: measure_field.to_string(),
        });
    }

    // Name and detail columns only feed tooltips; a table without them still charts
    let name_idx = dataset.field_index(&profile.name_field).ok();
    let detail_idx = dataset.field_index(&profile.detail_field).ok();

    Ok(ResolvedFields {
        key_field: dataset.headers()[key_idx].clone(),
        key_idx,
        measure_field: dataset.headers()[measure_idx].clone(),
        measure_idx,
        name_idx,
        detail_idx,
        aggregation,
    })
}

/// Resolve the column a cross-filter selection applies to
pub fn resolve_filter_field(dataset: &Dataset, profile: &Profile) -> Result<Option<usize>, DashError> {
    profile
        .filter_field
        .as_deref()
        .map(|field| dataset.field_index(field))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::CsvData;

    fn sales_dataset() -> Dataset {
        let csv = CsvData {
            headers: vec!["Name".into(), "Platform".into(), "Genre".into(), "Global_Sales".into()],
            rows: vec![vec!["Tetris".into(), "GB".into(), "Puzzle".into(), "30.26".into()]],
        };
        Dataset::from_csv(csv, &["Global_Sales"]).unwrap()
    }

    #[test]
    fn test_resolve_canonical_names() {
        let data = sales_dataset();
        let fields = resolve_fields(&data, &Profile::sales(), "genre", "global_sales", Aggregation::Sum).unwrap();
        assert_eq!(fields.key_field, "Genre");
        assert_eq!(fields.measure_field, "Global_Sales");
        assert_eq!(fields.value_field(), Some("Global_Sales"));
        assert_eq!(fields.name_idx, Some(0));
        assert_eq!(fields.detail_idx, Some(1));
    }

    #[test]
    fn test_resolve_unknown_field() {
        let data = sales_dataset();
        let err = resolve_fields(&data, &Profile::sales(), "Studio", "Global_Sales", Aggregation::Count).unwrap_err();
        assert!(matches!(err, DashError::UnknownField { ref field, .. } if field == "Studio"));
    }

    #[test]
    fn test_resolve_sum_over_text() {
        let data = sales_dataset();
        // a profile that lists a text column as a measure
        let profile = Profile {
            measure_fields: vec!["Genre".into()],
            ..Profile::sales()
        };
        let err = resolve_fields(&data, &profile, "Platform", "Genre", Aggregation::Sum).unwrap_err();
        assert_eq!(err, DashError::NonNumericField { field: "Genre".into() });

        let fields = resolve_fields(&data, &profile, "Platform", "Genre", Aggregation::Count).unwrap();
        assert_eq!(fields.value_field(), None);
    }

    #[test]
    fn test_resolve_rejects_non_measure() {
        let csv = CsvData {
            headers: vec!["Name".into(), "Year".into(), "Genre".into(), "Global_Sales".into()],
            rows: vec![vec!["Tetris".into(), "1989".into(), "Puzzle".into(), "30.26".into()]],
        };
        let data = Dataset::from_csv(csv, &["Year", "Global_Sales"]).unwrap();

        for aggregation in [Aggregation::Sum, Aggregation::Count] {
            let err = resolve_fields(&data, &Profile::sales(), "Genre", "Year", aggregation).unwrap_err();
            assert!(matches!(err, DashError::InvalidOption { ref option, ref value, .. } if option == "y" && value == "Year"));
        }
        assert!(resolve_fields(&data, &Profile::sales(), "Genre", "global_sales", Aggregation::Sum).is_ok());
    }

    #[test]
    fn test_filter_field() {
        let data = sales_dataset();
        assert_eq!(resolve_filter_field(&data, &Profile::sales()).unwrap(), None);
        assert!(resolve_filter_field(&data, &Profile::trails()).is_err());
    }
}
