//! Dashboard profiles.
//!
//! A profile names the role each column plays in one of the two dashboards
//! (which fields are categories, which is the ordinal axis, which are measures)
//! and carries the wording used for axis titles, tooltips and summaries.

use std::collections::BTreeMap;

/// The two dashboards this crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Sales,
    Trails,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub kind: DashboardKind,
    /// Identifying column shown in tooltip entries
    pub name_field: String,
    /// Secondary column shown next to the name in tooltip entries
    pub detail_field: String,
    /// Columns that produce a bar chart when chosen as x
    pub categorical_fields: Vec<String>,
    /// Fixed x of the scatterplot
    pub ordinal_field: String,
    pub ordinal_label: String,
    /// Columns selectable as the y measure
    pub measure_fields: Vec<String>,
    /// Columns coerced to numbers at load time
    pub numeric_fields: Vec<String>,
    /// Column the cross-filter selection applies to (trails only)
    pub filter_field: Option<String>,
    pub vocabulary: Vocabulary,
}

/// Wording for labels and summaries.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// Plural noun for one record, as used in "# of Games"
    pub item_plural: String,
    /// Unit of the summed measures, as used in "(in millions)"
    pub unit: String,
    /// Short suffix appended to legend ticks when summing
    pub unit_suffix: String,
    /// Trailing words after a summed value in scatter tooltips
    pub quantity_unit: String,
    pub subject: String,
    pub sum_phrase: String,
    pub count_phrase: String,
    pub key_phrases: BTreeMap<String, String>,
    pub measure_phrases: BTreeMap<String, String>,
    pub region_phrases: BTreeMap<String, String>,
    pub prepositions: BTreeMap<String, String>,
    pub full_names: BTreeMap<String, String>,
}

fn map_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Profile {
    /// Video-game sales: bar chart over Genre/Platform/Publisher, scatterplot over Year.
    pub fn sales() -> Self {
        let measures = ["Global_Sales", "NA_Sales", "EU_Sales", "JP_Sales", "Other_Sales"];
        let mut numeric = strings(&measures);
        numeric.push("Year".to_string());

        Profile {
            kind: DashboardKind::Sales,
            name_field: "Name".to_string(),
            detail_field: "Platform".to_string(),
            categorical_fields: strings(&["Genre", "Platform", "Publisher"]),
            ordinal_field: "Year".to_string(),
            ordinal_label: "Release Year".to_string(),
            measure_fields: strings(&measures),
            numeric_fields: numeric,
            filter_field: None,
            vocabulary: Vocabulary {
                item_plural: "Games".to_string(),
                unit: "millions".to_string(),
                unit_suffix: "M".to_string(),
                quantity_unit: "million units".to_string(),
                subject: "the video game industry".to_string(),
                sum_phrase: "total video game sales".to_string(),
                count_phrase: "the number of games released".to_string(),
                key_phrases: map_of(&[
                    ("Publisher", "top video game publishers"),
                    ("Genre", "game genres such as Action, Sports, or Puzzle"),
                    ("Platform", "gaming platforms like PlayStation and Xbox"),
                    ("Year", "video game releases from 1980 to 2020"),
                ]),
                measure_phrases: map_of(&[
                    ("Global_Sales", "worldwide sales"),
                    ("NA_Sales", "North American market"),
                    ("EU_Sales", "European market"),
                    ("JP_Sales", "Japanese market"),
                    ("Other_Sales", "other global regions"),
                ]),
                region_phrases: map_of(&[
                    ("Global_Sales", "(Worldwide)"),
                    ("NA_Sales", "in North America"),
                    ("EU_Sales", "in Europe"),
                    ("JP_Sales", "in Japan"),
                    ("Other_Sales", "in Other Regions"),
                ]),
                prepositions: map_of(&[("Genre", "of"), ("Publisher", "by"), ("Platform", "on")]),
                full_names: map_of(&[
                    ("PS3", "PlayStation 3"),
                    ("PS2", "PlayStation 2"),
                    ("PS4", "PlayStation 4"),
                    ("PS", "PlayStation"),
                    ("PSP", "PlayStation Portable"),
                    ("PSV", "PlayStation Vita"),
                    ("XB", "Xbox"),
                    ("X360", "Xbox 360"),
                    ("XOne", "Xbox One"),
                    ("DS", "Nintendo DS"),
                    ("GBA", "Game Boy Advance"),
                    ("GB", "Game Boy"),
                    ("3DS", "Nintendo 3DS"),
                    ("GC", "GameCube"),
                    ("N64", "Nintendo 64"),
                    ("Wii", "Wii"),
                    ("WiiU", "Wii U"),
                    ("NES", "Nintendo Entertainment System"),
                    ("SNES", "Super Nintendo Entertainment System"),
                    ("GEN", "Sega Genesis"),
                    ("SAT", "Sega Saturn"),
                    ("DC", "Dreamcast"),
                    ("PC", "PC"),
                ]),
            },
        }
    }

    /// Vancouver trails: difficulty bar chart filtering a time/distance scatterplot.
    pub fn trails() -> Self {
        Profile {
            kind: DashboardKind::Trails,
            name_field: "trail".to_string(),
            detail_field: "region".to_string(),
            categorical_fields: strings(&["difficulty", "region", "season"]),
            ordinal_field: "time".to_string(),
            ordinal_label: "Time (hours)".to_string(),
            measure_fields: strings(&["distance"]),
            numeric_fields: strings(&["time", "distance"]),
            filter_field: Some("difficulty".to_string()),
            vocabulary: Vocabulary {
                item_plural: "Trails".to_string(),
                unit: "km".to_string(),
                unit_suffix: "km".to_string(),
                quantity_unit: "km".to_string(),
                subject: "hiking around Vancouver".to_string(),
                sum_phrase: "total trail distance".to_string(),
                count_phrase: "the number of trails".to_string(),
                key_phrases: map_of(&[
                    ("difficulty", "trail difficulty levels"),
                    ("region", "regions around Vancouver"),
                    ("season", "hiking seasons"),
                    ("time", "trail hiking times"),
                ]),
                measure_phrases: map_of(&[("distance", "trail distance")]),
                region_phrases: BTreeMap::new(),
                prepositions: map_of(&[("difficulty", "rated"), ("region", "in"), ("season", "in")]),
                full_names: BTreeMap::new(),
            },
        }
    }

    pub fn is_categorical(&self, field: &str) -> bool {
        self.categorical_fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(field))
    }

    pub fn is_measure(&self, field: &str) -> bool {
        self.measure_fields.iter().any(|f| f.eq_ignore_ascii_case(field))
    }
}

impl Vocabulary {
    /// Display form of a key, e.g. `PS2` → `PlayStation 2`
    pub fn full_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.full_names.get(key).map(String::as_str).unwrap_or(key)
    }

    /// `Global_Sales` → `Global Sales` (first underscore only, as the dashboards did)
    pub fn measure_title(measure: &str) -> String {
        measure.replacen('_', " ", 1)
    }

    /// Y-axis title for the current measure and aggregation
    pub fn y_axis_title(&self, measure: &str, summed: bool) -> String {
        if summed {
            format!("{} (in {})", Self::measure_title(measure), self.unit)
        } else {
            match self.region_phrases.get(measure) {
                Some(region) => format!("# of {} {}", self.item_plural, region),
                None => format!("# of {}", self.item_plural),
            }
        }
    }

    /// Label for the aggregated metric in tooltips
    pub fn metric_label(&self, measure: &str, summed: bool) -> String {
        if summed {
            Self::measure_title(measure)
        } else {
            format!("# of {}", self.item_plural)
        }
    }

    pub fn preposition(&self, field: &str) -> &str {
        self.prepositions.get(field).map(String::as_str).unwrap_or("in")
    }
}
