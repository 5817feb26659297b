use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Calendar year of an observation.
pub type Year = i32;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell as delivered by the loader
// ---------------------------------------------------------------------------

/// A dynamically-typed raw cell mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Interpret the cell as a number. Numeric text (as produced by a CSV
    /// reader that kept the column as strings) is parsed as well.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – loader output, before any cleaning
// ---------------------------------------------------------------------------

/// One raw row: column name → cell.
pub type RawRow = BTreeMap<String, CellValue>;

/// Rows exactly as read from storage, plus the source column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build from rows, collecting the column names in first-seen order.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut seen = BTreeSet::new();
        let mut columns = Vec::new();
        for row in &rows {
            for col in row.keys() {
                if seen.insert(col.clone()) {
                    columns.push(col.clone());
                }
            }
        }
        RawTable { columns, rows }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// Metric – the per-year measurements of a station
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PowerGeneration,
    ReplacementRate,
    ReplacementFreeRate,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::PowerGeneration => "Power Generation (MWh)",
            Metric::ReplacementRate => "Component Replacement Rate",
            Metric::ReplacementFreeRate => "Component Replacement-Free Rate",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Measurements of one station in one year. `None` means missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct YearlyMetrics {
    pub power_generation: Option<f64>,
    pub replacement_rate: Option<f64>,
    pub replacement_free_rate: Option<f64>,
}

impl YearlyMetrics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::PowerGeneration => self.power_generation,
            Metric::ReplacementRate => self.replacement_rate,
            Metric::ReplacementFreeRate => self.replacement_free_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// Station – one prepared row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub name: String,
    pub city: String,
    pub project_type: String,
    pub scale_mw: f64,
    /// Indexed by `year - first_year` of the owning table.
    pub yearly: Vec<YearlyMetrics>,
}

// ---------------------------------------------------------------------------
// YearRange – inclusive span of observed years
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub first: Year,
    pub last: Year,
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange {
            first: 2016,
            last: 2021,
        }
    }
}

impl YearRange {
    pub fn contains(&self, year: Year) -> bool {
        (self.first..=self.last).contains(&year)
    }

    /// Number of years in the range; zero when inverted.
    pub fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            (i64::from(self.last) - i64::from(self.first) + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Year> {
        self.first..=self.last
    }

    pub fn index_of(&self, year: Year) -> Option<usize> {
        self.contains(year)
            .then(|| (i64::from(year) - i64::from(self.first)) as usize)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

// ---------------------------------------------------------------------------
// PlantTable – the prepared, immutable dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset. Built once by [`crate::data::prepare::prepare`] and
/// only read afterwards; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantTable {
    stations: Vec<Station>,
    years: YearRange,
}

impl PlantTable {
    pub(crate) fn new(stations: Vec<Station>, years: YearRange) -> Self {
        PlantTable { stations, years }
    }

    /// Stations in natural (source) order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn years(&self) -> YearRange {
        self.years
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// First row carrying this station name.
    pub fn station(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name == name)
    }

    /// Value of `metric` for `station` in `year`; `None` when missing or
    /// when the year is outside the table's range.
    pub fn value(&self, station: &Station, metric: Metric, year: Year) -> Option<f64> {
        let idx = self.years.index_of(year)?;
        station.yearly.get(idx)?.get(metric)
    }

    /// Distinct cities in first-seen order.
    pub fn cities(&self) -> Vec<String> {
        distinct(self.stations.iter().map(|s| s.city.as_str()))
    }

    /// Distinct project types in first-seen order.
    pub fn project_types(&self) -> Vec<String> {
        distinct(self.stations.iter().map(|s| s.project_type.as_str()))
    }
}

/// Deduplicate while keeping first-seen order.
pub(crate) fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_nan_cells() {
        assert!(CellValue::Null.is_null());
        assert!(CellValue::Float(f64::NAN).is_null());
        assert!(!CellValue::Float(0.0).is_null());
        assert_eq!(CellValue::String(" 12.5 ".into()).as_f64(), Some(12.5));
        assert_eq!(CellValue::String("n/a".into()).as_f64(), None);
    }

    #[test]
    fn year_range_indexing() {
        let years = YearRange::default();
        assert_eq!(years.len(), 6);
        assert_eq!(years.index_of(2016), Some(0));
        assert_eq!(years.index_of(2021), Some(5));
        assert_eq!(years.index_of(2022), None);
        assert!(YearRange { first: 2020, last: 2019 }.is_empty());

        let huge = YearRange { first: i32::MIN, last: i32::MAX };
        assert_eq!(huge.len(), 1usize << 32);
        assert_eq!(huge.index_of(i32::MAX), Some(u32::MAX as usize));
    }

    #[test]
    fn raw_table_columns_first_seen() {
        let mut a = RawRow::new();
        a.insert("b".into(), CellValue::Integer(1));
        let mut b = RawRow::new();
        b.insert("a".into(), CellValue::Integer(2));
        b.insert("b".into(), CellValue::Integer(3));
        let table = RawTable::from_rows(vec![a, b]);
        assert_eq!(table.columns, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn distinct_keeps_order() {
        let got = distinct(["Y", "X", "Y", "Z", "X"].into_iter());
        assert_eq!(got, vec!["Y", "X", "Z"]);
    }
}
