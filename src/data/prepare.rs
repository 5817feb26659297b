//! Dataset preparation: raw rows → immutable [`PlantTable`].
//!
//! The steps run in a fixed order:
//!
//! 1. drop every row holding a null in any column,
//! 2. derive `replacement_free_rate = 1 - replacement_rate` per year,
//! 3. recode yearly `power_generation == 0` and `replacement_rate == 0` to
//!    missing (a zero means the plant was not operating yet).
//!
//! Step 2 runs before step 3, so a zero replacement rate still yields a
//! free rate of 1.

use std::collections::BTreeSet;
use std::path::Path;

use log::{info, warn};

use super::error::{DataError, DataResult};
use super::loader;
use super::model::{CellValue, PlantTable, RawRow, RawTable, Station, YearlyMetrics};
use crate::config::DashboardConfig;

/// Load a file with [`loader::load_file`] and prepare it.
pub fn load_table(path: &Path, config: &DashboardConfig) -> DataResult<PlantTable> {
    let raw = loader::load_file(path).map_err(|e| DataError::DataLoad {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(
        "Read {} raw rows with {} columns from {}",
        raw.rows.len(),
        raw.columns.len(),
        path.display()
    );
    prepare(&raw, config)
}

/// Clean raw rows and derive the yearly metrics.
pub fn prepare(raw: &RawTable, config: &DashboardConfig) -> DataResult<PlantTable> {
    config
        .validate()
        .map_err(|e| DataError::Schema(format!("invalid configuration: {e:#}")))?;
    let years = config.years;

    let cols = &config.columns;
    for name in cols.attributes() {
        if !raw.has_column(name) {
            return Err(DataError::MissingColumn(name.to_string()));
        }
    }
    let yearly_columns: Vec<(String, String)> = years
        .iter()
        .map(|y| (cols.power_generation_for(y), cols.replacement_rate_for(y)))
        .collect();
    for (generation, rate) in &yearly_columns {
        for name in [generation, rate] {
            if !raw.has_column(name) {
                return Err(DataError::Schema(format!(
                    "no column '{name}' for the configured years {years}"
                )));
            }
        }
    }

    let mut stations = Vec::with_capacity(raw.rows.len());
    let mut names = BTreeSet::new();
    let mut dropped = 0usize;

    for (row_no, row) in raw.rows.iter().enumerate() {
        if is_incomplete(row, &raw.columns) {
            dropped += 1;
            continue;
        }

        let mut yearly = Vec::with_capacity(yearly_columns.len());
        for (generation_col, rate_col) in &yearly_columns {
            let generation = number(row, generation_col, row_no)?;
            let rate = number(row, rate_col, row_no)?;
            if !(0.0..=1.0).contains(&rate) {
                warn!("Row {row_no}: '{rate_col}' = {rate} is outside [0, 1]");
            }
            yearly.push(YearlyMetrics {
                power_generation: non_zero(generation),
                replacement_rate: non_zero(rate),
                replacement_free_rate: Some(1.0 - rate),
            });
        }

        let station = Station {
            name: text(row, &cols.station_name),
            city: text(row, &cols.city),
            project_type: text(row, &cols.project_type),
            scale_mw: number(row, &cols.scale_mw, row_no)?,
            yearly,
        };
        if !names.insert(station.name.clone()) {
            warn!("Duplicate station name '{}' at row {row_no}", station.name);
        }
        stations.push(station);
    }

    info!(
        "Prepared {} stations over {years} ({dropped} incomplete rows dropped)",
        stations.len()
    );
    Ok(PlantTable::new(stations, years))
}

/// A row is incomplete when any source column is absent or null.
fn is_incomplete(row: &RawRow, columns: &[String]) -> bool {
    columns
        .iter()
        .any(|col| row.get(col).map_or(true, CellValue::is_null))
}

fn non_zero(value: f64) -> Option<f64> {
    (value != 0.0).then_some(value)
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column).map(|v| v.to_string()).unwrap_or_default()
}

fn number(row: &RawRow, column: &str, row_no: usize) -> DataResult<f64> {
    let cell = row
        .get(column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;
    cell.as_f64().ok_or_else(|| DataError::InvalidCell {
        row: row_no,
        column: column.to_string(),
        value: cell.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ColumnNames;
    use crate::data::model::{Metric, YearRange};

    /// Raw row in the published layout. `yearly` holds
    /// `(power_generation, replacement_rate)` for 2016..=2021.
    pub(crate) fn raw_row(
        name: &str,
        city: &str,
        project_type: &str,
        scale_mw: f64,
        yearly: [(f64, f64); 6],
    ) -> RawRow {
        let cols = ColumnNames::default();
        let mut row = RawRow::new();
        row.insert(cols.station_name.clone(), CellValue::String(name.into()));
        row.insert(cols.city.clone(), CellValue::String(city.into()));
        row.insert(cols.project_type.clone(), CellValue::String(project_type.into()));
        row.insert(cols.scale_mw.clone(), CellValue::Float(scale_mw));
        for (year, (generation, rate)) in YearRange::default().iter().zip(yearly) {
            row.insert(cols.power_generation_for(year), CellValue::Float(generation));
            row.insert(cols.replacement_rate_for(year), CellValue::Float(rate));
        }
        row
    }

    const FULL: [(f64, f64); 6] = [
        (100.0, 0.1),
        (200.0, 0.2),
        (300.0, 0.3),
        (400.0, 0.4),
        (500.0, 0.5),
        (600.0, 0.6),
    ];

    #[test]
    fn zero_readings_become_missing() {
        let mut yearly = FULL;
        yearly[0] = (0.0, 0.1);
        yearly[1] = (500.0, 0.0);
        let raw = RawTable::from_rows(vec![raw_row("A", "X", "Solar", 10.0, yearly)]);
        let table = prepare(&raw, &DashboardConfig::default()).unwrap();

        let a = table.station("A").unwrap();
        assert_eq!(table.value(a, Metric::PowerGeneration, 2016), None);
        assert_eq!(table.value(a, Metric::ReplacementRate, 2016), Some(0.1));
        assert_eq!(table.value(a, Metric::PowerGeneration, 2017), Some(500.0));
        assert_eq!(table.value(a, Metric::ReplacementRate, 2017), None);
        // Free rate is derived before the recode.
        assert_eq!(table.value(a, Metric::ReplacementFreeRate, 2017), Some(1.0));
    }

    #[test]
    fn free_rate_is_complement() {
        let raw = RawTable::from_rows(vec![raw_row("A", "X", "Solar", 10.0, FULL)]);
        let table = prepare(&raw, &DashboardConfig::default()).unwrap();
        let a = table.station("A").unwrap();
        for year in table.years().iter() {
            let rate = table.value(a, Metric::ReplacementRate, year).unwrap();
            let free = table.value(a, Metric::ReplacementFreeRate, year).unwrap();
            assert!((free - (1.0 - rate)).abs() < 1e-12);
        }
    }

    #[test]
    fn incomplete_rows_dropped_whole() {
        let mut rows: Vec<RawRow> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| {
                let mut row = raw_row(name, "X", "Solar", 10.0, FULL);
                row.insert("Notes".into(), CellValue::String("ok".into()));
                row
            })
            .collect();
        rows[1].insert("City".into(), CellValue::Null);
        rows[2].insert("component replacement rate 2019".into(), CellValue::Float(f64::NAN));
        // A null in a column the dashboard never reads still drops the row.
        rows[3].insert("Notes".into(), CellValue::Null);

        let table = prepare(&RawTable::from_rows(rows), &DashboardConfig::default()).unwrap();
        let names: Vec<_> = table.stations().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
    }

    #[test]
    fn row_lacking_a_column_is_incomplete() {
        let mut b = raw_row("B", "X", "Wind", 5.0, FULL);
        b.remove("Power Station Scale (MW)");
        let raw = RawTable::from_rows(vec![raw_row("A", "X", "Solar", 10.0, FULL), b]);
        let table = prepare(&raw, &DashboardConfig::default()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_attribute_column_is_load_error() {
        let mut row = raw_row("A", "X", "Solar", 10.0, FULL);
        row.remove("City");
        let err = prepare(&RawTable::from_rows(vec![row]), &DashboardConfig::default())
            .unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "City"));
        assert!(err.is_load_error());
    }

    #[test]
    fn unresolvable_year_is_schema_error() {
        let raw = RawTable::from_rows(vec![raw_row("A", "X", "Solar", 10.0, FULL)]);
        let mut config = DashboardConfig::default();
        config.years = YearRange { first: 2016, last: 2022 };
        let err = prepare(&raw, &config).unwrap_err();
        assert!(matches!(err, DataError::Schema(ref m) if m.contains("2022")));
    }

    #[test]
    fn invalid_config_is_schema_error() {
        let raw = RawTable::from_rows(vec![raw_row("A", "X", "Solar", 10.0, FULL)]);
        let mut config = DashboardConfig::default();
        config.columns.power_generation = "Power Generation 2016(MWh)".into();
        let err = prepare(&raw, &config).unwrap_err();
        assert!(matches!(err, DataError::Schema(ref m) if m.contains("{year}")), "{err}");

        let mut config = DashboardConfig::default();
        config.years = YearRange { first: 2021, last: 2016 };
        assert!(matches!(prepare(&raw, &config), Err(DataError::Schema(_))));
    }

    #[test]
    fn narrower_year_range_is_fine() {
        let raw = RawTable::from_rows(vec![raw_row("A", "X", "Solar", 10.0, FULL)]);
        let mut config = DashboardConfig::default();
        config.years = YearRange { first: 2018, last: 2020 };
        let table = prepare(&raw, &config).unwrap();
        let a = table.station("A").unwrap();
        assert_eq!(a.yearly.len(), 3);
        assert_eq!(table.value(a, Metric::PowerGeneration, 2018), Some(300.0));
        assert_eq!(table.value(a, Metric::PowerGeneration, 2016), None);
    }

    #[test]
    fn non_numeric_cell_is_reported() {
        let mut row = raw_row("A", "X", "Solar", 10.0, FULL);
        row.insert("Power Generation 2018(MWh)".into(), CellValue::String("lots".into()));
        let err = prepare(&RawTable::from_rows(vec![row]), &DashboardConfig::default())
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidCell { row: 0, .. }));
    }

    #[test]
    fn load_table_wraps_loader_failures() {
        let err = load_table(Path::new("/nonexistent/plants.csv"), &DashboardConfig::default())
            .unwrap_err();
        assert!(matches!(err, DataError::DataLoad { .. }));
    }
}
