use std::collections::BTreeSet;

use log::warn;
use serde::Serialize;

use super::error::{DataError, DataResult};
use super::model::{distinct, Metric, PlantTable, Year};
use crate::config::{BubbleAxis, MissingStationPolicy};

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

/// One marker of the bubble chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubblePoint {
    pub station: String,
    /// Replacement rate (or its complement, per [`BubbleAxis`]).
    pub x: f64,
    /// Power generation in MWh.
    pub y: f64,
    /// Station scale in MW.
    pub size: f64,
}

/// Yearly values of one station, ascending by year. `None` marks a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSeries {
    pub station: String,
    pub points: Vec<(Year, Option<f64>)>,
}

// ---------------------------------------------------------------------------
// Default selection policy
// ---------------------------------------------------------------------------

/// The first `n` distinct station names in table order.
pub fn default_selection(table: &PlantTable, n: usize) -> Vec<String> {
    let mut names = distinct(table.stations().iter().map(|s| s.name.as_str()));
    names.truncate(n);
    names
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Distinct station names matching the optional city and project type,
/// in first-seen order.
pub fn station_options(
    table: &PlantTable,
    city: Option<&str>,
    project_type: Option<&str>,
) -> Vec<String> {
    distinct(
        table
            .stations()
            .iter()
            .filter(|s| city.map_or(true, |c| s.city == c))
            .filter(|s| project_type.map_or(true, |p| s.project_type == p))
            .map(|s| s.name.as_str()),
    )
}

/// Points for every row whose station is in `stations`, in table order.
///
/// Rows missing either coordinate in `year` contribute nothing. An empty
/// `stations` slice yields no points; callers pick a default selection first.
pub fn bubble_points(
    table: &PlantTable,
    stations: &[String],
    year: Year,
    x_axis: BubbleAxis,
) -> DataResult<Vec<BubblePoint>> {
    check_year(table, year)?;
    let wanted: BTreeSet<&str> = stations.iter().map(String::as_str).collect();
    let x_metric = match x_axis {
        BubbleAxis::ReplacementRate => Metric::ReplacementRate,
        BubbleAxis::ReplacementFreeRate => Metric::ReplacementFreeRate,
    };

    let points = table
        .stations()
        .iter()
        .filter(|s| wanted.contains(s.name.as_str()))
        .filter_map(|s| {
            let x = table.value(s, x_metric, year)?;
            let y = table.value(s, Metric::PowerGeneration, year)?;
            Some(BubblePoint {
                station: s.name.clone(),
                x,
                y,
                size: s.scale_mw,
            })
        })
        .collect();
    Ok(points)
}

/// `metric` from the first year of the table through `end_year` for each
/// selected station, in selection order. Repeated names are collapsed.
///
/// A station absent from the table fails the call under
/// [`MissingStationPolicy::Fail`] and is left out under
/// [`MissingStationPolicy::Skip`]. A station present but lacking values
/// (including in the first year) is not an error: its gaps stay `None`.
pub fn time_series(
    table: &PlantTable,
    stations: &[String],
    metric: Metric,
    end_year: Year,
    policy: MissingStationPolicy,
) -> DataResult<Vec<StationSeries>> {
    check_year(table, end_year)?;
    let first = table.years().first;

    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(stations.len());
    for name in stations {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let Some(station) = table.station(name) else {
            match policy {
                MissingStationPolicy::Fail => {
                    return Err(DataError::StationNotFound(name.clone()))
                }
                MissingStationPolicy::Skip => {
                    warn!("Skipping unknown station '{name}' in {metric} series");
                    continue;
                }
            }
        };
        let points = (first..=end_year)
            .map(|year| (year, table.value(station, metric, year)))
            .collect();
        out.push(StationSeries {
            station: name.clone(),
            points,
        });
    }
    Ok(out)
}

fn check_year(table: &PlantTable, year: Year) -> DataResult<()> {
    let range = table.years();
    if range.contains(year) {
        Ok(())
    } else {
        Err(DataError::InvalidYear { year, range })
    }
}
