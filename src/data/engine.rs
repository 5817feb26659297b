use std::borrow::Cow;
use std::sync::Arc;

use log::debug;

use super::error::DataResult;
use super::model::{Metric, PlantTable, Year};
use super::query::{self, BubblePoint, StationSeries};
use crate::config::DashboardConfig;

/// Read-only query front end shared by the UI.
///
/// Holds the prepared table behind an `Arc`, so clones are cheap and
/// concurrent calls from several threads are safe. Empty selections are
/// replaced by the configured default selection before querying.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    table: Arc<PlantTable>,
    config: DashboardConfig,
}

impl QueryEngine {
    pub fn new(table: Arc<PlantTable>, config: DashboardConfig) -> Self {
        QueryEngine { table, config }
    }

    pub fn table(&self) -> &PlantTable {
        &self.table
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn station_options(&self, city: Option<&str>, project_type: Option<&str>) -> Vec<String> {
        query::station_options(&self.table, city, project_type)
    }

    pub fn bubble_points(
        &self,
        selected: Option<&[String]>,
        year: Year,
    ) -> DataResult<Vec<BubblePoint>> {
        let stations = self.selection_or_default(selected, self.config.bubble_default_count);
        let points = query::bubble_points(&self.table, &stations, year, self.config.bubble_x_axis)?;
        debug!(
            "bubble_points: {} stations, year {year} → {} points",
            stations.len(),
            points.len()
        );
        Ok(points)
    }

    pub fn time_series(
        &self,
        selected: Option<&[String]>,
        metric: Metric,
        end_year: Year,
    ) -> DataResult<Vec<StationSeries>> {
        let stations = self.selection_or_default(selected, self.config.series_default_count);
        let series = query::time_series(
            &self.table,
            &stations,
            metric,
            end_year,
            self.config.missing_station,
        )?;
        debug!(
            "time_series: {metric} through {end_year} for {} stations",
            series.len()
        );
        Ok(series)
    }

    fn selection_or_default<'a>(
        &self,
        selected: Option<&'a [String]>,
        n: usize,
    ) -> Cow<'a, [String]> {
        match selected {
            Some(names) if !names.is_empty() => Cow::Borrowed(names),
            _ => Cow::Owned(query::default_selection(&self.table, n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingStationPolicy;
    use crate::data::error::DataError;
    use crate::data::model::RawTable;
    use crate::data::prepare::prepare;
    use crate::data::prepare::tests::raw_row;

    fn engine(n: usize, config: DashboardConfig) -> QueryEngine {
        let yearly = [
            (0.0, 0.0),
            (150.0, 0.05),
            (250.0, 0.1),
            (350.0, 0.0),
            (450.0, 0.2),
            (550.0, 0.25),
        ];
        let rows = (0..n)
            .map(|i| {
                let city = if i % 2 == 0 { "Even" } else { "Odd" };
                raw_row(&format!("S{i:02}"), city, "Solar", i as f64 + 1.0, yearly)
            })
            .collect();
        let table = prepare(&RawTable::from_rows(rows), &config).unwrap();
        QueryEngine::new(Arc::new(table), config)
    }

    #[test]
    fn bubble_defaults_to_first_twenty() {
        let engine = engine(25, DashboardConfig::default());
        let points = engine.bubble_points(None, 2017).unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(points[0].station, "S00");
        assert_eq!(points[19].station, "S19");

        let points = engine.bubble_points(Some(Vec::new().as_slice()), 2017).unwrap();
        assert_eq!(points.len(), 20);
    }

    #[test]
    fn series_defaults_to_first_two() {
        let engine = engine(5, DashboardConfig::default());
        let series = engine
            .time_series(None, Metric::ReplacementRate, 2021)
            .unwrap();
        let stations: Vec<_> = series.iter().map(|s| s.station.as_str()).collect();
        assert_eq!(stations, vec!["S00", "S01"]);
        assert_eq!(series[0].points[0], (2016, None));
        assert_eq!(series[0].points[3], (2019, None));
        assert_eq!(series[0].points.len(), 6);
    }

    #[test]
    fn defaults_are_overridable() {
        let config = DashboardConfig {
            bubble_default_count: 3,
            series_default_count: 1,
            ..DashboardConfig::default()
        };
        let engine = engine(10, config);
        assert_eq!(engine.bubble_points(None, 2018).unwrap().len(), 3);
        assert_eq!(
            engine
                .time_series(None, Metric::PowerGeneration, 2018)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn explicit_selection_wins() {
        let engine = engine(10, DashboardConfig::default());
        let selected = vec!["S07".to_string()];
        let points = engine.bubble_points(Some(selected.as_slice()), 2021).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].size, 8.0);
    }

    #[test]
    fn missing_station_policy_from_config() {
        let selected = vec!["S01".to_string(), "ghost".to_string()];

        let strict = engine(3, DashboardConfig::default());
        assert!(matches!(
            strict.time_series(Some(selected.as_slice()), Metric::PowerGeneration, 2020),
            Err(DataError::StationNotFound(_))
        ));

        let lenient = engine(
            3,
            DashboardConfig {
                missing_station: MissingStationPolicy::Skip,
                ..DashboardConfig::default()
            },
        );
        let series = lenient
            .time_series(Some(selected.as_slice()), Metric::PowerGeneration, 2020)
            .unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn concurrent_queries_agree() {
        let engine = engine(30, DashboardConfig::default());
        let expected = engine.bubble_points(None, 2020).unwrap();
        let options = engine.station_options(Some("Even"), None);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let engine = engine.clone();
                let expected = &expected;
                let options = &options;
                scope.spawn(move || {
                    for _ in 0..50 {
                        assert_eq!(&engine.bubble_points(None, 2020).unwrap(), expected);
                        assert_eq!(&engine.station_options(Some("Even"), None), options);
                        engine
                            .time_series(None, Metric::ReplacementFreeRate, 2021)
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(options.len(), 15);
    }
}
