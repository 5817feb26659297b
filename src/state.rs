use std::path::Path;
use std::sync::Arc;

use log::{error, info};

use crate::color::StationColors;
use crate::config::DashboardConfig;
use crate::data::model::{Metric, PlantTable, Year};
use crate::data::prepare::load_table;
use crate::data::query::{BubblePoint, StationSeries};
use crate::data::{DataResult, QueryEngine};

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// Query results backing the three charts, recomputed on filter change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartViews {
    pub bubble: Vec<BubblePoint>,
    pub generation: Vec<StationSeries>,
    pub replacement: Vec<StationSeries>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Query engine over the loaded table (None until a file is loaded).
    pub engine: Option<QueryEngine>,

    /// Colour per station, fixed for the lifetime of a table.
    pub colors: StationColors,

    pub city: Option<String>,
    pub project_type: Option<String>,

    /// Explicitly picked stations, in pick order. Empty means "defaults".
    pub selected: Vec<String>,

    pub year: Year,

    /// Stations offered by the current city / project type filters.
    pub station_options: Vec<String>,

    pub views: ChartViews,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let year = config.initial_year();
        Self {
            config,
            engine: None,
            colors: StationColors::default(),
            city: None,
            project_type: None,
            selected: Vec::new(),
            year,
            station_options: Vec::new(),
            views: ChartViews::default(),
            status_message: None,
        }
    }

    /// Load and prepare a dataset file, replacing the current one on success.
    pub fn load_path(&mut self, path: &Path) {
        match load_table(path, &self.config) {
            Ok(table) => {
                info!("Loaded {} stations from {}", table.len(), path.display());
                self.set_table(table);
            }
            Err(e) if e.is_load_error() => {
                error!("Failed to load {}: {e}", path.display());
                self.status_message =
                    Some(format!("Cannot open dataset, keeping the current one. {e}"));
            }
            Err(e) => {
                error!("Unexpected error loading {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a prepared table and reset all filters.
    pub fn set_table(&mut self, table: PlantTable) {
        self.colors = StationColors::new(table.stations().iter().map(|s| s.name.as_str()));
        self.engine = Some(QueryEngine::new(Arc::new(table), self.config.clone()));
        self.city = None;
        self.project_type = None;
        self.selected.clear();
        self.year = self.config.initial_year();
        self.status_message = None;
        self.refresh_options();
        self.refresh_views();
    }

    pub fn set_city(&mut self, city: Option<String>) {
        if self.city != city {
            self.city = city;
            self.refresh_options();
        }
    }

    pub fn set_project_type(&mut self, project_type: Option<String>) {
        if self.project_type != project_type {
            self.project_type = project_type;
            self.refresh_options();
        }
    }

    pub fn set_year(&mut self, year: Year) {
        if self.year != year {
            self.year = year;
            self.refresh_views();
        }
    }

    /// Add or remove a station from the explicit selection.
    pub fn toggle_station(&mut self, station: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == station) {
            self.selected.remove(pos);
        } else {
            self.selected.push(station.to_string());
        }
        self.refresh_views();
    }

    pub fn clear_selection(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.refresh_views();
        }
    }

    pub fn is_selected(&self, station: &str) -> bool {
        self.selected.iter().any(|s| s == station)
    }

    /// Recompute the station list; picks no longer offered are dropped.
    pub fn refresh_options(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        self.station_options =
            engine.station_options(self.city.as_deref(), self.project_type.as_deref());
        let before = self.selected.len();
        let options = &self.station_options;
        self.selected.retain(|s| options.contains(s));
        if self.selected.len() != before {
            self.refresh_views();
        }
    }

    /// Re-run the three chart queries. A failing query empties its chart
    /// and reports the error instead of aborting the frame.
    pub fn refresh_views(&mut self) {
        let Some(engine) = &self.engine else {
            self.views = ChartViews::default();
            return;
        };
        let selected = Some(self.selected.as_slice());
        let mut errors = Vec::new();

        let bubble = or_report(engine.bubble_points(selected, self.year), &mut errors);
        let generation = or_report(
            engine.time_series(selected, Metric::PowerGeneration, self.year),
            &mut errors,
        );
        let replacement = or_report(
            engine.time_series(selected, Metric::ReplacementRate, self.year),
            &mut errors,
        );

        self.views = ChartViews {
            bubble,
            generation,
            replacement,
        };
        self.status_message = errors.first().map(|e| format!("Error: {e}"));
    }
}

fn or_report<T: Default>(result: DataResult<T>, errors: &mut Vec<String>) -> T {
    result.unwrap_or_else(|e| {
        error!("Query failed: {e}");
        errors.push(e.to_string());
        T::default()
    })
}
