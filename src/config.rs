//! Dashboard configuration.
//!
//! Every field has a default matching the published dataset, so an empty
//! JSON object (or no file at all) yields a working dashboard.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::{Year, YearRange};

/// Placeholder substituted with the year in yearly column templates.
pub const YEAR_PLACEHOLDER: &str = "{year}";

// ---------------------------------------------------------------------------
// Column names of the raw dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub city: String,
    pub project_type: String,
    pub station_name: String,
    pub scale_mw: String,
    /// Template containing [`YEAR_PLACEHOLDER`].
    pub power_generation: String,
    /// Template containing [`YEAR_PLACEHOLDER`].
    pub replacement_rate: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            city: "City".into(),
            project_type: "Project Type".into(),
            station_name: "Project Power Station Name".into(),
            scale_mw: "Power Station Scale (MW)".into(),
            power_generation: "Power Generation {year}(MWh)".into(),
            replacement_rate: "component replacement rate {year}".into(),
        }
    }
}

impl ColumnNames {
    pub fn power_generation_for(&self, year: Year) -> String {
        self.power_generation
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    pub fn replacement_rate_for(&self, year: Year) -> String {
        self.replacement_rate
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    /// The four per-station attribute columns.
    pub fn attributes(&self) -> [&str; 4] {
        [
            &self.city,
            &self.project_type,
            &self.station_name,
            &self.scale_mw,
        ]
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What a time-series query does with a selected station absent from the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStationPolicy {
    #[default]
    Fail,
    Skip,
}

/// Quantity plotted on the bubble chart's x axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleAxis {
    #[default]
    ReplacementRate,
    ReplacementFreeRate,
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub years: YearRange,
    /// Stations shown on the bubble chart when nothing is selected.
    pub bubble_default_count: usize,
    /// Stations shown on the line charts when nothing is selected.
    pub series_default_count: usize,
    /// Initial slider position; `None` means the last year of the range.
    pub default_year: Option<Year>,
    pub columns: ColumnNames,
    pub missing_station: MissingStationPolicy,
    pub bubble_x_axis: BubbleAxis,
    pub bubble_size_factor: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            years: YearRange::default(),
            bubble_default_count: 20,
            series_default_count: 2,
            default_year: None,
            columns: ColumnNames::default(),
            missing_station: MissingStationPolicy::default(),
            bubble_x_axis: BubbleAxis::default(),
            bubble_size_factor: 3.0,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON configuration file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            bail!("year range {} is inverted", self.years);
        }
        if let Some(year) = self.default_year {
            if !self.years.contains(year) {
                bail!("default year {year} is outside {}", self.years);
            }
        }
        if self.bubble_default_count == 0 || self.series_default_count == 0 {
            bail!("default selection counts must be at least 1");
        }
        for template in [&self.columns.power_generation, &self.columns.replacement_rate] {
            if !template.contains(YEAR_PLACEHOLDER) {
                bail!("column template '{template}' lacks {YEAR_PLACEHOLDER}");
            }
        }
        if !(self.bubble_size_factor.is_finite() && self.bubble_size_factor > 0.0) {
            bail!("bubble size factor must be positive");
        }
        Ok(())
    }

    pub fn initial_year(&self) -> Year {
        self.default_year.unwrap_or(self.years.last)
    }
}
