use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use eframe::egui;
use log::info;
use serde::Serialize;

use plant_dash::app::PlantDashApp;
use plant_dash::config::DashboardConfig;
use plant_dash::data::model::Metric;
use plant_dash::data::prepare::load_table;
use plant_dash::data::query::{BubblePoint, StationSeries};
use plant_dash::data::{QueryEngine, Year};
use plant_dash::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "plant-dash",
    about = "Power plant generation and component replacement dashboard."
)]
struct Cli {
    /// Dataset to open on start (.csv, .json or .parquet).
    #[arg(value_name = "DATASET")]
    dataset: Option<PathBuf>,
    /// JSON configuration file overriding years, defaults and column names.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Initial year of the slider.
    #[arg(long)]
    year: Option<Year>,
    /// Print the three chart queries as JSON and exit instead of opening a window.
    #[arg(long, requires = "dataset")]
    print: bool,
}

#[derive(Serialize)]
struct Snapshot {
    year: Year,
    station_options: Vec<String>,
    bubble: Vec<BubblePoint>,
    power_generation: Vec<StationSeries>,
    replacement_rate: Vec<StationSeries>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(year) = cli.year {
        config.default_year = Some(year);
        config.validate()?;
    }

    if cli.print {
        if let Some(path) = &cli.dataset {
            return print_snapshot(path, config);
        }
    }

    let mut state = AppState::new(config);
    if let Some(path) = &cli.dataset {
        state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Power Plants",
        options,
        Box::new(|_cc| Ok(Box::new(PlantDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}

fn print_snapshot(path: &std::path::Path, config: DashboardConfig) -> Result<()> {
    let year = config.initial_year();
    let table = load_table(path, &config)?;
    info!("Printing snapshot for {year}");
    let engine = QueryEngine::new(table.into(), config);

    let snapshot = Snapshot {
        year,
        station_options: engine.station_options(None, None),
        bubble: engine.bubble_points(None, year)?,
        power_generation: engine.time_series(None, Metric::PowerGeneration, year)?,
        replacement_rate: engine.time_series(None, Metric::ReplacementRate, year)?,
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
