//! Writes a synthetic power plant dataset in the published column layout.
//!
//! `generate_sample [OUTPUT]` — `.csv` (default `sample_plants.csv`) or
//! `.parquet`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use plant_dash::config::DashboardConfig;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated row; `None` cells are written empty.
struct PlantRow {
    name: String,
    city: Option<String>,
    project_type: String,
    scale_mw: f64,
    generation: Vec<f64>,
    rate: Vec<f64>,
}

fn generate(config: &DashboardConfig, n: usize, rng: &mut SimpleRng) -> Vec<PlantRow> {
    let cities = ["Xining", "Golmud", "Delingha", "Gonghe"];
    let types = ["Photovoltaic", "Wind", "Hydro"];
    let years: Vec<i32> = config.years.iter().collect();

    (0..n)
        .map(|i| {
            let project_type = rng.pick(&types);
            let scale_mw = (rng.range(5.0, 100.0) * 10.0).round() / 10.0;
            // Stations commissioned later report zeros for earlier years.
            let start = years[(rng.next_u64() % 3) as usize];
            let capacity_factor = match project_type {
                "Photovoltaic" => 0.18,
                "Wind" => 0.28,
                _ => 0.45,
            };
            let mut generation = Vec::with_capacity(years.len());
            let mut rate = Vec::with_capacity(years.len());
            for &year in &years {
                if year < start {
                    generation.push(0.0);
                    rate.push(0.0);
                } else {
                    let mwh = scale_mw * 8760.0 * capacity_factor * rng.range(0.85, 1.1);
                    generation.push(mwh.round());
                    rate.push((rng.range(0.01, 0.2) * 1000.0).round() / 1000.0);
                }
            }
            PlantRow {
                name: format!("{} {} Station {:02}", rng.pick(&cities), project_type, i + 1),
                // Every 13th row lacks a city so the loader's row drop has work to do.
                city: (i % 13 != 12).then(|| rng.pick(&cities).to_string()),
                project_type: project_type.to_string(),
                scale_mw,
                generation,
                rate,
            }
        })
        .collect()
}

fn headers(config: &DashboardConfig) -> Vec<String> {
    let cols = &config.columns;
    let mut headers: Vec<String> = cols.attributes().iter().map(|s| s.to_string()).collect();
    headers.extend(config.years.iter().map(|y| cols.power_generation_for(y)));
    headers.extend(config.years.iter().map(|y| cols.replacement_rate_for(y)));
    headers
}

fn write_csv(path: &Path, config: &DashboardConfig, rows: &[PlantRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(headers(config))?;
    for row in rows {
        let mut record = vec![
            row.city.clone().unwrap_or_default(),
            row.project_type.clone(),
            row.name.clone(),
            row.scale_mw.to_string(),
        ];
        record.extend(row.generation.iter().map(|v| v.to_string()));
        record.extend(row.rate.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, config: &DashboardConfig, rows: &[PlantRow]) -> Result<()> {
    let headers = headers(config);
    let n_years = config.years.len();

    let mut fields = vec![
        Field::new(&headers[0], DataType::Utf8, true),
        Field::new(&headers[1], DataType::Utf8, false),
        Field::new(&headers[2], DataType::Utf8, false),
        Field::new(&headers[3], DataType::Float64, false),
    ];
    fields.extend(
        headers[4..]
            .iter()
            .map(|h| Field::new(h, DataType::Float64, false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.city.as_deref()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.project_type.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.scale_mw).collect::<Vec<_>>(),
        )),
    ];
    for i in 0..n_years {
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.generation[i]).collect::<Vec<_>>(),
        )));
    }
    for i in 0..n_years {
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.rate[i]).collect::<Vec<_>>(),
        )));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_plants.csv"));

    let config = DashboardConfig::default();
    let mut rng = SimpleRng::new(42);
    let rows = generate(&config, 40, &mut rng);

    let is_parquet = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(&output, &config, &rows)?;
    } else {
        write_csv(&output, &config, &rows)?;
    }

    println!("Wrote {} stations to {}", rows.len(), output.display());
    Ok(())
}
