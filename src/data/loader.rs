use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawRow, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load raw plant rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one station per line (the published layout)
/// * `.json`    – `[{ "City": "...", "Power Generation 2016(MWh)": 0, ... }, ...]`
/// * `.parquet` – flat scalar columns, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Cell texts read as missing, matching the default `na_values` of
/// `pandas.read_csv`.
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parse CSV from any reader. Cells stay text; numbers are parsed on demand
/// by [`CellValue::as_f64`], so identifiers such as `007` survive intact.
/// Null markers become [`CellValue::Null`].
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RawTable> {
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: RawRow = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.clone(), csv_cell(record.get(i).unwrap_or(""))))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

fn csv_cell(s: &str) -> CellValue {
    let s = s.trim();
    if NULL_MARKERS.contains(&s) {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let row: RawRow = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        rows.push(row);
    }

    Ok(RawTable::from_rows(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per raw field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        for row in 0..batch.num_rows() {
            let mut cells = RawRow::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}, column '{}'", field.name()))?;
                cells.insert(field.name().clone(), value);
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single scalar cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_cells_stay_text() {
        let data = "City,Project Type,Power Generation 2016(MWh)\nX,Solar,0\nY,,12.5\n";
        let table = read_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(
            table.columns,
            vec!["City", "Project Type", "Power Generation 2016(MWh)"]
        );
        assert_eq!(table.rows.len(), 2);
        let generation = &table.rows[0]["Power Generation 2016(MWh)"];
        assert_eq!(generation, &CellValue::String("0".into()));
        assert_eq!(generation.as_f64(), Some(0.0));
        assert_eq!(table.rows[1]["Project Type"], CellValue::Null);
        assert_eq!(table.rows[1]["Power Generation 2016(MWh)"].as_f64(), Some(12.5));
    }

    #[test]
    fn csv_identifiers_are_not_reparsed() {
        let data = "Name,Flag,Big\n007,true,1e3\n";
        let table = read_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();
        let row = &table.rows[0];
        assert_eq!(row["Name"].to_string(), "007");
        assert_eq!(row["Flag"].to_string(), "true");
        assert_eq!(row["Big"].to_string(), "1e3");
    }

    #[test]
    fn csv_null_markers() {
        let data = "A,B,C,D,E\nN/A,NA,null,#N/A,<NA>\n";
        let table = read_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert!(table.rows[0].values().all(|v| v.is_null()));
    }

    #[test]
    fn json_records() {
        let table = parse_json(r#"[{"City": "X", "Scale": 10, "Rate": null}, {"City": "Y", "Scale": 2.5, "Rate": 0.1}]"#)
            .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Rate"], CellValue::Null);
        assert_eq!(table.rows[1]["Scale"], CellValue::Float(2.5));
        assert!(table.has_column("City"));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert!(parse_json(r#"{"City": "X"}"#).is_err());
        assert!(parse_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("plants.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
