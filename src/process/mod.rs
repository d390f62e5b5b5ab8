// src/process/mod.rs
use arrow::{compute::concat_batches, csv::ReaderBuilder, record_batch::RecordBatch};
use flate2::read::GzDecoder;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    sync::Arc,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{build_read_schema, TableSpec};

pub mod fips;
pub mod mapping;
pub mod preprocess;
pub mod utils;

pub use mapping::{CodeMap, MappingSet};
pub use preprocess::{build, preprocess};

const BATCH_SIZE: usize = 64 * 1024;

/// The three artifacts the cache holds: both tables plus their lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficData {
    /// Hourly counts per station and day, label columns folded into `mappings`.
    pub traffic: RecordBatch,
    /// One row per monitoring station.
    pub station: RecordBatch,
    pub mappings: MappingSet,
}

/// Open a raw source table, gunzipping it when the name ends in `.gz`.
fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Column names from the header row of `path`.
fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(open_source(path)?);
    Ok(rdr.headers()?.iter().map(utils::clean_str).collect())
}

/// Read a delimited source table, keeping only the columns in `spec`.
///
/// Columns come back in file order with the types `spec` assigns them; every
/// other column is parsed as text and discarded by the projection.
#[tracing::instrument(level = "info", skip(path, spec), fields(path = %path.display(), table = spec.name))]
pub fn read_table(path: &Path, spec: &TableSpec) -> Result<RecordBatch> {
    let headers = read_headers(path)?;
    let (read_schema, projection) = build_read_schema(&headers, spec)?;
    let schema = Arc::new(read_schema.project(&projection)?);

    let reader = ReaderBuilder::new(read_schema)
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_projection(projection)
        .build(open_source(path)?)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let table = concat_batches(&schema, &batches)?;
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        batches = batches.len(),
        "read table"
    );
    Ok(table)
}
