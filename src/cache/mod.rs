// src/cache/mod.rs

use arrow::{
    compute::concat_batches,
    datatypes::{DataType, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression};
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, warn};

use crate::config::DatasetPaths;
use crate::error::{Error, Result};
use crate::process::fips::{FIPS_STATE_ABB_KEY, FIPS_STATE_FULL_KEY};
use crate::process::{MappingSet, TrafficData};
use crate::schema::{
    cache_field_names, TableSpec, CATEGORICAL_PAIRS, STATE_CODE_COLUMN, STATION, TRAFFIC,
};

pub mod loader;

pub use loader::{load, load_data, load_with, LoadOutcome};

const READ_BATCH_SIZE: usize = 64 * 1024;

/// Hidden sibling an artifact is staged in before being renamed over `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
        }
        _ => Ok(()),
    }
}

fn write_parquet(batch: &RecordBatch, path: &Path, compression: Compression) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let props = WriterProperties::builder()
        .set_compression(compression)
        .set_dictionary_enabled(true)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_mappings(mappings: &MappingSet, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, mappings)?;
    out.write_all(b"\n").map_err(|e| Error::io(path, e))?;
    out.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Write all three artifacts of `data` to the cache locations in `paths`.
///
/// Each artifact is staged next to its destination; nothing is renamed into
/// place until all three staged files are complete, and staged files are
/// removed if any write or rename fails. A failed rename after the first one
/// leaves the artifacts already renamed in place.
#[tracing::instrument(level = "info", skip(data, paths), fields(traffic = %paths.traffic_cache.display()))]
pub fn write_artifacts(data: &TrafficData, paths: &DatasetPaths) -> Result<()> {
    paths.check_distinct_caches()?;
    let staged: Vec<(PathBuf, &Path)> = paths
        .cache_files()
        .into_iter()
        .map(|dest| (staging_path(dest), dest))
        .collect();

    let written = (|| -> Result<()> {
        for (_, dest) in &staged {
            ensure_parent(dest)?;
        }
        let brotli = Compression::BROTLI(BrotliLevel::try_new(5)?);
        write_parquet(&data.traffic, &staged[0].0, brotli)?;
        write_parquet(&data.station, &staged[1].0, Compression::SNAPPY)?;
        write_mappings(&data.mappings, &staged[2].0)
    })();

    if let Err(e) = written {
        for (tmp, _) in &staged {
            let _ = fs::remove_file(tmp);
        }
        return Err(e);
    }

    for (i, (tmp, dest)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, dest) {
            for (rest, _) in &staged[i..] {
                let _ = fs::remove_file(rest);
            }
            return Err(Error::io(*dest, e));
        }
        debug!(path = %dest.display(), "artifact in place");
    }
    info!(
        traffic_rows = data.traffic.num_rows(),
        station_rows = data.station.num_rows(),
        mappings = data.mappings.len(),
        "cache written"
    );
    Ok(())
}

/// Read a whole Parquet file into a single batch.
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(READ_BATCH_SIZE).build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let table = concat_batches(&schema, &batches)?;

    // drop file-level metadata so cached and freshly built tables compare equal
    let bare = Arc::new(Schema::new(table.schema().fields().clone()));
    Ok(RecordBatch::try_new(bare, table.columns().to_vec())?)
}

/// Check that a cached table has exactly the columns we write for `spec`.
fn check_layout(table: &RecordBatch, spec: &TableSpec, path: &Path) -> Result<()> {
    let schema = table.schema();
    let found: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let expected = cache_field_names(spec);
    if found != expected {
        return Err(Error::SchemaMismatch {
            path: path.to_path_buf(),
            reason: format!("expected columns {:?}, found {:?}", expected, found),
        });
    }

    let state = schema.field_with_name(STATE_CODE_COLUMN)?;
    if state.data_type() != &DataType::Utf8 {
        return Err(Error::SchemaMismatch {
            path: path.to_path_buf(),
            reason: format!("{} is {}, not Utf8", STATE_CODE_COLUMN, state.data_type()),
        });
    }
    Ok(())
}

/// Check that a cached mapping set holds the state references and one
/// mapping per categorical pair.
fn check_mappings(mappings: &MappingSet, path: &Path) -> Result<()> {
    let required = [FIPS_STATE_ABB_KEY, FIPS_STATE_FULL_KEY]
        .into_iter()
        .chain(CATEGORICAL_PAIRS.iter().map(|p| p.feature_name()));
    let missing: Vec<&str> = required.filter(|f| mappings.get(f).is_none()).collect();
    if !missing.is_empty() {
        warn!(path = %path.display(), ?missing, "mapping artifact is incomplete");
        return Err(Error::SchemaMismatch {
            path: path.to_path_buf(),
            reason: format!("missing mappings {:?}", missing),
        });
    }
    Ok(())
}

fn read_mappings(path: &Path) -> Result<MappingSet> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Deserialize all three cache artifacts named in `paths`.
#[tracing::instrument(level = "info", skip(paths), fields(traffic = %paths.traffic_cache.display()))]
pub fn read_artifacts(paths: &DatasetPaths) -> Result<TrafficData> {
    let traffic = read_parquet(&paths.traffic_cache)?;
    check_layout(&traffic, &TRAFFIC, &paths.traffic_cache)?;

    let station = read_parquet(&paths.station_cache)?;
    check_layout(&station, &STATION, &paths.station_cache)?;

    let mappings = read_mappings(&paths.mapping_cache)?;
    check_mappings(&mappings, &paths.mapping_cache)?;

    debug!(
        traffic_rows = traffic.num_rows(),
        station_rows = station.num_rows(),
        "cache read"
    );
    Ok(TrafficData {
        traffic,
        station,
        mappings,
    })
}
