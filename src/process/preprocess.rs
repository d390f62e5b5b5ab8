use arrow::record_batch::RecordBatch;
use std::path::Path;
use tracing::info;

use super::mapping::{derive_mapping, MappingSet};
use super::utils::{drop_column, pad_fips_state};
use super::{read_table, TrafficData};
use crate::cache;
use crate::config::DatasetPaths;
use crate::error::Result;
use crate::schema::{CategoricalPair, CATEGORICAL_PAIRS, STATE_CODE_COLUMN, STATION, TRAFFIC};

/// Derive the mapping for `pair`, register it in `mappings`, and return
/// `batch` without the label column the mapping now stands in for.
pub fn fold_categorical(
    batch: &RecordBatch,
    pair: &CategoricalPair,
    mappings: &mut MappingSet,
) -> Result<RecordBatch> {
    let map = derive_mapping(batch, pair)?;
    mappings.insert(pair.feature_name(), map)?;
    drop_column(batch, pair.label)
}

/// Read both raw tables and apply every normalization step, in memory only.
///
/// 1. read each table restricted to its allow-list
/// 2. zero-pad the state code on both
/// 3. fold each categorical pair of the traffic table into a mapping
#[tracing::instrument(
    level = "info",
    skip(traffic_source, station_source),
    fields(traffic = %traffic_source.display(), station = %station_source.display())
)]
pub fn build(traffic_source: &Path, station_source: &Path) -> Result<TrafficData> {
    let traffic = read_table(traffic_source, &TRAFFIC)?;
    let station = read_table(station_source, &STATION)?;

    let mut traffic = pad_fips_state(&traffic, STATE_CODE_COLUMN)?;
    let station = pad_fips_state(&station, STATE_CODE_COLUMN)?;

    let mut mappings = MappingSet::with_state_references();
    for pair in CATEGORICAL_PAIRS {
        traffic = fold_categorical(&traffic, pair, &mut mappings)?;
    }

    info!(
        traffic_rows = traffic.num_rows(),
        station_rows = station.num_rows(),
        mappings = mappings.len(),
        "preprocessed raw tables"
    );

    Ok(TrafficData {
        traffic,
        station,
        mappings,
    })
}

/// Rebuild the cache: [`build`] from the raw sources in `paths`, then write
/// all three artifacts to their cache destinations.
pub fn preprocess(paths: &DatasetPaths) -> Result<TrafficData> {
    let data = build(&paths.traffic_source, &paths.station_source)?;
    cache::write_artifacts(&data, paths)?;
    Ok(data)
}
