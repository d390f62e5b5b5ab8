// src/cache/loader.rs

use tracing::{info, warn};

use super::read_artifacts;
use crate::config::DatasetPaths;
use crate::error::{Error, Result};
use crate::process::{preprocess, TrafficData};

/// Where a successful load got its data from.
#[derive(Debug)]
pub enum LoadOutcome {
    /// All three artifacts were read straight from the cache.
    Cached(TrafficData),
    /// The cache was unusable, so it was rebuilt from raw source and read again.
    Rebuilt {
        data: TrafficData,
        /// What made the first read fail.
        cause: Error,
    },
}

impl LoadOutcome {
    pub fn data(&self) -> &TrafficData {
        match self {
            LoadOutcome::Cached(data) | LoadOutcome::Rebuilt { data, .. } => data,
        }
    }

    pub fn into_data(self) -> TrafficData {
        match self {
            LoadOutcome::Cached(data) | LoadOutcome::Rebuilt { data, .. } => data,
        }
    }

    pub fn was_rebuilt(&self) -> bool {
        matches!(self, LoadOutcome::Rebuilt { .. })
    }
}

/// Load the cached dataset, rebuilding it from raw source at most once.
///
/// Only a recoverable first failure (see [`Error::is_recoverable`]) triggers a
/// rebuild; anything else is returned untouched. Errors from the rebuild or
/// from the second read are returned as-is.
pub fn load(paths: &DatasetPaths) -> Result<LoadOutcome> {
    load_with(paths, |p| preprocess(p).map(drop))
}

/// [`load`] with the rebuild step supplied by the caller. `rebuild` runs at
/// most once and must leave all three artifacts at their cache paths.
#[tracing::instrument(level = "info", skip(paths, rebuild), fields(cache = %paths.traffic_cache.display()))]
pub fn load_with<F>(paths: &DatasetPaths, rebuild: F) -> Result<LoadOutcome>
where
    F: FnOnce(&DatasetPaths) -> Result<()>,
{
    let cause = match read_artifacts(paths) {
        Ok(data) => {
            info!("loaded from cache");
            return Ok(LoadOutcome::Cached(data));
        }
        Err(e) if e.is_recoverable() => e,
        Err(e) => return Err(e),
    };

    warn!(error = %cause, "cache unusable, rebuilding from raw source");
    rebuild(paths)?;
    let data = read_artifacts(paths)?;
    info!("loaded from rebuilt cache");
    Ok(LoadOutcome::Rebuilt { data, cause })
}

/// [`load`], discarding where the data came from.
pub fn load_data(paths: &DatasetPaths) -> Result<TrafficData> {
    load(paths).map(LoadOutcome::into_data)
}
