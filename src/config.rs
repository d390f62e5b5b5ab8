use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

pub const TRAFFIC_SOURCE: &str = "dot_traffic_2015.txt.gz";
pub const STATION_SOURCE: &str = "dot_traffic_stations_2015.txt.gz";
pub const TRAFFIC_CACHE: &str = "dot_traffic_2015.parquet";
pub const STATION_CACHE: &str = "dot_traffic_stations_2015.parquet";
pub const MAPPING_CACHE: &str = "dot_mappings_2015.json";

/// Where the raw source tables live and where their cache artifacts go.
///
/// Defaults place everything under `datasets/`; `DatasetPaths::under(".")`
/// keeps sources and artifacts side by side in the working directory. Any key
/// missing from a YAML override keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub traffic_source: PathBuf,
    pub station_source: PathBuf,
    pub traffic_cache: PathBuf,
    pub station_cache: PathBuf,
    pub mapping_cache: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self::under("datasets")
    }
}

impl DatasetPaths {
    /// Every default file name, rooted at `dir`.
    pub fn under(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            traffic_source: dir.join(TRAFFIC_SOURCE),
            station_source: dir.join(STATION_SOURCE),
            traffic_cache: dir.join(TRAFFIC_CACHE),
            station_cache: dir.join(STATION_CACHE),
            mapping_cache: dir.join(MAPPING_CACHE),
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let paths: Self = serde_yaml::from_reader(file)?;
        paths.check_distinct_caches()?;
        Ok(paths)
    }

    /// Each cache artifact needs its own file; aliased destinations would
    /// overwrite one another.
    pub fn check_distinct_caches(&self) -> Result<()> {
        let files = self.cache_files();
        for (i, a) in files.iter().enumerate() {
            if files[i + 1..].contains(a) {
                return Err(Error::DuplicateCachePath {
                    path: a.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn cache_files(&self) -> [&Path; 3] {
        [
            self.traffic_cache.as_path(),
            self.station_cache.as_path(),
            self.mapping_cache.as_path(),
        ]
    }
}
