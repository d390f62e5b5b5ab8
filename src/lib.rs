//! Load-or-build cache for the 2015 DOT traffic volume and station datasets.
//!
//! Raw gzipped CSVs are read once, normalized, and written as Parquet tables
//! plus a JSON mapping file; later loads read the cached artifacts directly.

pub mod cache;
pub mod config;
pub mod error;
pub mod process;
pub mod schema;

pub use cache::{load, load_data, load_with, LoadOutcome};
pub use config::DatasetPaths;
pub use error::{Error, Result};
pub use process::{preprocess, CodeMap, MappingSet, TrafficData};
