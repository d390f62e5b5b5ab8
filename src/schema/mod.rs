pub mod arrow;
pub mod columns;
pub mod types;

pub use self::arrow::{build_read_schema, cache_field_names, map_to_arrow_type};
pub use columns::{CATEGORICAL_PAIRS, STATE_CODE_COLUMN, STATION, TRAFFIC};
pub use types::{CategoricalPair, Column, ColumnKind, TableSpec};
