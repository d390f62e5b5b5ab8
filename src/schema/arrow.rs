// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::columns::CATEGORICAL_PAIRS;
use super::types::{ColumnKind, TableSpec};
use crate::error::{Error, Result};

/// Map a raw column kind into an Arrow DataType.
///
/// - Integer → Int64
/// - Float   → Float64
/// - Text    → Utf8
pub fn map_to_arrow_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Integer => DataType::Int64,
        ColumnKind::Float => DataType::Float64,
        ColumnKind::Text => DataType::Utf8,
    }
}

/// Build the schema the CSV reader parses a raw file with, plus the projection
/// that keeps only the allow-listed columns.
///
/// Every header gets a field (Utf8 unless allow-listed) so the reader lines up
/// with the file; the projection is in file order.
pub fn build_read_schema(
    headers: &[String],
    spec: &TableSpec,
) -> Result<(Arc<ArrowSchema>, Vec<usize>)> {
    let mut fields = Vec::with_capacity(headers.len());
    let mut projection = Vec::with_capacity(spec.columns.len());

    for (idx, name) in headers.iter().enumerate() {
        match spec.get(name) {
            Some(col) if !projection.iter().any(|&p: &usize| headers[p] == *name) => {
                fields.push(ArrowField::new(name, map_to_arrow_type(col.kind), true));
                projection.push(idx);
            }
            _ => fields.push(ArrowField::new(name, DataType::Utf8, true)),
        }
    }

    if let Some(missing) = spec
        .columns
        .iter()
        .find(|c| !headers.iter().any(|h| h == c.name))
    {
        return Err(Error::MissingColumn {
            table: spec.name.to_string(),
            column: missing.name.to_string(),
        });
    }

    Ok((Arc::new(ArrowSchema::new(fields)), projection))
}

/// Column names a cache artifact of `spec` must carry, in allow-list order,
/// minus the label columns folded into mappings.
pub fn cache_field_names(spec: &TableSpec) -> Vec<&'static str> {
    spec.columns
        .iter()
        .map(|c| c.name)
        .filter(|name| !CATEGORICAL_PAIRS.iter().any(|p| p.label == *name))
        .collect()
}
