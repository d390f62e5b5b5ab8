use arrow::{
    array::{ArrayRef, AsArray, StringArray},
    compute::cast,
    datatypes::{DataType, Field, FieldRef, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Render a numeric state code as exactly two zero-padded digits
/// (`"1"` → `"01"`, `"36"` → `"36"`).
pub fn normalize_state_code(raw: &str) -> Result<String> {
    match clean_str(raw).parse::<u8>() {
        Ok(n) if n < 100 => Ok(format!("{:02}", n)),
        _ => Err(Error::InvalidStateCode {
            value: raw.to_string(),
        }),
    }
}

/// Replace `column` with its 2-character, zero-padded, string-typed form.
///
/// Accepts either an integer or a text column. The rewritten field is
/// non-nullable: a missing state code is an error, not a null.
pub fn pad_fips_state(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let schema = batch.schema();
    let idx = schema.index_of(column)?;

    let as_text = cast(batch.column(idx), &DataType::Utf8)?;
    let padded = as_text
        .as_string::<i32>()
        .iter()
        .map(|v| normalize_state_code(v.unwrap_or_default()))
        .collect::<Result<Vec<String>>>()?;

    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    fields[idx] = Arc::new(Field::new(column, DataType::Utf8, false));
    let mut columns = batch.columns().to_vec();
    columns[idx] = Arc::new(StringArray::from(padded)) as ArrayRef;

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Copy of `batch` without `column`.
pub fn drop_column(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let idx = batch.schema().index_of(column)?;
    let keep: Vec<usize> = (0..batch.num_columns()).filter(|&i| i != idx).collect();
    Ok(batch.project(&keep)?)
}
