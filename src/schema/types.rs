// src/schema/types.rs

/// Logical type of a raw source column, before it is mapped to Arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

/// A single allow-listed column of a raw source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// A raw source table: a name for error reporting plus the columns kept from it.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSpec {
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A code column and the label column it is paired with in the traffic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoricalPair {
    pub code: &'static str,
    pub label: &'static str,
    /// Key under which the derived mapping is stored; `None` uses `code`.
    pub feature: Option<&'static str>,
}

impl CategoricalPair {
    pub const fn new(code: &'static str, label: &'static str) -> Self {
        Self {
            code,
            label,
            feature: None,
        }
    }

    pub fn feature_name(&self) -> &'static str {
        self.feature.unwrap_or(self.code)
    }
}
