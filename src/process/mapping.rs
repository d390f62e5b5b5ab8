use arrow::{
    array::{ArrayRef, AsArray},
    compute::cast,
    datatypes::DataType,
    record_batch::RecordBatch,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    collections::{hash_map::Entry, BTreeMap, HashMap},
};
use tracing::{debug, warn};

use super::fips::{fips_state_abb, fips_state_full, FIPS_STATE_ABB_KEY, FIPS_STATE_FULL_KEY};
use crate::error::{Error, Result};
use crate::schema::CategoricalPair;

/// Order codes numerically when both are integers, textually otherwise.
/// Integer codes sort ahead of non-integer ones.
pub fn code_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// A code → label lookup, kept sorted by [`code_order`].
///
/// Serialized as a JSON object in code order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMap {
    entries: Vec<(String, String)>,
}

impl CodeMap {
    /// Sort `pairs` by code. When a code repeats, the first label wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries: Vec<(String, String)> = pairs.into_iter().collect();
        entries.sort_by(|a, b| code_order(&a.0, &b.0));
        entries.dedup_by(|later, earlier| later.0 == earlier.0);
        Self { entries }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|(c, _)| code_order(c, code))
            .ok()
            .map(|i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }
}

impl Serialize for CodeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(c, l)| (c, l)))
    }
}

impl<'de> Deserialize<'de> for CodeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(Self::from_pairs(raw))
    }
}

/// Every lookup table that ships with the cached dataset, keyed by feature name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingSet {
    mappings: BTreeMap<String, CodeMap>,
}

impl MappingSet {
    /// A set holding only the two static state reference tables.
    pub fn with_state_references() -> Self {
        let mut mappings = BTreeMap::new();
        mappings.insert(FIPS_STATE_ABB_KEY.to_string(), fips_state_abb());
        mappings.insert(FIPS_STATE_FULL_KEY.to_string(), fips_state_full());
        Self { mappings }
    }

    /// Register `map` under `feature`. Reusing a feature name is an error.
    pub fn insert(&mut self, feature: impl Into<String>, map: CodeMap) -> Result<()> {
        let feature = feature.into();
        if self.mappings.contains_key(&feature) {
            return Err(Error::MappingKeyCollision { feature });
        }
        self.mappings.insert(feature, map);
        Ok(())
    }

    pub fn get(&self, feature: &str) -> Option<&CodeMap> {
        self.mappings.get(feature)
    }

    pub fn label(&self, feature: &str, code: &str) -> Option<&str> {
        self.get(feature).and_then(|m| m.get(code))
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeMap)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn column_as_text(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    let idx = batch.schema().index_of(name)?;
    Ok(cast(batch.column(idx), &DataType::Utf8)?)
}

/// Collect the distinct code → label pairs of `pair` in `batch`.
///
/// Fails if one code carries two labels or one label is shared by two codes.
/// Rows where either side is null are skipped.
#[tracing::instrument(level = "debug", skip(batch), fields(feature = pair.feature_name()))]
pub fn derive_mapping(batch: &RecordBatch, pair: &CategoricalPair) -> Result<CodeMap> {
    let feature = pair.feature_name();
    let codes = column_as_text(batch, pair.code)?;
    let labels = column_as_text(batch, pair.label)?;

    let mut by_code: HashMap<&str, &str> = HashMap::new();
    let mut by_label: HashMap<&str, &str> = HashMap::new();
    let mut skipped = 0usize;

    for (code, label) in codes
        .as_string::<i32>()
        .iter()
        .zip(labels.as_string::<i32>().iter())
    {
        let (Some(code), Some(label)) = (code, label) else {
            skipped += 1;
            continue;
        };

        match by_code.entry(code) {
            Entry::Occupied(seen) if *seen.get() == label => continue,
            Entry::Occupied(seen) => {
                return Err(Error::DuplicateCode {
                    feature: feature.to_string(),
                    code: code.to_string(),
                    first: seen.get().to_string(),
                    second: label.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(label);
            }
        }

        if let Some(prev) = by_label.insert(label, code) {
            return Err(Error::DuplicateLabel {
                feature: feature.to_string(),
                label: label.to_string(),
                first: prev.to_string(),
                second: code.to_string(),
            });
        }
    }

    if skipped > 0 {
        warn!(feature, skipped, "rows with null code or label left out of mapping");
    }

    let map = CodeMap::from_pairs(
        by_code
            .into_iter()
            .map(|(c, l)| (c.to_string(), l.to_string())),
    );
    debug!(feature, entries = map.len(), "derived mapping");
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    const DIRECTION: CategoricalPair =
        CategoricalPair::new("direction_of_travel", "direction_of_travel_name");

    fn direction_batch(codes: Vec<Option<i64>>, labels: Vec<Option<&str>>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("direction_of_travel", DataType::Int64, true),
            Field::new("direction_of_travel_name", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(codes)),
                Arc::new(StringArray::from(labels)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn codes_sort_numerically_then_textually() {
        let mut codes = vec!["1U", "10", "2", "1R", "01"];
        codes.sort_by(|a, b| code_order(a, b));
        assert_eq!(codes, vec!["01", "2", "10", "1R", "1U"]);
    }

    #[test]
    fn consistent_pairs_yield_one_entry_each() -> anyhow::Result<()> {
        let batch = direction_batch(
            vec![Some(5), Some(1), Some(5), Some(1), Some(3)],
            vec![
                Some("South"),
                Some("North"),
                Some("South"),
                Some("North"),
                Some("East"),
            ],
        );
        let map = derive_mapping(&batch, &DIRECTION)?;
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![("1", "North"), ("3", "East"), ("5", "South")]
        );
        Ok(())
    }

    #[test]
    fn same_code_with_two_labels_fails() {
        let batch = direction_batch(vec![Some(1), Some(1)], vec![Some("North"), Some("South")]);
        match derive_mapping(&batch, &DIRECTION) {
            Err(Error::DuplicateCode { code, first, second, .. }) => {
                assert_eq!(code, "1");
                assert_eq!(first, "North");
                assert_eq!(second, "South");
            }
            other => panic!("expected DuplicateCode, got {other:?}"),
        }
    }

    #[test]
    fn same_label_with_two_codes_fails() {
        let batch = direction_batch(vec![Some(1), Some(2)], vec![Some("North"), Some("North")]);
        assert!(matches!(
            derive_mapping(&batch, &DIRECTION),
            Err(Error::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn null_cells_are_skipped() -> anyhow::Result<()> {
        let batch = direction_batch(
            vec![Some(7), None, Some(3)],
            vec![Some("West"), Some("Unknown"), None],
        );
        let map = derive_mapping(&batch, &DIRECTION)?;
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("7"), Some("West"));
        Ok(())
    }

    #[test]
    fn feature_override_names_the_mapping() {
        let pair = CategoricalPair {
            feature: Some("direction"),
            ..DIRECTION
        };
        assert_eq!(pair.feature_name(), "direction");
        assert_eq!(DIRECTION.feature_name(), "direction_of_travel");
    }

    #[test]
    fn mapping_keys_cannot_be_reused() -> anyhow::Result<()> {
        let mut set = MappingSet::with_state_references();
        set.insert("direction_of_travel", CodeMap::default())?;

        let err = set
            .insert("fips_state_abb", CodeMap::default())
            .unwrap_err();
        assert!(matches!(err, Error::MappingKeyCollision { feature } if feature == "fips_state_abb"));
        assert_eq!(set.len(), 3);
        assert_eq!(set.label("fips_state_full", "01"), Some("Alabama"));
        Ok(())
    }

    #[test]
    fn json_keeps_code_order() -> anyhow::Result<()> {
        let map = CodeMap::from_pairs(vec![
            ("10".to_string(), "ten".to_string()),
            ("2".to_string(), "two".to_string()),
        ]);
        let json = serde_json::to_string(&map)?;
        assert_eq!(json, r#"{"2":"two","10":"ten"}"#);

        let back: CodeMap = serde_json::from_str(&json)?;
        assert_eq!(back, map);
        Ok(())
    }
}
