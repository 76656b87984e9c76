//! JSON wire format for catalog input and selection output.
//!
//! Input: either a bare array of records or an object with an `objects`
//! array. Output: `{ metadata, objects }` with camelCase fields. Maps are
//! `BTreeMap`s so the same selection always serializes to the same bytes.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ranking::RankedRecord;
use crate::record::CatalogRecord;
use crate::tier::BadgeTier;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionMetadata {
    pub generated_at: String,
    pub target_count: usize,
    pub actual_count: usize,
    pub tier_distribution: BTreeMap<BadgeTier, usize>,
    pub type_distribution: BTreeMap<String, usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SelectionDocument {
    pub metadata: SelectionMetadata,
    pub objects: Vec<RankedRecord>,
}

impl SelectionDocument {
    /// Build a document; `objects` are ordered by total score descending,
    /// ties in selection order.
    pub fn new(selected: &[RankedRecord], target_count: usize, generated_at: &str) -> Self {
        let mut objects = selected.to_vec();
        objects.sort_by(|a, b| b.total_score().total_cmp(&a.total_score()));

        let mut tier_distribution: BTreeMap<BadgeTier, usize> =
            BadgeTier::ALL.into_iter().map(|t| (t, 0)).collect();
        let mut type_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for record in &objects {
            *tier_distribution.entry(record.badge_tier).or_default() += 1;
            *type_distribution
                .entry(record.scored.record.object_type.clone())
                .or_default() += 1;
        }

        Self {
            metadata: SelectionMetadata {
                generated_at: generated_at.to_string(),
                target_count,
                actual_count: objects.len(),
                tier_distribution,
                type_distribution,
            },
            objects,
        }
    }
}

/// Parse a catalog file's contents.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogRecord>, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(_) => serde_json::from_value(value),
        Value::Object(mut map) => match map.remove("objects") {
            Some(objects @ Value::Array(_)) => serde_json::from_value(objects),
            _ => Err(serde_json::Error::custom(
                "catalog object must contain an `objects` array",
            )),
        },
        _ => Err(serde_json::Error::custom(
            "catalog must be an array of records or an object with an `objects` array",
        )),
    }
}

pub fn export_selection(document: &SelectionDocument) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(document)?;
    json.push('\n');
    Ok(json)
}

pub fn import_selection(json: &str) -> Result<SelectionDocument, serde_json::Error> {
    serde_json::from_str(json)
}
