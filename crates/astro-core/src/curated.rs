//! Hand-authored records shipped with the crate.

use crate::record::{CatalogRecord, CatalogSource};
use crate::wire::parse_catalog;

const CURATED_JSON: &str = include_str!("../data/curated.json");

/// The embedded curated dataset, every record marked `Curated`.
pub fn curated_records() -> Result<Vec<CatalogRecord>, serde_json::Error> {
    Ok(parse_catalog(CURATED_JSON)?
        .into_iter()
        .map(|r| r.with_source(CatalogSource::Curated))
        .collect())
}
