//! Catalog records as read from a source catalog, before any scoring.
//!
//! Raw numeric attributes are sparse and often dirty (numeric strings,
//! `null`, placeholder text). Every attribute is an explicit `Option` and
//! deserialization never fails on a bad value; it resolves to `None` and the
//! normalizer turns `None` into the neutral default.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// Hand-authored, shipped with the crate.
    Curated,
    /// Loaded from an external or generated catalog file.
    #[default]
    Generated,
}

/// Closed set of object categories used for type multipliers and quotas.
///
/// Resolved once per record from the free-form `objectType` string. Anything
/// unrecognised lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Star,
    Exoplanet,
    Galaxy,
    Nebula,
    StarCluster,
    BlackHole,
    NeutronStar,
    Quasar,
    SupernovaRemnant,
    Other,
}

impl TypeCategory {
    pub const ALL: [TypeCategory; 10] = [
        TypeCategory::Star,
        TypeCategory::Exoplanet,
        TypeCategory::Galaxy,
        TypeCategory::Nebula,
        TypeCategory::StarCluster,
        TypeCategory::BlackHole,
        TypeCategory::NeutronStar,
        TypeCategory::Quasar,
        TypeCategory::SupernovaRemnant,
        TypeCategory::Other,
    ];

    /// Map a raw `objectType` onto a category.
    ///
    /// Case, whitespace, hyphens and underscores are ignored, so
    /// "Black Hole", "black_hole" and "BLACK-HOLE" all resolve identically.
    pub fn from_object_type(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "star" | "binarystar" | "doublestar" | "variablestar" | "whitedwarf" | "reddwarf"
            | "browndwarf" | "redgiant" | "bluegiant" | "supergiant" | "redsupergiant"
            | "bluesupergiant" | "yellowsupergiant" | "hypergiant" | "redhypergiant"
            | "mainsequencestar" => TypeCategory::Star,
            "exoplanet" | "planet" | "hotjupiter" | "superearth" => TypeCategory::Exoplanet,
            "galaxy" | "spiralgalaxy" | "ellipticalgalaxy" | "dwarfgalaxy" | "irregulargalaxy"
            | "lenticulargalaxy" | "galaxycluster" => TypeCategory::Galaxy,
            "nebula" | "planetarynebula" | "emissionnebula" | "reflectionnebula" | "darknebula" => {
                TypeCategory::Nebula
            }
            "starcluster" | "cluster" | "globularcluster" | "opencluster" => {
                TypeCategory::StarCluster
            }
            "blackhole" | "supermassiveblackhole" | "stellarblackhole" | "blackholemerger" => {
                TypeCategory::BlackHole
            }
            "neutronstar" | "pulsar" | "magnetar" => TypeCategory::NeutronStar,
            "quasar" | "blazar" | "agn" | "activegalacticnucleus" => TypeCategory::Quasar,
            "supernovaremnant" | "supernova" | "snr" => TypeCategory::SupernovaRemnant,
            _ => TypeCategory::Other,
        }
    }

    /// Rarity multiplier applied to each metric score.
    pub fn type_multiplier(self) -> f64 {
        match self {
            TypeCategory::BlackHole => 1.3,
            TypeCategory::Quasar => 1.25,
            TypeCategory::NeutronStar => 1.2,
            TypeCategory::SupernovaRemnant => 1.15,
            TypeCategory::Exoplanet => 1.1,
            TypeCategory::Nebula => 1.05,
            TypeCategory::Galaxy | TypeCategory::StarCluster | TypeCategory::Other => 1.0,
            TypeCategory::Star => 0.95,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeCategory::Star => "star",
            TypeCategory::Exoplanet => "exoplanet",
            TypeCategory::Galaxy => "galaxy",
            TypeCategory::Nebula => "nebula",
            TypeCategory::StarCluster => "star_cluster",
            TypeCategory::BlackHole => "black_hole",
            TypeCategory::NeutronStar => "neutron_star",
            TypeCategory::Quasar => "quasar",
            TypeCategory::SupernovaRemnant => "supernova_remnant",
            TypeCategory::Other => "other",
        }
    }

    /// Parse a config-file key (`"black_hole"`, `"other"`, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        TypeCategory::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional raw numeric attributes. Units: light-years, solar masses,
/// solar luminosities, kelvin, apparent magnitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub luminosity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Carried through for downstream consumers; not scored.
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_year", skip_serializing_if = "Option::is_none")]
    pub discovery_year: Option<i32>,
}

/// One candidate entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub name: String,
    #[serde(default)]
    pub object_type: String,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(default)]
    pub catalog_source: CatalogSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constellation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral_class: Option<String>,
}

impl CatalogRecord {
    pub fn new(name: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            attributes: Attributes::default(),
            catalog_source: CatalogSource::Generated,
            description: None,
            constellation: None,
            spectral_class: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_source(mut self, source: CatalogSource) -> Self {
        self.catalog_source = source;
        self
    }

    /// Case-insensitive identity used for de-duplication.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    pub fn category(&self) -> TypeCategory {
        TypeCategory::from_object_type(&self.object_type)
    }

    pub fn is_curated(&self) -> bool {
        self.catalog_source == CatalogSource::Curated
    }
}

pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Coerce a JSON value to a finite f64: numbers and numeric strings pass,
/// everything else is `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value)
        .map(f64::round)
        .filter(|y| *y >= f64::from(i32::MIN) && *y <= f64::from(i32::MAX))
        .map(|y| y as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_resolution_ignores_case_and_separators() {
        assert_eq!(TypeCategory::from_object_type("Black Hole"), TypeCategory::BlackHole);
        assert_eq!(TypeCategory::from_object_type("black_hole"), TypeCategory::BlackHole);
        assert_eq!(TypeCategory::from_object_type("BLACK-HOLE"), TypeCategory::BlackHole);
        assert_eq!(TypeCategory::from_object_type("Pulsar"), TypeCategory::NeutronStar);
        assert_eq!(TypeCategory::from_object_type("Globular Cluster"), TypeCategory::StarCluster);
    }

    #[test]
    fn test_giant_star_variants_are_stars() {
        for raw in ["Red Supergiant", "Blue Supergiant", "Yellow Supergiant", "Red Hypergiant", "Blue Giant"] {
            assert_eq!(TypeCategory::from_object_type(raw), TypeCategory::Star, "{raw}");
        }
        assert_eq!(TypeCategory::Star.type_multiplier(), 0.95);
    }

    #[test]
    fn test_curated_types_resolve_to_named_categories() {
        // the only curated types meant to land in the catch-all bucket
        let catch_all = ["Cosmic Void", "Interstellar Object"];
        let records = crate::curated::curated_records().unwrap();
        for record in &records {
            if catch_all.contains(&record.object_type.as_str()) {
                continue;
            }
            assert_ne!(record.category(), TypeCategory::Other, "{}: {}", record.name, record.object_type);
        }
        let betelgeuse = records.iter().find(|r| r.name == "Betelgeuse").unwrap();
        assert_eq!(betelgeuse.category(), TypeCategory::Star);
    }

    #[test]
    fn test_unknown_type_is_other() {
        assert_eq!(TypeCategory::from_object_type("Comet"), TypeCategory::Other);
        assert_eq!(TypeCategory::from_object_type(""), TypeCategory::Other);
    }

    #[test]
    fn test_category_keys_roundtrip() {
        for cat in TypeCategory::ALL {
            assert_eq!(TypeCategory::from_key(cat.as_str()), Some(cat));
        }
        assert_eq!(TypeCategory::from_key("comet"), None);
    }

    #[test]
    fn test_lenient_attributes() {
        let json = r#"{
            "name": "Vega",
            "objectType": "Star",
            "distance": "25.04",
            "mass": null,
            "luminosity": "bright",
            "temperature": 9602,
            "discoveryYear": 1850.4
        }"#;
        let record: CatalogRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.attributes.distance, Some(25.04));
        assert_eq!(record.attributes.mass, None);
        assert_eq!(record.attributes.luminosity, None);
        assert_eq!(record.attributes.temperature, Some(9602.0));
        assert_eq!(record.attributes.magnitude, None);
        assert_eq!(record.attributes.discovery_year, Some(1850));
        assert_eq!(record.catalog_source, CatalogSource::Generated);
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let result: Result<CatalogRecord, _> = serde_json::from_str(r#"{"objectType": "Star"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_name_key_is_case_insensitive() {
        let a = CatalogRecord::new("Andromeda Galaxy", "Galaxy");
        let b = CatalogRecord::new("  ANDROMEDA galaxy ", "Galaxy");
        assert_eq!(a.name_key(), b.name_key());
    }

    #[test]
    fn test_serialize_skips_missing_attributes() {
        let record = CatalogRecord::new("Sirius", "Star").with_attributes(Attributes {
            distance: Some(8.6),
            ..Attributes::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["distance"], 8.6);
        assert!(json.get("mass").is_none());
        assert_eq!(json["catalogSource"], "generated");
    }
}
