//! Run configuration.
//!
//! Resolution order for each setting:
//! 1. command-line flag
//! 2. environment variable (handled by clap `env`)
//! 3. TOML file given with `--config`
//! 4. built-in default

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use astro_core::{
    BadgeTier, DEFAULT_TARGET_COUNT, PipelineConfig, QuotaTables, TierTable, TypeCategory,
    TypeWeights,
};

pub const DEFAULT_INPUT: &str = "data/catalog.json";
pub const DEFAULT_OUTPUT: &str = "selection.json";

/// Contents of a `--config` TOML file. Every field is optional.
///
/// ```toml
/// target_count = 500
/// input = "data/catalog.json"
/// curated_bonus = 40.0
///
/// [tiers]
/// mythic = 0.02
///
/// [types.mythic]
/// black_hole = 30
/// quasar = 20
/// other = 10
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub target_count: Option<usize>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub curated_bonus: Option<f64>,
    /// Percentile cut points for ranking; also the quota tier shares unless
    /// `quota_tiers` is set.
    pub tiers: BTreeMap<String, f64>,
    pub quota_tiers: BTreeMap<String, f64>,
    /// Replaces the whole type table of each named tier.
    pub types: BTreeMap<String, BTreeMap<String, u32>>,
}

impl FileConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: FileConfig = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn target_count(&self, cli: Option<usize>) -> usize {
        cli.or(self.target_count).unwrap_or(DEFAULT_TARGET_COUNT)
    }

    pub fn input(&self, cli: Option<&Path>) -> PathBuf {
        resolve_path(cli, self.input.as_deref(), DEFAULT_INPUT)
    }

    pub fn output(&self, cli: Option<&Path>) -> PathBuf {
        resolve_path(cli, self.output.as_deref(), DEFAULT_OUTPUT)
    }

    pub fn pipeline(&self, target_count: usize) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();

        let ranking = override_tiers(defaults.ranking, &self.tiers).context("in [tiers]")?;
        let quota_tiers = if self.quota_tiers.is_empty() {
            ranking
        } else {
            override_tiers(defaults.quotas.tiers, &self.quota_tiers).context("in [quota_tiers]")?
        };

        let mut types = defaults.quotas.types;
        for (tier_key, weights) in &self.types {
            let tier = parse_tier(tier_key).context("in [types]")?;
            types.insert(tier, parse_weights(weights).with_context(|| format!("in [types.{tier_key}]"))?);
        }

        let curated_bonus = self.curated_bonus.unwrap_or(defaults.curated_bonus);
        if !curated_bonus.is_finite() {
            bail!("curated_bonus must be a finite number");
        }

        Ok(PipelineConfig {
            target_count,
            curated_bonus,
            ranking,
            quotas: QuotaTables {
                tiers: quota_tiers,
                types,
            },
        })
    }
}

fn resolve_path(cli: Option<&Path>, file: Option<&Path>, default: &str) -> PathBuf {
    cli.or(file)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn parse_tier(key: &str) -> Result<BadgeTier> {
    match BadgeTier::from_key(key) {
        Some(tier) => Ok(tier),
        None => bail!("unknown tier `{key}`"),
    }
}

fn override_tiers(base: TierTable, overrides: &BTreeMap<String, f64>) -> Result<TierTable> {
    let mut fractions = base.fractions();
    for (key, fraction) in overrides {
        let tier = parse_tier(key)?;
        if !fraction.is_finite() || *fraction < 0.0 {
            bail!("fraction for `{key}` must be a non-negative number");
        }
        fractions[tier.index()] = *fraction;
    }
    let total: f64 = fractions.iter().sum();
    if total > 1.0 + 1e-6 {
        bail!("tier fractions sum to {total:.4}, more than 1");
    }
    Ok(TierTable::new(fractions))
}

fn parse_weights(raw: &BTreeMap<String, u32>) -> Result<TypeWeights> {
    raw.iter()
        .map(|(key, weight)| -> Result<(TypeCategory, u32)> {
            match TypeCategory::from_key(key) {
                Some(category) => Ok((category, *weight)),
                None => bail!("unknown type category `{key}`"),
            }
        })
        .collect()
}
