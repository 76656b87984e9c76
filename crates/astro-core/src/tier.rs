use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::BOUNDARY_EPSILON;

/// Rarity tier, ordered rarest first.
///
/// Tiers are relative to one run's pool: the same total score can land in
/// different tiers when the pool changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Mythic,
    Legendary,
    Epic,
    Rare,
    Common,
}

impl BadgeTier {
    pub const ALL: [BadgeTier; 5] = [
        BadgeTier::Mythic,
        BadgeTier::Legendary,
        BadgeTier::Epic,
        BadgeTier::Rare,
        BadgeTier::Common,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BadgeTier::Mythic => "mythic",
            BadgeTier::Legendary => "legendary",
            BadgeTier::Epic => "epic",
            BadgeTier::Rare => "rare",
            BadgeTier::Common => "common",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        BadgeTier::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of a pool (or of a target count) per tier, rarest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierTable {
    fractions: [f64; 5],
}

impl TierTable {
    /// Top 1% / next 3% / next 6% / next 15% / remaining 75%.
    pub const DEFAULT: TierTable = TierTable {
        fractions: [0.01, 0.03, 0.06, 0.15, 0.75],
    };

    /// Negative and non-finite fractions are treated as zero.
    pub fn new(fractions: [f64; 5]) -> Self {
        Self {
            fractions: fractions.map(|f| if f.is_finite() && f > 0.0 { f } else { 0.0 }),
        }
    }

    pub fn fraction(&self, tier: BadgeTier) -> f64 {
        self.fractions[tier.index()]
    }

    pub fn fractions(&self) -> [f64; 5] {
        self.fractions
    }

    /// Exclusive end rank of each tier for a pool of `pool_len` records.
    ///
    /// Tier `t` ends at `floor(pool_len * cumulative_t)`. The last tier
    /// always ends at `pool_len` so every record receives a tier.
    pub fn rank_bounds(&self, pool_len: usize) -> [usize; 5] {
        let mut bounds = [pool_len; 5];
        let mut cumulative = 0.0;
        for tier in &BadgeTier::ALL[..4] {
            cumulative += self.fraction(*tier);
            let end = (pool_len as f64 * cumulative + BOUNDARY_EPSILON).floor() as usize;
            bounds[tier.index()] = end.min(pool_len);
        }
        bounds
    }

    /// Tier for a 0-based rank position within a pool of `pool_len`.
    pub fn tier_for_rank(bounds: &[usize; 5], rank: usize) -> BadgeTier {
        BadgeTier::ALL
            .into_iter()
            .find(|t| rank < bounds[t.index()])
            .unwrap_or(BadgeTier::Common)
    }
}

impl Default for TierTable {
    fn default() -> Self {
        TierTable::DEFAULT
    }
}
