//! Quota planning: integer targets per tier and per (tier, type) cell.
//!
//! Every target is rounded independently, so totals can drift a little from
//! the requested count. The drift is accepted; the selector's global cap
//! keeps the final selection within `target_count`.

use std::collections::BTreeMap;

use crate::record::TypeCategory;
use crate::tier::{BadgeTier, TierTable};

/// Relative type weights for one tier. Categories absent from a table are
/// quota-matched against its `Other` entry.
pub type TypeWeights = BTreeMap<TypeCategory, u32>;

/// Fixed tables a plan is derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaTables {
    pub tiers: TierTable,
    pub types: BTreeMap<BadgeTier, TypeWeights>,
}

impl Default for QuotaTables {
    fn default() -> Self {
        use TypeCategory::*;

        let table = |entries: &[(TypeCategory, u32)]| -> TypeWeights {
            entries.iter().copied().collect()
        };

        let types = BTreeMap::from([
            (
                BadgeTier::Mythic,
                table(&[
                    (BlackHole, 25),
                    (Quasar, 20),
                    (NeutronStar, 15),
                    (SupernovaRemnant, 10),
                    (Galaxy, 10),
                    (Exoplanet, 5),
                    (Nebula, 5),
                    (Star, 5),
                    (Other, 5),
                ]),
            ),
            (
                BadgeTier::Legendary,
                table(&[
                    (BlackHole, 15),
                    (Quasar, 15),
                    (NeutronStar, 15),
                    (SupernovaRemnant, 10),
                    (Galaxy, 15),
                    (Nebula, 10),
                    (Exoplanet, 10),
                    (Star, 5),
                    (Other, 5),
                ]),
            ),
            (
                BadgeTier::Epic,
                table(&[
                    (Galaxy, 20),
                    (Nebula, 15),
                    (Exoplanet, 15),
                    (NeutronStar, 10),
                    (StarCluster, 10),
                    (Star, 10),
                    (SupernovaRemnant, 5),
                    (BlackHole, 5),
                    (Quasar, 5),
                    (Other, 5),
                ]),
            ),
            (
                BadgeTier::Rare,
                table(&[
                    (Star, 25),
                    (Galaxy, 20),
                    (Exoplanet, 15),
                    (Nebula, 15),
                    (StarCluster, 15),
                    (NeutronStar, 5),
                    (Other, 5),
                ]),
            ),
            (
                BadgeTier::Common,
                table(&[
                    (Star, 40),
                    (Exoplanet, 20),
                    (Galaxy, 15),
                    (StarCluster, 10),
                    (Nebula, 10),
                    (Other, 5),
                ]),
            ),
        ]);

        Self {
            tiers: TierTable::DEFAULT,
            types,
        }
    }
}

/// Integer targets for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaPlan {
    pub target_count: usize,
    pub tiers: BTreeMap<BadgeTier, usize>,
    pub cells: BTreeMap<BadgeTier, BTreeMap<TypeCategory, usize>>,
}

impl QuotaPlan {
    pub fn new(target_count: usize, tables: &QuotaTables) -> Self {
        let mut tiers = BTreeMap::new();
        let mut cells = BTreeMap::new();

        for tier in BadgeTier::ALL {
            let tier_quota = round_share(target_count as f64 * tables.tiers.fraction(tier));
            tiers.insert(tier, tier_quota);

            let weights = tables.types.get(&tier).cloned().unwrap_or_default();
            let weight_sum: u32 = weights.values().sum();
            let tier_cells: BTreeMap<TypeCategory, usize> = if weight_sum == 0 {
                BTreeMap::new()
            } else {
                let scale = tier_quota as f64 / f64::from(weight_sum);
                weights
                    .into_iter()
                    .map(|(category, weight)| (category, round_share(f64::from(weight) * scale)))
                    .collect()
            };
            cells.insert(tier, tier_cells);
        }

        let plan = Self {
            target_count,
            tiers,
            cells,
        };
        let planned = plan.planned_total();
        if planned != target_count {
            tracing::debug!(target_count, planned, "tier quotas drift from target after rounding");
        }
        plan
    }

    pub fn tier_quota(&self, tier: BadgeTier) -> usize {
        self.tiers.get(&tier).copied().unwrap_or(0)
    }

    /// `None` when the cell is not tracked for this tier.
    pub fn cell_quota(&self, tier: BadgeTier, category: TypeCategory) -> Option<usize> {
        self.cells.get(&tier)?.get(&category).copied()
    }

    /// Quota cell a category counts against in `tier`: itself when the tier
    /// tracks it, otherwise `Other`.
    pub fn cell_for(&self, tier: BadgeTier, category: TypeCategory) -> TypeCategory {
        match self.cells.get(&tier) {
            Some(cells) if cells.contains_key(&category) => category,
            _ => TypeCategory::Other,
        }
    }

    /// Sum of tier quotas (may differ from `target_count` by rounding drift).
    pub fn planned_total(&self) -> usize {
        self.tiers.values().sum()
    }
}

fn round_share(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.round() as usize
    } else {
        0
    }
}
