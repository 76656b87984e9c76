//! Percentile tier assignment over the whole merged pool.
//!
//! Tiers are assigned by rank position, never by absolute score. Ranking is
//! a stable sort on `total_score` descending: records with equal scores keep
//! their relative input order, which is what makes repeated runs over the
//! same input produce the same tiers.

use serde::{Deserialize, Serialize};

use crate::score::ScoredRecord;
use crate::tier::{BadgeTier, TierTable};

/// A scored record with its run-relative tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRecord {
    #[serde(flatten)]
    pub scored: ScoredRecord,
    pub badge_tier: BadgeTier,
    /// 0-based position in this run's ranking. Meaningless across runs.
    #[serde(skip)]
    pub rank: usize,
}

impl RankedRecord {
    pub fn name(&self) -> &str {
        &self.scored.record.name
    }

    pub fn total_score(&self) -> f64 {
        self.scored.total_score
    }
}

/// Assign a tier to every record of `pool`.
///
/// The returned vector keeps the input order; `rank` carries each record's
/// position in the score ordering.
pub fn assign_tiers(pool: Vec<ScoredRecord>, table: &TierTable) -> Vec<RankedRecord> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    // sort_by is stable: ties keep input order
    order.sort_by(|&a, &b| pool[b].total_score.total_cmp(&pool[a].total_score));

    let mut ranks = vec![0usize; pool.len()];
    for (rank, &index) in order.iter().enumerate() {
        ranks[index] = rank;
    }

    let bounds = table.rank_bounds(pool.len());
    let ranked: Vec<RankedRecord> = pool
        .into_iter()
        .zip(ranks)
        .map(|(scored, rank)| RankedRecord {
            scored,
            badge_tier: TierTable::tier_for_rank(&bounds, rank),
            rank,
        })
        .collect();

    tracing::debug!(pool = ranked.len(), ?bounds, "assigned percentile tiers");
    ranked
}

/// Indices of `pool` ordered by rank (best first).
pub fn rank_order(pool: &[RankedRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by_key(|&i| pool[i].rank);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MetricScores;
    use crate::record::CatalogRecord;

    fn scored(name: &str, total: f64) -> ScoredRecord {
        ScoredRecord {
            record: CatalogRecord::new(name, "Star"),
            scores: MetricScores {
                distance: 0.0,
                mass: 0.0,
                luminosity: 0.0,
                temperature: 0.0,
                discovery: 0.0,
            },
            total_score: total,
        }
    }

    #[test]
    fn test_output_keeps_input_order() {
        let pool = vec![scored("low", 1.0), scored("high", 9.0), scored("mid", 5.0)];
        let ranked = assign_tiers(pool, &TierTable::DEFAULT);
        let names: Vec<&str> = ranked.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["low", "high", "mid"]);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, [2, 0, 1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let pool = vec![scored("first", 5.0), scored("second", 5.0), scored("third", 5.0)];
        let ranked = assign_tiers(pool, &TierTable::DEFAULT);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, [0, 1, 2]);
    }

    #[test]
    fn test_tier_by_rank_not_score() {
        // Identical scores end up in different tiers purely by position.
        let table = TierTable::new([0.5, 0.5, 0.0, 0.0, 0.0]);
        let pool = vec![scored("a", 7.0), scored("b", 7.0)];
        let ranked = assign_tiers(pool, &table);
        assert_eq!(ranked[0].badge_tier, BadgeTier::Mythic);
        assert_eq!(ranked[1].badge_tier, BadgeTier::Legendary);
    }

    #[test]
    fn test_same_score_different_pools_different_tiers() {
        let table = TierTable::new([0.5, 0.5, 0.0, 0.0, 0.0]);
        let small = assign_tiers(vec![scored("x", 50.0), scored("y", 10.0)], &table);
        let large = assign_tiers(vec![scored("x", 50.0), scored("z", 90.0)], &table);
        assert_eq!(small[0].badge_tier, BadgeTier::Mythic);
        assert_eq!(large[0].badge_tier, BadgeTier::Legendary);
    }

    #[test]
    fn test_rank_order() {
        let pool = vec![scored("c", 1.0), scored("a", 3.0), scored("b", 2.0)];
        let ranked = assign_tiers(pool, &TierTable::DEFAULT);
        let ordered: Vec<&str> = rank_order(&ranked).iter().map(|&i| ranked[i].name()).collect();
        assert_eq!(ordered, ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_pool() {
        assert!(assign_tiers(Vec::new(), &TierTable::DEFAULT).is_empty());
    }
}
