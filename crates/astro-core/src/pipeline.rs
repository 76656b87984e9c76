//! End-to-end run: merge → score → tier → plan → select.
//!
//! The whole pool is materialized before ranking; nothing here streams.
//! Each call owns its pool and counters, so concurrent runs share no state.

use std::collections::HashSet;

use crate::constants::{CURATED_BONUS, DEFAULT_TARGET_COUNT};
use crate::quota::{QuotaPlan, QuotaTables};
use crate::ranking::{RankedRecord, assign_tiers};
use crate::record::{CatalogRecord, CatalogSource};
use crate::score::Aggregator;
use crate::select::{BalancedSelector, PassCounts};
use crate::tier::TierTable;
use crate::wire::SelectionDocument;

/// Inputs that shape a run besides the records themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub target_count: usize,
    pub curated_bonus: f64,
    /// Percentile cut points used for ranking.
    pub ranking: TierTable,
    /// Tables the quota plan is derived from.
    pub quotas: QuotaTables,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            curated_bonus: CURATED_BONUS,
            ranking: TierTable::DEFAULT,
            quotas: QuotaTables::default(),
        }
    }
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct Selection {
    pub selected: Vec<RankedRecord>,
    pub plan: QuotaPlan,
    pub counts: PassCounts,
    pub pool_size: usize,
    pub duplicates_dropped: usize,
}

impl Selection {
    pub fn to_document(&self, generated_at: &str) -> SelectionDocument {
        SelectionDocument::new(&self.selected, self.plan.target_count, generated_at)
    }
}

/// Curated records first, then generated; a later record whose name matches
/// an earlier one case-insensitively is dropped. Returns the pool and the
/// number of drops.
pub fn merge_pool(
    curated: Vec<CatalogRecord>,
    generated: Vec<CatalogRecord>,
) -> (Vec<CatalogRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut pool = Vec::with_capacity(curated.len() + generated.len());
    let mut dropped = 0;

    let tagged = curated
        .into_iter()
        .map(|r| r.with_source(CatalogSource::Curated))
        .chain(
            generated
                .into_iter()
                .map(|r| r.with_source(CatalogSource::Generated)),
        );

    for record in tagged {
        if seen.insert(record.name_key()) {
            pool.push(record);
        } else {
            dropped += 1;
            tracing::info!(name = %record.name, source = ?record.catalog_source, "dropped duplicate name");
        }
    }
    (pool, dropped)
}

/// Score and tier a pool without selecting.
pub fn rank_pool(
    curated: Vec<CatalogRecord>,
    generated: Vec<CatalogRecord>,
    config: &PipelineConfig,
) -> Vec<RankedRecord> {
    let (pool, _) = merge_pool(curated, generated);
    let scored = Aggregator::new(config.curated_bonus).score_all(pool);
    assign_tiers(scored, &config.ranking)
}

pub fn run_pipeline(
    curated: Vec<CatalogRecord>,
    generated: Vec<CatalogRecord>,
    config: &PipelineConfig,
) -> Selection {
    let (pool, duplicates_dropped) = merge_pool(curated, generated);
    let pool_size = pool.len();
    tracing::info!(pool_size, duplicates_dropped, "merged catalog pool");

    let scored = Aggregator::new(config.curated_bonus).score_all(pool);
    let ranked = assign_tiers(scored, &config.ranking);
    let plan = QuotaPlan::new(config.target_count, &config.quotas);

    let state = BalancedSelector::new(&ranked, &plan).select();
    let counts = state.counts;
    let selected = state.into_selected();
    tracing::info!(
        selected = selected.len(),
        target = config.target_count,
        "selection complete"
    );

    Selection {
        selected,
        plan,
        counts,
        pool_size,
        duplicates_dropped,
    }
}
