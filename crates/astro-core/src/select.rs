//! Balanced selection: a three-pass greedy allocator under tier and
//! (tier, type) quotas.
//!
//! 1. Curated priority: curated records, in input order, through the normal
//!    quota checks.
//! 2. Quota fill: per tier (rarest first) and per tracked type cell,
//!    round-robin across raw-type groups, best score first within a group.
//! 3. Backfill: remaining records by score, limited only by tier quotas.
//!
//! All mutable bookkeeping lives in [`SelectionState`], which each pass takes
//! by value and hands back. A curated record is not guaranteed admission:
//! if earlier curated records already filled its cell it is skipped.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::quota::QuotaPlan;
use crate::ranking::{RankedRecord, rank_order};
use crate::record::{TypeCategory, name_key};
use crate::tier::BadgeTier;

/// Why `admit` accepted or rejected a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    DuplicateName,
    TargetReached,
    TierFull,
    CellFull,
}

/// Whether `admit` enforces the (tier, type) cell quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPolicy {
    Enforce,
    Ignore,
}

/// Records admitted by each pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub curated: usize,
    pub curated_skipped: usize,
    pub quota_fill: usize,
    pub backfill: usize,
}

/// Mutable state threaded through the passes.
#[derive(Debug, Clone)]
pub struct SelectionState {
    selected: Vec<RankedRecord>,
    used_names: HashSet<String>,
    target_count: usize,
    tier_remaining: BTreeMap<BadgeTier, usize>,
    cell_remaining: BTreeMap<(BadgeTier, TypeCategory), usize>,
    pub counts: PassCounts,
}

impl SelectionState {
    /// Fresh state with every counter at its planned quota.
    pub fn new(plan: &QuotaPlan) -> Self {
        let cell_remaining = plan
            .cells
            .iter()
            .flat_map(|(tier, cells)| cells.iter().map(move |(cat, q)| ((*tier, *cat), *q)))
            .collect();
        Self {
            selected: Vec::new(),
            used_names: HashSet::new(),
            target_count: plan.target_count,
            tier_remaining: plan.tiers.clone(),
            cell_remaining,
            counts: PassCounts::default(),
        }
    }

    /// Try to add `record`, counted against `cell` in its tier.
    pub fn admit(&mut self, record: &RankedRecord, cell: TypeCategory, policy: CellPolicy) -> Admission {
        let key = name_key(record.name());
        if self.used_names.contains(&key) {
            return Admission::DuplicateName;
        }
        if self.selected.len() >= self.target_count {
            return Admission::TargetReached;
        }
        let tier = record.badge_tier;
        if self.tier_remaining(tier) == 0 {
            return Admission::TierFull;
        }
        if policy == CellPolicy::Enforce && self.cell_remaining(tier, cell) == Some(0) {
            return Admission::CellFull;
        }

        if let Some(remaining) = self.tier_remaining.get_mut(&tier) {
            *remaining -= 1;
        }
        if let Some(remaining) = self.cell_remaining.get_mut(&(tier, cell)) {
            *remaining = remaining.saturating_sub(1);
        }
        self.used_names.insert(key);
        self.selected.push(record.clone());
        Admission::Admitted
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used_names.contains(&name_key(name))
    }

    pub fn tier_remaining(&self, tier: BadgeTier) -> usize {
        self.tier_remaining.get(&tier).copied().unwrap_or(0)
    }

    /// `None` when the cell is untracked.
    pub fn cell_remaining(&self, tier: BadgeTier, cell: TypeCategory) -> Option<usize> {
        self.cell_remaining.get(&(tier, cell)).copied()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= self.target_count
            || self.tier_remaining.values().all(|&r| r == 0)
    }

    pub fn selected(&self) -> &[RankedRecord] {
        &self.selected
    }

    pub fn into_selected(self) -> Vec<RankedRecord> {
        self.selected
    }
}

/// Runs the passes over a tiered pool.
pub struct BalancedSelector<'a> {
    pool: &'a [RankedRecord],
    plan: &'a QuotaPlan,
    /// Quota cell of each pool record, resolved once.
    cells: Vec<TypeCategory>,
}

impl<'a> BalancedSelector<'a> {
    pub fn new(pool: &'a [RankedRecord], plan: &'a QuotaPlan) -> Self {
        let cells = pool
            .iter()
            .map(|r| plan.cell_for(r.badge_tier, r.scored.record.category()))
            .collect();
        Self { pool, plan, cells }
    }

    /// All three passes in order.
    pub fn select(&self) -> SelectionState {
        let state = SelectionState::new(self.plan);
        let state = self.curated_pass(state);
        let state = self.quota_fill_pass(state);
        self.backfill_pass(state)
    }

    /// Pass 1: curated records in input order.
    pub fn curated_pass(&self, mut state: SelectionState) -> SelectionState {
        for (index, record) in self.pool.iter().enumerate() {
            if !record.scored.record.is_curated() {
                continue;
            }
            match state.admit(record, self.cells[index], CellPolicy::Enforce) {
                Admission::Admitted => state.counts.curated += 1,
                outcome => {
                    state.counts.curated_skipped += 1;
                    tracing::debug!(name = record.name(), ?outcome, "curated record not admitted");
                }
            }
        }
        tracing::info!(
            admitted = state.counts.curated,
            skipped = state.counts.curated_skipped,
            "curated pass complete"
        );
        state
    }

    /// Pass 2: fill each tracked (tier, type) cell from raw-type groups,
    /// largest group first, one record per group per round.
    pub fn quota_fill_pass(&self, mut state: SelectionState) -> SelectionState {
        let order = rank_order(self.pool);

        for tier in BadgeTier::ALL {
            let Some(tier_cells) = self.plan.cells.get(&tier) else {
                continue;
            };
            for &cell in tier_cells.keys() {
                if state.cell_remaining(tier, cell).unwrap_or(0) == 0 {
                    continue;
                }
                let mut groups = self.candidate_groups(&order, &state, tier, cell);
                let admitted = round_robin(&mut state, self.pool, &mut groups, tier, cell);
                state.counts.quota_fill += admitted;
                if let Some(left) = state.cell_remaining(tier, cell).filter(|&q| q > 0) {
                    tracing::debug!(%tier, %cell, left, "cell ran out of candidates");
                }
            }
        }
        tracing::info!(admitted = state.counts.quota_fill, "quota fill pass complete");
        state
    }

    /// Pass 3: best remaining records while their tier has room.
    pub fn backfill_pass(&self, mut state: SelectionState) -> SelectionState {
        for index in rank_order(self.pool) {
            if state.is_full() {
                break;
            }
            let record = &self.pool[index];
            if state.is_used(record.name()) || state.tier_remaining(record.badge_tier) == 0 {
                continue;
            }
            if state.admit(record, self.cells[index], CellPolicy::Ignore) == Admission::Admitted {
                state.counts.backfill += 1;
            }
        }
        tracing::info!(admitted = state.counts.backfill, "backfill pass complete");

        for tier in BadgeTier::ALL {
            let left = state.tier_remaining(tier);
            if left > 0 && state.selected().len() < self.plan.target_count {
                tracing::warn!(%tier, left, "tier quota under-filled");
            }
        }
        state
    }

    /// Unused records of (tier, cell) grouped by raw object type, each group
    /// ordered best first, groups ordered largest first.
    fn candidate_groups(
        &self,
        order: &[usize],
        state: &SelectionState,
        tier: BadgeTier,
        cell: TypeCategory,
    ) -> Vec<VecDeque<usize>> {
        let mut by_type: BTreeMap<String, VecDeque<usize>> = BTreeMap::new();
        for &index in order {
            let record = &self.pool[index];
            if record.badge_tier != tier || self.cells[index] != cell || state.is_used(record.name()) {
                continue;
            }
            by_type
                .entry(name_key(&record.scored.record.object_type))
                .or_default()
                .push_back(index);
        }
        let mut groups: Vec<VecDeque<usize>> = by_type.into_values().collect();
        // stable: equal sizes stay in type-name order
        groups.sort_by(|a, b| b.len().cmp(&a.len()));
        groups
    }
}

fn round_robin(
    state: &mut SelectionState,
    pool: &[RankedRecord],
    groups: &mut Vec<VecDeque<usize>>,
    tier: BadgeTier,
    cell: TypeCategory,
) -> usize {
    let mut admitted = 0;
    let mut cursor = 0;
    while !groups.is_empty()
        && state.cell_remaining(tier, cell).unwrap_or(0) > 0
        && state.tier_remaining(tier) > 0
        && !state.is_full()
    {
        if cursor >= groups.len() {
            cursor = 0;
        }
        match groups[cursor].pop_front() {
            Some(index) => {
                if state.admit(&pool[index], cell, CellPolicy::Enforce) == Admission::Admitted {
                    admitted += 1;
                }
                cursor += 1;
            }
            None => {
                groups.remove(cursor);
            }
        }
    }
    admitted
}
