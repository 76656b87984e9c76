//! Distribution diagnostics for a finished selection.

use std::collections::BTreeMap;
use std::fmt;

use crate::ranking::RankedRecord;
use crate::record::TypeCategory;
use crate::tier::{BadgeTier, TierTable};

const BAR_WIDTH: usize = 20;

/// Summary statistics over total scores. Standard deviation is the
/// population form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl ScoreStats {
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;
        Some(Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierRow {
    pub tier: BadgeTier,
    pub count: usize,
    pub percent: f64,
    pub target_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRow {
    pub object_type: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopEntry {
    pub name: String,
    pub object_type: String,
    pub tier: BadgeTier,
    pub total_score: f64,
}

/// Everything the text report prints, computed from `selected` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub target_count: usize,
    pub actual_count: usize,
    pub stats: Option<ScoreStats>,
    pub tiers: Vec<TierRow>,
    pub types: Vec<TypeRow>,
    pub breakdown: BTreeMap<BadgeTier, BTreeMap<TypeCategory, usize>>,
    pub top: Vec<TopEntry>,
}

impl Report {
    pub fn new(selected: &[RankedRecord], target_count: usize, targets: &TierTable, top_n: usize) -> Self {
        let actual = selected.len();
        let percent = |count: usize| {
            if actual == 0 {
                0.0
            } else {
                count as f64 * 100.0 / actual as f64
            }
        };

        let scores: Vec<f64> = selected.iter().map(RankedRecord::total_score).collect();

        let mut tier_counts: BTreeMap<BadgeTier, usize> = BTreeMap::new();
        let mut type_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut breakdown: BTreeMap<BadgeTier, BTreeMap<TypeCategory, usize>> = BTreeMap::new();
        for record in selected {
            *tier_counts.entry(record.badge_tier).or_default() += 1;
            *type_counts
                .entry(record.scored.record.object_type.clone())
                .or_default() += 1;
            *breakdown
                .entry(record.badge_tier)
                .or_default()
                .entry(record.scored.record.category())
                .or_default() += 1;
        }

        let tiers = BadgeTier::ALL
            .into_iter()
            .map(|tier| {
                let count = tier_counts.get(&tier).copied().unwrap_or(0);
                TierRow {
                    tier,
                    count,
                    percent: percent(count),
                    target_percent: targets.fraction(tier) * 100.0,
                }
            })
            .collect();

        let mut types: Vec<TypeRow> = type_counts
            .into_iter()
            .map(|(object_type, count)| TypeRow {
                object_type,
                count,
                percent: percent(count),
            })
            .collect();
        // stable over the name-sorted map: ties stay alphabetical
        types.sort_by(|a, b| b.count.cmp(&a.count));

        let mut by_score: Vec<&RankedRecord> = selected.iter().collect();
        by_score.sort_by(|a, b| b.total_score().total_cmp(&a.total_score()));
        let top = by_score
            .into_iter()
            .take(top_n)
            .map(|r| TopEntry {
                name: r.name().to_string(),
                object_type: r.scored.record.object_type.clone(),
                tier: r.badge_tier,
                total_score: r.total_score(),
            })
            .collect();

        Self {
            target_count,
            actual_count: actual,
            stats: ScoreStats::from_scores(&scores),
            tiers,
            types,
            breakdown,
            top,
        }
    }

    pub fn tier_count(&self, tier: BadgeTier) -> usize {
        self.tiers
            .iter()
            .find(|row| row.tier == tier)
            .map_or(0, |row| row.count)
    }
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let width = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(width)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Selection report ===")?;
        writeln!(f, "selected:   {} / {} target", self.actual_count, self.target_count)?;
        match &self.stats {
            Some(s) => {
                writeln!(
                    f,
                    "scores:     min={:.2} max={:.2} mean={:.2} median={:.2} stddev={:.2}",
                    s.min, s.max, s.mean, s.median, s.std_dev
                )?;
            }
            None => writeln!(f, "scores:     (none)")?,
        }

        writeln!(f)?;
        writeln!(f, "--- tiers ---")?;
        writeln!(f, "{:<10} {:>6} {:>8} {:>8}", "tier", "count", "actual%", "target%")?;
        for row in &self.tiers {
            writeln!(
                f,
                "{:<10} {:>6} {:>7.1}% {:>7.1}%",
                row.tier.as_str(),
                row.count,
                row.percent,
                row.target_percent
            )?;
        }

        writeln!(f)?;
        writeln!(f, "--- types ---")?;
        for row in &self.types {
            writeln!(f, "{:<24} {:>6} {:>7.1}%", row.object_type, row.count, row.percent)?;
        }

        writeln!(f)?;
        writeln!(f, "--- tier x type ---")?;
        let max_cell = self
            .breakdown
            .values()
            .flat_map(|cells| cells.values().copied())
            .max()
            .unwrap_or(0);
        for (tier, cells) in &self.breakdown {
            writeln!(f, "{}:", tier.as_str())?;
            for (category, count) in cells {
                writeln!(
                    f,
                    "  {:<18} {:>6} {}",
                    category.as_str(),
                    count,
                    bar(*count, max_cell)
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "--- top {} ---", self.top.len())?;
        for (i, entry) in self.top.iter().enumerate() {
            writeln!(
                f,
                "{:>3}. {:<32} {:<20} {:<10} {:>7.2}",
                i + 1,
                entry.name,
                entry.object_type,
                entry.tier.as_str(),
                entry.total_score
            )?;
        }
        Ok(())
    }
}
