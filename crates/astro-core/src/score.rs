//! Aggregation of metric scores into a record total.

use serde::{Deserialize, Serialize};

use crate::constants::{CURATED_BONUS, MAX_TOTAL_SCORE};
use crate::normalize::MetricScores;
use crate::record::CatalogRecord;

/// A record with its metric scores and total, not yet tiered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: CatalogRecord,
    pub scores: MetricScores,
    pub total_score: f64,
}

/// Sums metric scores and applies the curated bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregator {
    pub curated_bonus: f64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            curated_bonus: CURATED_BONUS,
        }
    }
}

impl Aggregator {
    pub fn new(curated_bonus: f64) -> Self {
        Self { curated_bonus }
    }

    /// Score one record. Pure: the same record always yields the same result.
    ///
    /// Curated records receive the bonus here, exactly once, before any
    /// ranking takes place.
    pub fn score(&self, record: CatalogRecord) -> ScoredRecord {
        let scores = MetricScores::compute(&record.attributes, record.category());
        let mut total = total_score(&scores);
        if record.is_curated() {
            total = (total + self.curated_bonus).clamp(0.0, MAX_TOTAL_SCORE);
        }
        ScoredRecord {
            record,
            scores,
            total_score: total,
        }
    }

    pub fn score_all(&self, records: Vec<CatalogRecord>) -> Vec<ScoredRecord> {
        records.into_iter().map(|r| self.score(r)).collect()
    }
}

/// Sum of metric scores clamped to `[0, 500]`.
pub fn total_score(scores: &MetricScores) -> f64 {
    scores.sum().clamp(0.0, MAX_TOTAL_SCORE)
}
