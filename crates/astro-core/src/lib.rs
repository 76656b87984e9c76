//! Catalog scoring, percentile tiering and quota-balanced selection.
//!
//! Raw records are normalized into five 0–100 metric scores, summed, ranked
//! across the whole merged pool into five rarity tiers by percentile, and a
//! fixed-size subset is chosen under per-tier and per-(tier, type) quotas,
//! curated records first.
//!
//! Zero I/O: loading catalogs and writing selections belong to callers.

pub mod constants;
pub mod curated;
pub mod normalize;
pub mod pipeline;
pub mod quota;
pub mod ranking;
pub mod record;
pub mod report;
pub mod score;
pub mod select;
pub mod tier;
pub mod time;
pub mod wire;

pub use constants::{CURATED_BONUS, DEFAULT_SCORE, DEFAULT_TARGET_COUNT, DEFAULT_TOP_N};
pub use curated::curated_records;
pub use normalize::{MetricScores, normalize};
pub use pipeline::{PipelineConfig, Selection, merge_pool, rank_pool, run_pipeline};
pub use quota::{QuotaPlan, QuotaTables, TypeWeights};
pub use ranking::{RankedRecord, assign_tiers};
pub use record::{Attributes, CatalogRecord, CatalogSource, TypeCategory};
pub use report::{Report, ScoreStats};
pub use score::{Aggregator, ScoredRecord};
pub use select::{Admission, BalancedSelector, CellPolicy, PassCounts, SelectionState};
pub use tier::{BadgeTier, TierTable};
pub use time::{now_iso8601, parse_epoch, resolve_generated_at, unix_to_iso8601};
pub use wire::{SelectionDocument, SelectionMetadata, export_selection, import_selection, parse_catalog};
