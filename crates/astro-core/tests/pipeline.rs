//! Integration tests over the full run: merge → score → tier → plan → select.

use std::collections::{BTreeMap, HashSet};

use astro_core::{
    Attributes, BadgeTier, BalancedSelector, CatalogRecord, CatalogSource, MetricScores,
    PipelineConfig, QuotaPlan, QuotaTables, RankedRecord, ScoredRecord, SelectionState,
    TierTable, TypeCategory, TypeWeights, assign_tiers, curated_records, export_selection,
    rank_pool, run_pipeline,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

const GENERATED_AT: &str = "2026-03-01T00:00:00Z";

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

const TYPES: [&str; 8] = [
    "Star",
    "Red Giant",
    "Spiral Galaxy",
    "Exoplanet",
    "Emission Nebula",
    "Pulsar",
    "Globular Cluster",
    "Comet",
];

/// Deterministic sparse catalog: every third record misses its distance,
/// every fifth its mass.
fn synthetic_catalog(n: usize) -> Vec<CatalogRecord> {
    (0..n)
        .map(|i| {
            let f = i as f64;
            CatalogRecord::new(format!("Catalog Object {i}"), TYPES[i % TYPES.len()]).with_attributes(
                Attributes {
                    distance: (i % 3 != 0).then(|| 10f64.powf(1.0 + (f * 0.37) % 9.0)),
                    mass: (i % 5 != 0).then(|| 10f64.powf(-4.0 + (f * 0.53) % 14.0)),
                    luminosity: (i % 2 == 0).then(|| 10f64.powf((f * 0.71) % 10.0)),
                    temperature: (i % 4 != 1).then(|| 2000.0 + (f * 137.0) % 40_000.0),
                    magnitude: None,
                    discovery_year: (i % 7 != 0).then(|| 1500 + ((i * 13) % 525) as i32),
                },
            )
        })
        .collect()
}

fn config(target_count: usize) -> PipelineConfig {
    PipelineConfig {
        target_count,
        ..PipelineConfig::default()
    }
}

#[test]
fn determinism_byte_identical_output() {
    let curated = curated_records().unwrap();
    let catalog = synthetic_catalog(3000);

    let first = run_pipeline(curated.clone(), catalog.clone(), &config(400));
    let second = run_pipeline(curated, catalog, &config(400));

    let a = export_selection(&first.to_document(GENERATED_AT)).unwrap();
    let b = export_selection(&second.to_document(GENERATED_AT)).unwrap();
    assert_eq!(a, b, "same input must produce the same bytes");
}

#[test]
fn uniqueness_under_case_insensitive_duplicates() {
    let mut catalog = synthetic_catalog(500);
    let dupes: Vec<CatalogRecord> = catalog
        .iter()
        .take(50)
        .map(|r| CatalogRecord::new(r.name.to_uppercase(), "Quasar"))
        .collect();
    catalog.extend(dupes);
    catalog.push(CatalogRecord::new("SIRIUS", "Star"));

    let selection = run_pipeline(curated_records().unwrap(), catalog, &config(300));
    let mut seen = HashSet::new();
    for record in &selection.selected {
        assert!(
            seen.insert(record.name().to_lowercase()),
            "duplicate name selected: {}",
            record.name()
        );
    }
    assert_eq!(selection.duplicates_dropped, 51);
}

#[test]
fn bounds_and_tier_distribution_sum() {
    for target in [0, 1, 10, 77, 250, 1000, 5000] {
        let selection = run_pipeline(curated_records().unwrap(), synthetic_catalog(1200), &config(target));
        assert!(selection.selected.len() <= target, "target {target}");

        let doc = selection.to_document(GENERATED_AT);
        let tier_sum: usize = doc.metadata.tier_distribution.values().sum();
        assert_eq!(tier_sum, selection.selected.len());
        assert_eq!(doc.metadata.actual_count, selection.selected.len());
        let type_sum: usize = doc.metadata.type_distribution.values().sum();
        assert_eq!(type_sum, selection.selected.len());
    }
}

fn bare(name: String, total: f64) -> ScoredRecord {
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
fn percentile_boundary_on_1000_distinct_scores() {
    let mut pool: Vec<ScoredRecord> = (0..1000).map(|i| bare(format!("r{i}"), i as f64)).collect();
    pool.shuffle(&mut rng());

    let table = TierTable::DEFAULT;
    let ranked = assign_tiers(pool, &table);

    let mythic = ranked.iter().filter(|r| r.badge_tier == BadgeTier::Mythic).count();
    assert_eq!(mythic, (1000.0 * table.fraction(BadgeTier::Mythic)).floor() as usize);

    let mut counts: BTreeMap<BadgeTier, usize> = BTreeMap::new();
    for r in &ranked {
        *counts.entry(r.badge_tier).or_default() += 1;
    }
    assert_eq!(counts[&BadgeTier::Legendary], 30);
    assert_eq!(counts[&BadgeTier::Epic], 60);
    assert_eq!(counts[&BadgeTier::Rare], 150);
    assert_eq!(counts[&BadgeTier::Common], 750);

    // a higher score is never in a less rare tier than a lower score
    let mut by_score: Vec<&RankedRecord> = ranked.iter().collect();
    by_score.sort_by(|a, b| b.total_score().total_cmp(&a.total_score()));
    for pair in by_score.windows(2) {
        assert!(pair[0].badge_tier <= pair[1].badge_tier);
    }
    assert!(by_score[..10].iter().all(|r| r.total_score() >= 990.0));
}

#[test]
fn quota_non_violation() {
    let ranked = rank_pool(curated_records().unwrap(), synthetic_catalog(2000), &config(600));
    let plan = QuotaPlan::new(600, &QuotaTables::default());
    let selector = BalancedSelector::new(&ranked, &plan);

    let state = selector.curated_pass(SelectionState::new(&plan));
    let state = selector.quota_fill_pass(state);

    // before backfill every tracked cell is within its quota
    let mut cells: BTreeMap<(BadgeTier, TypeCategory), usize> = BTreeMap::new();
    for r in state.selected() {
        let cell = plan.cell_for(r.badge_tier, r.scored.record.category());
        *cells.entry((r.badge_tier, cell)).or_default() += 1;
    }
    for ((tier, cell), count) in &cells {
        if let Some(quota) = plan.cell_quota(*tier, *cell) {
            assert!(*count <= quota, "{tier}/{cell}: {count} > {quota}");
        }
    }

    // after backfill no tier exceeds its quota
    let state = selector.backfill_pass(state);
    let mut tiers: BTreeMap<BadgeTier, usize> = BTreeMap::new();
    for r in state.selected() {
        *tiers.entry(r.badge_tier).or_default() += 1;
    }
    for (tier, count) in &tiers {
        assert!(*count <= plan.tier_quota(*tier), "{tier}: {count}");
    }
}

#[test]
fn small_closed_pool_scenario() {
    // Type A = black hole. Five curated with maximal attributes, all type A.
    let maxed = Attributes {
        distance: Some(1.4e10),
        mass: Some(1e11),
        luminosity: Some(1e12),
        temperature: Some(1e7),
        magnitude: None,
        discovery_year: Some(2024),
    };
    let curated: Vec<CatalogRecord> = (0..5)
        .map(|i| CatalogRecord::new(format!("Curated {i}"), "Black Hole").with_attributes(maxed.clone()))
        .collect();

    // Twenty generated records across two types, distinct masses.
    let generated: Vec<CatalogRecord> = (0..20)
        .map(|i| {
            let object_type = if i % 2 == 0 { "Galaxy" } else { "Star" };
            CatalogRecord::new(format!("Generated {i}"), object_type).with_attributes(Attributes {
                mass: Some(10f64.powi(i - 4)),
                ..Attributes::default()
            })
        })
        .collect();

    let mut types = BTreeMap::new();
    types.insert(
        BadgeTier::Mythic,
        TypeWeights::from([(TypeCategory::BlackHole, 3), (TypeCategory::Galaxy, 2)]),
    );
    let config = PipelineConfig {
        target_count: 10,
        ranking: TierTable::new([0.2, 0.8, 0.0, 0.0, 0.0]),
        quotas: QuotaTables {
            tiers: TierTable::new([0.2, 0.8, 0.0, 0.0, 0.0]),
            types,
        },
        ..PipelineConfig::default()
    };

    let selection = run_pipeline(curated, generated, &config);

    // 25 records: the top 5 (all curated) are mythic
    assert_eq!(selection.pool_size, 25);
    assert_eq!(selection.plan.tier_quota(BadgeTier::Mythic), 2);
    assert_eq!(selection.plan.cell_quota(BadgeTier::Mythic, TypeCategory::BlackHole), Some(1));

    // curated pass stops at the black-hole cell; backfill tops up the tier
    assert_eq!(selection.counts.curated, 1);
    assert_eq!(selection.counts.curated_skipped, 4);
    assert_eq!(selection.selected[0].name(), "Curated 0");

    let mythic: Vec<&RankedRecord> = selection
        .selected
        .iter()
        .filter(|r| r.badge_tier == BadgeTier::Mythic)
        .collect();
    assert_eq!(mythic.len(), 2);
    assert!(mythic.iter().all(|r| r.scored.record.catalog_source == CatalogSource::Curated));
    let type_a = mythic
        .iter()
        .filter(|r| r.scored.record.category() == TypeCategory::BlackHole)
        .count();
    assert!(type_a <= 3);

    // the remaining 8 come from the second tier, best scores first
    assert_eq!(selection.selected.len(), 10);
    let chosen: HashSet<&str> = selection.selected.iter().map(|r| r.name()).collect();
    let legendary_selected: Vec<f64> = selection
        .selected
        .iter()
        .filter(|r| r.badge_tier == BadgeTier::Legendary)
        .map(RankedRecord::total_score)
        .collect();
    assert_eq!(legendary_selected.len(), 8);
    let worst_chosen = legendary_selected.iter().copied().fold(f64::INFINITY, f64::min);
    for i in 0..20 {
        let name = format!("Generated {i}");
        if !chosen.contains(name.as_str()) {
            let mass = 10f64.powi(i - 4);
            let object_type = if i % 2 == 0 { "Galaxy" } else { "Star" };
            let record = CatalogRecord::new(name, object_type).with_attributes(Attributes {
                mass: Some(mass),
                ..Attributes::default()
            });
            let total = astro_core::Aggregator::default().score(record).total_score;
            assert!(total <= worst_chosen);
        }
    }
}

#[test]
fn scoring_is_idempotent_across_runs() {
    let a = rank_pool(curated_records().unwrap(), synthetic_catalog(300), &config(100));
    let b = rank_pool(curated_records().unwrap(), synthetic_catalog(300), &config(100));
    assert_eq!(a, b);
}

#[test]
fn curated_records_rank_above_equivalent_generated() {
    let mut curated = curated_records().unwrap();
    curated.truncate(1);
    let mut twin = curated[0].clone();
    twin.name = format!("{} (catalog copy)", twin.name);

    let ranked = rank_pool(curated, vec![twin], &config(10));
    assert!(ranked[0].total_score() > ranked[1].total_score());
    assert!(ranked[0].rank < ranked[1].rank);
}

#[test]
fn type_cell_cap_binds_within_top_tier() {
    // Eight black holes compete for a mythic black-hole cell of 3.
    let maxed = Attributes {
        distance: Some(1.4e10),
        mass: Some(1e11),
        luminosity: Some(1e12),
        temperature: Some(1e7),
        magnitude: None,
        discovery_year: Some(2024),
    };
    let mut generated: Vec<CatalogRecord> = (0..8)
        .map(|i| CatalogRecord::new(format!("Black Hole {i}"), "Black Hole").with_attributes(maxed.clone()))
        .collect();
    generated.extend((0..12).map(|i| {
        let object_type = if i % 2 == 0 { "Galaxy" } else { "Star" };
        CatalogRecord::new(format!("Field {i}"), object_type).with_attributes(Attributes {
            mass: Some(10f64.powi(i - 4)),
            ..Attributes::default()
        })
    }));

    let tiers = TierTable::new([0.5, 0.5, 0.0, 0.0, 0.0]);
    let mut types = BTreeMap::new();
    types.insert(
        BadgeTier::Mythic,
        TypeWeights::from([(TypeCategory::BlackHole, 3), (TypeCategory::Galaxy, 2)]),
    );
    let config = PipelineConfig {
        target_count: 10,
        ranking: tiers,
        quotas: QuotaTables { tiers, types },
        ..PipelineConfig::default()
    };

    let ranked = rank_pool(Vec::new(), generated, &config);
    let mythic_black_holes = ranked
        .iter()
        .filter(|r| r.badge_tier == BadgeTier::Mythic && r.scored.record.category() == TypeCategory::BlackHole)
        .count();
    assert_eq!(mythic_black_holes, 8);

    let plan = QuotaPlan::new(10, &config.quotas);
    assert_eq!(plan.tier_quota(BadgeTier::Mythic), 5);
    assert_eq!(plan.cell_quota(BadgeTier::Mythic, TypeCategory::BlackHole), Some(3));

    let selector = BalancedSelector::new(&ranked, &plan);
    let state = selector.quota_fill_pass(selector.curated_pass(SelectionState::new(&plan)));
    let admitted_black_holes = state
        .selected()
        .iter()
        .filter(|r| r.badge_tier == BadgeTier::Mythic && r.scored.record.category() == TypeCategory::BlackHole)
        .count();
    assert_eq!(admitted_black_holes, 3);
    assert_eq!(state.cell_remaining(BadgeTier::Mythic, TypeCategory::BlackHole), Some(0));

    let state = selector.backfill_pass(state);
    let mythic = state.selected().iter().filter(|r| r.badge_tier == BadgeTier::Mythic).count();
    assert!(mythic <= plan.tier_quota(BadgeTier::Mythic));
    assert!(state.selected().len() <= 10);
}
