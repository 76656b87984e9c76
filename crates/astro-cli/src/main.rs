mod config;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use astro_core::{
    Aggregator, BadgeTier, CatalogRecord, DEFAULT_TOP_N, RankedRecord, Report, ScoreStats,
    assign_tiers, curated_records, merge_pool, resolve_generated_at, run_pipeline,
};
use astro_store::{Store, read_catalog_file, read_selection_file, write_selection_file};

use crate::config::FileConfig;

#[derive(Parser)]
#[command(name = "astro", about = "Score, tier and select catalog objects under rarity quotas")]
struct Cli {
    /// TOML file with defaults, tier fractions and type tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write a selection file.
    ///
    /// The output is replaced atomically. Two runs writing the same path
    /// concurrently: the last one to finish wins.
    Select {
        /// Number of objects to select
        #[arg(long, env = "ASTRO_TARGET_COUNT")]
        target_count: Option<usize>,

        /// Generated catalog (JSON array or {"objects": [...]})
        #[arg(long, env = "ASTRO_INPUT")]
        input: Option<PathBuf>,

        /// Selection file destination
        #[arg(long, env = "ASTRO_OUTPUT")]
        output: Option<PathBuf>,

        /// Fixed `generatedAt` value (else SOURCE_DATE_EPOCH, else now)
        #[arg(long)]
        generated_at: Option<String>,

        /// Select from the generated catalog only
        #[arg(long)]
        skip_curated: bool,

        /// Size of the top-N list in the report
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Also record the run in this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Score and tier a catalog without selecting
    Score {
        /// Catalog file
        input: PathBuf,

        /// Leave the curated dataset out of the pool
        #[arg(long)]
        skip_curated: bool,
    },

    /// Print the report for a saved selection file
    Report {
        /// Selection file
        path: PathBuf,

        /// Size of the top-N list
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// List selection runs recorded in a database
    History {
        /// SQLite database written by `select --db`
        #[arg(long)]
        db: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = FileConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Select {
            target_count,
            input,
            output,
            generated_at,
            skip_curated,
            top,
            db,
        } => cmd_select(
            &file_config,
            SelectArgs {
                target_count: *target_count,
                input: input.as_deref(),
                output: output.as_deref(),
                generated_at: generated_at.as_deref(),
                skip_curated: *skip_curated,
                top: *top,
                db: db.as_deref(),
            },
        ),
        Commands::Score {
            input,
            skip_curated,
        } => cmd_score(&file_config, input, *skip_curated),
        Commands::Report { path, top } => cmd_report(&file_config, path, *top),
        Commands::History { db } => cmd_history(db),
    }
}

struct SelectArgs<'a> {
    target_count: Option<usize>,
    input: Option<&'a Path>,
    output: Option<&'a Path>,
    generated_at: Option<&'a str>,
    skip_curated: bool,
    top: usize,
    db: Option<&'a Path>,
}

fn load_curated(skip: bool) -> Result<Vec<CatalogRecord>> {
    if skip {
        return Ok(Vec::new());
    }
    curated_records().context("embedded curated dataset is malformed")
}

fn cmd_select(file_config: &FileConfig, args: SelectArgs<'_>) -> Result<()> {
    let target_count = file_config.target_count(args.target_count);
    let input = file_config.input(args.input);
    let output = file_config.output(args.output);
    let config = file_config.pipeline(target_count)?;

    // every input is read and the database opened before anything is written
    let curated = load_curated(args.skip_curated)?;
    let generated = read_catalog_file(&input)
        .with_context(|| format!("failed to load catalog {}", input.display()))?;

    let store = args
        .db
        .map(|db| Store::open(db).with_context(|| format!("failed to open {}", db.display())))
        .transpose()?;

    let selection = run_pipeline(curated, generated, &config);
    let source_date_epoch = std::env::var("SOURCE_DATE_EPOCH").ok();
    let generated_at = resolve_generated_at(args.generated_at, source_date_epoch.as_deref());
    let document = selection.to_document(&generated_at);

    write_selection_file(&output, &document)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if let Some(store) = &store {
        let run = store
            .save_selection(&document)
            .context("failed to record selection run")?;
        eprintln!("recorded run {}", run.id);
    }

    let report = Report::new(&document.objects, target_count, &config.quotas.tiers, args.top);
    print!("{report}");
    println!();
    println!(
        "pool: {} records, {} duplicate names dropped",
        selection.pool_size, selection.duplicates_dropped
    );
    println!(
        "passes: curated={} (skipped {}), quota_fill={}, backfill={}",
        selection.counts.curated,
        selection.counts.curated_skipped,
        selection.counts.quota_fill,
        selection.counts.backfill
    );
    println!("wrote {}", output.display());
    Ok(())
}

fn cmd_score(file_config: &FileConfig, input: &Path, skip_curated: bool) -> Result<()> {
    let config = file_config.pipeline(file_config.target_count(None))?;
    let curated = load_curated(skip_curated)?;
    let generated = read_catalog_file(input)
        .with_context(|| format!("failed to load catalog {}", input.display()))?;

    let (pool, dropped) = merge_pool(curated, generated);
    let scored = Aggregator::new(config.curated_bonus).score_all(pool);
    let ranked = assign_tiers(scored, &config.ranking);

    let mut by_tier: BTreeMap<BadgeTier, Vec<f64>> = BTreeMap::new();
    for record in &ranked {
        by_tier
            .entry(record.badge_tier)
            .or_default()
            .push(record.total_score());
    }

    println!("pool:       {} records ({} duplicate names dropped)", ranked.len(), dropped);
    let all: Vec<f64> = ranked.iter().map(RankedRecord::total_score).collect();
    print_stats("scores:    ", ScoreStats::from_scores(&all));
    println!();
    println!("{:<10} {:>6}  stats", "tier", "count");
    for tier in BadgeTier::ALL {
        let scores = by_tier.get(&tier).map(Vec::as_slice).unwrap_or_default();
        print!("{:<10} {:>6}  ", tier.as_str(), scores.len());
        print_stats("", ScoreStats::from_scores(scores));
    }
    Ok(())
}

fn print_stats(label: &str, stats: Option<ScoreStats>) {
    match stats {
        Some(s) => println!(
            "{label}min={:.2} max={:.2} mean={:.2} median={:.2} stddev={:.2}",
            s.min, s.max, s.mean, s.median, s.std_dev
        ),
        None => println!("{label}(none)"),
    }
}

fn cmd_report(file_config: &FileConfig, path: &Path, top: usize) -> Result<()> {
    let document = read_selection_file(path)
        .with_context(|| format!("failed to load selection {}", path.display()))?;
    let config = file_config.pipeline(document.metadata.target_count)?;

    println!("generated:  {}", document.metadata.generated_at);
    let report = Report::new(
        &document.objects,
        document.metadata.target_count,
        &config.quotas.tiers,
        top,
    );
    print!("{report}");
    Ok(())
}

fn cmd_history(db: &Path) -> Result<()> {
    let store = Store::open(db).with_context(|| format!("failed to open {}", db.display()))?;
    let runs = store.list_runs().context("failed to list runs")?;

    if runs.is_empty() {
        println!("(no runs recorded)");
        return Ok(());
    }
    for run in &runs {
        let tiers: Vec<String> = run
            .tier_distribution
            .iter()
            .map(|(tier, count)| format!("{tier}={count}"))
            .collect();
        println!(
            "{}  {}  {}/{}  {}",
            run.id,
            run.generated_at,
            run.actual_count,
            run.target_count,
            tiers.join(" ")
        );
    }
    println!("runs: {}", runs.len());
    Ok(())
}
