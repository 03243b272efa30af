// CLI tool for seeding daily flow records.
// Run with: cargo run --bin seed-flows -- --help

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use pulse_core::{DateRange, SankeyGraph};
use pulse_storage::{demo_graph, plan_flow_seed, write_seed, StoreConfig, StoreHandle};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug)]
struct Args {
    start: String,
    end: String,
    seed: Option<u64>,
    graph: Option<PathBuf>,
    dry_run: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let args: Vec<String> = env::args().collect();
        let mut start = None;
        let mut end = None;
        let mut seed = None;
        let mut graph = None;
        let mut dry_run = false;
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--start" | "-s" => {
                    i += 1;
                    start = Some(args.get(i).context("--start requires a date")?.to_string());
                }
                "--end" | "-e" => {
                    i += 1;
                    end = Some(args.get(i).context("--end requires a date")?.to_string());
                }
                "--seed" => {
                    i += 1;
                    seed = Some(
                        args.get(i)
                            .context("--seed requires a value")?
                            .parse()
                            .context("Invalid seed")?,
                    );
                }
                "--graph" | "-g" => {
                    i += 1;
                    graph = Some(PathBuf::from(
                        args.get(i).context("--graph requires a path")?,
                    ));
                }
                "--dry-run" | "-n" => dry_run = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                arg => {
                    eprintln!("Unknown argument: {}", arg);
                    print_help();
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        Ok(Self {
            start: start.context("--start is required")?,
            end: end.context("--end is required")?,
            seed,
            graph,
            dry_run,
        })
    }
}

fn print_help() {
    eprintln!(
        r#"
seed-flows - Write jittered daily flow records for a Sankey graph

USAGE:
    seed-flows --start <DATE> --end <DATE> [OPTIONS]

OPTIONS:
    -s, --start <DATE>      First day to seed, YYYY-MM-DD (required)
    -e, --end <DATE>        Last day to seed, YYYY-MM-DD (required)
        --seed <N>          RNG seed for reproducible values
    -g, --graph <PATH>      JSON file with {{"nodes": [...], "links": [...]}} (default: demo graph)
    -n, --dry-run           Print the planned records without writing them
    -h, --help              Show this help message

ENVIRONMENT:
    DATABASE_URL            PostgreSQL connection string (required unless STORAGE_MODE=memory)
    STORAGE_MODE            postgres (default) or memory

EXAMPLES:
    # Seed the demo graph for one month
    seed-flows --start 2025-01-20 --end 2025-02-20

    # Preview a custom graph with fixed randomness
    seed-flows --start 2025-01-01 --end 2025-01-07 --graph flows.json --seed 7 --dry-run
"#
    );
}

fn load_graph(path: Option<&PathBuf>) -> Result<SankeyGraph> {
    match path {
        None => Ok(demo_graph()),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read graph file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid graph JSON in {}", path.display()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_flows=info,pulse_storage=info".into()),
        )
        .init();

    let args = Args::parse()?;

    // Load environment
    if let Ok(path) = dotenvy::dotenv() {
        tracing::info!("Loaded .env from {:?}", path);
    }

    let range = DateRange::parse(&args.start, &args.end).context("Invalid seeding window")?;
    let graph = load_graph(args.graph.as_ref())?;
    tracing::info!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        days = range.num_days(),
        "Planning flow seed"
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let plan = plan_flow_seed(&graph, &range, &mut rng);
    if !plan.skipped_edges.is_empty() {
        tracing::warn!(skipped = plan.skipped_edges.len(), "Some edges were not seeded");
    }

    if args.dry_run {
        for record in &plan.records {
            println!(
                "{}\t{}\t{}",
                record.flow_date,
                record.flow_key,
                record.weight().unwrap_or_default()
            );
        }
        tracing::info!(records = plan.records.len(), "Dry run complete, nothing written");
        return Ok(());
    }

    let store = StoreHandle::new(StoreConfig::from_env().context("Invalid storage configuration")?);
    pulse_api::open_store(&store)
        .await
        .context("Analytics store is misconfigured")?;

    let report = write_seed(&store, &plan.records).await;
    store.close().await;

    tracing::info!(
        written = report.written,
        failed = report.failed,
        "Flow seeding complete"
    );

    Ok(())
}
