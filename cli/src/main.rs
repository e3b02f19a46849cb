//! Phenograph CLI: command-line interface for the ontology engine
//!
//! Builds an `OntologyService` from config, loads the graph once and runs a
//! single query against it.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use phenograph::{
    build_display_tree, chart_from_counts, closest_common_ancestor, consolidate, ChartOptions,
    Closure, ClosureEngine, Diagnostics, EngineConfig, Ontology, OntologyService,
    PhenotypeFilter, TreeNode,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "phenograph", version, about = "Phenotype ontology graph engine")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true, env = "PHENOGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Ontology source URL or path
    #[arg(long, global = true)]
    source: Option<String>,

    /// Local cache file for the raw source
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Designated root term
    #[arg(long, global = true)]
    root: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ontology statistics
    Info,
    /// Terms and all their ancestors
    Ancestors {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Terms and all their descendants
    Descendants {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Descendant-closed include / exclude sets for a cohort filter
    Filter {
        #[arg(long = "select", num_args = 1..)]
        select: Vec<String>,
        #[arg(long = "exclude", num_args = 1..)]
        exclude: Vec<String>,
    },
    /// Consolidate a JSON count map ({"HP:..": n})
    Consolidate {
        #[arg(long)]
        counts: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        threshold: i64,
    },
    /// Deepest non-trivial common ancestor of two terms
    CommonAncestor { a: String, b: String },
    /// Minimal display tree for the given terms
    Tree {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Chart tuples for a JSON count map, consolidated first
    Chart {
        #[arg(long)]
        counts: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        threshold: i64,
        #[arg(long, default_value_t = 1)]
        min_count: u64,
    },
    /// Re-check the remote source and replace the cache when its version changed
    Refresh,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Defaults, then the YAML file, then `PHENOGRAPH_*` variables, then flags
fn engine_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut config = config
        .with_env_overrides()
        .context("applying PHENOGRAPH_* environment overrides")?;
    if let Some(source) = &cli.source {
        config.source_url = source.clone();
    }
    if let Some(cache) = &cli.cache {
        config.cache_path = cache.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.fetch_timeout_secs = timeout;
    }
    if let Some(root) = &cli.root {
        config.root_term = root.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = engine_config(&cli)?;
    let service = OntologyService::from_config(&config)?;

    if let Commands::Refresh = cli.command {
        let outcome = service.refresh().await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let ontology = service.get().await?;
    let format = &cli.format;

    match &cli.command {
        Commands::Info => run_info(&ontology, format)?,
        Commands::Ancestors { ids } => {
            let mut engine = ClosureEngine::with_capacity(&ontology, config.closure_cache_capacity);
            print_closure(&ontology, &engine.ancestors_of_any(ids), format)?;
        }
        Commands::Descendants { ids } => {
            let mut engine = ClosureEngine::with_capacity(&ontology, config.closure_cache_capacity);
            print_closure(&ontology, &engine.descendants_of_any(ids), format)?;
        }
        Commands::Filter { select, exclude } => {
            let filter = PhenotypeFilter {
                selected: select.clone(),
                excluded: exclude.clone(),
            };
            let mut engine = ClosureEngine::with_capacity(&ontology, config.closure_cache_capacity);
            let sets = engine.filter_sets(&filter);
            report(&sets.diagnostics);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sets)?),
                _ => {
                    println!("include: {} term(s)", sets.include.len());
                    println!("exclude: {} term(s)", sets.exclude.len());
                }
            }
        }
        Commands::Consolidate { counts, threshold } => {
            let counts = read_counts(counts)?;
            let result = consolidate(&ontology, counts, *threshold);
            report(&result.diagnostics);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                _ => {
                    let rows = result.counts.iter().map(|(id, count)| {
                        vec![
                            id.to_string(),
                            ontology.label(id.as_str()).unwrap_or_default().to_string(),
                            count.to_string(),
                        ]
                    });
                    print_rows(&["id", "label", "count"], rows, format);
                    println!("{} pass(es), total {}", result.iterations, result.total());
                }
            }
        }
        Commands::CommonAncestor { a, b } => {
            let found = closest_common_ancestor(&ontology, a, b);
            match (format, found) {
                (OutputFormat::Json, found) => {
                    println!("{}", serde_json::to_string_pretty(&found)?)
                }
                (_, Some(id)) => println!(
                    "{}\t{}",
                    id,
                    ontology.label(id.as_str()).unwrap_or_default()
                ),
                (_, None) => println!("(none)"),
            }
        }
        Commands::Tree { ids } => {
            let tree = build_display_tree(&ontology, ids);
            report(&tree.diagnostics);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
                _ => {
                    for root in &tree.roots {
                        print_tree(root, 0);
                    }
                }
            }
        }
        Commands::Chart {
            counts,
            threshold,
            min_count,
        } => {
            let counts = read_counts(counts)?;
            let chart = chart_from_counts(
                &ontology,
                counts,
                *threshold,
                ChartOptions {
                    min_count: *min_count,
                },
            );
            report(&chart.diagnostics);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&chart)?),
                _ => {
                    let rows = chart.entries.iter().map(|e| {
                        vec![
                            e.id.to_string(),
                            e.label.clone(),
                            e.parent.as_ref().map(|p| p.to_string()).unwrap_or_default(),
                            e.value.to_string(),
                        ]
                    });
                    print_rows(&["id", "label", "parent", "value"], rows, format);
                }
            }
        }
        Commands::Refresh => {}
    }

    Ok(())
}

fn run_info(ontology: &Ontology, format: &OutputFormat) -> anyhow::Result<()> {
    let stats = ontology.statistics();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        _ => {
            println!("Version:      {}", stats.data_version.as_deref().unwrap_or("unknown"));
            println!("Root:         {}", stats.root);
            println!("Terms:        {}", stats.term_count);
            println!("Edges:        {}", stats.edge_count);
            println!("Obsolete:     {}", stats.obsolete_count);
            println!("Placeholders: {}", stats.placeholder_count);
            println!("Disconnected: {}", stats.disconnected_count);
            println!("Max depth:    {}", stats.max_depth);
            if stats.cycle_edge_count > 0 {
                println!("Cycle edges:  {}", stats.cycle_edge_count);
            }
        }
    }
    Ok(())
}

fn read_counts(path: &Path) -> anyhow::Result<BTreeMap<String, u64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading counts {}", path.display()))?;
    let counts: BTreeMap<String, u64> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON object of term id -> count", path.display()))?;
    if counts.is_empty() {
        bail!("{} contains no counts", path.display());
    }
    Ok(counts)
}

fn print_closure(
    ontology: &Ontology,
    closure: &Closure,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    report(&closure.diagnostics);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(closure)?),
        _ => {
            let rows = closure.iter().map(|id| {
                vec![
                    id.to_string(),
                    ontology.label(id.as_str()).unwrap_or_default().to_string(),
                    ontology
                        .depth(id.as_str())
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]
            });
            print_rows(&["id", "label", "depth"], rows, format);
        }
    }
    Ok(())
}

fn print_rows<I>(header: &[&str], rows: I, format: &OutputFormat)
where
    I: Iterator<Item = Vec<String>>,
{
    match format {
        OutputFormat::Csv => {
            println!("{}", header.join(","));
            for row in rows {
                let cells: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        _ => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(header.to_vec());

            let mut count = 0;
            for row in rows {
                table.add_row(row);
                count += 1;
            }

            if count == 0 {
                println!("(no results)");
                return;
            }
            println!("{}", table);
            println!("{} row(s)", count);
        }
    }
}

fn print_tree(node: &TreeNode, indent: usize) {
    let marker = if node.used { "*" } else { " " };
    println!("{}{} {} {}", "  ".repeat(indent), marker, node.id, node.label);
    for child in &node.children {
        print_tree(child, indent + 1);
    }
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("warning: {}", diagnostic);
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
