//! Cohort command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cohort::AppConfig;
use cohort::cli::{concepts, output, project, top_nodes, translate};
use cohort::tree::CatalogOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cohort definition tool
#[derive(Parser)]
#[command(name = "cohort")]
#[command(author, version, about = "Cohort definition tools", long_about = None)]
struct Cli {
    /// Config file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend api type (transmart, picsure); overrides the config file
    #[arg(long, global = true)]
    api_type: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the concepts of a tree file
    Concepts {
        /// Tree file (JSON)
        #[arg(short, long)]
        tree: PathBuf,
    },

    /// Project a tree onto a set of counts
    Project {
        /// Tree file (JSON)
        #[arg(short, long)]
        tree: PathBuf,

        /// Counts file (JSON object keyed by concept code)
        #[arg(long)]
        counts: PathBuf,

        /// Paths to select; prints the final selection instead of the projection
        #[arg(short, long)]
        select: Vec<String>,
    },

    /// Translate a constraint file into a backend query
    Translate {
        /// Constraint file (JSON)
        #[arg(long)]
        constraint: PathBuf,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Reduce a set of paths to their topmost members
    TopNodes {
        /// Node paths
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(api_type) = &cli.api_type {
        config.api_type.clone_from(api_type);
        config.validate().context("Invalid --api-type")?;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Concepts { tree } => {
            let config = concepts::ConceptsConfig {
                tree,
                catalog: CatalogOptions {
                    greedy: true,
                    ..config.catalog_options()
                },
                output_file: cli.output,
            };
            concepts::concepts(config).await
        }

        Commands::Project {
            tree,
            counts,
            select,
        } => {
            let config = project::ProjectConfig {
                tree,
                counts,
                select,
                catalog: config.catalog_options(),
                output_file: cli.output,
            };
            project::project(config).await
        }

        Commands::Translate { constraint, pretty } => {
            let config = translate::TranslateConfig {
                constraint,
                api_type: config.api_type()?,
                pretty,
                output_file: cli.output,
            };
            translate::translate(config).await
        }

        Commands::TopNodes { paths } => top_nodes::top_nodes(&paths, cli.output.as_deref()),
    }
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
