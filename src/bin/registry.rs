//! Metadata Core CLI
//!
//! Lists registered schemas, validates analysis payloads, and compiles
//! info-search query fragments.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use genometa::{SearchQueryBuilder, SearchTerm, Settings, Validator};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genometa")]
#[command(about = "Schema registry and search query tools for analysis metadata")]
struct Cli {
    /// Path to a config file (defaults to genometa.toml if present)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered schema ids and their checksums
    List {
        /// Include schemas hidden from external listing
        #[arg(long)]
        all: bool,
    },

    /// Validate a payload file against a registered schema
    Validate {
        /// Schema id (e.g. sequencingRead)
        schema_id: String,
        /// Path to the JSON payload
        payload: PathBuf,
    },

    /// Compile a search query fragment from key=pattern terms
    Query {
        /// Search terms, each as dotted.path=regex
        terms: Vec<String>,
        /// Project the raw info blob alongside the analysis id
        #[arg(long)]
        include_info: bool,
        /// Emit the bound-parameter form instead of the legacy spliced form
        #[arg(long)]
        bound: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = Settings::load_from(cli.config.as_deref()).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log.filter.clone())),
        )
        .init();

    if let Err(e) = run(cli, settings) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let registry = settings.build_registry()?;

    match cli.command {
        Commands::List { all } => {
            let ids = if all { registry.all_ids() } else { registry.ids() };
            for id in ids {
                let record = registry.get(id)?;
                println!("{}  {}", record.checksum, record.id);
            }
            Ok(())
        }

        Commands::Validate { schema_id, payload } => {
            let content = std::fs::read_to_string(&payload)
                .with_context(|| format!("reading {}", payload.display()))?;
            let document: serde_json::Value =
                serde_json::from_str(&content).context("payload is not valid JSON")?;

            let validator = Validator::new(std::sync::Arc::new(registry));
            let result = validator.validate(&schema_id, &document)?;

            if result.is_valid() {
                println!("✅ payload conforms to '{}'", schema_id);
                Ok(())
            } else {
                println!(
                    "❌ payload failed validation against '{}' ({} violations):",
                    schema_id,
                    result.errors().len()
                );
                for error in result.errors() {
                    println!("  └─ {}", error);
                }
                std::process::exit(1);
            }
        }

        Commands::Query {
            terms,
            include_info,
            bound,
        } => {
            let mut builder = SearchQueryBuilder::new(include_info);
            for term in SearchTerm::parse_all(&terms)? {
                builder.add_term(term);
            }

            if bound {
                let query = builder.build_bound();
                println!("{}", query.sql);
                for (n, param) in query.params.iter().enumerate() {
                    println!("  ${} = {}", n + 1, param);
                }
            } else {
                println!("{}", builder.build());
            }
            Ok(())
        }
    }
}
