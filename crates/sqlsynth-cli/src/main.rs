//! sqlsynth CLI
//!
//! Prints the SQL a platform needs to create, drop or migrate a schema
//! described in a JSON document, and renders structured queries.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sqlsynth_core::query::QueryParts;
use sqlsynth_core::registry::{self, PlatformKind};
use sqlsynth_core::schema::{compare_schemas, Schema};
use sqlsynth_core::{PlatformConfig, Statements};

/// Cross-dialect SQL generation from schema documents.
#[derive(Parser)]
#[command(name = "sqlsynth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target platform (name or alias, see `platforms`).
    #[arg(short, long, env = "SQLSYNTH_PLATFORM", default_value = "postgresql")]
    platform: PlatformKind,

    /// Quote every identifier, not only reserved words.
    #[arg(short, long)]
    quote_all: bool,

    /// Print statements and diagnostics as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the statements that create every table and sequence of a schema.
    Create {
        /// Schema document.
        schema: PathBuf,
    },

    /// Show the statements that drop every table and sequence of a schema.
    Drop {
        /// Schema document.
        schema: PathBuf,
    },

    /// Show the statements that migrate one schema to another.
    Diff {
        /// Current schema document.
        #[arg(long)]
        from: PathBuf,

        /// Target schema document.
        #[arg(long)]
        to: PathBuf,
    },

    /// Render a query described as JSON.
    Query {
        /// Query document.
        parts: PathBuf,

        /// Substitute parameters as literals, for reading rather than running.
        #[arg(long)]
        inline: bool,
    },

    /// List supported platforms and their aliases.
    Platforms,
}

#[derive(Serialize)]
struct PlatformEntry {
    name: &'static str,
    aliases: &'static [&'static str],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging. Statements go to stdout, so logs go to stderr.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = if cli.quote_all {
        PlatformConfig::quote_all()
    } else {
        PlatformConfig::default()
    };
    let platform = registry::create(cli.platform, config);

    match cli.command {
        Commands::Create { schema } => {
            let schema: Schema = load(&schema)?;
            info!(
                "Creating {} tables and {} sequences on {}",
                schema.tables.len(),
                schema.sequences.len(),
                platform.name()
            );
            let out = platform.create_schema(&schema)?;
            print_statements(&out, cli.json)?;
        }

        Commands::Drop { schema } => {
            let schema: Schema = load(&schema)?;
            let diff = compare_schemas(&schema, &Schema::new());
            let out = platform.migrate_schema(&diff)?;
            print_statements(&out, cli.json)?;
        }

        Commands::Diff { from, to } => {
            let from: Schema = load(&from)?;
            let to: Schema = load(&to)?;
            let diff = compare_schemas(&from, &to);
            if diff.is_empty() {
                info!("Schemas are identical, nothing to migrate.");
            } else {
                info!(
                    "{} tables created, {} altered, {} dropped",
                    diff.created_tables.len(),
                    diff.altered_tables.len(),
                    diff.dropped_tables.len()
                );
            }
            let out = platform.migrate_schema(&diff)?;
            print_statements(&out, cli.json)?;
        }

        Commands::Query { parts, inline } => {
            let parts: QueryParts = load(&parts)?;
            let rendered = platform.render_query(&parts)?;
            if inline {
                println!("{};", rendered.inline_sql(platform.as_ref()));
            } else if cli.json {
                println!("{}", serde_json::to_string_pretty(&rendered)?);
            } else {
                println!("{};", rendered.sql);
            }
        }

        Commands::Platforms => {
            if cli.json {
                let entries: Vec<PlatformEntry> = PlatformKind::ALL
                    .into_iter()
                    .map(|kind| PlatformEntry {
                        name: kind.name(),
                        aliases: kind.aliases(),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for kind in PlatformKind::ALL {
                    println!("{:<12}{}", kind.name(), kind.aliases().join(", "));
                }
            }
        }
    }

    Ok(())
}

fn load<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_statements(out: &Statements, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(out)?);
        return Ok(());
    }
    for sql in out {
        println!("{sql};");
    }
    info!(
        "{} statements, {} diagnostics",
        out.len(),
        out.diagnostics.len()
    );
    Ok(())
}
