//! Docgraph CLI - export a documentation model into a SQLite graph

use clap::{Parser, Subcommand};
use docgraph::config;
use docgraph::query::QueryEngine;
use docgraph::render::PlainRenderer;
use docgraph::{DocModel, Exporter};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docgraph")]
#[command(version)]
#[command(about = "Documentation graph exporter - resolved model in, relational SQLite graph out")]
#[command(long_about = r#"
Docgraph persists an already-resolved documentation model into a SQLite
database with stable cross-reference identities, enabling:
  • SQL queries over classes, namespaces, files, groups, pages and members
  • Inclusion, containment, inheritance and cross-reference graph walks
  • One merged row per symbol, declaration and definition collapsed

Example usage:
  docgraph export --model model.json --database docs.db
  docgraph stats --database docs.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a documentation model into a database
    Export {
        /// Path to the JSON documentation model
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Project name override for the meta row
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Show statistics about an exported database
    Stats {
        /// Path to the database file
        #[arg(short, long, default_value = "docgraph.db")]
        database: PathBuf,
    },

    /// Write a starter docgraph.toml
    Init {
        /// Config file location
        #[arg(short, long, default_value = "docgraph.toml")]
        path: PathBuf,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Export { model, database, project } => {
            let file_config = config::load_config(None)?.unwrap_or_default();
            let model_path = model
                .or_else(|| file_config.model.as_ref().map(PathBuf::from))
                .ok_or_else(|| anyhow::anyhow!("no model given (use --model or docgraph.toml)"))?;
            let db_path = database
                .or_else(|| file_config.database.as_ref().map(PathBuf::from))
                .unwrap_or_else(config::default_database_path);

            tracing::info!("Exporting {:?} into {:?}", model_path, db_path);
            let file = std::fs::File::open(&model_path)?;
            let mut doc_model: DocModel = serde_json::from_reader(std::io::BufReader::new(file))?;
            if let Some(name) = project.or(file_config.project) {
                doc_model.project = name;
            }

            config::ensure_db_dir(&db_path)?;
            let renderer = PlainRenderer;
            let session = Exporter::open(&db_path, &renderer)?.export(&doc_model)?;

            let conn = session.into_connection();
            let stats = QueryEngine::new(&conn).stats()?;
            println!("✅ Export complete: {:?}", db_path);
            print!("{}", stats);
        }

        Commands::Stats { database } => {
            let conn = rusqlite::Connection::open(&database)?;
            let stats = QueryEngine::new(&conn).stats()?;
            println!("🗄️  Database: {:?}", database);
            print!("{}", stats);
        }

        Commands::Init { path, force } => {
            let config = config::DocgraphConfig {
                database: Some("docgraph.db".into()),
                model: Some("model.json".into()),
                project: None,
            };
            config::write_config(&path, &config, force)?;
            println!("Wrote {:?}", path);
        }
    }

    Ok(())
}
