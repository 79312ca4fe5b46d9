use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pitwall::auth::JwtKeys;
use pitwall::config::Config;
use pitwall::etl::{Warehouse, load_all};
use pitwall::server::{AppState, create_router};
use pitwall::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "pitwall")]
#[command(about = "Formula 1 statistics: CSV loader, warehouse build and REST API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "PITWALL_CONFIG")]
    config: Option<PathBuf>,

    /// Source database path (overrides the config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Warehouse database path (overrides the config file)
    #[arg(long, global = true)]
    warehouse: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the source schema
    Init,

    /// Load the CSV extracts into the source database
    Load {
        /// Directory holding the *_ok.csv files
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },

    /// Warehouse commands
    Warehouse {
        #[command(subcommand)]
        command: WarehouseCommands,
    },

    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum WarehouseCommands {
    /// Create the star schema and load it from the source database
    Build {
        /// Empty every warehouse table before loading
        #[arg(long)]
        truncate: bool,
    },
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

fn open_source(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = &config.database.path;
    ensure_parent_dir(path)?;

    let store = SqliteStore::new(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    store.initialize()?;
    Ok(store)
}

fn run_init(config: &Config) -> anyhow::Result<()> {
    open_source(config)?;
    println!(
        "Initialized source database at {}",
        config.database.path.display()
    );
    Ok(())
}

fn run_load(config: &Config) -> anyhow::Result<()> {
    let csv_dir = &config.etl.csv_dir;
    if !csv_dir.is_dir() {
        bail!("CSV directory {} does not exist", csv_dir.display());
    }

    let store = open_source(config)?;
    let summary = load_all(&store.connection(), csv_dir);

    for report in &summary.loaded {
        println!(
            "loaded  {:<24} {:>8} rows  ({})",
            report.table,
            report.rows_inserted,
            report.file.display()
        );
    }
    for skipped in &summary.skipped {
        println!(
            "skipped {:<24} {}  ({})",
            skipped.table,
            skipped.reason,
            skipped.file.display()
        );
    }
    println!(
        "{} file(s) loaded, {} skipped",
        summary.loaded.len(),
        summary.skipped.len()
    );

    Ok(())
}

fn run_warehouse_build(config: &Config, truncate: bool) -> anyhow::Result<()> {
    ensure_parent_dir(&config.database.warehouse_path)?;

    let warehouse = Warehouse::open(&config.database.warehouse_path, &config.database.path)?;
    warehouse.create_tables()?;

    if truncate {
        info!("Truncating warehouse tables");
        warehouse.truncate()?;
    }

    let report = warehouse.build()?;

    for step in &report.steps {
        println!("{:<28} {:>8} rows", step.table, step.rows);
    }
    println!("Warehouse built in {:.2?}", report.duration);

    Ok(())
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    let jwt = JwtKeys::new(config.jwt_secret()?, config.token_ttl()?);

    let store: Option<Arc<dyn Store>> = match open_source(&config) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!("Database connection failed, serving without it: {e:#}");
            None
        }
    };

    let state = Arc::new(AppState::new(store, jwt));
    let app = create_router(state);
    let addr = config.server.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pitwall=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(warehouse) = cli.warehouse {
        config.database.warehouse_path = warehouse;
    }

    match cli.command {
        Commands::Init => run_init(&config)?,
        Commands::Load { csv_dir } => {
            if let Some(dir) = csv_dir {
                config.etl.csv_dir = dir;
            }
            run_load(&config)?;
        }
        Commands::Warehouse { command } => match command {
            WarehouseCommands::Build { truncate } => run_warehouse_build(&config, truncate)?,
        },
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_serve(config).await?;
        }
    }

    Ok(())
}
