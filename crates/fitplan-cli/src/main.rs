mod config;
mod generator;
mod plan_cmds;
mod prompt;
mod serve_cmd;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use fitplan_core::PlanService;
use fitplan_core::catalog::Catalog;
use fitplan_core::store::PlanVersionStore;
use fitplan_db::config::DbConfig;
use fitplan_db::models::PlanKind;
use fitplan_db::pool;
use sqlx::PgPool;

use config::FitplanConfig;
use generator::CommandGenerator;

#[derive(Parser)]
#[command(name = "fitplan", about = "Meal and workout plan generator")]
struct Cli {
    /// Database URL (overrides FITPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Ingredient catalog TOML (overrides FITPLAN_CATALOG env var)
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fitplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// External generator command, e.g. "llm-plan --json"
        #[arg(long)]
        generator_command: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the fitplan database (requires config file or env vars)
    DbInit,
    /// Generate and inspect plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Serve the plan API over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate a week of meals for a user
    GenerateMeal {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Read the full request (preferences and targets) from a JSON file
        #[arg(long)]
        request: Option<String>,
        /// Daily calories (kcal)
        #[arg(long, required_unless_present = "request")]
        calories: Option<f64>,
        /// Daily protein (g)
        #[arg(long, required_unless_present = "request")]
        protein: Option<f64>,
        /// Daily carbohydrates (g)
        #[arg(long, required_unless_present = "request")]
        carbs: Option<f64>,
        /// Daily fat (g)
        #[arg(long, required_unless_present = "request")]
        fat: Option<f64>,
        /// Meals per day (1-5)
        #[arg(long)]
        meals_per_day: Option<u32>,
        /// Output language: en or ar
        #[arg(long)]
        language: Option<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rebuild one day of the user's meal plan with the built-in planner
    RegenerateDay {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Day to rebuild (1-7)
        #[arg(long)]
        day: u32,
        /// Read the full request (preferences and targets) from a JSON file
        #[arg(long)]
        request: Option<String>,
        /// Daily calories (kcal)
        #[arg(long, required_unless_present = "request")]
        calories: Option<f64>,
        /// Daily protein (g)
        #[arg(long, required_unless_present = "request")]
        protein: Option<f64>,
        /// Daily carbohydrates (g)
        #[arg(long, required_unless_present = "request")]
        carbs: Option<f64>,
        /// Daily fat (g)
        #[arg(long, required_unless_present = "request")]
        fat: Option<f64>,
        /// Meals per day (1-5)
        #[arg(long)]
        meals_per_day: Option<u32>,
        /// Output language: en or ar
        #[arg(long)]
        language: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a workout plan for a user (needs a generator)
    GenerateWorkout {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Read the full request (preferences and day count) from a JSON file
        #[arg(long)]
        request: Option<String>,
        /// Number of training days (defaults to days per week)
        #[arg(long)]
        days: Option<u32>,
        /// Experience level: beginner, intermediate or advanced
        #[arg(long)]
        experience: Option<String>,
        /// Output language: en or ar
        #[arg(long)]
        language: Option<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the newest stored plan of a kind
    Latest {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Plan kind: meal or workout
        kind: PlanKind,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored versions of a kind, newest first
    History {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Plan kind: meal or workout
        kind: PlanKind,
    },
    /// Render the newest stored plan as a paginated document
    Render {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Plan kind: meal or workout
        kind: PlanKind,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
}

/// Execute the `fitplan init` command: write config file.
fn cmd_init(db_url: &str, generator_command: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let generator = match generator_command {
        Some(line) => Some(
            config::GeneratorSection::from_command_line(line)
                .context("--generator-command must not be empty")?,
        ),
        None => None,
    };

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        generator,
        catalog: None,
        policy: config::PolicySection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    match &cfg.generator {
        Some(g) => println!("  generator.command = {}", g.command),
        None => println!("  generator: none (meal plans use the built-in planner)"),
    }
    println!();
    println!("Next: run `fitplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `fitplan db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &FitplanConfig) -> anyhow::Result<()> {
    println!("Initializing fitplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let result = async {
        pool::run_migrations(&db_pool).await?;
        pool::table_counts(&db_pool).await
    }
    .await;
    db_pool.close().await;
    let counts = result?;

    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }
    println!("fitplan db-init complete.");
    Ok(())
}

/// Wire the store, catalog, policy and optional generator into a service.
fn build_service(resolved: &FitplanConfig, db_pool: &PgPool) -> anyhow::Result<PlanService> {
    let catalog = match &resolved.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => Catalog::builtin(),
    };

    let mut service = PlanService::new(PlanVersionStore::new(db_pool.clone()), Arc::new(catalog))
        .with_policy(resolved.policy.clone());
    if let Some(section) = &resolved.generator {
        tracing::info!(command = %section.command, "using external plan generator");
        service = service.with_generator(Arc::new(CommandGenerator::from_config(section)));
    }
    Ok(service)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            generator_command,
            force,
        } => {
            cmd_init(&db_url, generator_command.as_deref(), force)?;
        }
        Commands::DbInit => {
            let resolved =
                FitplanConfig::resolve(cli.database_url.as_deref(), cli.catalog.as_deref())?;
            cmd_db_init(&resolved).await?;
        }
        Commands::Plan { command } => {
            let resolved =
                FitplanConfig::resolve(cli.database_url.as_deref(), cli.catalog.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = match build_service(&resolved, &db_pool) {
                Ok(service) => plan_cmds::run_plan_command(command, &service).await,
                Err(e) => Err(e),
            };
            db_pool.close().await;
            result?;
        }
        Commands::Serve { bind, port } => {
            let resolved =
                FitplanConfig::resolve(cli.database_url.as_deref(), cli.catalog.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = match build_service(&resolved, &db_pool) {
                Ok(service) => serve_cmd::run_serve(Arc::new(service), &bind, port).await,
                Err(e) => Err(e),
            };
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
