use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use configuration::{Config, GeneratorInference};
use core_types::{Row, Value};
use database::{PgBoundary, PgSession, connect};
use engine::{Dispatcher, Manifest, MethodSpec, Registries};
use procedures::declare_procedure;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// The main entry point for the Quarry dispatch tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, when there is one.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => configuration::load_config_from(&path.to_string_lossy()),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;
    if let Some(inference) = cli.generator_inference {
        config.dispatch.generator_inference = inference;
    }

    let _log_guard =
        configuration::init_tracing(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Call(args) => handle_call(args, &config).await,
        Commands::Check(args) => handle_check(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Dispatches declared queries and stored procedures against PostgreSQL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config.toml in the working directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides how query generators are found.
    #[arg(long, global = true, value_enum)]
    generator_inference: Option<GeneratorInference>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one declared method and print its result.
    Call(CallArgs),
    /// Validate every method of a manifest.
    Check(CheckArgs),
}

#[derive(Parser)]
struct CallArgs {
    /// The manifest declaring the method.
    #[arg(long, default_value = "methods.toml")]
    manifest: PathBuf,

    /// The method to call: `name`, `Type.name` or `Type::name`.
    #[arg(long)]
    method: String,

    /// An argument value, as `name=value`. May be repeated.
    #[arg(long = "arg", value_parser = parse_key_value)]
    args: Vec<(String, String)>,
}

#[derive(Parser)]
struct CheckArgs {
    #[arg(long, default_value = "methods.toml")]
    manifest: PathBuf,

    /// Also compile every stored procedure against the database.
    #[arg(long)]
    prepare: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Connects to the database and builds a dispatcher serving the manifest's
/// named queries.
async fn build_dispatcher(config: &Config, manifest: &Manifest) -> anyhow::Result<Dispatcher> {
    let pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    let session = PgSession::new(pool.clone()).with_named_queries(manifest.named_queries());

    let dispatcher = Dispatcher::builder(Arc::new(session))
        .config(config)
        .read_only_boundary(Arc::new(PgBoundary::read_only(pool.clone())))
        .boundary(Arc::new(PgBoundary::read_write(pool)))
        .build()?;
    Ok(dispatcher)
}

async fn handle_call(args: CallArgs, config: &Config) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let spec = manifest.method(&args.method)?;
    let dispatcher = build_dispatcher(config, &manifest).await?;

    let values: HashMap<String, String> = args.args.into_iter().collect();
    let method = spec.describe(dispatcher.registries(), &values)?;
    let result = dispatcher
        .dispatch(&method)
        .await
        .with_context(|| format!("{} failed", spec.qualified_name()))?;

    print_value(&result);
    Ok(())
}

async fn handle_check(args: CheckArgs, config: &Config) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    // Only preparing needs the database.
    let dispatcher = if args.prepare {
        Some(build_dispatcher(config, &manifest).await?)
    } else {
        None
    };
    let defaults = Registries::default();
    let registries = dispatcher.as_ref().map_or(&defaults, Dispatcher::registries);

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Method", "Kind", "Status"]);

    let mut failures = 0;
    for spec in &manifest.methods {
        let kind = if spec.is_procedure() { "procedure" } else { "query" };
        let status = check_method(spec, registries, dispatcher.as_ref()).await;
        let status = status.unwrap_or_else(|e| {
            failures += 1;
            e.to_string()
        });
        table.add_row(vec![spec.qualified_name(), kind.to_string(), status]);
    }
    println!("{table}");

    if failures > 0 {
        anyhow::bail!("{failures} of {} methods failed the check", manifest.methods.len());
    }
    tracing::info!(methods = manifest.methods.len(), "Manifest is valid");
    Ok(())
}

/// Describes a method and, for procedures, declares or prepares its call.
async fn check_method(
    spec: &MethodSpec,
    registries: &Registries,
    dispatcher: Option<&Dispatcher>,
) -> anyhow::Result<String> {
    let method = spec.describe(registries, &HashMap::new())?;
    if !spec.is_procedure() {
        return Ok("ok".to_string());
    }
    match dispatcher {
        Some(dispatcher) => {
            let compiled = dispatcher.procedure(&method).await?;
            Ok(format!("prepared: {}", compiled.statement()))
        }
        None => {
            let declaration = declare_procedure(&method)?;
            let order: Vec<String> = declaration
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.kind, p.name))
                .collect();
            Ok(format!("{}({})", declaration.name, order.join(", ")))
        }
    }
}

// ==============================================================================
// Output
// ==============================================================================

fn print_value(value: &Value) {
    match value {
        Value::Row(row) => println!("{}", rows_table(std::slice::from_ref(row))),
        Value::List(items) => {
            let rows: Vec<Row> = items
                .iter()
                .filter_map(|v| match v {
                    Value::Row(row) => Some(row.clone()),
                    _ => None,
                })
                .collect();
            if !rows.is_empty() && rows.len() == items.len() {
                println!("{}", rows_table(&rows));
                println!("{} rows", rows.len());
            } else {
                for item in items {
                    println!("{item}");
                }
            }
        }
        scalar => println!("{scalar}"),
    }
}

fn rows_table(rows: &[Row]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some(first) = rows.first() {
        table.set_header(first.columns().iter().map(|(name, _)| name.clone()));
    }
    for row in rows {
        table.add_row(row.columns().iter().map(|(_, value)| value.to_string()));
    }
    table
}
