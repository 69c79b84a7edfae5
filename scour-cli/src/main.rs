mod output;

use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use scour_core::config::{split_list, CliOverrides, ScourConfig};
use scour_core::error::ScourError;
use scour_core::Scour;

#[derive(Parser)]
#[command(
    name = "scour",
    about = "Inspect and clean database schemas across dialects",
    version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_HASH"), " ", env!("BUILD_TIME"), ")"
    ),
    propagate_version = true
)]
struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Database URL (overrides config)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Managed schemas, comma-separated (overrides config)
    #[arg(long, value_name = "SCHEMAS")]
    schemas: Option<String>,

    /// Database dialect: postgres (default: detected from the URL).
    /// db2i has no bundled driver and is only usable through the library
    /// with `Scour::with_executor`
    #[arg(long, value_name = "DIALECT")]
    dialect: Option<String>,

    /// Number of retries when connecting to the database
    #[arg(long, value_name = "N")]
    connect_retries: Option<u32>,

    /// SSL/TLS mode: disable, prefer, require
    #[arg(long, value_name = "MODE")]
    ssl_mode: Option<String>,

    /// Connection timeout in seconds (default: 30, 0 = no timeout)
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u32>,

    /// Statement timeout in seconds (default: 0 = no limit)
    #[arg(long, value_name = "SECS")]
    statement_timeout: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose/debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop all objects in managed schemas
    Clean {
        /// Required flag to actually run clean
        #[arg(long)]
        allow_clean: bool,
    },

    /// Drop managed schemas (cleans them where the dialect cannot drop a schema)
    Drop {
        /// Required flag to actually run drop
        #[arg(long)]
        allow_clean: bool,
    },

    /// Create managed schemas that do not exist
    Create,

    /// Show the objects each managed schema holds
    Info,

    /// Show or change the session's current schema
    CurrentSchema {
        /// Switch to this schema before printing
        #[arg(long, value_name = "SCHEMA")]
        set: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging (suppress when JSON output is requested)
    let filter = if cli.json {
        "error"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli).await {
        print_error(&e);
        process::exit(exit_code(&e));
    }
}

/// Map error types to differentiated exit codes.
fn exit_code(error: &ScourError) -> i32 {
    match error {
        ScourError::ConfigError(_) => 2,
        ScourError::CatalogQuery { .. } => 3,
        ScourError::DatabaseError(_) => 4,
        ScourError::Unsupported { .. } => 5,
        ScourError::ResourceLoad { .. } | ScourError::TemplateError { .. } => 6,
        ScourError::CleanDisabled => 7,
        _ => 1,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ScourError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ScourError::IoError(std::io::Error::other(e)))?;
    println!("{}", text);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), ScourError> {
    let json_output = cli.json;

    let overrides = CliOverrides {
        url: cli.url,
        dialect: cli.dialect,
        schemas: cli.schemas.as_deref().map(split_list),
        connect_retries: cli.connect_retries,
        ssl_mode: cli.ssl_mode,
        connect_timeout: cli.connect_timeout,
        statement_timeout: cli.statement_timeout,
    };

    // Load config
    let config = ScourConfig::load(cli.config.as_deref(), &overrides)?;

    let scour = Scour::new(config).await?;

    match cli.command {
        Commands::Clean { allow_clean } => {
            let reports = scour.clean(allow_clean).await?;
            if json_output {
                print_json(&reports)?;
            } else {
                output::print_clean_result(&reports);
            }
        }
        Commands::Drop { allow_clean } => {
            let reports = scour.drop_schemas(allow_clean).await?;
            if json_output {
                print_json(&reports)?;
            } else {
                output::print_drop_result(&reports);
            }
        }
        Commands::Create => {
            let created = scour.create().await?;
            if json_output {
                print_json(&created)?;
            } else {
                output::print_create_result(&created);
            }
        }
        Commands::Info => {
            let infos = scour.info().await?;
            if json_output {
                print_json(&infos)?;
            } else {
                output::print_info_table(&infos);
            }
        }
        Commands::CurrentSchema { set } => {
            if let Some(ref schema) = set {
                scour.set_current_schema(schema).await?;
            }
            let current = scour.current_schema().await?;
            if json_output {
                print_json(&serde_json::json!({ "current_schema": current }))?;
            } else {
                println!("{}", current);
            }
        }
    }

    Ok(())
}

fn print_error(error: &ScourError) {
    eprintln!("{} {}", "ERROR:".red().bold(), error);
    if let Some(hint) = hint(error) {
        eprintln!("{}", hint.dimmed());
    }
}

/// Actionable guidance for an error, if there is any.
fn hint(error: &ScourError) -> Option<&'static str> {
    match error {
        ScourError::ConfigError(_) => Some(
            "Hint: Check your scour.toml or set SCOUR_DATABASE_URL environment variable. \
             The CLI only connects to PostgreSQL.",
        ),
        ScourError::DatabaseError(_) => {
            Some("Hint: Verify database is running and connection details are correct.")
        }
        ScourError::CleanDisabled => {
            Some("Hint: Pass --allow-clean flag or set clean_enabled = true in scour.toml.")
        }
        ScourError::CatalogQuery { .. } => Some(
            "Hint: Objects dropped before the failure stay dropped. \
             Fix the cause and run the command again.",
        ),
        ScourError::Unsupported { .. } => {
            Some("Hint: The connected database does not offer this operation.")
        }
        _ => None,
    }
}
