//! ctxstore CLI - Inspect and edit a context record store

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use context_store::config::{self, StoreConfig};
use context_store::output::{emit_error, OutputMode};
use context_store::record::data_type;
use context_store::{ui, ContextRecordStore, Database};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "ctxstore")]
#[command(version)]
#[command(about = "Context record store - persist data scoped by context and type")]
#[command(long_about = r#"
ctxstore reads and edits the CONTEXT_DATA table of a context record store.
Records are opaque payloads scoped by a context id and a type discriminator.

Types may be given as numbers or as names:
  name, description, include, exclude, in_scope, include_tech, exclude_tech

Example usage:
  ctxstore add --context 1 --type include "https://example.com/.*"
  ctxstore list --context 1
  ctxstore set --context 1 --type exclude ".*logout.*" ".*\.png"
  ctxstore clear --context 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records, optionally narrowed to a context or a context and type
    List {
        /// Owning context id
        #[arg(long)]
        context: Option<i32>,

        /// Type discriminator (requires --context)
        #[arg(short = 't', long = "type", value_parser = parse_type, requires = "context")]
        data_type: Option<i32>,
    },

    /// Show a single record by id
    Get {
        /// Record id
        id: i64,
    },

    /// Insert a record
    Add {
        /// Owning context id
        #[arg(long)]
        context: i32,

        /// Type discriminator
        #[arg(short = 't', long = "type", value_parser = parse_type)]
        data_type: i32,

        /// Payload
        data: String,
    },

    /// Delete every record matching context, type and payload exactly
    Remove {
        /// Owning context id
        #[arg(long)]
        context: i32,

        /// Type discriminator
        #[arg(short = 't', long = "type", value_parser = parse_type)]
        data_type: i32,

        /// Payload
        data: String,
    },

    /// Delete all records of a context, or of one type within it
    Clear {
        /// Owning context id
        #[arg(long)]
        context: i32,

        /// Type discriminator
        #[arg(short = 't', long = "type", value_parser = parse_type)]
        data_type: Option<i32>,
    },

    /// Replace all records of a context and type with the given payloads
    Set {
        /// Owning context id
        #[arg(long)]
        context: i32,

        /// Type discriminator
        #[arg(short = 't', long = "type", value_parser = parse_type)]
        data_type: i32,

        /// Payloads, stored in the order given (none clears the scope)
        data: Vec<String>,
    },

    /// Write a config file pointing at the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

/// Accept a numeric discriminator or a well-known type name
fn parse_type(value: &str) -> Result<i32, String> {
    if let Ok(number) = value.parse::<i32>() {
        return Ok(number);
    }
    data_type::from_name(value).ok_or_else(|| format!("unknown type '{}'", value))
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::List { .. } => "list",
        Commands::Get { .. } => "get",
        Commands::Add { .. } => "add",
        Commands::Remove { .. } => "remove",
        Commands::Clear { .. } => "clear",
        Commands::Set { .. } => "set",
        Commands::Init { .. } => "init",
        Commands::Version => "version",
    }
}

/// Default log directive when `RUST_LOG` is unset
fn default_log_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// CLI flag, then config file, then `contexts.db` in the working directory.
///
/// The binary always persists to a file; an unset path only means in-memory
/// when `StoreConfig::database_config` is called by library users directly.
fn resolve_database_path(cli_override: Option<&Path>, store_config: &StoreConfig) -> PathBuf {
    cli_override
        .map(Path::to_path_buf)
        .or_else(|| store_config.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(config::default_database_path)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli.verbose)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = OutputMode::from_json_flag(cli.json);
    let name = command_name(&cli.command);

    match run(cli, output_mode) {
        Ok(()) => Ok(()),
        Err(e) if !output_mode.is_human() => {
            emit_error(name, &e)?;
            std::process::exit(1);
        }
        Err(e) => {
            ui::error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let store_config: StoreConfig = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database_path = resolve_database_path(cli.database.as_deref(), &store_config);

    match cli.command {
        Commands::Version => return commands::run_version(output_mode),
        Commands::Init { force } => {
            return commands::run_init(output_mode, &config_path, &database_path, force);
        }
        _ => {}
    }

    let store = Arc::new(ContextRecordStore::new());
    let mut database = Database::new(store_config.database_config(Some(&database_path)));
    let db_config = database.config();
    tracing::debug!(
        "Busy timeout {}ms, journal mode {}",
        db_config.busy_timeout_ms,
        db_config.journal_mode.pragma_value()
    );
    database.add_listener(store.clone());
    database.connect()?;

    let result = match cli.command {
        Commands::List { context, data_type } => {
            commands::run_list(&store, output_mode, context, data_type)
        }
        Commands::Get { id } => commands::run_get(&store, output_mode, id),
        Commands::Add { context, data_type, data } => {
            commands::run_add(&store, output_mode, context, data_type, &data)
        }
        Commands::Remove { context, data_type, data } => {
            commands::run_remove(&store, output_mode, context, data_type, &data)
        }
        Commands::Clear { context, data_type } => {
            commands::run_clear(&store, output_mode, context, data_type)
        }
        Commands::Set { context, data_type, data } => {
            commands::run_set(&store, output_mode, context, data_type, &data)
        }
        Commands::Init { .. } | Commands::Version => Ok(()),
    };

    database.disconnect();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_type_accepts_names_and_numbers() {
        assert_eq!(parse_type("include"), Ok(data_type::INCLUDE));
        assert_eq!(parse_type("42"), Ok(42));
        assert_eq!(parse_type("-1"), Ok(-1));
        assert!(parse_type("bogus").is_err());
    }

    #[test]
    fn test_list_type_requires_context() {
        assert!(Cli::try_parse_from(["ctxstore", "list", "--type", "include"]).is_err());
        assert!(Cli::try_parse_from(["ctxstore", "list", "--context", "1", "-t", "3"]).is_ok());
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(true), "debug");
        assert_eq!(default_log_level(false), "info");
    }

    #[test]
    fn test_database_path_precedence() {
        let configured = StoreConfig {
            database: Some("from-config.db".to_string()),
            ..StoreConfig::default()
        };

        assert_eq!(
            resolve_database_path(Some(Path::new("cli.db")), &configured),
            PathBuf::from("cli.db")
        );
        assert_eq!(resolve_database_path(None, &configured), PathBuf::from("from-config.db"));
        assert_eq!(
            resolve_database_path(None, &StoreConfig::default()),
            config::default_database_path()
        );
    }

    #[test]
    fn test_set_accepts_no_payloads() {
        let cli = Cli::try_parse_from(["ctxstore", "set", "--context", "2", "--type", "exclude"]).unwrap();
        match cli.command {
            Commands::Set { context, data_type, data } => {
                assert_eq!(context, 2);
                assert_eq!(data_type, data_type::EXCLUDE);
                assert!(data.is_empty());
            }
            _ => panic!("expected set"),
        }
    }
}
