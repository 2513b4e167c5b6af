//! table-gateway CLI - query and edit configured tables through their gateways.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use table_gateway::{
    Config, Criteria, GatewayCatalog, GatewayError, Record, TableDataGateway, Value,
};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "table-gateway")]
#[command(about = "Query and edit database tables through table data gateways")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured tables with their ID column and column types
    Tables,

    /// Print the record with the given ID
    Find {
        /// Table name
        table: String,

        /// Primary key value
        id: String,
    },

    /// Print every record in a table
    FindAll {
        /// Table name
        table: String,
    },

    /// Print records matching all col=value criteria
    Select {
        /// Table name
        table: String,

        /// Print only the first match (or null)
        #[arg(long)]
        one: bool,

        /// Criteria as col=value
        #[arg(required = true)]
        criteria: Vec<String>,
    },

    /// Insert a record and print its new ID
    Insert {
        /// Table name
        table: String,

        /// Column values as col=value
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Update records and print the number of rows affected
    Update {
        /// Table name
        table: String,

        /// Criterion as col=value (repeatable); defaults to the record's ID
        #[arg(long = "where", value_name = "COL=VALUE")]
        criteria: Vec<String>,

        /// Column values as col=value
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Delete the record with the given ID
    Delete {
        /// Table name
        table: String,

        /// Primary key value
        id: String,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), GatewayError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(GatewayError::Config)?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);
    let catalog = config.build_catalog()?;

    let output = match cli.command {
        Commands::Tables => list_tables(&catalog)?,
        Commands::Find { table, id } => {
            let gateway = catalog.get_table_gateway(&table)?;
            let id = parse_id(&gateway, &id)?;
            to_json(gateway.find(id)?)?
        }
        Commands::FindAll { table } => {
            let gateway = catalog.get_table_gateway(&table)?;
            to_json(gateway.find_all()?)?
        }
        Commands::Select {
            table,
            one,
            criteria,
        } => {
            let gateway = catalog.get_table_gateway(&table)?;
            let criteria = parse_assignments(&gateway, &criteria)?;
            if one {
                to_json(gateway.select_one(&criteria)?)?
            } else {
                to_json(gateway.select(&criteria)?)?
            }
        }
        Commands::Insert { table, values } => {
            let gateway = catalog.get_table_gateway(&table)?;
            let record = parse_assignments(&gateway, &values)?;
            to_json(gateway.insert(&record)?)?
        }
        Commands::Update {
            table,
            criteria,
            values,
        } => {
            let gateway = catalog.get_table_gateway(&table)?;
            let record = parse_assignments(&gateway, &values)?;
            let criteria: Criteria = parse_assignments(&gateway, &criteria)?;
            to_json(gateway.update(&record, &criteria)?)?
        }
        Commands::Delete { table, id } => {
            let gateway = catalog.get_table_gateway(&table)?;
            let id = parse_id(&gateway, &id)?;
            to_json(gateway.delete(id)?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn to_json<T: serde::Serialize>(value: T) -> Result<serde_json::Value, GatewayError> {
    Ok(serde_json::to_value(value)?)
}

fn list_tables(catalog: &GatewayCatalog) -> Result<serde_json::Value, GatewayError> {
    let mut tables = Vec::new();
    for name in catalog.tables() {
        let definition = catalog.definition(name)?;
        tables.push(json!({
            "name": name,
            "id_column": definition.id_column,
            "columns": to_json(&definition.types)?,
        }));
    }
    Ok(serde_json::Value::Array(tables))
}

/// Parse an ID argument with the ID column's declared type.
fn parse_id(gateway: &TableDataGateway, raw: &str) -> Result<Value, GatewayError> {
    gateway.column_type(gateway.id_column())?.parse_value(raw)
}

/// Parse `col=value` arguments. Values of declared columns are parsed with
/// the column type; undeclared columns are passed through as text.
fn parse_assignments(gateway: &TableDataGateway, args: &[String]) -> Result<Record, GatewayError> {
    let mut record = Record::new();
    for arg in args {
        let (column, raw) = arg.split_once('=').ok_or_else(|| {
            GatewayError::InvalidArgument(format!("expected col=value, got '{}'", arg))
        })?;

        let value = match gateway.column_types().get(column) {
            Some(column_type) => column_type.parse_value(raw)?,
            None => Value::Text(raw.to_string()),
        };
        debug!("Parsed {}={:?}", column, value);
        record.insert(column.to_string(), value);
    }
    Ok(record)
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().try_init().map_err(|e| e.to_string())
    } else {
        subscriber.try_init().map_err(|e| e.to_string())
    }
}
