use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use memocalc::{AppConfig, Operation};

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Memoizing arithmetic service", long_about = None)]
struct Cli {
    /// Config file (default: ~/.memocalc/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Results database file (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default: 8080)
        #[arg(long)]
        port: Option<u16>,

        /// Serve on a Unix domain socket instead of TCP
        #[arg(long, conflicts_with_all = ["host", "port"])]
        socket: Option<PathBuf>,
    },

    /// Compute a result (reused if it was computed before)
    Compute {
        /// ADDITION, SUBTRACTION, MULTIPLICATION or DIVISION
        operation: Operation,

        /// Numbers to fold, left to right
        #[arg(allow_negative_numbers = true)]
        numbers: Vec<f64>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Look up a stored result without computing
    Lookup {
        /// Stored result id
        #[arg(long, conflicts_with_all = ["operation", "numbers"])]
        id: Option<i64>,

        /// Operation the result was computed with
        #[arg(required_unless_present = "id")]
        operation: Option<Operation>,

        /// Numbers the result was computed from
        #[arg(allow_negative_numbers = true)]
        numbers: Vec<f64>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    init_logging(&config.log_level);

    match cli.command {
        Commands::Serve { host, port, socket } => {
            let options = commands::serve::ServeOptions::from_config(&config, host, port, socket);
            commands::serve::execute(options)?;
        }
        Commands::Compute {
            operation,
            numbers,
            json,
        } => {
            commands::compute::execute(&config, operation, &numbers, json)?;
        }
        Commands::Lookup {
            id,
            operation,
            numbers,
            json,
        } => {
            let target = match (id, operation) {
                (Some(id), _) => commands::lookup::LookupTarget::Id(id),
                (None, Some(operation)) => commands::lookup::LookupTarget::Inputs(operation, numbers),
                (None, None) => anyhow::bail!("Either --id or an operation is required"),
            };
            commands::lookup::execute(&config, target, json)?;
        }
    }

    Ok(())
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
    fn test_parse_compute_with_negative_numbers() {
        let cli = Cli::try_parse_from(["memocalc", "compute", "subtraction", "5", "-2.5"]).unwrap();
        match cli.command {
            Commands::Compute {
                operation, numbers, ..
            } => {
                assert_eq!(operation, Operation::Subtraction);
                assert_eq!(numbers, vec![5.0, -2.5]);
            }
            _ => panic!("expected compute"),
        }
    }

    #[test]
    fn test_lookup_requires_id_or_operation() {
        assert!(Cli::try_parse_from(["memocalc", "lookup"]).is_err());
        assert!(Cli::try_parse_from(["memocalc", "lookup", "--id", "3"]).is_ok());
        assert!(Cli::try_parse_from(["memocalc", "lookup", "--id", "3", "ADDITION"]).is_err());
    }

    #[test]
    fn test_serve_socket_conflicts_with_port() {
        assert!(
            Cli::try_parse_from(["memocalc", "serve", "--socket", "/tmp/m.sock", "--port", "1"])
                .is_err()
        );
    }
}
