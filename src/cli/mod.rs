//! CLI command definitions for todo-server.
//!
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::Config;

/// To-do list server with a browser page and JSON API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database schema. Run once before first use.
    InitDb,

    /// Start the HTTP server (default if no subcommand given)
    Serve(ServeArgs),
}

/// Arguments for the serve command.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Apply command-line overrides, the highest configuration tier.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(db_path) = &self.database {
            config.server.db_path = db_path.clone();
        }
        if let Some(Command::Serve(args)) = &self.command {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["todo-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn serve_flags_override_config() {
        let cli = Cli::try_parse_from([
            "todo-server",
            "--database",
            "other.db",
            "serve",
            "--port",
            "8081",
            "--host",
            "0.0.0.0",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.server.db_path, PathBuf::from("other.db"));
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
    }

    #[test]
    fn init_db_accepts_global_database_flag() {
        let cli = Cli::try_parse_from(["todo-server", "init-db", "-d", "x.db"]).unwrap();
        assert!(matches!(cli.command, Some(Command::InitDb)));
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
    }
}
