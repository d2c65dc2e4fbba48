use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use escapade_admin::{
    seed, Admin, AdminOptions, DatabaseError, MemoryDatabase, PgDatabase, SeedError,
    SharedDatabase, SEED_ADMIN_EMAIL,
};
use log::{error, info};
use thiserror::Error;
use tokio::runtime::{self, Runtime};

use crate::config::Config;

mod config;
mod logging;

/// Admin dashboard for escape room games
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Also show debug logs from escapade itself
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serves the dashboard and its API (the default)
    Serve,
    /// Replaces all data with an admin account and sample games
    Seed,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid value for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),

    #[error("Seeding failed: {0}")]
    Seed(#[from] SeedError),

    #[error("Server stopped: {0}")]
    Server(std::io::Error),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl CliError {
    fn hint(&self) -> String {
        match self {
            CliError::Config { .. } => "Check the environment variables and any .env file.".to_string(),
            CliError::Database(_) => "This is a database error. Make sure DATABASE_URL points to a running Postgres instance, then try again.".to_string(),
            CliError::Seed(_) => "Seeding goes through the same checks as regular requests, so the store itself is likely unavailable.".to_string(),
            CliError::Server(_) => "Make sure ESCAPADE_PORT is free.".to_string(),
            CliError::Fatal(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

struct Escapade {
    config: Config,
    admin: Admin,
    runtime: Runtime,
}

impl Escapade {
    fn new() -> Result<Self, CliError> {
        let config = Config::load()?;

        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("escapade-async")
            .build()
            .map_err(|e| CliError::Fatal(e.to_string()))?;

        let db: SharedDatabase = match &config.database_url {
            Some(url) => {
                info!("Connecting to database...");
                Arc::new(runtime.block_on(PgDatabase::new(url))?)
            }
            None => Arc::new(MemoryDatabase::new()),
        };

        let admin = Admin::new(
            db,
            AdminOptions {
                max_page_size: config.max_page_size,
                ..AdminOptions::new(config.session_secret.as_bytes())
            },
        );

        Ok(Self {
            config,
            admin,
            runtime,
        })
    }

    fn run(self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Serve => {
                let server_config = self.config.server();

                self.runtime
                    .block_on(escapade_server::run_server(self.admin, server_config))
                    .map_err(CliError::Server)
            }
            Command::Seed => {
                self.runtime.block_on(seed(&self.admin))?;

                info!("Seed completed successfully");
                info!("Sign in as {} with the default seed password", SEED_ADMIN_EMAIL);
                Ok(())
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(cli.verbose) {
        eprintln!("Could not initialize logging: {e}");
    }

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            error!("Could not read .env file: {}", e);
        }
    }

    let result =
        Escapade::new().and_then(|escapade| escapade.run(cli.command.unwrap_or(Command::Serve)));

    if let Err(error) = result {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "escapade failed!".bold().red()
        );
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
        std::process::exit(1);
    }
}
