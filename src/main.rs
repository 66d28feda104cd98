//! Battery rental back office server.
//!
//! ```sh
//! # Run with default config (~/.config/battery-rental/config.toml)
//! battery-rental
//!
//! # Custom config path and port
//! battery-rental --config /etc/battery-rental/config.toml serve --port 9000
//!
//! # Validate config without starting
//! battery-rental check
//!
//! # Mint an operator token
//! battery-rental token --subject front-desk --role staff
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use battery_rental::config::{default_config_path, AppConfig};
use battery_rental::domain::Role;
use battery_rental::infrastructure::crypto::create_token;
use battery_rental::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "battery-rental",
    version,
    about = "Back office for renting out batteries",
    long_about = "REST API for battery inventory, customers, rentals, payments \
                  and customer credit ratings.\n\n\
                  Default config: ~/.config/battery-rental/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, env = "BATTERY_RENTAL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve {
        /// Override the listen port.
        #[arg(long)]
        port: Option<u16>,

        /// Override the log level (trace, debug, info, warn, error).
        #[arg(short, long)]
        log_level: Option<String>,

        /// Skip database migrations on startup.
        #[arg(long)]
        no_migrate: bool,
    },
    /// Validate the configuration and exit.
    Check,
    /// Print a signed bearer token.
    Token {
        /// Token subject, e.g. an operator name.
        #[arg(long)]
        subject: String,

        /// admin or staff.
        #[arg(long, default_value = "staff")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let command = cli.command.unwrap_or(Command::Serve {
        port: None,
        log_level: None,
        no_migrate: false,
    });

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    match command {
        Command::Check => {
            println!("Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   Address     : {}", config.server.address());
            println!("   Database    : {}", config.database.url);
            println!("   Log level   : {}", config.logging.level);
            println!("   Rental days : {}", config.rental.standard_period_days);
            Ok(())
        }
        Command::Token { subject, role } => {
            let role = Role::from_str(&role)
                .ok_or_else(|| format!("unknown role '{}', expected admin or staff", role))?;
            let token = create_token(&subject, role, &config.security.jwt_config())?;
            println!("{}", token);
            Ok(())
        }
        Command::Serve {
            port,
            log_level,
            no_migrate,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(level) = log_level {
                config.logging.level = level;
            }

            init_tracing(&config);
            info!("Configuration loaded from {}", config_path.display());

            let handle = match ServerHandle::start(ServerOptions {
                config,
                auto_migrate: !no_migrate,
            })
            .await
            {
                Ok(handle) => handle,
                Err(e) => {
                    error!("Failed to start: {}", e);
                    return Err(e);
                }
            };

            handle.install_signal_handler();
            info!("Press Ctrl+C to shut down gracefully");

            handle.shutdown_signal().wait().await;
            handle.wait().await;
            Ok(())
        }
    }
}
