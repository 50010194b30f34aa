//! SalesDesk CLI - manage the product and customer catalog from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create the data directory, default account, and demo data
//! sd-cli init
//!
//! # Log in with the default account
//! sd-cli login -u waseem -p 12345
//!
//! # Browse and edit the catalog
//! sd-cli products list --search laptop --page 2
//! sd-cli customers add --name "Amy Pond" --email amy@example.com \
//!     --phone +15551234567 --company Globex --status Active
//! sd-cli products update <id> --stock 0 --status "Out of Stock"
//!
//! # Follow changes made by other processes
//! sd-cli watch
//! ```
//!
//! # Commands
//!
//! - `init`, `seed` - First-run setup and demo data
//! - `signup`, `login`, `logout`, `status` - Accounts and the login flag
//! - `products`, `customers` - Catalog CRUD (requires login)
//! - `dashboard` - Inventory and customer summary (requires login)
//! - `settings` - Profile, notification, and theme preferences (requires login)
//! - `watch` - Report slots changed by other processes

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salesdesk_admin::config::{AdminConfig, LogFormat};
use salesdesk_admin::state::AppState;

mod commands;

use commands::CommandError;
use commands::catalog::{CustomerAction, ProductAction};
use commands::settings::SettingsAction;

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "SalesDesk catalog and customer management")]
struct Cli {
    /// Data directory (overrides `SALESDESK_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default account and seed demo data into empty collections
    Init,
    /// Seed demo data into empty collections
    Seed,
    /// Register a new account
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show whether a user is logged in
    Status,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Show inventory and customer figures
    Dashboard {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// View or change preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Report slots changed by other processes
    Watch {
        /// Seconds between checks
        #[arg(long, default_value_t = 2)]
        interval: u64,
        /// Stop after this many checks
        #[arg(long)]
        checks: Option<u64>,
    },
}

fn main() {
    let mut config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let cli = Cli::parse();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = run(cli.command, config, &mut out);

    if let Err(e) = result {
        if e.is_user_error() {
            tracing::warn!("{e}");
        } else {
            tracing::error!("Command failed: {e}");
        }
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter` and either a JSON or text layer.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "salesdesk_admin=info,sd_cli=info".into());

    // Logs go to stderr so command output on stdout stays clean.
    let json_layer = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (format == LogFormat::Text)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn run(
    command: Commands,
    config: AdminConfig,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let state = AppState::open(config)?;
    match command {
        Commands::Init => commands::session::init(&state, out)?,
        Commands::Seed => commands::session::seed(&state, out)?,
        Commands::Signup { username, password } => {
            commands::session::signup(&state, &username, password, out)?;
        }
        Commands::Login { username, password } => {
            commands::session::login(&state, &username, password, out)?;
        }
        Commands::Logout => commands::session::logout(&state, out)?,
        Commands::Status => commands::session::status(&state, out)?,
        Commands::Products { action } => {
            state.require_auth()?;
            commands::catalog::products(&state, action, out)?;
        }
        Commands::Customers { action } => {
            state.require_auth()?;
            commands::catalog::customers(&state, action, out)?;
        }
        Commands::Dashboard { json } => {
            state.require_auth()?;
            commands::dashboard::show(&state, json, out)?;
        }
        Commands::Settings { action } => {
            state.require_auth()?;
            commands::settings::run(&state, action, out)?;
        }
        Commands::Watch { interval, checks } => {
            commands::watch::run(&state, interval, checks, out)?;
        }
    }
    Ok(())
}
