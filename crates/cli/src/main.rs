//! Folio CLI - Store bootstrap and local state tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the first administrator (password from FOLIO_ADMIN_PASSWORD or stdin)
//! folio admin bootstrap -u admin
//!
//! # Check the store API and both session probes
//! folio status
//!
//! # Inspect or empty the persisted cart
//! folio cart show
//! folio cart clear
//! ```
//!
//! # Commands
//!
//! - `admin bootstrap` - Create the first administrator account
//! - `status` - Probe the store API
//! - `cart` - Inspect the cart the storefront persists in `FOLIO_DATA_DIR`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Folio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage administrators
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Check the store API and the customer and admin sessions
    Status,
    /// Inspect the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create the first administrator (only works on an empty store)
    Bootstrap {
        /// Administrator username
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and totals
    Show,
    /// Remove every line from the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "folio_cli=info,folio_storefront=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let config = commands::load_config()?;

    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Bootstrap { username } => {
                let password = commands::admin::read_password()?;
                commands::admin::bootstrap(&config, &username, password).await?;
            }
        },
        Commands::Status => commands::status::run(&config).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&config),
            CartAction::Clear => commands::cart::clear(&config)?,
        },
    }
    Ok(())
}
