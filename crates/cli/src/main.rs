//! Go Marketplace CLI - inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cli show
//!
//! # Add a product (or one more unit of it)
//! gm-cli add --id p1 --title "Shirt" --image-url https://img.example/p1.png --price 10
//!
//! # Change quantities
//! gm-cli increment p1
//! gm-cli decrement p1
//!
//! # Create the storage table (postgres feature)
//! gm-cli migrate
//! ```
//!
//! # Commands
//!
//! - `show` - Print cart lines and totals
//! - `add` - Add one unit of a product
//! - `increment` / `decrement` - Change a line's quantity
//! - `migrate` - Run storage migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use go_marketplace_cart::{CART, CartConfig};
use go_marketplace_core::{NewCartItem, Price, ProductId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product to the cart
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(long)]
        price: Price,
    },
    /// Increase a product's quantity by one
    Increment {
        /// Product ID
        id: String,
    },
    /// Decrease a product's quantity by one (never below 1)
    Decrement {
        /// Product ID
        id: String,
    },
    /// Run storage migrations (postgres backend)
    Migrate,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json_logs: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gm_cli=info,go_marketplace_cart=info".into());

    let (plain, json) = if json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(plain)
        .with(json)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (needed for Sentry init)
    let config = CartConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    init_tracing(cli.json_logs);

    let result = match config {
        Ok(config) => run(cli.command, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(command: Commands, config: &CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Migrations must be able to run before the cart's storage is usable
    if matches!(command, Commands::Migrate) {
        commands::migrate::run(config).await?;
        return Ok(());
    }

    // A cart that failed to load is still installed empty; the next write repairs storage
    if let Err(e) = CART.init(config).await {
        if !CART.is_initialized() {
            return Err(e.into());
        }
        tracing::warn!("Stored cart could not be loaded, starting empty: {e}");
    }

    match command {
        Commands::Show => commands::cart::show()?,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let item = NewCartItem {
                id: ProductId::new(id),
                title,
                image_url,
                price,
            };
            commands::cart::add(item).await?;
        }
        Commands::Increment { id } => commands::cart::increment(&ProductId::new(id)).await?,
        Commands::Decrement { id } => commands::cart::decrement(&ProductId::new(id)).await?,
        Commands::Migrate => {}
    }
    Ok(())
}
