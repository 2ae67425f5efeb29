//! Go Marketplace CLI - Inspect and edit a stored cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart stored in ./.go-marketplace
//! gm-cli show
//!
//! # Use another data directory
//! gm-cli --data-dir /tmp/cart add --id p1 --title Shirt --image-url u1 --price 10
//!
//! # Change quantities
//! gm-cli increment p1
//! gm-cli decrement p1
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart lines
//! - `add` - Add one unit of a product
//! - `increment` - Add one unit to a line already in the cart
//! - `decrement` - Remove one unit, dropping the line at zero

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use go_marketplace_core::{CartProduct, ProductId};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    /// Directory holding the stored cart (overrides `CART_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart lines
    Show,
    /// Add one unit of a product
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

        /// Unit price
        #[arg(long)]
        price: Decimal,
    },
    /// Add one unit to a line already in the cart
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit from a line, dropping it at zero
    Decrement {
        /// Product ID
        id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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

/// Print a configuration error to stderr.
#[allow(clippy::print_stderr)]
fn report_config_error(error: &go_marketplace_cart::ConfigError) {
    eprintln!("Invalid configuration: {error}");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e);
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so `show` output stays clean on stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cart=info,go_marketplace_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = cli.data_dir.unwrap_or(config.data_dir);
    let store = commands::cart::open(&data_dir, &config.cart).await?;

    match cli.command {
        Commands::Show => commands::cart::show(&store)?,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let product = CartProduct::new(id, title, image_url, price);
            commands::cart::add(&store, product).await?;
        }
        Commands::Increment { id } => {
            commands::cart::increment(&store, &ProductId::new(id)).await?;
        }
        Commands::Decrement { id } => {
            commands::cart::decrement(&store, &ProductId::new(id)).await?;
        }
    }
    Ok(())
}
