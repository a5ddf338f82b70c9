//! Shoe POS CLI - point-of-sale front end for the shoe inventory API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog, optionally filtered
//! pos catalog --search glide --brand 3
//!
//! # List brands, categories and demographics for filtering
//! pos filters
//!
//! # Work the cart (lines are numbered from 1)
//! pos cart add 5 2
//! pos cart update 1 3
//! pos cart remove 1
//! pos cart show
//!
//! # Sell the cart
//! pos checkout --customer "Ana Cruz" --cash 300
//! ```
//!
//! # Environment Variables
//!
//! - `POS_API_BASE_URL` - Base URL of the inventory/sales service (required)
//! - `POS_CASHIER_ID` - User id recorded on sales (required)
//! - `POS_SESSION_COOKIE` - Session cookie forwarded to the API
//! - `POS_DATA_DIR` - Directory holding the persisted cart (default `.pos`)
//! - `POS_LOG_FORMAT` - `text` or `json`
//! - `SENTRY_DSN` - Enables error reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use shoe_pos::PosError;
use shoe_pos::config::{LogFormat, PosConfig};
use shoe_pos::error::set_sentry_cashier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pos")]
#[command(author, version, about = "Shoe store point of sale")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the product grid
    Catalog {
        /// Match shoe or brand name
        #[arg(short, long)]
        search: Option<String>,

        /// Brand id (any of)
        #[arg(short, long = "brand")]
        brands: Vec<i32>,

        /// Category id (all of)
        #[arg(short, long = "category")]
        categories: Vec<i32>,

        /// Demographic id (all of)
        #[arg(short, long = "demographic")]
        demographics: Vec<i32>,
    },
    /// List filter options
    Filters,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Record the sale and clear the cart
    Checkout {
        /// Customer name
        #[arg(short = 'n', long)]
        customer: String,

        /// Cash received
        #[arg(short, long)]
        cash: Decimal,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart panel
    Show,
    /// Add a variant to the cart
    Add {
        /// Variant id
        variant_id: i32,

        /// Units to add
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Line number as shown by `cart show`
        line: usize,
    },
    /// Set a line's quantity (zero or less removes it)
    Update {
        /// Line number as shown by `cart show`
        line: usize,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Drop lines whose variant is no longer in the catalog
    Purge,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &PosConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(format: LogFormat) {
    // Logs go to stderr; stdout carries the rendered panels
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shoe_pos=info,pos_cli=info".into());

    let text = (format == LogFormat::Text)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json = (format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text)
        .with(json)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match PosConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);
    set_sentry_cashier(&config.cashier_id);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: PosConfig) -> Result<(), PosError> {
    let session = commands::Session::new(config)?;

    match cli.command {
        Commands::Catalog {
            search,
            brands,
            categories,
            demographics,
        } => {
            let filter = commands::catalog::build_filter(search, &brands, &categories, &demographics);
            commands::catalog::show(&session, &filter).await?;
        }
        Commands::Filters => commands::catalog::filters(&session).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session).await?,
            CartAction::Add {
                variant_id,
                quantity,
            } => commands::cart::add(&session, variant_id, quantity).await?,
            CartAction::Remove { line } => commands::cart::remove(&session, line).await?,
            CartAction::Update { line, quantity } => {
                commands::cart::update(&session, line, quantity).await?;
            }
            CartAction::Purge => commands::cart::purge(&session).await?,
        },
        Commands::Checkout { customer, cash } => {
            commands::checkout::run(&session, &customer, cash).await?;
        }
    }
    Ok(())
}
