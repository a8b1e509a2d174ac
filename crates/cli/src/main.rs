//! TAFE Shop CLI - the storefront from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and log in
//! tafe-shop register alice --password hunter2
//! tafe-shop login alice --password hunter2
//!
//! # Browse and fill the cart
//! tafe-shop catalog
//! tafe-shop cart add 1
//! tafe-shop cart show
//!
//! # Place the order and download the history
//! tafe-shop checkout
//! tafe-shop orders export
//! ```
//!
//! # Commands
//!
//! - `register`, `login`, `logout`, `whoami` - Accounts and session
//! - `guard` - Evaluate the protected-page guard
//! - `catalog` - List products and courses
//! - `cart` - Show and change the cart
//! - `checkout` - Place an order
//! - `orders` - List, show or export orders
//! - `clear-data` - Clear cart and order history

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tafe_shop_core::CatalogItemId;
use tafe_shop_storefront::catalog::Catalog;
use tafe_shop_storefront::config::StorefrontConfig;
use tafe_shop_storefront::state::AppState;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "tafe-shop")]
#[command(author, version, about = "TAFE Shop storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,

        /// Account password
        #[arg(short, long, env = "TAFE_SHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in, replacing any current session
    Login {
        username: String,

        /// Account password
        #[arg(short, long, env = "TAFE_SHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Render the login/logout link as HTML
        #[arg(long)]
        html: bool,
    },
    /// Evaluate the navigation guard for a page
    Guard {
        /// Page file name, e.g. `checkout.html`
        page: String,
    },
    /// List products and courses
    Catalog {
        /// Page to list the catalog as (`shopping.html` or `courses.html`)
        #[arg(long, default_value = "shopping.html")]
        page: String,

        /// Render as HTML
        #[arg(long)]
        html: bool,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order from the cart
    Checkout,
    /// List, show or export orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Clear the cart and order history
    ClearData {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and order summary
    Show {
        /// Render as HTML
        #[arg(long)]
        html: bool,
    },
    /// Add one unit of a product or course
    Add {
        id: CatalogItemId,

        /// Render the notification as HTML
        #[arg(long)]
        html: bool,
    },
    /// Set a line's quantity (below 1 removes it)
    Update { id: CatalogItemId, quantity: String },
    /// Remove a line
    Remove { id: CatalogItemId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show your latest order
    Latest {
        /// Render as HTML
        #[arg(long)]
        html: bool,
    },
    /// Write every order to `orders_<timestamp>.json`
    Export {
        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

impl Commands {
    /// Only catalog views and adding to the cart read the catalog.
    const fn needs_catalog(&self) -> bool {
        matches!(
            self,
            Self::Catalog { .. }
                | Self::Cart {
                    action: CartAction::Add { .. }
                }
        )
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

/// Map tracing levels to Sentry events and breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tafe_shop_storefront=info,tafe_shop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CliError::App(e.into())),
    };

    if let Err(e) = result {
        e.report();
        let _ = writeln!(io::stderr(), "{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let state = if cli.command.needs_catalog() {
        AppState::open(config).await?
    } else {
        AppState::with_file_stores(config, Catalog::empty())
    };
    state.initialize()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Register { username, password } => {
            commands::account::register(&state, &username, &SecretString::from(password), &mut out)?;
        }
        Commands::Login { username, password } => {
            commands::account::login(&state, &username, &SecretString::from(password), &mut out)?;
        }
        Commands::Logout => commands::account::logout(&state, &mut out)?,
        Commands::Whoami { html } => commands::account::whoami(&state, html, &mut out)?,
        Commands::Guard { page } => commands::account::guard(&state, &page, &mut out)?,
        Commands::Catalog { page, html } => {
            commands::catalog::show(&state, &page, html, &mut out)?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show { html } => commands::cart::show(&state, html, &mut out)?,
            CartAction::Add { id, html } => commands::cart::add(&state, id, html, &mut out)?,
            CartAction::Update { id, quantity } => {
                commands::cart::update(&state, id, &quantity, &mut out)?;
            }
            CartAction::Remove { id } => commands::cart::remove(&state, id, &mut out)?,
            CartAction::Clear => commands::cart::clear(&state, &mut out)?,
        },
        Commands::Checkout => commands::orders::checkout(&state, &mut out)?,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&state, &mut out)?,
            OrdersAction::Latest { html } => commands::orders::latest(&state, html, &mut out)?,
            OrdersAction::Export { output } => {
                commands::orders::export(&state, &output, &mut out)?;
            }
        },
        Commands::ClearData { yes } => {
            let stdin = io::stdin();
            commands::orders::clear_data(&state, yes, &mut stdin.lock(), &mut out)?;
        }
    }
    Ok(())
}
