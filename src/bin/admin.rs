//! CLI administration tool for tinylink.
//!
//! Creates and inspects short links, shows statistics, and performs
//! database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin admin -- link create https://example.com/long/path
//!
//! # Look up a code
//! cargo run --bin admin -- link show aB3xY9z
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `BASE_URL` (optional): prefix for printed short URLs
//! - `MONGO_URL`, `MONGO_DATABASE`, `MONGO_COLLECTION` (optional): click counts

use tinylink::application::services::{LinkService, ShortenPolicy};
use tinylink::domain::repositories::ClickRepository;
use tinylink::infrastructure::analytics::MongoClickRepository;
use tinylink::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

const STORE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// CLI tool for managing tinylink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// URL to shorten
        url: String,

        /// Prefix for the printed short URL (defaults to BASE_URL)
        #[arg(short, long)]
        base_url: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the URL stored for a code
    Show {
        /// Short code
        code: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn link_service(pool: &PgPool) -> LinkService<PgLinkRepository> {
    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    LinkService::new(repository, ShortenPolicy::default(), STORE_TIMEOUT)
}

/// Dispatches link commands.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let service = link_service(pool);

    match action {
        LinkAction::Create { url, base_url, yes } => {
            let base_url = base_url
                .or_else(|| std::env::var("BASE_URL").ok())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            create_link(&service, &url, &base_url, yes).await?;
        }
        LinkAction::Show { code } => show_link(&service, &code).await?,
    }

    Ok(())
}

/// Creates a short link after an optional confirmation.
///
/// The URL is stored verbatim. A warning is printed when it does not parse
/// as an absolute URL, but the link is still created.
async fn create_link(
    service: &LinkService<PgLinkRepository>,
    original_url: &str,
    base_url: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();
    println!("  URL: {}", original_url.cyan());

    if url::Url::parse(original_url).is_err() {
        println!(
            "{}",
            "  ⚠️  Not an absolute URL; it will be stored as given".yellow()
        );
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this link?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let shortened = service
        .shorten(original_url, base_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    println!();
    println!("  Code:      {}", shortened.link.short_code.bright_white());
    println!(
        "  Short URL: {}",
        shortened.short_url.bright_yellow().bold()
    );
    println!();

    Ok(())
}

/// Prints the stored record for a code.
async fn show_link(service: &LinkService<PgLinkRepository>, code: &str) -> Result<()> {
    let link = match service.get_link(code).await {
        Ok(link) => link,
        Err(tinylink::AppError::NotFound { .. }) => {
            println!("{} {}", "Not found:".yellow(), code);
            return Ok(());
        }
        Err(e) => anyhow::bail!("Lookup failed: {}", e),
    };

    println!("  ID:       {}", link.id.to_string().bright_black());
    println!("  Code:     {}", link.short_code.bright_white());
    println!("  URL:      {}", link.original_url.cyan());
    println!(
        "  Created:  {}",
        link.created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );

    if let Some(analytics) = connect_analytics().await {
        match analytics.count_by_code(code).await {
            Ok(clicks) => println!("  Clicks:   {}", clicks.to_string().bright_green()),
            Err(e) => println!("  Clicks:   {}", format!("unavailable ({})", e).red()),
        }
    }
    println!();

    Ok(())
}

/// Connects to MongoDB when `MONGO_URL` is set; prints and swallows failures.
async fn connect_analytics() -> Option<MongoClickRepository> {
    let mongo_url = std::env::var("MONGO_URL").ok()?;
    let database =
        std::env::var("MONGO_DATABASE").unwrap_or_else(|_| "url_shortener_analytics".to_string());
    let collection = std::env::var("MONGO_COLLECTION").unwrap_or_else(|_| "clicks".to_string());

    match MongoClickRepository::connect(&mongo_url, &database, &collection, STORE_TIMEOUT).await {
        Ok(repo) => Some(repo),
        Err(e) => {
            println!("{} {}", "⚠️  MongoDB unavailable:".yellow(), e);
            None
        }
    }
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Total number of recorded clicks (when MongoDB is configured)
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count = link_service(pool)
        .count_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count links: {}", e))?;

    println!(
        "  Links:  {}",
        links_count.to_string().bright_green().bold()
    );

    match connect_analytics().await {
        Some(analytics) => {
            let clicks = analytics
                .count_all()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to count clicks: {}", e))?;
            println!("  Clicks: {}", clicks.to_string().bright_green().bold());
        }
        None => println!("  Clicks: {}", "analytics disabled".bright_black()),
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
            )
            .fetch_one(pool)
            .await
            .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
