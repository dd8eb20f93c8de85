//! CLI administration tool for urlai.
//!
//! Operates on the same link store as the server, without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List live links (expired ones are cleaned up first)
//! cargo run --bin admin -- list
//!
//! # Create a link, optionally with a custom code
//! cargo run --bin admin -- shorten example.com/page --code promo
//!
//! # Show where a code redirects
//! cargo run --bin admin -- resolve promo
//!
//! # Delete a link by id
//! cargo run --bin admin -- delete 5f0c6a1e-3b9e-4a53-9f59-2d1f0b6f1d2a
//!
//! # Delete every expired link
//! cargo run --bin admin -- cleanup
//!
//! # Add the widget to an HTML page
//! cargo run --bin admin -- inject landing.html
//!
//! # Check store and cache connectivity
//! cargo run --bin admin -- check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (`STORE_URL`, `STORE_API_KEY`, `REDIS_URL`,
//! `PUBLIC_BASE_URL`, ...). `inject` only needs `PUBLIC_BASE_URL`.

use urlai::application::services::LinkService;
use urlai::config::{Config, StoreBackend};
use urlai::error::AppError;
use urlai::server::build_state;
use urlai::utils::code_generator::sanitize_custom_code;
use urlai::utils::widget_injector::{inject_widget, injected_file_name};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI tool for managing urlai short links.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List live links, newest first
    List,

    /// Create a short link
    Shorten {
        /// URL to shorten (https:// is optional)
        url: String,

        /// Custom code (lowercased, letters, digits and dashes kept)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Show where a short code redirects
    Resolve {
        /// Short code
        code: String,
    },

    /// Delete a link by id
    Delete {
        /// Link id as shown by `list`
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Delete every expired link
    Cleanup,

    /// Write a copy of an HTML page with the widget script added
    Inject {
        /// HTML file to read
        file: PathBuf,

        /// Output path (default: `{stem}-with-urlai.html` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check store and cache connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Inject { file, output } => inject(&config, &file, output),
        command => run_store_command(command, &config).await,
    }
}

/// Runs a command that needs the link store.
async fn run_store_command(command: Commands, config: &Config) -> Result<()> {
    config.validate()?;

    if config.store_backend == StoreBackend::Memory {
        println!(
            "{}",
            "⚠️  STORE_BACKEND=memory: this process has its own empty store".yellow()
        );
        println!();
    }

    let state = build_state(config).await?;
    let service = state.link_service;

    match command {
        Commands::List => list_links(&service).await,
        Commands::Shorten { url, code } => shorten(&service, url, code).await,
        Commands::Resolve { code } => resolve(&service, &code).await,
        Commands::Delete { id, yes } => delete(&service, &id, yes).await,
        Commands::Cleanup => cleanup(&service).await,
        Commands::Check => check(&service, config).await,
        Commands::Inject { file, output } => inject(config, &file, output),
    }
}

/// Lists live links.
///
/// # Output Format
///
/// ```text
/// 📋 Links
///
///   Code         Expires      Target
///   ─────────────────────────────────────────────────────────────
///   promo        2025-02-01   https://example.com/page
///                id: 5f0c6a1e-3b9e-4a53-9f59-2d1f0b6f1d2a
/// ```
async fn list_links(service: &Arc<LinkService>) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let links = service
        .list_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        println!(
            "  Create one with: {} admin shorten <url>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<12} {:<12} {}",
        "Code".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<12} {:<12} {}",
            link.short_code.cyan(),
            link.expiry_date
                .format("%Y-%m-%d")
                .to_string()
                .bright_black(),
            link.original_url
        );
        println!("  {:<12} {}", "", format!("id: {}", link.id).bright_black());
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Creates a link, sanitizing the custom code like the web form does.
async fn shorten(service: &Arc<LinkService>, url: String, code: Option<String>) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    let custom_code = code.map(|c| sanitize_custom_code(&c));

    match service.create_short_link(&url, custom_code).await {
        Ok(link) => {
            println!("{}", "✅ Short link created".green().bold());
            println!();
            println!(
                "  Short URL: {}",
                service.short_url(&link.short_code).bright_yellow().bold()
            );
            println!("  Target:    {}", link.original_url.cyan());
            println!(
                "  Expires:   {}",
                link.expiry_date.format("%Y-%m-%d %H:%M UTC")
            );
            println!("  ID:        {}", link.id.bright_black());
            println!();
            Ok(())
        }
        Err(AppError::CodeTaken { code }) => {
            println!(
                "{}",
                format!("❌ Code \"{}\" is already taken", code).red()
            );
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create link: {}", e)),
    }
}

/// Resolves a code the same way the redirect route does.
async fn resolve(service: &Arc<LinkService>, code: &str) -> Result<()> {
    match service.resolve(code).await {
        Ok(url) => println!("  {} → {}", code.cyan(), url.bright_yellow()),
        Err(AppError::NotFound { .. }) => println!("{}", "❌ Short link not found".red()),
        Err(AppError::Expired { .. }) => {
            println!("{}", "⌛ Short link had expired and was deleted".yellow())
        }
        Err(e) => return Err(anyhow::anyhow!("Store error: {}", e)),
    }

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete(service: &Arc<LinkService>, id: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Short Link".bright_blue().bold());
    println!();
    println!("  ID: {}", id.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

async fn cleanup(service: &Arc<LinkService>) -> Result<()> {
    let deleted = service
        .cleanup_expired()
        .await
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {}", e))?;

    println!(
        "{} {} expired link(s) removed (cutoff {})",
        "🧹".bright_blue(),
        deleted.to_string().bright_white().bold(),
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );

    Ok(())
}

async fn check(service: &Arc<LinkService>, config: &Config) -> Result<()> {
    println!("{}", "🔍 Checking connectivity...".bright_blue());
    println!();

    let store_ok = match service.store_health().await {
        Ok(()) => {
            println!("  Store ({}): {}", config.store_backend, "OK".green().bold());
            true
        }
        Err(e) => {
            println!("  Store ({}): {} {}", config.store_backend, "FAILED".red().bold(), e);
            false
        }
    };

    match service.cache_health().await {
        ("disabled", _) => println!("  Cache: {}", "disabled".bright_black()),
        (backend, true) => println!("  Cache ({}): {}", backend, "OK".green().bold()),
        (backend, false) => println!("  Cache ({}): {}", backend, "FAILED".red().bold()),
    }

    println!();

    if !store_ok {
        anyhow::bail!("Link store is not reachable");
    }

    Ok(())
}

/// Writes the widget-injected copy of `file`.
fn inject(config: &Config, file: &Path, output: Option<PathBuf>) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let injected = inject_widget(&html, &config.public_base_url);

    let output = output.unwrap_or_else(|| {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        file.with_file_name(injected_file_name(&name))
    });

    std::fs::write(&output, &injected)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if injected == html {
        println!(
            "{}",
            "⚠️  The page already loads the widget, copied unchanged".yellow()
        );
    } else {
        println!("{}", "✅ Widget injected".green().bold());
    }
    println!("  Output: {}", output.display().to_string().cyan());

    Ok(())
}
