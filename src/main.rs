use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vendorlist::config::Config;
use vendorlist::vendorlist::{
    ChannelListener, Endpoint, HttpFetcher, VendorListEvent, VendorListManager,
};

#[derive(Parser)]
#[command(
    name = "vendorlist",
    version,
    about = "Vendor list refresh scheduler",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the vendor list refreshed until interrupted
    Watch {
        /// Download immediately even if a recent list is known
        #[arg(long, default_value = "false")]
        force: bool,

        /// Print scheduler status every N seconds (0 disables)
        #[arg(long, default_value = "0")]
        status_every: u64,
    },

    /// Download one vendor list version and print it
    Get {
        /// Vendor list version
        #[arg(short = 'n', long)]
        list_version: i64,

        /// Print the raw primary document instead of the merged one
        #[arg(long, default_value = "false")]
        raw: bool,
    },

    /// Show the endpoints the current configuration resolves to
    Endpoints,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => {
            let config = Config::from_env()?;
            config.validate()?;
            config
        }
    };

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("vendorlist starting");

    match cli.command {
        Commands::Watch {
            force,
            status_every,
        } => {
            tracing::info!(force = %force, status_every = %status_every, "Starting watch command");
            watch(&config, force, status_every).await?;
        }

        Commands::Get { list_version, raw } => {
            tracing::info!(version = %list_version, raw = %raw, "Starting get command");
            get(&config, list_version, raw).await?;
        }

        Commands::Endpoints => endpoints(&config)?,
    }

    tracing::info!("vendorlist completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("vendorlist=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("vendorlist={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn build_fetcher(config: &Config) -> Result<HttpFetcher> {
    HttpFetcher::with_config(config.request_timeout(), &config.http.user_agent)
        .context("Failed to create HTTP client")
}

async fn watch(config: &Config, force: bool, status_every: u64) -> Result<()> {
    let (listener, mut events) = ChannelListener::new();
    let manager = VendorListManager::new(
        config.refresh_config()?,
        Arc::new(build_fetcher(config)?),
        Arc::new(listener),
    )?;

    manager.start_automatic_refresh(force);

    let mut status_ticker = tokio::time::interval(Duration::from_secs(status_every.max(1)));

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(VendorListEvent::Updated(list)) => {
                    println!(
                        "Vendor list updated: version {} ({})",
                        list.version().map_or_else(|| "unknown".to_string(), |v| v.to_string()),
                        if list.is_localized() { "localized" } else { "primary only" },
                    );
                }
                Some(VendorListEvent::Failed(err)) => {
                    eprintln!("Vendor list refresh failed [{}]: {err}", err.category().label());
                }
                None => break,
            },
            _ = status_ticker.tick(), if status_every > 0 => {
                print!("{}", manager.status().display());
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping automatic refresh");
                break;
            }
        }
    }

    manager.stop_automatic_refresh();
    Ok(())
}

async fn get(config: &Config, version: i64, raw: bool) -> Result<()> {
    let (listener, _events) = ChannelListener::new();
    let manager = VendorListManager::new(
        config.refresh_config()?,
        Arc::new(build_fetcher(config)?),
        Arc::new(listener),
    )?;

    let list = manager
        .fetch_vendor_list(version)
        .await
        .with_context(|| format!("Failed to download vendor list version {version}"))?;

    let document = if raw {
        list.primary().clone()
    } else {
        list.merged()
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn endpoints(config: &Config) -> Result<()> {
    let refresh = config.refresh_config()?;
    let endpoint = Endpoint::resolve(
        refresh.version,
        refresh.language.as_ref(),
        refresh.override_url.as_ref(),
    )?;

    println!("Primary:   {}", endpoint.primary());
    println!(
        "Localized: {}",
        endpoint.localized().unwrap_or("(no language configured)")
    );
    Ok(())
}
