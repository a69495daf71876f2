//! Candlefeed client
//!
//! Talks to the pattern backend (mock or real): lists picks, fetches a stock
//! snapshot or pattern history, and follows a live candle feed.
//!
//! # Environment Variables
//! - `PATTERN_API_URL` - REST base URL (default: http://localhost:8002)
//! - `WS_URL` - Live feed base URL (default: ws://localhost:8003)

use anyhow::{Context, Result};
use candlefeed::application::chart_state::ChartState;
use candlefeed::config::ClientConfig;
use candlefeed::domain::market::{FeedEvent, Timeframe};
use candlefeed::infrastructure::ApiClient;
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Synthetic candle feed client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the top stock picks
    Picks {
        /// Number of picks to request
        #[arg(short, long, default_value = "5")]
        count: usize,
    },
    /// Show the snapshot for one symbol
    Stock {
        /// Upper-case ticker, e.g. AAPL
        symbol: String,
    },
    /// Fetch recent pattern detections for a symbol
    Patterns {
        symbol: String,

        /// Timeframe (1m, 5m, 15m, 1h, 4h, 1d)
        #[arg(short, long, default_value = "1d")]
        timeframe: Timeframe,

        /// Lookback in days
        #[arg(short, long, default_value = "7")]
        days: u32,
    },
    /// Follow the live candle feed and print chart statistics
    Watch {
        symbol: String,

        /// Timeframe (1m, 5m, 15m, 1h, 4h, 1d)
        #[arg(short, long, default_value = "1m")]
        timeframe: Timeframe,

        /// Stop after this many candle updates (runs until Ctrl+C when omitted)
        #[arg(short, long)]
        updates: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let client = ApiClient::from_config(&config);

    match cli.command {
        Commands::Picks { count } => {
            let picks = client.get_top_picks(count).await?;
            println!("{:<6} {:<24} {:>10} {:>8} {:>12}", "SYMBOL", "NAME", "PRICE", "CHANGE", "VOLUME");
            for pick in picks {
                println!(
                    "{:<6} {:<24} {:>10.2} {:>8.2} {:>12}",
                    pick.symbol, pick.name, pick.price, pick.change, pick.volume
                );
            }
        }
        Commands::Stock { symbol } => {
            let stock = client.get_stock_details(&symbol).await?;
            println!("{} ({})", stock.name, stock.symbol);
            println!("  Price:      {:.2}", stock.price);
            println!("  Change:     {:.2} ({:.2}%)", stock.change, stock.change_percent);
            println!("  Volume:     {}", stock.volume);
            println!("  Market cap: {}", stock.market_cap);
        }
        Commands::Patterns {
            symbol,
            timeframe,
            days,
        } => {
            let patterns = client.get_patterns(&symbol, timeframe, days).await?;
            println!("Patterns for {} ({}, last {} days)", symbol, timeframe, days);
            for p in patterns {
                println!(
                    "  {}  {:<18} {:<8} confidence={:.2} strength={}",
                    p.timestamp.format("%Y-%m-%d %H:%M"),
                    p.pattern_type,
                    p.direction,
                    p.confidence,
                    p.strength
                );
            }
        }
        Commands::Watch {
            symbol,
            timeframe,
            updates,
        } => watch(&client, &symbol, timeframe, updates).await?,
    }

    Ok(())
}

async fn watch(
    client: &ApiClient,
    symbol: &str,
    timeframe: Timeframe,
    max_updates: Option<usize>,
) -> Result<()> {
    let mut chart = ChartState::new(symbol, timeframe);
    let mut stream = client
        .connect_live(symbol, timeframe)
        .await
        .context("Failed to open live feed")?;
    chart.set_connected(true);
    info!("Watching {} ({})", symbol, timeframe);

    let mut received = 0usize;
    loop {
        let event = tokio::select! {
            event = stream.next_event() => event?,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(event) = event else {
            warn!("Live feed closed by server");
            break;
        };

        match &event {
            FeedEvent::Historical(candles) => {
                println!("Loaded {} historical candles", candles.len());
            }
            FeedEvent::CandleUpdate(candle) => {
                received += 1;
                println!(
                    "{}  O {:.2}  H {:.2}  L {:.2}  C {:.2}  V {}",
                    candle.timestamp.format("%H:%M:%S"),
                    candle.open,
                    candle.high,
                    candle.low,
                    candle.close,
                    candle.volume
                );
            }
            FeedEvent::PatternDetected(p) => {
                println!(
                    "  pattern: {} ({}, confidence {:.2})",
                    p.pattern_type, p.direction, p.confidence
                );
            }
            FeedEvent::Heartbeat => {}
        }
        chart.apply(event);

        if max_updates.is_some_and(|max| received >= max) {
            break;
        }
    }

    chart.set_connected(false);
    if let Err(e) = stream.close().await {
        warn!("Failed to close live feed cleanly: {}", e);
    }

    let change = chart.price_change();
    println!(
        "{} last {:.2}  change {:.2} ({:.2}%)",
        chart.selected_symbol(),
        chart.current_price(),
        change.change,
        change.change_percent
    );
    if let Some(stats) = chart.candle_stats() {
        println!(
            "  high {:.2}  low {:.2}  avg volume {:.0}  volatility {:.2}%",
            stats.high, stats.low, stats.avg_volume, stats.volatility
        );
    }

    Ok(())
}
