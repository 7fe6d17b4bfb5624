//! Headless clicker session: loads a game directory, runs the ticker for a
//! while with a scripted player, and reports the final state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clicker_core::clock::SystemClock;
use clicker_core::command::Command;
use clicker_core::engine::Engine;
use clicker_data::{classic_data_dir, load_game_data};
use clicker_runtime::{RuntimeError, SharedGame, Ticker};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clicker-headless", about = "Run a clicker game without a UI")]
struct Args {
    /// Game data directory. Defaults to the bundled classic game.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Wall-clock seconds to run.
    #[arg(long, default_value_t = 10)]
    seconds: u64,

    /// Manual clicks per second issued by the scripted player.
    #[arg(long, default_value_t = 5)]
    clicks_per_second: u32,

    /// Buy the cheapest affordable worker once per second.
    #[arg(long)]
    auto_buy: bool,

    /// Print the final snapshot as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Upgrade the cheapest visible worker the ledger can pay for.
fn buy_cheapest(engine: &mut Engine) -> bool {
    let state = engine.snapshot();
    let cheapest = state
        .workers
        .iter()
        .filter(|w| w.visible && w.can_buy)
        .min_by(|a, b| a.price.total_cmp(&b.price))
        .map(|w| w.id);
    cheapest.is_some_and(|id| engine.execute(Command::UpgradeWorker(id)))
}

#[tokio::main]
async fn main() -> Result<(), RuntimeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let dir = args.data.unwrap_or_else(classic_data_dir);
    let engine = load_game_data(&dir)?.into_engine(Arc::new(SystemClock::new()))?;
    let game = SharedGame::new(engine);
    let ticker = Ticker::spawn_at_config_rate(game.clone())?;

    let mut second = tokio::time::interval(Duration::from_secs(1));
    second.tick().await;
    let click_gap = Duration::from_secs(1) / args.clicks_per_second.max(1);
    for elapsed in 1..=args.seconds {
        for _ in 0..args.clicks_per_second {
            game.execute(Command::Click)?;
            tokio::time::sleep(click_gap).await;
        }
        second.tick().await;
        if args.auto_buy {
            game.with(buy_cheapest)?;
        }
        let state = game.snapshot()?;
        tracing::info!(
            target: "clicker.runtime",
            elapsed,
            currency = state.currency,
            production = state.production_per_second,
            owned = state.owned_workers.len(),
            "progress"
        );
    }

    let steps = ticker.shutdown().await?;
    let events = game.drain_events()?;
    let state = game.snapshot()?;
    tracing::info!(
        target: "clicker.runtime",
        steps,
        events = events.len(),
        currency = state.currency,
        "session finished"
    );
    if args.json {
        match serde_json::to_string_pretty(&state) {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::error!(target: "clicker.runtime", %err, "snapshot not serializable"),
        }
    }
    Ok(())
}
