//! Ticker and shared-handle tests on tokio's paused clock.

use std::time::Duration;

use clicker_core::command::Command;
use clicker_core::content::FARMER;
use clicker_core::test_utils::*;
use clicker_runtime::{SharedGame, Ticker};

#[tokio::test(start_paused = true)]
async fn ticker_runs_one_step_per_period() {
    let (engine, _) = classic_engine();
    let game = SharedGame::new(engine);
    let ticker = Ticker::spawn_at_config_rate(game.clone()).unwrap();

    tokio::time::sleep(Duration::from_millis(1_050)).await;
    let steps = ticker.shutdown().await.unwrap();

    assert_eq!(steps, 10);
    assert_eq!(game.with(|e| e.tick()).unwrap(), 10);
}

#[tokio::test(start_paused = true)]
async fn ticks_credit_production() {
    let (engine, _) = funded_classic_engine(50.0);
    let game = SharedGame::new(engine);
    assert!(game.execute(Command::UpgradeWorker(FARMER)).unwrap());

    let ticker = Ticker::spawn(game.clone(), Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    ticker.shutdown().await.unwrap();

    let currency = game.snapshot().unwrap().currency;
    assert!((currency - 2.6).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn immediate_shutdown_runs_nothing() {
    let (engine, _) = classic_engine();
    let game = SharedGame::new(engine);
    let ticker = Ticker::spawn(game.clone(), Duration::from_millis(100));

    assert_eq!(ticker.shutdown().await.unwrap(), 0);
    assert_eq!(game.with(|e| e.tick()).unwrap(), 0);
}

#[tokio::test]
async fn concurrent_clicks_are_serialized() {
    let (engine, _) = classic_engine();
    let game = SharedGame::new(engine);

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let game = game.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    game.execute(Command::Click).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(game.snapshot().unwrap().currency, 100.0);
    assert_eq!(game.snapshot().unwrap().mana, 50.0);
}
