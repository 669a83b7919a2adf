use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use street_guess_core::catalog::{PanoramaCatalog, StaticPanoramaCatalog};
use street_guess_core::presenter::{format_countdown, Presenter};
use street_guess_core::provider::{
    CatalogProvider, JsonFileLocationStore, LocationStore, MemoryLocationStore,
};
use street_guess_core::{
    Coordinate, GameConfig, Generation, Round, RoundController, RoundStatus,
};

mod renderer;
mod synthetic;

use renderer::LogRenderer;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GuessMode {
    /// Pin the center of the play area
    Center,
    /// Pin a uniformly random point in the play area
    Random,
    /// Never guess; let the countdown run out
    None,
}

#[derive(Parser, Debug)]
#[command(
    name = "round-sim",
    author,
    version,
    about = "Play street-guess rounds headlessly",
    long_about = "Runs the round engine against a panorama catalog without any map UI. \
                  Map drawing commands are written to the log.\n\n\
                  Without --catalog, a synthetic grid of stations and panoramas covering \
                  the play area is generated."
)]
struct Args {
    /// Game configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GeoJSON panorama/station bundle
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Spacing of the synthetic catalog grid, in degrees
    #[arg(long, default_value = "0.004")]
    grid_step: f64,

    /// Number of rounds to play
    #[arg(short, long, default_value = "3")]
    rounds: u32,

    /// Where to put the guess pin
    #[arg(short, long, value_enum, default_value = "center")]
    guess: GuessMode,

    /// How long to look at the panorama before confirming, in milliseconds
    #[arg(long, default_value = "1500")]
    think_ms: u64,

    /// Override the round time limit, in seconds
    #[arg(long)]
    time_limit: Option<u32>,

    /// Override the countdown tick interval, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Simulated provider latency, in milliseconds
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    /// JSON file to persist the current panorama in
    #[arg(long)]
    store: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .without_time()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("street_guess_core={level}").parse()?)
                .add_directive(format!("street_guess_catalog={level}").parse()?)
                .add_directive(format!("round_sim={level}").parse()?),
        )
        .init();

    Ok(())
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(time_limit) = args.time_limit {
        config.time_limit = time_limit;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_interval_ms = tick_ms;
    }

    Ok(config)
}

fn load_catalog(args: &Args, config: &GameConfig) -> Result<StaticPanoramaCatalog> {
    match &args.catalog {
        Some(path) => StaticPanoramaCatalog::load(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => {
            synthetic::check_step(args.grid_step)?;
            tracing::info!(step = args.grid_step, "generating synthetic catalog");
            Ok(synthetic::grid_catalog(&config.bounds, args.grid_step))
        }
    }
}

fn pick_guess(mode: GuessMode, config: &GameConfig) -> Option<Coordinate> {
    match mode {
        GuessMode::Center => Some(config.bounds.center()),
        GuessMode::Random => Some(config.bounds.random_point(&mut rand::rng())),
        GuessMode::None => None,
    }
}

/// Wait until the round launched as `generation` leaves sampling
async fn sampled(updates: &mut watch::Receiver<Round>, generation: Generation) -> Result<Round> {
    let round = updates
        .wait_for(|r| r.generation() == generation && r.status() != RoundStatus::Sampling)
        .await
        .context("Controller went away")?
        .clone();
    Ok(round)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose)?;

    let config = load_config(&args)?;
    let catalog = load_catalog(&args, &config)?;

    tracing::info!(
        panoramas = catalog.all_panoramas().len(),
        stations = catalog.all_stations().len(),
        strategy = %config.strategy,
        "catalog ready"
    );

    let provider =
        CatalogProvider::new(Arc::new(catalog)).with_latency(Duration::from_millis(args.latency_ms));
    let store: Arc<dyn LocationStore> = match &args.store {
        Some(path) => Arc::new(JsonFileLocationStore::new(path)),
        None => Arc::new(MemoryLocationStore::new()),
    };

    let controller = RoundController::new(config.clone(), Arc::new(provider), store)
        .context("Invalid game configuration")?;

    let presenter = Presenter::new(LogRenderer, config.clone());
    presenter.show_initial(controller.persisted_location());

    let mut updates = controller.subscribe();
    let rendering = {
        let updates = controller.subscribe();
        tokio::spawn(async move { presenter.run(updates).await })
    };

    let mut total_distance = 0.0;
    let mut played = 0u32;

    for n in 1..=args.rounds {
        let generation = controller.start_round();
        let round = sampled(&mut updates, generation).await?;

        if round.status() != RoundStatus::Active {
            tracing::warn!(
                %generation,
                attempts = round.attempts_used(),
                "{}",
                round.message().unwrap_or("sampling failed")
            );
            continue;
        }

        tracing::info!(
            "round {n}/{}: {} to go",
            args.rounds,
            format_countdown(round.time_remaining())
        );

        let result = match pick_guess(args.guess, &config) {
            Some(guess) => {
                controller.open_map();
                controller.set_guess(guess)?;
                tokio::time::sleep(Duration::from_millis(args.think_ms)).await;

                // Also fine if the countdown ran out first
                controller.confirm()?
            }
            None => {
                let revealed = updates
                    .wait_for(|r| r.generation() == generation && r.status() == RoundStatus::Revealed)
                    .await
                    .context("Controller went away")?
                    .clone();
                *revealed.result().context("Revealed round has no result")?
            }
        };

        tracing::info!("round {n}: {}", result.title());
        total_distance += result.distance_meters;
        played += 1;
    }

    controller.shutdown();
    drop(controller);
    rendering.await.context("Renderer task failed")?;

    if played > 0 {
        tracing::info!(
            rounds = played,
            "average distance {:.0}m",
            total_distance / f64::from(played)
        );
    } else {
        tracing::warn!("no rounds could be played");
    }

    Ok(())
}
