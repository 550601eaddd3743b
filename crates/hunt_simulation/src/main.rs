//! Headless симуляция NIGHTHUNT
//!
//! Запускает Bevy App без рендера: охотники, цель в центре карты,
//! score начисляется каждые N тиков и эскалирует популяцию.

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;
use clap::Parser;

use hunt_simulation::logger::{self, LogLevel};
use hunt_simulation::{
    create_simulation_app, EscalationEngine, HuntTarget, HunterBrain, PopulationRegistry,
    ProgressTracker, ScoreAwarded, SimulationConfig, TargetHit,
};

#[derive(Parser, Debug)]
#[command(name = "hunt_simulation", about = "Headless hunter/escalation simulation")]
struct Cli {
    /// JSON конфиг (default если не указан)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Переопределить seed из конфига
    #[arg(long)]
    seed: Option<u64>,

    /// Сколько fixed тиков прогнать
    #[arg(long, default_value_t = 3600)]
    ticks: u32,

    /// Начислять 1 очко каждые N тиков (0 = никогда)
    #[arg(long, default_value_t = 120)]
    score_every: u32,

    /// Debug логи (переходы FSM, навигация)
    #[arg(long)]
    verbose: bool,
}

/// Счётчик попаданий для summary
#[derive(Resource, Default)]
struct HitCounter(u32);

fn count_hits(mut hits: EventReader<TargetHit>, mut counter: ResMut<HitCounter>) {
    counter.0 += hits.read().count() as u32;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logger::init_logger();
    logger::set_log_level(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let mut config = match &cli.config {
        Some(path) => match SimulationConfig::load(path) {
            Ok(config) => config,
            Err(error) => {
                logger::log_error(&format!("{}: {}", path.display(), error));
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    logger::log_info(&format!(
        "Starting NIGHTHUNT headless simulation (seed: {}, ticks: {})",
        config.seed, cli.ticks
    ));

    let mut app = create_simulation_app(config);
    app.init_resource::<HitCounter>()
        .add_systems(FixedUpdate, count_hits);
    app.world_mut().spawn((
        Name::new("Target"),
        Transform::from_xyz(0.0, 0.0, 0.0),
        HuntTarget::default(),
    ));

    // Первый update стартует часы (нулевой delta)
    app.update();

    for tick in 1..=cli.ticks {
        if cli.score_every > 0 && tick % cli.score_every == 0 {
            app.world_mut().send_event(ScoreAwarded { points: 1 });
        }

        app.update();

        if tick % 600 == 0 || tick == cli.ticks {
            print_summary(&mut app, tick);
        }
    }

    logger::log_info("Simulation complete!");
    ExitCode::SUCCESS
}

fn print_summary(app: &mut App, tick: u32) {
    let hunters = app
        .world_mut()
        .query::<&HunterBrain>()
        .iter(app.world())
        .count();
    let world = app.world();

    logger::log_info(&format!(
        "Tick {}: score {}, hunters {} (registered {}), speed ×{}, spread {}, hits {}",
        tick,
        world.resource::<ProgressTracker>().score(),
        hunters,
        world.resource::<PopulationRegistry>().len(),
        world.resource::<PopulationRegistry>().speed_multiplier(),
        world.resource::<EscalationEngine>().weapon_spread(),
        world.resource::<HitCounter>().0,
    ));
}
