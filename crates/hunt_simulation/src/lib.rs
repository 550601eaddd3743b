//! NIGHTHUNT Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 (strategic layer): охотники патрулируют,
//! замечают цель и стреляют, а рост score эскалирует их популяцию.
//!
//! Архитектура:
//! - Ядро без ECS: `can_perceive`, `HunterBrain`, `PopulationRegistry`,
//!   `ProgressTracker`, `EscalationEngine` (юнит-тестируемы напрямую)
//! - ECS слой: Resources + Components + SystemParam adapters вокруг ядра
//! - Navigation/LOS/projectiles: headless реализации внешних collaborators

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod config;
pub mod escalation;
pub mod logger;
pub mod navigation;
pub mod perception;
pub mod population;
pub mod progress;

// Re-export основных типов
pub use ai::{AIPlugin, HidingZone, HuntTarget, HunterBrain, HunterConfig, HunterState};
pub use combat::{CombatPlugin, Projectile, ProjectileConfig, ProjectileFired, TargetHit};
pub use config::{ConfigError, SimulationConfig};
pub use escalation::{
    EscalationConfig, EscalationEffect, EscalationEngine, EscalationPlugin, HunterFactory,
    InitialHunters, RestartRequested, SpawnError, Threshold,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use navigation::{NavAgent, NavMesh, NavigationPlugin};
pub use perception::{can_perceive, PerceptionConfig};
pub use population::{PopulationMember, PopulationPlugin, PopulationRegistry};
pub use progress::{ProgressPlugin, ProgressTracker, ScoreAwarded, ScoreChanged};

/// Порядок подсистем внутри одного FixedUpdate тика
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Concealment (HidingZone → HuntTarget)
    Perception,
    /// HunterBrain FSM
    Brain,
    /// Движение NavAgent
    Navigation,
    /// Полёт пуль, попадания
    Combat,
    /// ScoreAwarded → ScoreChanged
    Progress,
    /// ScoreChanged → эффекты, restart
    Escalation,
    /// PopulationMember → registry
    Population,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Ресурсы собираются из `SimulationConfig`; охотники из `initial_hunters`
/// спавнятся в Startup.
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Perception,
                SimulationSet::Brain,
                SimulationSet::Navigation,
                SimulationSet::Combat,
                SimulationSet::Progress,
                SimulationSet::Escalation,
                SimulationSet::Population,
            )
                .chain(),
        )
        .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
        .insert_resource(NavMesh::new(config.navigation.clone()))
        .insert_resource(config.projectile)
        .insert_resource(PopulationRegistry::new(config.population.base_speed))
        .insert_resource(EscalationEngine::new(config.escalation.clone()))
        .insert_resource(HunterFactory {
            hunter: config.hunter.clone(),
            perception: config.perception,
        })
        .insert_resource(InitialHunters(config.initial_hunter_positions()))
        .add_plugins((
            AIPlugin,
            NavigationPlugin,
            CombatPlugin,
            ProgressPlugin,
            EscalationPlugin,
            PopulationPlugin,
        ));

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.seed));
        }

        for zone in &config.hiding_zones {
            app.world_mut().spawn((
                Name::new("HidingZone"),
                Transform::from_translation(Vec3::from_array(zone.center)),
                HidingZone {
                    radius: zone.radius,
                },
            ));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Каждый `app.update()` сдвигает виртуальное время ровно на один fixed шаг
/// (60Hz), поэтому прогон не зависит от wall clock. Первый update: нулевой
/// delta (Bevy стартует часы), FixedUpdate в нём не запускается.
pub fn create_headless_app(seed: u64) -> App {
    headless_app(seed, 60.0)
}

fn headless_app(seed: u64, tick_hz: f64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(tick_hz))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / tick_hz,
        )));

    app
}

/// Headless App со всей симуляцией из конфига
pub fn create_simulation_app(config: SimulationConfig) -> App {
    let mut app = headless_app(config.seed, config.tick_hz);
    app.add_plugins(SimulationPlugin::new(config));
    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты `T` сортируются по Entity index и сериализуются через Debug.
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
