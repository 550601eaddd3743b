//! Escalation ECS adapters: HunterFactory, EscalationWorld, системы.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::engine::{AgentSpawn, EscalationEngine, EscalationHost, SpawnError};
use crate::ai::{HunterBrain, HunterConfig};
use crate::navigation::{NavAgent, NavMesh};
use crate::perception::PerceptionConfig;
use crate::population::{PopulationMember, PopulationQuery, PopulationRegistry, SpeedSink};
use crate::progress::{ProgressTracker, ScoreChanged};

/// New game: сброс escalation, registry multiplier и score
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartRequested;

/// Agent factory: из чего собирается новый охотник
///
/// Без этого resource спавн-эффекты логируют `SpawnError::NoFactory`.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct HunterFactory {
    pub hunter: HunterConfig,
    pub perception: PerceptionConfig,
}

impl HunterFactory {
    /// Bundle охотника: Transform + FSM + navigation + membership
    pub fn hunter_bundle(&self, spawn: AgentSpawn) -> impl Bundle {
        let mut brain = HunterBrain::new(self.hunter.clone()).with_movement_speed(spawn.speed);
        if let Some(bullets) = spawn.bullets_per_shot {
            brain.set_weapon_spread(bullets);
        }

        (
            Name::new("Hunter"),
            Transform::from_translation(spawn.position),
            brain,
            self.perception,
            NavAgent::with_speed(spawn.speed),
            PopulationMember,
        )
    }
}

/// Стартовые позиции охотников (из SimulationConfig)
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InitialHunters(pub Vec<Vec3>);

/// SystemParam adapter: Commands + factory + navmesh + популяция → EscalationHost
///
/// Охотники, заспавненные в этом же запуске системы, ещё не видны в queries
/// (commands отложены). Их параметры держим в `pending` и при изменении
/// скорости/spread пересобираем bundle.
#[derive(SystemParam)]
pub struct EscalationWorld<'w, 's> {
    commands: Commands<'w, 's>,
    factory: Option<Res<'w, HunterFactory>>,
    mesh: Res<'w, NavMesh>,
    population: PopulationQuery<'w, 's>,
    pending: Local<'s, Vec<(Entity, AgentSpawn)>>,
}

impl EscalationWorld<'_, '_> {
    /// Забыть спавны прошлых запусков
    ///
    /// Их commands уже применены: охотник либо виден в queries, либо уже
    /// despawned. Вызывать в начале каждого запуска системы.
    pub fn begin_run(&mut self) {
        self.pending.clear();
    }

    /// Обновить отложенный spawn и перевставить bundle
    fn update_pending(&mut self, agent: Entity, update: impl FnOnce(&mut AgentSpawn)) -> bool {
        let Some(factory) = self.factory.as_ref() else {
            return false;
        };
        let Some((_, spawn)) = self.pending.iter_mut().find(|(entity, _)| *entity == agent) else {
            return false;
        };

        update(spawn);
        self.commands.entity(agent).try_insert(factory.hunter_bundle(*spawn));
        true
    }
}

impl SpeedSink for EscalationWorld<'_, '_> {
    fn apply_speed(&mut self, agent: Entity, speed: f32) -> bool {
        self.population.apply_speed(agent, speed)
            || self.update_pending(agent, |spawn| spawn.speed = speed)
    }
}

impl EscalationHost for EscalationWorld<'_, '_> {
    fn sample_walkable(&self, point: Vec3, search_radius: f32) -> Option<Vec3> {
        self.mesh.sample_walkable(point, search_radius)
    }

    fn create_agent(&mut self, spawn: AgentSpawn) -> Result<Entity, SpawnError> {
        let factory = self.factory.as_ref().ok_or(SpawnError::NoFactory)?;
        let entity = self.commands.spawn(factory.hunter_bundle(spawn)).id();
        self.pending.push((entity, spawn));

        crate::logger::log(&format!(
            "Hunter {:?} spawned at {:?} (speed {})",
            entity, spawn.position, spawn.speed
        ));
        Ok(entity)
    }

    fn set_weapon_spread(&mut self, agent: Entity, bullets: u32) -> bool {
        self.population.set_weapon_spread(agent, bullets)
            || self.update_pending(agent, |spawn| spawn.bullets_per_shot = Some(bullets))
    }

    fn live_agents(&self) -> Vec<Entity> {
        let mut agents = self.population.live_hunters();
        let deferred: Vec<Entity> = self
            .pending
            .iter()
            .map(|(agent, _)| *agent)
            .filter(|agent| !agents.contains(agent))
            .collect();
        agents.extend(deferred);
        agents
    }
}

/// Система: ScoreChanged → EscalationEngine
pub fn escalate_on_score_change(
    mut changes: EventReader<ScoreChanged>,
    mut engine: ResMut<EscalationEngine>,
    mut registry: ResMut<PopulationRegistry>,
    mut world: EscalationWorld,
) {
    world.begin_run();
    for change in changes.read() {
        engine.handle_score_changed(change.old, change.new, &mut registry, &mut world);
    }
}

/// Система: RestartRequested → reset всего escalation состояния
pub fn restart_on_request(
    mut requests: EventReader<RestartRequested>,
    mut engine: ResMut<EscalationEngine>,
    mut registry: ResMut<PopulationRegistry>,
    mut tracker: ResMut<ProgressTracker>,
    mut population: PopulationQuery,
) {
    // Несколько запросов за тик = один reset
    if requests.read().count() == 0 {
        return;
    }

    engine.reset_all(&mut registry, &mut population);
    tracker.reset();
    crate::logger::log_info("🔄 Restart: score 0, escalation re-armed");
}

/// Startup система: стартовые охотники через ту же factory
pub fn spawn_initial_hunters(
    initial: Option<Res<InitialHunters>>,
    engine: Res<EscalationEngine>,
    registry: Res<PopulationRegistry>,
    mut world: EscalationWorld,
) {
    let Some(initial) = initial else {
        return;
    };

    world.begin_run();
    let spread = engine.spawn_weapon_spread();
    for position in initial.0.iter().copied() {
        let spawn = AgentSpawn {
            position,
            speed: registry.effective_speed(),
            bullets_per_shot: spread,
        };
        if let Err(error) = world.create_agent(spawn) {
            crate::logger::log_error(&format!("Initial hunter skipped: {}", error));
            return;
        }
    }
}
