//! Общие helpers для integration тестов (headless App из конфига)

#![allow(dead_code)]

use bevy::prelude::*;
use hunt_simulation::{
    create_simulation_app, HuntTarget, HunterBrain, ProjectileFired, SimulationConfig,
    SimulationSet, TargetHit,
};

/// Все ProjectileFired/TargetHit за прогон
#[derive(Resource, Default)]
pub struct CombatLog {
    pub fired: Vec<ProjectileFired>,
    pub hits: Vec<TargetHit>,
}

fn record_combat(
    mut fired: EventReader<ProjectileFired>,
    mut hits: EventReader<TargetHit>,
    mut log: ResMut<CombatLog>,
) {
    log.fired.extend(fired.read().cloned());
    log.hits.extend(hits.read().cloned());
}

/// Пустая арена: без стартовых охотников, зон и порогов
pub fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.initial_hunters.clear();
    config.hiding_zones.clear();
    config.escalation.thresholds.clear();
    config
}

pub fn app_with(config: SimulationConfig) -> App {
    let mut app = create_simulation_app(config);
    app.init_resource::<CombatLog>().add_systems(
        FixedUpdate,
        record_combat.after(SimulationSet::Combat),
    );
    app
}

pub fn spawn_target(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Transform::from_translation(position), HuntTarget::default()))
        .id()
}

pub fn run(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

pub fn hunters(app: &mut App) -> Vec<Entity> {
    let mut query = app.world_mut().query_filtered::<Entity, With<HunterBrain>>();
    let mut entities: Vec<Entity> = query.iter(app.world()).collect();
    entities.sort();
    entities
}
