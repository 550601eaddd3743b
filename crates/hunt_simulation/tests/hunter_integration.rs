//! Integration тесты: охотник в headless App (perception → FSM → пули)

mod common;

use bevy::prelude::*;
use common::{app_with, hunters, quiet_config, run, spawn_target, CombatLog};
use hunt_simulation::config::SimulationConfig;
use hunt_simulation::{HidingZone, HuntTarget, HunterBrain, HunterState, NavAgent, Projectile};

/// Один охотник в (0,0,0), смотрит в -Z
fn single_hunter_config() -> SimulationConfig {
    let mut config = quiet_config();
    config.initial_hunters = vec![[0.0, 0.0, 0.0]];
    config.hunter.detection_time = 0.5;
    config.hunter.shoot_cooldown = 1.0;
    config
}

#[test]
fn test_hunter_spots_target_and_fires() {
    let mut app = app_with(single_hunter_config());
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -6.0));

    run(&mut app, 90);

    let hunter = hunters(&mut app)[0];
    let log = app.world().resource::<CombatLog>();
    assert!(!log.fired.is_empty(), "hunter never fired");
    assert!(log.fired.iter().all(|shot| shot.shooter == hunter));

    // Пуля летит прямо в цель и попадает
    assert!(log.hits.iter().any(|hit| hit.target == target && hit.shooter == hunter));
}

#[test]
fn test_hunter_holds_position_while_alert() {
    let mut config = single_hunter_config();
    config.hunter.detection_time = 10.0;
    let mut app = app_with(config);
    spawn_target(&mut app, Vec3::new(0.0, 0.0, -6.0));

    run(&mut app, 30);

    let hunter = hunters(&mut app)[0];
    let state = app.world().get::<HunterBrain>(hunter).map(|b| b.state());
    assert!(matches!(state, Some(HunterState::Alert { .. })));

    let position = app.world().get::<Transform>(hunter).map(|t| t.translation);
    assert_eq!(position, Some(Vec3::ZERO));
    assert!(app.world().resource::<CombatLog>().fired.is_empty());
}

#[test]
fn test_hidden_target_never_shot() {
    let mut config = single_hunter_config();
    config.hiding_zones = vec![hunt_simulation::ai::HidingZoneConfig {
        center: [0.0, 0.0, -6.0],
        radius: 2.0,
    }];
    let mut app = app_with(config);
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -6.0));

    run(&mut app, 240);

    assert_eq!(
        app.world().get::<HuntTarget>(target).map(|t| t.is_suppressed),
        Some(true)
    );
    assert!(app.world().resource::<CombatLog>().fired.is_empty());

    let mut zones = app.world_mut().query::<&HidingZone>();
    assert_eq!(zones.iter(app.world()).count(), 1);
}

#[test]
fn test_target_behind_hunter_not_noticed() {
    let mut config = single_hunter_config();
    // Стоим на месте: wander ring вырожден в ноль
    config.hunter.wander_min_distance = 0.0;
    config.hunter.wander_radius = 0.0;
    let mut app = app_with(config);
    spawn_target(&mut app, Vec3::new(0.0, 0.0, 6.0));

    run(&mut app, 120);

    let hunter = hunters(&mut app)[0];
    let state = app.world().get::<HunterBrain>(hunter).map(|b| b.state());
    assert!(matches!(state, Some(HunterState::Wandering { .. })));
    assert!(app.world().resource::<CombatLog>().fired.is_empty());
}

#[test]
fn test_hunter_wanders_without_target() {
    let mut app = app_with(single_hunter_config());

    run(&mut app, 120);

    let hunter = hunters(&mut app)[0];
    let position = app
        .world()
        .get::<Transform>(hunter)
        .map(|t| t.translation)
        .unwrap_or(Vec3::ZERO);
    assert!(position.length() > 0.1, "hunter did not move: {:?}", position);

    let nav = app.world().get::<NavAgent>(hunter).cloned();
    assert!(nav.is_some());
}

#[test]
fn test_projectiles_expire() {
    let mut config = single_hunter_config();
    config.projectile.lifetime = 0.25;
    let mut app = app_with(config);
    // Цель вне досягаемости пули (лайфтайм 0.25с × 20 м/с = 5м), но в зоне видимости
    spawn_target(&mut app, Vec3::new(0.0, 0.0, -12.0));

    run(&mut app, 60);
    assert!(!app.world().resource::<CombatLog>().fired.is_empty());

    // Охотник в cooldown (1с), новые пули не летят, старые истекли
    run(&mut app, 20);
    let mut projectiles = app.world_mut().query::<&Projectile>();
    assert_eq!(projectiles.iter(app.world()).count(), 0);
    assert!(app.world().resource::<CombatLog>().hits.is_empty());
}
