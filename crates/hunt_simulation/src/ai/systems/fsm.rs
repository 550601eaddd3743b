//! Hunter FSM system: Senses из мира → HunterBrain::tick → исполнение HunterAction.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{HuntTarget, HunterAction, HunterBrain, HunterConfig, Senses, TargetSighting};
use crate::combat::{ProjectileFactory, ProjectileSpawner};
use crate::navigation::{NavAgent, NavigationProvider, NavigationQuery};
use crate::perception::{can_perceive_with, PerceptionConfig};
use crate::DeterministicRng;

/// Система: один шаг FSM для каждого охотника
///
/// Perception вычисляется только когда brain его ждёт (не в Engaging).
/// Цель: ближайший HuntTarget (обычно один игрок).
pub fn hunter_fsm_tick(
    mut hunters: Query<(Entity, &mut HunterBrain, Option<&PerceptionConfig>)>,
    targets: Query<(&Transform, &HuntTarget), Without<NavAgent>>,
    mut navigation: NavigationQuery,
    mut projectiles: ProjectileSpawner,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut brain, perception) in hunters.iter_mut() {
        let Some(pose) = navigation.pose(entity) else {
            // Нет NavAgent/Transform: охотник ещё не собран
            continue;
        };

        let nearest = targets.iter().min_by(|(a, _), (b, _)| {
            let da = a.translation.distance_squared(pose.position);
            let db = b.translation.distance_squared(pose.position);
            da.total_cmp(&db)
        });

        let target = nearest.map(|(transform, hunt_target)| {
            let position = transform.translation;
            let visible = brain.is_perceiving()
                && can_perceive_with(
                    &perception.copied().unwrap_or_default(),
                    pose.position,
                    pose.forward,
                    position,
                    hunt_target.is_suppressed,
                    &*navigation.mesh,
                );
            TargetSighting { position, visible }
        });

        let senses = Senses {
            position: pose.position,
            forward: pose.forward,
            arrived: navigation.has_arrived(entity),
            target,
        };

        for action in brain.tick(delta, &senses) {
            match action {
                HunterAction::RequestWanderDestination => {
                    let desired = random_wander_point(&brain.config, pose.position, &mut rng);
                    if navigation
                        .request_destination(entity, desired, brain.config.wander_search_radius)
                        .is_none()
                    {
                        crate::logger::log(&format!(
                            "Hunter {:?}: no walkable wander point near {:?}",
                            entity, desired
                        ));
                    }
                }
                HunterAction::HoldPosition => navigation.hold_position(entity),
                HunterAction::FaceTowards { point, turn_speed } => {
                    navigation.face_towards(entity, point, (turn_speed * delta).min(1.0));
                }
                HunterAction::FireVolley { origin, directions } => {
                    crate::logger::log(&format!(
                        "🔫 Hunter {:?} fires {} bullet(s)",
                        entity,
                        directions.len()
                    ));
                    for direction in directions {
                        projectiles.spawn_projectile(entity, origin, direction);
                    }
                }
                HunterAction::ApplySpeed(speed) => {
                    navigation.set_speed(entity, speed);
                }
            }
        }
    }
}

/// Случайная точка в кольце [wander_min_distance, wander_radius] вокруг позиции
pub fn random_wander_point(config: &HunterConfig, origin: Vec3, rng: &mut DeterministicRng) -> Vec3 {
    let angle = rng.rng.gen::<f32>() * std::f32::consts::TAU;
    let min = config.wander_min_distance.min(config.wander_radius);
    let max = config.wander_radius.max(min);
    let distance = min + rng.rng.gen::<f32>() * (max - min);

    origin + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance
}
