//! Headless projectile: прямолинейный полёт + lifetime
//!
//! Projectile живёт пока не истёк lifetime или не попал в HuntTarget.
//! Shooter никогда не попадает сам в себя.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::weapon::{ProjectileConfig, ProjectileFactory, ProjectileFired, TargetHit};
use crate::ai::HuntTarget;

/// Пуля в полёте
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    /// Кто выстрелил (self-hit prevention)
    pub shooter: Entity,
    /// Направление полёта (normalized)
    pub direction: Vec3,
    /// Скорость (м/с)
    pub speed: f32,
    /// Осталось жить (секунды)
    pub lifetime: f32,
    /// Радиус попадания (метры)
    pub hit_radius: f32,
}

/// SystemParam adapter: Commands + ProjectileConfig → ProjectileFactory
#[derive(SystemParam)]
pub struct ProjectileSpawner<'w, 's> {
    commands: Commands<'w, 's>,
    config: Res<'w, ProjectileConfig>,
    fired: EventWriter<'w, ProjectileFired>,
}

impl ProjectileFactory for ProjectileSpawner<'_, '_> {
    fn spawn_projectile(&mut self, shooter: Entity, origin: Vec3, direction: Vec3) -> Entity {
        let direction = direction.normalize_or_zero();
        let projectile = self
            .commands
            .spawn((
                Transform::from_translation(origin),
                Projectile {
                    shooter,
                    direction,
                    speed: self.config.speed,
                    lifetime: self.config.lifetime,
                    hit_radius: self.config.hit_radius,
                },
            ))
            .id();

        self.fired.write(ProjectileFired {
            shooter,
            projectile,
            origin,
            direction,
        });

        projectile
    }
}

/// Система: полёт пуль, lifetime, попадания
pub fn advance_projectiles(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile), Without<HuntTarget>>,
    targets: Query<(Entity, &Transform), With<HuntTarget>>,
    mut hits: EventWriter<TargetHit>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut projectile) in projectiles.iter_mut() {
        transform.translation += projectile.direction * projectile.speed * delta;
        projectile.lifetime -= delta;

        let hit = targets.iter().find(|(target, target_transform)| {
            *target != projectile.shooter
                && target_transform.translation.distance(transform.translation)
                    <= projectile.hit_radius
        });

        if let Some((target, _)) = hit {
            crate::logger::log(&format!(
                "🎯 Projectile from {:?} hit target {:?} at {:?}",
                projectile.shooter, target, transform.translation
            ));
            hits.write(TargetHit {
                shooter: projectile.shooter,
                target,
                impact_point: transform.translation,
            });
            commands.entity(entity).despawn();
            continue;
        }

        if projectile.lifetime <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
