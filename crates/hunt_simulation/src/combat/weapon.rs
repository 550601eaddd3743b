//! Weapon volley: веерный залп и события выстрела
//!
//! Architecture:
//! - HunterBrain решает КОГДА стрелять (вход в Engaging)
//! - `spread_directions` считает направления пуль залпа
//! - `ProjectileFactory`: внешний spawner (headless: `ProjectileSpawner`)
//! - Events: ProjectileFired (audio/VFX hook), TargetHit (попадание)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Event: пуля выпущена
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileFired {
    pub shooter: Entity,
    pub projectile: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Event: пуля попала в цель (projectile уже despawned)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TargetHit {
    pub shooter: Entity,
    pub target: Entity,
    pub impact_point: Vec3,
}

/// Projectile factory (внешний collaborator)
pub trait ProjectileFactory {
    /// Выпустить одну пулю, вернуть handle
    fn spawn_projectile(&mut self, shooter: Entity, origin: Vec3, direction: Vec3) -> Entity;
}

/// Параметры пули (straight-line mover)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Скорость (м/с)
    pub speed: f32,
    /// Время жизни (секунды), потом despawn
    pub lifetime: f32,
    /// Радиус попадания (метры)
    pub hit_radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            lifetime: 3.0,
            hit_radius: 0.5,
        }
    }
}

/// Угловые смещения залпа (градусы), центрированы вокруг 0
///
/// `n` пуль, шаг `spread_angle`: `-((n-1)·spread/2) + i·spread`.
pub fn spread_offsets(bullets: u32, spread_angle: f32) -> Vec<f32> {
    let half_width = (bullets.saturating_sub(1)) as f32 * spread_angle / 2.0;
    (0..bullets)
        .map(|i| -half_width + i as f32 * spread_angle)
        .collect()
}

/// Направления пуль залпа: base direction повёрнут вокруг Y на каждое смещение
pub fn spread_directions(base_direction: Vec3, bullets: u32, spread_angle: f32) -> Vec<Vec3> {
    let base = base_direction.normalize_or_zero();
    spread_offsets(bullets, spread_angle)
        .into_iter()
        .map(|offset| Quat::from_rotation_y(offset.to_radians()) * base)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::planar_angle_degrees;

    #[test]
    fn test_single_bullet_goes_straight() {
        assert_eq!(spread_offsets(1, 10.0), vec![0.0]);
        assert_eq!(spread_directions(Vec3::Z * 3.0, 1, 10.0), vec![Vec3::Z]);
    }

    #[test]
    fn test_offsets_are_centered() {
        assert_eq!(spread_offsets(3, 10.0), vec![-10.0, 0.0, 10.0]);
        assert_eq!(spread_offsets(4, 10.0), vec![-15.0, -5.0, 5.0, 15.0]);
        assert!(spread_offsets(0, 10.0).is_empty());
    }

    #[test]
    fn test_directions_symmetric_around_base() {
        let base = Vec3::new(1.0, 0.0, 1.0);
        let directions = spread_directions(base, 5, 8.0);
        assert_eq!(directions.len(), 5);

        let angles: Vec<f32> = directions
            .iter()
            .map(|d| planar_angle_degrees(base, *d).unwrap_or(f32::NAN))
            .collect();

        let expected = [16.0, 8.0, 0.0, 8.0, 16.0];
        for (angle, expected) in angles.iter().zip(expected) {
            assert!((angle - expected).abs() < 1e-3, "angle {} != {}", angle, expected);
        }

        // Все пули единичной длины
        for d in &directions {
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }
}
