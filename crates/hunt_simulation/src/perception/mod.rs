//! Perception: "видит ли наблюдатель точку"
//!
//! Чистая геометрия, без ECS:
//! 1. Suppression (цель прячется): абсолютный запрет, проверяется первым
//! 2. Planar distance (XZ) ≤ range
//! 3. Угол между forward и направлением на цель (XZ) ≤ half angle
//! 4. Line-of-sight query (внешний raycast): препятствий нет
//!
//! Используется HunterBrain через систему `hunter_fsm_tick`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Допуск для границы конуса (float погрешность atan2 около ровных углов)
pub const ANGLE_EPSILON_DEGREES: f32 = 1e-3;

/// Line-of-sight query (внешний collaborator)
///
/// `true` = между точками есть непрозрачное препятствие.
pub trait LineOfSight {
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool;
}

impl<F> LineOfSight for F
where
    F: Fn(Vec3, Vec3) -> bool,
{
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool {
        self(from, to)
    }
}

/// Открытое поле: ничего не блокирует обзор
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearSight;

impl LineOfSight for ClearSight {
    fn is_obstructed(&self, _from: Vec3, _to: Vec3) -> bool {
        false
    }
}

/// Параметры зрения охотника (component на охотнике, default если нет)
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Дальность обзора (метры, по горизонтали)
    pub range: f32,
    /// Половина угла конуса обзора (градусы)
    pub half_angle_degrees: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            range: 15.0,
            half_angle_degrees: 45.0,
        }
    }
}

/// Проекция на горизонтальную плоскость (XZ)
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Угол (градусы, 0..=180) между двумя направлениями на плоскости XZ
///
/// `None` если одно из направлений вырождено.
pub fn planar_angle_degrees(forward: Vec3, direction: Vec3) -> Option<f32> {
    let f = planar(forward);
    let d = planar(direction);

    if f.length_squared() <= f32::EPSILON || d.length_squared() <= f32::EPSILON {
        return None;
    }

    Some(f.perp_dot(d).atan2(f.dot(d)).abs().to_degrees())
}

/// Может ли наблюдатель увидеть цель
///
/// Без side effects. Line-of-sight query вызывается только если distance и
/// angle уже прошли (raycast самый дорогой шаг).
pub fn can_perceive(
    observer_position: Vec3,
    observer_forward: Vec3,
    target_position: Vec3,
    is_target_suppressed: bool,
    range: f32,
    half_angle_degrees: f32,
    line_of_sight: &impl LineOfSight,
) -> bool {
    if is_target_suppressed {
        return false;
    }

    let to_target = target_position - observer_position;
    let distance = planar(to_target).length();
    if distance > range {
        return false;
    }

    // Point-blank: направление не определено, конус не проверяем
    if distance > f32::EPSILON {
        match planar_angle_degrees(observer_forward, to_target) {
            Some(angle) if angle <= half_angle_degrees + ANGLE_EPSILON_DEGREES => {}
            _ => return false,
        }
    }

    !line_of_sight.is_obstructed(observer_position, target_position)
}

/// `can_perceive` с параметрами из `PerceptionConfig`
pub fn can_perceive_with(
    config: &PerceptionConfig,
    observer_position: Vec3,
    observer_forward: Vec3,
    target_position: Vec3,
    is_target_suppressed: bool,
    line_of_sight: &impl LineOfSight,
) -> bool {
    can_perceive(
        observer_position,
        observer_forward,
        target_position,
        is_target_suppressed,
        config.range,
        config.half_angle_degrees,
        line_of_sight,
    )
}
