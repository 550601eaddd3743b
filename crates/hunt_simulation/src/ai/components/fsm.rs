//! Hunter FSM components (states, config, target, hiding zones).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Под-фаза блуждания
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum WanderPhase {
    /// Нет destination: запросить новую точку
    Idle,
    /// Идём к wander точке
    Moving,
    /// Дошли, ждём перед следующей точкой
    Waiting {
        /// Сколько ещё ждать (секунды)
        remaining: f32,
    },
}

/// Hunter FSM состояния
///
/// Wandering → Alert → Engaging → Wandering (всегда, после cooldown)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum HunterState {
    /// Wandering: случайное блуждание, perception каждый тик
    Wandering { phase: WanderPhase },

    /// Alert: заметили цель, стоим и разворачиваемся к ней
    Alert {
        /// Сколько секунд цель видна подряд
        detection_progress: f32,
    },

    /// Engaging: залп выпущен на входе, ждём cooldown (perception не смотрим)
    Engaging {
        /// Осталось до возврата в Wandering (секунды)
        cooldown_remaining: f32,
    },
}

impl Default for HunterState {
    fn default() -> Self {
        Self::Wandering {
            phase: WanderPhase::Idle,
        }
    }
}

impl HunterState {
    pub fn name(&self) -> &'static str {
        match self {
            HunterState::Wandering { .. } => "Wandering",
            HunterState::Alert { .. } => "Alert",
            HunterState::Engaging { .. } => "Engaging",
        }
    }
}

/// Параметры охотника
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct HunterConfig {
    /// Сколько секунд цель должна быть видна до выстрела
    pub detection_time: f32,
    /// Пауза после залпа (секунды)
    pub shoot_cooldown: f32,
    /// Ожидание на wander точке (секунды)
    pub wander_wait_time: f32,
    /// Wander точка генерируется в кольце [min_distance, radius]
    pub wander_min_distance: f32,
    pub wander_radius: f32,
    /// Радиус поиска walkable точки около wander точки
    pub wander_search_radius: f32,
    /// Шаг веера между пулями (градусы)
    pub spread_angle: f32,
    /// Пуль в залпе по умолчанию
    pub bullets_per_shot: u32,
    /// Скорость сглаженного поворота к цели (1/сек, доля slerp)
    pub turn_speed: f32,
    /// Высота ствола над позицией (метры)
    pub muzzle_height: f32,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            detection_time: 1.5,
            shoot_cooldown: 2.0,
            wander_wait_time: 2.0,
            wander_min_distance: 4.0,
            wander_radius: 12.0,
            wander_search_radius: 4.0,
            spread_angle: 12.0,
            bullets_per_shot: 1,
            turn_speed: 8.0,
            muzzle_height: 1.0,
        }
    }
}

/// Цель охоты (игрок). Позиция: Transform.
///
/// `is_suppressed` выставляется снаружи (hiding zone trigger), для охотников read-only.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HuntTarget {
    pub is_suppressed: bool,
}

/// Зона укрытия: цель внутри радиуса невидима
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HidingZone {
    pub radius: f32,
}

/// Конфиг зоны укрытия (для SimulationConfig)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HidingZoneConfig {
    pub center: [f32; 3],
    pub radius: f32,
}
