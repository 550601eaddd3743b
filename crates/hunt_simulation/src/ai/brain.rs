//! HunterBrain: perception/combat state machine одного охотника
//!
//! Wandering → Alert → Engaging → Wandering
//!
//! Архитектура:
//! - `tick(dt, senses)`, чистый шаг FSM: (state, senses, dt) → новый state + actions
//! - Brain НЕ трогает ECS: navigation, rotation, пули идут через `HunterAction`
//! - Система `hunter_fsm_tick` собирает `Senses` и исполняет actions
//!
//! Perception в Engaging не вычисляется (окно атаки нельзя прервать).

use bevy::prelude::*;

use super::components::{HunterConfig, HunterState, WanderPhase};
use crate::combat::spread_directions;

/// Что охотник знает о цели в этот тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSighting {
    pub position: Vec3,
    /// Результат `can_perceive` (false в Engaging: не вычисляется)
    pub visible: bool,
}

/// Входные данные тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Senses {
    pub position: Vec3,
    pub forward: Vec3,
    /// NavigationProvider::has_arrived
    pub arrived: bool,
    /// None = цели нет (despawned / ссылка потеряна)
    pub target: Option<TargetSighting>,
}

/// Side effect, который система должна исполнить
#[derive(Debug, Clone, PartialEq)]
pub enum HunterAction {
    /// Новая случайная wander точка через NavigationProvider
    RequestWanderDestination,
    /// destination = текущая позиция
    HoldPosition,
    /// Сглаженный поворот к точке
    FaceTowards { point: Vec3, turn_speed: f32 },
    /// Залп (только на входе в Engaging)
    FireVolley { origin: Vec3, directions: Vec<Vec3> },
    /// Новая скорость для NavigationProvider (broadcast от PopulationRegistry)
    ApplySpeed(f32),
}

/// Hunter FSM component
#[derive(Component, Debug, Clone, PartialEq)]
pub struct HunterBrain {
    pub config: HunterConfig,
    state: HunterState,
    bullets_per_shot: u32,
    movement_speed: Option<f32>,
    pending_speed: Option<f32>,
}

impl Default for HunterBrain {
    fn default() -> Self {
        Self::new(HunterConfig::default())
    }
}

impl HunterBrain {
    pub fn new(config: HunterConfig) -> Self {
        let bullets_per_shot = config.bullets_per_shot.max(1);
        Self {
            config,
            state: HunterState::default(),
            bullets_per_shot,
            movement_speed: None,
            pending_speed: None,
        }
    }

    /// Скорость, уже выставленная в NavAgent при спавне (без ApplySpeed)
    pub fn with_movement_speed(mut self, speed: f32) -> Self {
        self.movement_speed = Some(speed);
        self
    }

    pub fn state(&self) -> HunterState {
        self.state
    }

    /// 0 вне Alert
    pub fn detection_progress(&self) -> f32 {
        match self.state {
            HunterState::Alert { detection_progress } => detection_progress,
            _ => 0.0,
        }
    }

    pub fn bullets_per_shot(&self) -> u32 {
        self.bullets_per_shot
    }

    /// Последняя скорость от PopulationRegistry (None до регистрации)
    pub fn movement_speed(&self) -> Option<f32> {
        self.movement_speed
    }

    /// Нужно ли вычислять perception в этот тик
    pub fn is_perceiving(&self) -> bool {
        !matches!(self.state, HunterState::Engaging { .. })
    }

    /// Пуль в следующих залпах. Текущий залп (уже в Engaging) не меняется.
    pub fn set_weapon_spread(&mut self, bullets: u32) {
        if bullets == 0 {
            crate::logger::log_warning("HunterBrain: weapon spread 0 clamped to 1");
        }
        self.bullets_per_shot = bullets.max(1);
    }

    /// Скорость движения. State не прерывается, NavAgent обновится в следующем тике.
    pub fn set_movement_speed(&mut self, speed: f32) {
        self.movement_speed = Some(speed);
        self.pending_speed = Some(speed);
    }

    /// Один шаг FSM
    pub fn tick(&mut self, dt: f32, senses: &Senses) -> Vec<HunterAction> {
        let mut actions = Vec::new();

        if let Some(speed) = self.pending_speed.take() {
            actions.push(HunterAction::ApplySpeed(speed));
        }

        let new_state = match self.state {
            HunterState::Wandering { phase } => {
                self.tick_wandering(phase, dt, senses, &mut actions)
            }
            HunterState::Alert { detection_progress } => {
                self.tick_alert(detection_progress, dt, senses, &mut actions)
            }
            HunterState::Engaging { cooldown_remaining } => {
                self.tick_engaging(cooldown_remaining, dt, senses, &mut actions)
            }
        };

        if new_state.name() != self.state.name() {
            crate::logger::log(&format!(
                "Hunter: {} → {}",
                self.state.name(),
                new_state.name()
            ));
        }
        self.state = new_state;

        actions
    }

    fn tick_wandering(
        &self,
        phase: WanderPhase,
        dt: f32,
        senses: &Senses,
        actions: &mut Vec<HunterAction>,
    ) -> HunterState {
        if let Some(sighting) = senses.target.filter(|s| s.visible) {
            actions.push(HunterAction::HoldPosition);
            actions.push(self.face(sighting.position));
            return HunterState::Alert {
                detection_progress: 0.0,
            };
        }

        let phase = match phase {
            WanderPhase::Idle => {
                actions.push(HunterAction::RequestWanderDestination);
                WanderPhase::Moving
            }
            WanderPhase::Moving if senses.arrived => WanderPhase::Waiting {
                remaining: self.config.wander_wait_time,
            },
            WanderPhase::Moving => WanderPhase::Moving,
            WanderPhase::Waiting { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    actions.push(HunterAction::RequestWanderDestination);
                    WanderPhase::Moving
                } else {
                    WanderPhase::Waiting { remaining }
                }
            }
        };

        HunterState::Wandering { phase }
    }

    fn tick_alert(
        &self,
        detection_progress: f32,
        dt: f32,
        senses: &Senses,
        actions: &mut Vec<HunterAction>,
    ) -> HunterState {
        let Some(sighting) = senses.target else {
            crate::logger::log("Hunter: target unavailable in Alert");
            return wandering();
        };

        if !sighting.visible {
            return wandering();
        }

        actions.push(HunterAction::HoldPosition);
        actions.push(self.face(sighting.position));

        let detection_progress = detection_progress + dt;
        if detection_progress < self.config.detection_time {
            return HunterState::Alert { detection_progress };
        }

        actions.push(self.volley(senses, sighting.position));
        HunterState::Engaging {
            cooldown_remaining: self.config.shoot_cooldown,
        }
    }

    fn tick_engaging(
        &self,
        cooldown_remaining: f32,
        dt: f32,
        senses: &Senses,
        actions: &mut Vec<HunterAction>,
    ) -> HunterState {
        if senses.target.is_none() {
            crate::logger::log("Hunter: target unavailable in Engaging");
            return wandering();
        }

        let cooldown_remaining = cooldown_remaining - dt;
        if cooldown_remaining <= 0.0 {
            return wandering();
        }

        actions.push(HunterAction::HoldPosition);
        HunterState::Engaging { cooldown_remaining }
    }

    fn face(&self, point: Vec3) -> HunterAction {
        HunterAction::FaceTowards {
            point,
            turn_speed: self.config.turn_speed,
        }
    }

    /// Залп по позиции цели на момент входа в Engaging
    fn volley(&self, senses: &Senses, target_position: Vec3) -> HunterAction {
        let origin = senses.position + Vec3::Y * self.config.muzzle_height;
        let mut base = target_position - origin;
        if base.length_squared() <= f32::EPSILON {
            base = senses.forward;
        }

        HunterAction::FireVolley {
            origin,
            directions: spread_directions(base, self.bullets_per_shot, self.config.spread_angle),
        }
    }
}

fn wandering() -> HunterState {
    HunterState::Wandering {
        phase: WanderPhase::Idle,
    }
}

#[cfg(test)]
mod brain_tests;
