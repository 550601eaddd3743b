//! EscalationEngine: score thresholds → эффекты над живой популяцией
//!
//! Engine не владеет ни охотниками, ни registry: всё приходит параметрами
//! (`PopulationRegistry` + `EscalationHost`). Так его можно гонять без App.

use bevy::prelude::*;
use thiserror::Error;

use super::threshold::{EscalationConfig, EscalationEffect, Threshold};
use crate::population::{PopulationRegistry, SpeedSink};

/// Ошибки спавна (логируются, эффект становится no-op)
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    #[error("no agent factory configured")]
    NoFactory,
    #[error("no spawn points configured")]
    NoSpawnPoints,
}

/// Параметры нового охотника
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSpawn {
    pub position: Vec3,
    /// Текущая effective speed популяции
    pub speed: f32,
    /// Активный weapon spread (None = default, не трогаем)
    pub bullets_per_shot: Option<u32>,
}

/// Мир, над которым работают эффекты (agent factory + navigation + live agents)
pub trait EscalationHost: SpeedSink {
    /// Walkable точка около `point` (None = нет)
    fn sample_walkable(&self, point: Vec3, search_radius: f32) -> Option<Vec3>;

    /// Создать охотника со свежим FSM
    fn create_agent(&mut self, spawn: AgentSpawn) -> Result<Entity, SpawnError>;

    /// Пуль в залпе для одного охотника. `false` если его нет.
    fn set_weapon_spread(&mut self, agent: Entity, bullets: u32) -> bool;

    /// Все живые охотники
    fn live_agents(&self) -> Vec<Entity>;
}

/// Escalation engine resource
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EscalationEngine {
    thresholds: Vec<Threshold>,
    spawn_points: Vec<Vec3>,
    spawn_search_radius: f32,
    next_spawn_index: usize,
    /// Spread из последнего SetWeaponSpread (None = не задавался)
    weapon_spread: Option<u32>,
}

impl Default for EscalationEngine {
    fn default() -> Self {
        Self::new(EscalationConfig::default())
    }
}

impl EscalationEngine {
    pub const DEFAULT_WEAPON_SPREAD: u32 = 1;

    pub fn new(config: EscalationConfig) -> Self {
        let mut thresholds = config.thresholds;
        thresholds.iter_mut().for_each(Threshold::reset);

        Self {
            thresholds,
            spawn_points: config.spawn_points.into_iter().map(Vec3::from_array).collect(),
            spawn_search_radius: config.spawn_search_radius,
            next_spawn_index: 0,
            weapon_spread: None,
        }
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    /// Активный spread (`DEFAULT_WEAPON_SPREAD` пока эффект не срабатывал)
    pub fn weapon_spread(&self) -> u32 {
        self.weapon_spread.unwrap_or(Self::DEFAULT_WEAPON_SPREAD)
    }

    /// Spread для новых охотников: только явно заданный эффектом
    pub fn spawn_weapon_spread(&self) -> Option<u32> {
        self.weapon_spread
    }

    pub fn next_spawn_index(&self) -> usize {
        self.next_spawn_index
    }

    /// Пометить и вернуть все пороги, пересечённые old → new (в порядке списка)
    pub fn fired_effects(&mut self, old: u32, new: u32) -> Vec<EscalationEffect> {
        self.thresholds
            .iter_mut()
            .filter_map(|threshold| {
                let effect = threshold.try_fire(old, new)?;
                crate::logger::log_info(&format!(
                    "🔥 Escalation: threshold {} fired ({} → {}): {}",
                    threshold.score,
                    old,
                    new,
                    effect.name()
                ));
                Some(effect)
            })
            .collect()
    }

    /// Обработать изменение score: scan + dispatch
    ///
    /// Возвращает сработавшие эффекты (для логов/тестов).
    pub fn handle_score_changed(
        &mut self,
        old: u32,
        new: u32,
        registry: &mut PopulationRegistry,
        host: &mut impl EscalationHost,
    ) -> Vec<EscalationEffect> {
        let effects = self.fired_effects(old, new);
        for effect in &effects {
            self.dispatch(*effect, registry, host);
        }
        effects
    }

    /// Выполнить эффект
    pub fn dispatch(
        &mut self,
        effect: EscalationEffect,
        registry: &mut PopulationRegistry,
        host: &mut impl EscalationHost,
    ) {
        match effect {
            EscalationEffect::SpawnAgents { count } => {
                let spawned = self.spawn_agents(count, registry, host);
                crate::logger::log(&format!(
                    "Escalation: spawned {}/{} hunters",
                    spawned.len(),
                    count
                ));
            }
            EscalationEffect::ScalePopulationSpeed { multiplier } => {
                registry.set_speed_multiplier(multiplier, host);
            }
            EscalationEffect::SetWeaponSpread { bullets } => {
                self.set_weapon_spread(bullets, host);
            }
        }
    }

    /// Спавн `count` охотников по spawn points (round-robin)
    ///
    /// При ошибке factory спавн прерывается, индекс не сдвигается.
    pub fn spawn_agents(
        &mut self,
        count: u32,
        registry: &mut PopulationRegistry,
        host: &mut impl EscalationHost,
    ) -> Vec<Entity> {
        let mut spawned = Vec::new();

        if self.spawn_points.is_empty() {
            crate::logger::log_error(&format!("Escalation: {}", SpawnError::NoSpawnPoints));
            return spawned;
        }

        for _ in 0..count {
            let spawn_point = self.spawn_points[self.next_spawn_index % self.spawn_points.len()];
            let position = host
                .sample_walkable(spawn_point, self.spawn_search_radius)
                .unwrap_or(spawn_point);

            let spawn = AgentSpawn {
                position,
                speed: registry.effective_speed(),
                bullets_per_shot: self.weapon_spread,
            };

            match host.create_agent(spawn) {
                Ok(agent) => {
                    self.next_spawn_index = (self.next_spawn_index + 1) % self.spawn_points.len();
                    registry.register(agent, host);
                    spawned.push(agent);
                }
                Err(error) => {
                    crate::logger::log_error(&format!("Escalation: spawn skipped: {}", error));
                    break;
                }
            }
        }

        spawned
    }

    /// Новый default для спавнов + broadcast всем живым охотникам
    ///
    /// Возвращает число охотников, которым spread реально применён.
    pub fn set_weapon_spread(&mut self, bullets: u32, host: &mut impl EscalationHost) -> usize {
        if bullets == 0 {
            crate::logger::log_warning("Escalation: weapon spread 0 clamped to 1");
        }
        let bullets = bullets.max(1);
        self.weapon_spread = Some(bullets);

        let applied = host
            .live_agents()
            .into_iter()
            .filter(|agent| host.set_weapon_spread(*agent, bullets))
            .count();
        crate::logger::log(&format!(
            "Escalation: weapon spread {} applied to {} hunters",
            bullets, applied
        ));
        applied
    }

    /// New game: пороги, round-robin, registry multiplier, weapon spread → default
    pub fn reset_all(&mut self, registry: &mut PopulationRegistry, sink: &mut impl SpeedSink) {
        self.thresholds.iter_mut().for_each(Threshold::reset);
        self.next_spawn_index = 0;
        self.weapon_spread = None;
        registry.reset(sink);
        crate::logger::log_info("Escalation: reset");
    }
}
