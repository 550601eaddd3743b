//! Population: реестр агентов, на которых действуют escalation эффекты
//!
//! Архитектура:
//! - `PopulationRegistry` (Resource): множество entity + общий speed multiplier
//! - `SpeedSink`: куда registry пушит новую скорость (ECS adapter / test double)
//! - `PopulationMember` marker → автоматическая регистрация/удаление
//!
//! Effective speed = base_speed × speed_multiplier.
//! Multiplier абсолютный (×1.5 дважды = 1.5, не 2.25).

use std::collections::BTreeSet;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::HunterBrain;
use crate::navigation::NavAgent;

/// Получатель скорости (agent controller)
pub trait SpeedSink {
    /// `false` если агент уже не существует
    fn apply_speed(&mut self, agent: Entity, speed: f32) -> bool;
}

/// Параметры популяции
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Базовая скорость агентов (м/с)
    pub base_speed: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { base_speed: 3.5 }
    }
}

/// Реестр агентов
///
/// BTreeSet: детерминированный порядок обхода (Entity: Ord).
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PopulationRegistry {
    members: BTreeSet<Entity>,
    base_speed: f32,
    speed_multiplier: f32,
}

impl Default for PopulationRegistry {
    fn default() -> Self {
        Self::new(PopulationConfig::default().base_speed)
    }
}

impl PopulationRegistry {
    pub fn new(base_speed: f32) -> Self {
        Self {
            members: BTreeSet::new(),
            base_speed,
            speed_multiplier: 1.0,
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn effective_speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier
    }

    pub fn contains(&self, agent: Entity) -> bool {
        self.members.contains(&agent)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().copied()
    }

    /// Добавить агента (идемпотентно). Новичок сразу получает текущую скорость.
    ///
    /// Возвращает `false` если агент уже был зарегистрирован.
    pub fn register(&mut self, agent: Entity, sink: &mut impl SpeedSink) -> bool {
        if !self.members.insert(agent) {
            return false;
        }

        // false для ещё не применённого spawn: factory ставит скорость сама
        sink.apply_speed(agent, self.effective_speed());
        true
    }

    /// Удалить агента (идемпотентно)
    pub fn unregister(&mut self, agent: Entity) -> bool {
        self.members.remove(&agent)
    }

    /// Новый абсолютный multiplier → broadcast всем членам
    ///
    /// Агенты, которых уже нет (despawn между тиками), пропускаются молча.
    /// Возвращает сколько агентов получили скорость.
    pub fn set_speed_multiplier(&mut self, multiplier: f32, sink: &mut impl SpeedSink) -> usize {
        self.speed_multiplier = multiplier;
        let speed = self.effective_speed();

        let applied = self
            .members
            .iter()
            .filter(|&&agent| sink.apply_speed(agent, speed))
            .count();

        crate::logger::log(&format!(
            "PopulationRegistry: speed ×{} → {} m/s ({}/{} agents)",
            multiplier,
            speed,
            applied,
            self.members.len()
        ));
        applied
    }

    /// Multiplier → 1.0 (restart). Членство не трогаем.
    pub fn reset(&mut self, sink: &mut impl SpeedSink) -> usize {
        self.set_speed_multiplier(1.0, sink)
    }
}

/// Marker: агент участвует в популяции (авто-регистрация)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct PopulationMember;

/// SystemParam adapter: скорость охотникам (через HunterBrain) и прочим NavAgent
#[derive(SystemParam)]
pub struct PopulationQuery<'w, 's> {
    pub brains: Query<'w, 's, (Entity, &'static mut HunterBrain)>,
    pub movers: Query<'w, 's, &'static mut NavAgent, Without<HunterBrain>>,
}

impl SpeedSink for PopulationQuery<'_, '_> {
    fn apply_speed(&mut self, agent: Entity, speed: f32) -> bool {
        if let Ok((_, mut brain)) = self.brains.get_mut(agent) {
            brain.set_movement_speed(speed);
            return true;
        }
        if let Ok(mut nav) = self.movers.get_mut(agent) {
            nav.speed = speed;
            return true;
        }
        false
    }
}

impl PopulationQuery<'_, '_> {
    /// Пуль в залпе для одного охотника. `false` если его нет.
    pub fn set_weapon_spread(&mut self, agent: Entity, bullets: u32) -> bool {
        match self.brains.get_mut(agent) {
            Ok((_, mut brain)) => {
                brain.set_weapon_spread(bullets);
                true
            }
            Err(_) => false,
        }
    }

    /// Все живые охотники (порядок Entity: детерминированный)
    pub fn live_hunters(&self) -> Vec<Entity> {
        let mut hunters: Vec<Entity> = self.brains.iter().map(|(entity, _)| entity).collect();
        hunters.sort();
        hunters
    }
}

/// Система: PopulationMember added/removed → registry
pub fn track_population_membership(
    mut registry: ResMut<PopulationRegistry>,
    added: Query<Entity, Added<PopulationMember>>,
    mut removed: RemovedComponents<PopulationMember>,
    mut sink: PopulationQuery,
) {
    for entity in removed.read() {
        if registry.unregister(entity) {
            crate::logger::log(&format!("PopulationRegistry: {:?} left", entity));
        }
    }

    for entity in added.iter() {
        if registry.register(entity, &mut sink) {
            crate::logger::log(&format!("PopulationRegistry: {:?} joined", entity));
        }
    }
}

/// Population Plugin
pub struct PopulationPlugin;

impl Plugin for PopulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PopulationRegistry>()
            .register_type::<PopulationMember>()
            .add_systems(
                FixedUpdate,
                track_population_membership.in_set(crate::SimulationSet::Population),
            );
    }
}
