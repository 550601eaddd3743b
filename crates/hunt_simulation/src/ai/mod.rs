//! AI module: hunter perception/combat FSM
//!
//! Архитектура:
//! - `components`: HunterState, HunterConfig, HuntTarget, HidingZone
//! - `brain`: HunterBrain (чистый FSM шаг, без ECS)
//! - `systems`: ECS adapters (сбор Senses, исполнение HunterAction, concealment)

use bevy::prelude::*;

pub mod brain;
pub mod components;
pub mod systems;

// Re-export основных типов
pub use brain::{HunterAction, HunterBrain, Senses, TargetSighting};
pub use components::{
    HidingZone, HidingZoneConfig, HuntTarget, HunterConfig, HunterState, WanderPhase,
};
pub use systems::{hunter_fsm_tick, update_target_suppression};

/// AI Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. update_target_suppression (Perception): hiding zones → HuntTarget.is_suppressed
/// 2. hunter_fsm_tick (Brain): perception + FSM шаг + actions
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HuntTarget>()
            .register_type::<HidingZone>()
            .add_systems(
                FixedUpdate,
                (
                    update_target_suppression.in_set(crate::SimulationSet::Perception),
                    hunter_fsm_tick.in_set(crate::SimulationSet::Brain),
                ),
            );
    }
}
