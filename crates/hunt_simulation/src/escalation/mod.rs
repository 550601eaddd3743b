//! Escalation: score thresholds мутируют живую популяцию охотников
//!
//! Data flow:
//! ScoreAwarded → ProgressTracker → ScoreChanged → EscalationEngine
//!   → (spawn через HunterFactory | PopulationRegistry speed | weapon spread broadcast)
//!
//! Существующие охотники не пересоздаются: эффекты меняют их на месте.

use bevy::prelude::*;

pub mod engine;
pub mod systems;
pub mod threshold;

pub use engine::{AgentSpawn, EscalationEngine, EscalationHost, SpawnError};
pub use systems::{
    escalate_on_score_change, restart_on_request, spawn_initial_hunters, EscalationWorld,
    HunterFactory, InitialHunters, RestartRequested,
};
pub use threshold::{EscalationConfig, EscalationEffect, Threshold};

/// Escalation Plugin
///
/// EscalationEngine/HunterFactory вставляются снаружи (SimulationPlugin из конфига),
/// здесь только default если их нет.
pub struct EscalationPlugin;

impl Plugin for EscalationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EscalationEngine>()
            .add_event::<RestartRequested>()
            .add_systems(Startup, spawn_initial_hunters)
            .add_systems(
                FixedUpdate,
                (escalate_on_score_change, restart_on_request)
                    .chain()
                    .in_set(crate::SimulationSet::Escalation),
            );
    }
}
