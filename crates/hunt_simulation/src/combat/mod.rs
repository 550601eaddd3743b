//! Combat module: залпы охотников и headless пули
//!
//! ECS ответственность:
//! - Volley geometry (spread_offsets / spread_directions)
//! - Projectile lifecycle: spawn → полёт → hit / timeout
//! - Events: ProjectileFired, TargetHit
//!
//! Damage/health цели: внешний lifecycle, здесь только TargetHit.

use bevy::prelude::*;

pub mod projectile;
pub mod weapon;

pub use projectile::{advance_projectiles, Projectile, ProjectileSpawner};
pub use weapon::{
    spread_directions, spread_offsets, ProjectileConfig, ProjectileFactory, ProjectileFired,
    TargetHit,
};

/// Combat Plugin
///
/// Порядок: пули двигаются после того как HunterBrain их выпустил (SimulationSet::Combat).
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ProjectileFired>()
            .add_event::<TargetHit>()
            .init_resource::<ProjectileConfig>()
            .add_systems(
                FixedUpdate,
                advance_projectiles.in_set(crate::SimulationSet::Combat),
            );
    }
}
