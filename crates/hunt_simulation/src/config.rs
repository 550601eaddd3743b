//! SimulationConfig: вся настройка симуляции одним JSON файлом
//!
//! Каждая секция `#[serde(default)]`: пустой `{}` = играбельный default.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{HidingZoneConfig, HunterConfig};
use crate::combat::ProjectileConfig;
use crate::escalation::{EscalationConfig, EscalationEffect};
use crate::navigation::NavMeshConfig;
use crate::perception::PerceptionConfig;
use crate::population::PopulationConfig;

/// Ошибки загрузки конфига
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Корневой конфиг
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Частота FixedUpdate (Гц)
    pub tick_hz: f64,
    pub hunter: HunterConfig,
    pub perception: PerceptionConfig,
    pub population: PopulationConfig,
    pub projectile: ProjectileConfig,
    pub navigation: NavMeshConfig,
    pub escalation: EscalationConfig,
    /// Стартовые позиции охотников (x, y, z)
    pub initial_hunters: Vec<[f32; 3]>,
    pub hiding_zones: Vec<HidingZoneConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_hz: 60.0,
            hunter: HunterConfig::default(),
            perception: PerceptionConfig::default(),
            population: PopulationConfig::default(),
            projectile: ProjectileConfig::default(),
            navigation: NavMeshConfig::default(),
            escalation: EscalationConfig::default(),
            initial_hunters: vec![[-10.0, 0.0, -10.0], [10.0, 0.0, 10.0]],
            hiding_zones: vec![HidingZoneConfig {
                center: [0.0, 0.0, -15.0],
                radius: 3.0,
            }],
        }
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Проверка значений, которые serde пропускает
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tick_hz must be positive, got {}",
                self.tick_hz
            )));
        }

        positive("hunter.detection_time", self.hunter.detection_time)?;
        positive("hunter.shoot_cooldown", self.hunter.shoot_cooldown)?;
        positive("hunter.wander_radius", self.hunter.wander_radius)?;
        positive("perception.range", self.perception.range)?;
        positive("perception.half_angle_degrees", self.perception.half_angle_degrees)?;
        positive("population.base_speed", self.population.base_speed)?;
        positive("projectile.speed", self.projectile.speed)?;
        positive("projectile.lifetime", self.projectile.lifetime)?;

        if self.hunter.wander_wait_time < 0.0 {
            return Err(ConfigError::Invalid(
                "hunter.wander_wait_time must not be negative".into(),
            ));
        }
        if self.hunter.bullets_per_shot == 0 {
            return Err(ConfigError::Invalid(
                "hunter.bullets_per_shot must be at least 1".into(),
            ));
        }

        let (min, max) = (self.navigation.bounds_min, self.navigation.bounds_max);
        if min[0] > max[0] || min[1] > max[1] {
            return Err(ConfigError::Invalid(format!(
                "navigation bounds are inverted: {:?} > {:?}",
                min, max
            )));
        }

        for threshold in &self.escalation.thresholds {
            match threshold.effect {
                EscalationEffect::SpawnAgents { count: 0 } => {
                    return Err(ConfigError::Invalid(format!(
                        "threshold {}: spawn count must be at least 1",
                        threshold.score
                    )));
                }
                EscalationEffect::ScalePopulationSpeed { multiplier } => {
                    positive(&format!("threshold {} multiplier", threshold.score), multiplier)?;
                }
                EscalationEffect::SetWeaponSpread { bullets: 0 } => {
                    return Err(ConfigError::Invalid(format!(
                        "threshold {}: weapon spread must be at least 1",
                        threshold.score
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn initial_hunter_positions(&self) -> Vec<Vec3> {
        self.initial_hunters.iter().copied().map(Vec3::from_array).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = SimulationConfig::from_json_str("{}");
        assert_eq!(config.ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "seed": 7,
            "hunter": { "detection_time": 0.5 },
            "escalation": {
                "thresholds": [
                    {"score": 3, "effect": {"kind": "set_weapon_spread", "bullets": 2}}
                ],
                "spawn_points": [[1.0, 0.0, 1.0]]
            }
        }"#;
        let Ok(config) = SimulationConfig::from_json_str(json) else {
            panic!("config should parse");
        };

        assert_eq!(config.seed, 7);
        assert_eq!(config.hunter.detection_time, 0.5);
        assert_eq!(config.hunter.shoot_cooldown, HunterConfig::default().shoot_cooldown);
        assert_eq!(config.escalation.thresholds.len(), 1);
        assert_eq!(config.escalation.spawn_search_radius, 3.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            r#"{"tick_hz": 0}"#,
            r#"{"perception": {"range": -1}}"#,
            r#"{"hunter": {"bullets_per_shot": 0}}"#,
            r#"{"escalation": {"thresholds": [{"score": 1, "effect": {"kind": "spawn_agents", "count": 0}}]}}"#,
            r#"{"escalation": {"thresholds": [{"score": 1, "effect": {"kind": "scale_population_speed", "multiplier": 0}}]}}"#,
            r#"{"navigation": {"bounds_min": [5, 5], "bounds_max": [0, 0]}}"#,
        ];

        for json in cases {
            assert!(
                matches!(SimulationConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "expected Invalid for {}",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimulationConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimulationConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_thresholds() {
        let config = SimulationConfig::default();
        let Ok(json) = config.to_json_pretty() else {
            panic!("serialize failed");
        };
        let parsed = SimulationConfig::from_json_str(&json).ok();
        assert_eq!(parsed, Some(config));
    }
}
