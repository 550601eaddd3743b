//! Escalation thresholds и эффекты (конфиг + one-shot состояние).

use serde::{Deserialize, Serialize};

/// Эффект escalation (tagged в JSON: `{"kind": "spawn_agents", "count": 2}`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationEffect {
    /// Заспавнить `count` охотников (spawn points по кругу)
    SpawnAgents { count: u32 },
    /// Абсолютный multiplier скорости популяции
    ScalePopulationSpeed { multiplier: f32 },
    /// Пуль в залпе: всем живым охотникам + будущим спавнам
    SetWeaponSpread { bullets: u32 },
}

impl EscalationEffect {
    pub fn name(&self) -> &'static str {
        match self {
            EscalationEffect::SpawnAgents { .. } => "SpawnAgents",
            EscalationEffect::ScalePopulationSpeed { .. } => "ScalePopulationSpeed",
            EscalationEffect::SetWeaponSpread { .. } => "SetWeaponSpread",
        }
    }
}

/// One-shot порог: срабатывает один раз, когда score пересекает `score`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub score: u32,
    pub effect: EscalationEffect,
    /// Runtime состояние, в конфиг не пишется
    #[serde(skip)]
    has_fired: bool,
}

impl Threshold {
    pub fn new(score: u32, effect: EscalationEffect) -> Self {
        Self {
            score,
            effect,
            has_fired: false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.has_fired
    }

    /// old < score ≤ new
    pub fn is_crossed(&self, old: u32, new: u32) -> bool {
        old < self.score && self.score <= new
    }

    /// Пометить сработавшим если пересечён и ещё не срабатывал
    pub fn try_fire(&mut self, old: u32, new: u32) -> Option<EscalationEffect> {
        if self.has_fired || !self.is_crossed(old, new) {
            return None;
        }
        self.has_fired = true;
        Some(self.effect)
    }

    pub fn reset(&mut self) {
        self.has_fired = false;
    }
}

/// Конфиг escalation (часть SimulationConfig)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Пороги в порядке сканирования
    pub thresholds: Vec<Threshold>,
    /// Точки спавна (x, y, z), round-robin
    pub spawn_points: Vec<[f32; 3]>,
    /// Радиус поиска walkable точки около spawn point
    pub spawn_search_radius: f32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                Threshold::new(5, EscalationEffect::SpawnAgents { count: 1 }),
                Threshold::new(10, EscalationEffect::ScalePopulationSpeed { multiplier: 1.25 }),
                Threshold::new(15, EscalationEffect::SetWeaponSpread { bullets: 3 }),
                Threshold::new(20, EscalationEffect::SpawnAgents { count: 2 }),
                Threshold::new(25, EscalationEffect::ScalePopulationSpeed { multiplier: 1.5 }),
            ],
            spawn_points: vec![[-20.0, 0.0, -20.0], [20.0, 0.0, -20.0], [0.0, 0.0, 20.0]],
            spawn_search_radius: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_crossing_bounds() {
        let threshold = Threshold::new(5, EscalationEffect::SpawnAgents { count: 1 });
        assert!(threshold.is_crossed(4, 5));
        assert!(threshold.is_crossed(0, 12));
        assert!(!threshold.is_crossed(5, 6));
        assert!(!threshold.is_crossed(3, 4));
    }

    #[test]
    fn test_threshold_fires_once() {
        let mut threshold = Threshold::new(5, EscalationEffect::SetWeaponSpread { bullets: 2 });
        assert!(threshold.try_fire(4, 6).is_some());
        assert!(threshold.try_fire(4, 6).is_none());

        threshold.reset();
        assert!(!threshold.has_fired());
        assert!(threshold.try_fire(0, 5).is_some());
    }

    #[test]
    fn test_threshold_json_tagged_effect() {
        let json = r#"[
            {"score": 5, "effect": {"kind": "spawn_agents", "count": 2}},
            {"score": 10, "effect": {"kind": "scale_population_speed", "multiplier": 1.5}},
            {"score": 15, "effect": {"kind": "set_weapon_spread", "bullets": 3}}
        ]"#;
        let parsed: Result<Vec<Threshold>, _> = serde_json::from_str(json);
        let Ok(thresholds) = parsed else {
            panic!("thresholds should parse: {:?}", parsed.err());
        };

        assert_eq!(
            thresholds,
            vec![
                Threshold::new(5, EscalationEffect::SpawnAgents { count: 2 }),
                Threshold::new(10, EscalationEffect::ScalePopulationSpeed { multiplier: 1.5 }),
                Threshold::new(15, EscalationEffect::SetWeaponSpread { bullets: 3 }),
            ]
        );
        assert!(thresholds.iter().all(|t| !t.has_fired()));
    }

    #[test]
    fn test_unknown_effect_kind_rejected() {
        let json = r#"{"score": 1, "effect": {"kind": "explode"}}"#;
        assert!(serde_json::from_str::<Threshold>(json).is_err());
    }
}
