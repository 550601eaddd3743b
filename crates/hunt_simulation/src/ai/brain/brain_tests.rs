//! Tests for the hunter state machine (без App, чистые шаги FSM).

use super::*;
use crate::perception::planar_angle_degrees;

const DT: f32 = 0.5;

fn config() -> HunterConfig {
    HunterConfig {
        detection_time: 1.5,
        shoot_cooldown: 2.0,
        wander_wait_time: 1.0,
        bullets_per_shot: 3,
        spread_angle: 10.0,
        ..Default::default()
    }
}

const TARGET: Vec3 = Vec3::new(0.0, 0.0, 8.0);

fn senses(target: Option<TargetSighting>, arrived: bool) -> Senses {
    Senses {
        position: Vec3::ZERO,
        forward: Vec3::Z,
        arrived,
        target,
    }
}

fn visible() -> Senses {
    senses(
        Some(TargetSighting {
            position: TARGET,
            visible: true,
        }),
        true,
    )
}

fn hidden() -> Senses {
    senses(
        Some(TargetSighting {
            position: TARGET,
            visible: false,
        }),
        true,
    )
}

fn volleys(actions: &[HunterAction]) -> Vec<Vec<Vec3>> {
    actions
        .iter()
        .filter_map(|a| match a {
            HunterAction::FireVolley { directions, .. } => Some(directions.clone()),
            _ => None,
        })
        .collect()
}

/// Довести brain до Engaging (Wandering → Alert → 3 тика по 0.5с)
fn engage(brain: &mut HunterBrain) -> Vec<HunterAction> {
    brain.tick(DT, &visible());
    brain.tick(DT, &visible());
    brain.tick(DT, &visible());
    brain.tick(DT, &visible())
}

#[test]
fn test_first_tick_requests_wander_destination() {
    let mut brain = HunterBrain::new(config());
    let actions = brain.tick(DT, &senses(None, true));

    assert_eq!(actions, vec![HunterAction::RequestWanderDestination]);
    assert_eq!(
        brain.state(),
        HunterState::Wandering {
            phase: WanderPhase::Moving
        }
    );
}

#[test]
fn test_wander_waits_at_arrival_then_requests_again() {
    let mut brain = HunterBrain::new(config());
    brain.tick(DT, &senses(None, false));

    // Ещё идём
    assert!(brain.tick(DT, &senses(None, false)).is_empty());

    // Дошли → ждём 1с
    assert!(brain.tick(DT, &senses(None, true)).is_empty());
    assert!(matches!(
        brain.state(),
        HunterState::Wandering {
            phase: WanderPhase::Waiting { .. }
        }
    ));

    assert!(brain.tick(DT, &senses(None, true)).is_empty());
    let actions = brain.tick(DT, &senses(None, true));
    assert_eq!(actions, vec![HunterAction::RequestWanderDestination]);
}

#[test]
fn test_wander_to_alert_on_perception() {
    let mut brain = HunterBrain::new(config());
    let actions = brain.tick(DT, &visible());

    assert_eq!(
        brain.state(),
        HunterState::Alert {
            detection_progress: 0.0
        }
    );
    assert!(actions.contains(&HunterAction::HoldPosition));
    assert!(actions
        .iter()
        .any(|a| matches!(a, HunterAction::FaceTowards { point, .. } if *point == TARGET)));
}

#[test]
fn test_perception_checked_in_every_wander_phase() {
    let mut brain = HunterBrain::new(config());
    brain.tick(DT, &senses(None, true));
    brain.tick(DT, &senses(None, true));
    assert!(matches!(
        brain.state(),
        HunterState::Wandering {
            phase: WanderPhase::Waiting { .. }
        }
    ));

    brain.tick(DT, &visible());
    assert!(matches!(brain.state(), HunterState::Alert { .. }));
}

#[test]
fn test_alert_accumulates_and_resets_on_loss() {
    let mut brain = HunterBrain::new(config());
    brain.tick(DT, &visible());
    brain.tick(DT, &visible());
    assert_eq!(brain.detection_progress(), 0.5);

    brain.tick(DT, &hidden());
    assert!(matches!(brain.state(), HunterState::Wandering { .. }));
    assert_eq!(brain.detection_progress(), 0.0);

    // Заново с нуля
    brain.tick(DT, &visible());
    assert_eq!(brain.detection_progress(), 0.0);
}

#[test]
fn test_round_trip_wander_alert_engage_wander() {
    let mut brain = HunterBrain::new(config());

    brain.tick(DT, &visible()); // → Alert(0.0)
    assert!(volleys(&brain.tick(DT, &visible())).is_empty()); // 0.5
    assert!(volleys(&brain.tick(DT, &visible())).is_empty()); // 1.0
    let actions = brain.tick(DT, &visible()); // 1.5 → Engaging

    assert!(matches!(brain.state(), HunterState::Engaging { .. }));
    let fired = volleys(&actions);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].len(), 3);

    // Веер симметричен вокруг прямой на цель
    let origin = Vec3::Y * brain.config.muzzle_height;
    let straight = TARGET - origin;
    let mut angles: Vec<f32> = fired[0]
        .iter()
        .map(|d| planar_angle_degrees(straight, *d).unwrap_or(f32::NAN))
        .collect();
    angles.sort_by(|a, b| a.total_cmp(b));
    assert!(angles[0].abs() < 1e-3);
    assert!((angles[1] - 10.0).abs() < 1e-3);
    assert!((angles[2] - 10.0).abs() < 1e-3);

    // Cooldown 2.0с: 3 тика в Engaging, на 4-м возврат
    for _ in 0..3 {
        assert!(volleys(&brain.tick(DT, &visible())).is_empty());
        assert!(matches!(brain.state(), HunterState::Engaging { .. }));
    }
    brain.tick(DT, &visible());
    assert!(matches!(brain.state(), HunterState::Wandering { .. }));
    assert_eq!(brain.detection_progress(), 0.0);
}

#[test]
fn test_engaging_ignores_perception() {
    let mut brain = HunterBrain::new(config());
    engage(&mut brain);
    assert!(!brain.is_perceiving());

    // Цель пропала из виду: всё равно держим атаку
    brain.tick(DT, &hidden());
    assert!(matches!(brain.state(), HunterState::Engaging { .. }));
}

#[test]
fn test_engaging_returns_to_wandering_even_if_target_visible() {
    let mut brain = HunterBrain::new(config());
    engage(&mut brain);
    for _ in 0..4 {
        brain.tick(DT, &visible());
    }

    // Не перепрыгиваем в Engaging: сначала Wandering, потом Alert заново
    assert!(matches!(brain.state(), HunterState::Wandering { .. }));
    brain.tick(DT, &visible());
    assert_eq!(
        brain.state(),
        HunterState::Alert {
            detection_progress: 0.0
        }
    );
}

#[test]
fn test_target_unavailable_falls_back_to_wandering() {
    let mut brain = HunterBrain::new(config());
    brain.tick(DT, &visible());
    brain.tick(DT, &senses(None, true));
    assert!(matches!(brain.state(), HunterState::Wandering { .. }));

    let mut brain = HunterBrain::new(config());
    engage(&mut brain);
    brain.tick(DT, &senses(None, true));
    assert!(matches!(brain.state(), HunterState::Wandering { .. }));
}

#[test]
fn test_weapon_spread_applies_to_next_attack_only() {
    let mut brain = HunterBrain::new(config());
    let first = engage(&mut brain);
    assert_eq!(volleys(&first)[0].len(), 3);

    brain.set_weapon_spread(5);
    assert_eq!(brain.bullets_per_shot(), 5);
    // Текущая атака продолжается без нового залпа
    assert!(volleys(&brain.tick(DT, &visible())).is_empty());

    for _ in 0..3 {
        brain.tick(DT, &visible());
    }
    assert!(matches!(brain.state(), HunterState::Wandering { .. }));

    let second = engage(&mut brain);
    assert_eq!(volleys(&second)[0].len(), 5);
}

#[test]
fn test_weapon_spread_zero_clamped() {
    let mut brain = HunterBrain::new(config());
    brain.set_weapon_spread(0);
    assert_eq!(brain.bullets_per_shot(), 1);
}

#[test]
fn test_movement_speed_does_not_interrupt_state() {
    let mut brain = HunterBrain::new(config());
    brain.tick(DT, &visible());
    brain.tick(DT, &visible());

    brain.set_movement_speed(7.0);
    assert_eq!(brain.movement_speed(), Some(7.0));

    let actions = brain.tick(DT, &visible());
    assert_eq!(actions.first(), Some(&HunterAction::ApplySpeed(7.0)));
    assert_eq!(brain.detection_progress(), 1.0);

    // Speed применяется один раз
    let actions = brain.tick(DT, &visible());
    assert!(!actions.iter().any(|a| matches!(a, HunterAction::ApplySpeed(_))));
}
