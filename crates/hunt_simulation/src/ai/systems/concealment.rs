//! Concealment: HidingZone → HuntTarget.is_suppressed

use bevy::prelude::*;

use crate::ai::{HidingZone, HuntTarget};
use crate::perception::planar;

/// Система: цель внутри любой HidingZone (по XZ) считается подавленной
///
/// Пишет только при изменении флага (Changed<HuntTarget> не шумит).
pub fn update_target_suppression(
    mut targets: Query<(&Transform, &mut HuntTarget)>,
    zones: Query<(&Transform, &HidingZone), Without<HuntTarget>>,
) {
    for (transform, mut target) in targets.iter_mut() {
        let hidden = zones.iter().any(|(zone_transform, zone)| {
            planar(transform.translation - zone_transform.translation).length() <= zone.radius
        });

        if target.is_suppressed != hidden {
            crate::logger::log(&format!(
                "Target {} hiding zone",
                if hidden { "entered" } else { "left" }
            ));
            target.is_suppressed = hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_zone() -> App {
        let mut app = App::new();
        app.add_systems(Update, update_target_suppression);
        app.world_mut().spawn((
            Transform::from_xyz(5.0, 0.0, 5.0),
            HidingZone { radius: 2.0 },
        ));
        app
    }

    #[test]
    fn test_target_inside_zone_suppressed() {
        let mut app = app_with_zone();
        let target = app
            .world_mut()
            .spawn((Transform::from_xyz(5.5, 3.0, 4.0), HuntTarget::default()))
            .id();

        app.update();

        let suppressed = app.world().get::<HuntTarget>(target).map(|t| t.is_suppressed);
        assert_eq!(suppressed, Some(true));
    }

    #[test]
    fn test_target_leaving_zone_unsuppressed() {
        let mut app = app_with_zone();
        let target = app
            .world_mut()
            .spawn((Transform::from_xyz(5.0, 0.0, 5.0), HuntTarget::default()))
            .id();
        app.update();

        if let Some(mut transform) = app.world_mut().get_mut::<Transform>(target) {
            transform.translation = Vec3::new(-5.0, 0.0, 0.0);
        }
        app.update();

        let suppressed = app.world().get::<HuntTarget>(target).map(|t| t.is_suppressed);
        assert_eq!(suppressed, Some(false));
    }
}
