//! Navigation: pathfinding provider для агентов
//!
//! Архитектура:
//! - `NavigationProvider`: внешний black-box (engine NavMesh в игре)
//! - `NavMesh` + `NavAgent`: headless реализация, прямоугольная walkable зона,
//!   круглые препятствия, движение по прямой
//! - `NavigationQuery`: SystemParam adapter (NavMesh + NavAgent query → trait)
//!
//! Агент сам не двигает Transform: только ставит destination.
//! `advance_navigation` двигает всех агентов раз в тик.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::perception::{planar, LineOfSight};

/// Поза агента (позиция + forward), источник: navigation provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPose {
    pub position: Vec3,
    pub forward: Vec3,
}

/// Pathfinding provider (внешний collaborator)
///
/// Владеет позой агента (как engine NavigationAgent владеет Transform),
/// ядро только запрашивает destination/rotation.
pub trait NavigationProvider {
    /// Найти walkable точку около `desired` (в радиусе `search_radius`) и
    /// отправить туда агента. `None` = no path, агент не двигается.
    fn request_destination(
        &mut self,
        agent: Entity,
        desired: Vec3,
        search_radius: f32,
    ) -> Option<Vec3>;

    /// Стоять на месте (destination = текущая позиция)
    fn hold_position(&mut self, agent: Entity);

    /// Агент дошёл (или destination нет)
    fn has_arrived(&self, agent: Entity) -> bool;

    /// Скорость движения агента. `false` если агента уже нет.
    fn set_speed(&mut self, agent: Entity, speed: f32) -> bool;

    /// Текущая поза. `None` если агента нет.
    fn pose(&self, agent: Entity) -> Option<AgentPose>;

    /// Повернуть агента к точке (yaw), `fraction` ∈ [0, 1]: доля slerp за тик
    fn face_towards(&mut self, agent: Entity, point: Vec3, fraction: f32);
}

/// Навигационный агент (headless аналог NavigationAgent3D)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Текущая цель движения (None = стоим)
    pub destination: Option<Vec3>,
    /// Скорость (м/с), выставляется PopulationRegistry
    pub speed: f32,
    /// Дистанция "дошли" (метры)
    pub stopping_distance: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            speed: 3.5,
            stopping_distance: 0.2,
        }
    }
}

impl NavAgent {
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }

    pub fn has_arrived(&self, position: Vec3) -> bool {
        match self.destination {
            None => true,
            Some(destination) => {
                planar(destination - position).length() <= self.stopping_distance
            }
        }
    }
}

/// Круглое препятствие (колонна, ящик): блокирует движение и обзор
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Центр (x, z)
    pub center: [f32; 2],
    pub radius: f32,
}

impl Obstacle {
    fn center(&self) -> Vec2 {
        Vec2::from_array(self.center)
    }

    fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center()) < self.radius
    }

    /// Пересекает ли отрезок from→to круг препятствия
    fn intersects_segment(&self, from: Vec2, to: Vec2) -> bool {
        let segment = to - from;
        let length_squared = segment.length_squared();
        let t = if length_squared <= f32::EPSILON {
            0.0
        } else {
            ((self.center() - from).dot(segment) / length_squared).clamp(0.0, 1.0)
        };
        let closest = from + segment * t;
        closest.distance(self.center()) < self.radius
    }
}

/// Конфиг headless navmesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavMeshConfig {
    /// Walkable прямоугольник: min (x, z)
    pub bounds_min: [f32; 2],
    /// Walkable прямоугольник: max (x, z)
    pub bounds_max: [f32; 2],
    pub obstacles: Vec<Obstacle>,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            bounds_min: [-40.0, -40.0],
            bounds_max: [40.0, 40.0],
            obstacles: Vec::new(),
        }
    }
}

/// Headless NavMesh resource
///
/// Walkable = внутри bounds и вне всех obstacles. Высота (Y) сохраняется
/// от запрошенной точки.
#[derive(Resource, Debug, Clone, Default)]
pub struct NavMesh {
    pub config: NavMeshConfig,
}

impl NavMesh {
    pub fn new(config: NavMeshConfig) -> Self {
        Self { config }
    }

    fn bounds(&self) -> (Vec2, Vec2) {
        (
            Vec2::from_array(self.config.bounds_min),
            Vec2::from_array(self.config.bounds_max),
        )
    }

    pub fn is_walkable(&self, point: Vec3) -> bool {
        let p = planar(point);
        let (min, max) = self.bounds();
        p.cmpge(min).all()
            && p.cmple(max).all()
            && !self.config.obstacles.iter().any(|o| o.contains(p))
    }

    /// Ближайшая walkable точка в радиусе `search_radius`
    ///
    /// Кандидаты: сама точка, clamp в bounds, выталкивание из препятствия.
    pub fn sample_walkable(&self, point: Vec3, search_radius: f32) -> Option<Vec3> {
        if self.is_walkable(point) {
            return Some(point);
        }

        let (min, max) = self.bounds();
        let mut candidate = planar(point).clamp(min, max);

        for obstacle in &self.config.obstacles {
            if obstacle.contains(candidate) {
                let away = (candidate - obstacle.center())
                    .try_normalize()
                    .unwrap_or(Vec2::X);
                candidate = obstacle.center() + away * (obstacle.radius + 0.01);
            }
        }

        let sampled = Vec3::new(candidate.x, point.y, candidate.y);
        let within_radius = planar(sampled - point).length() <= search_radius;

        (within_radius && self.is_walkable(sampled)).then_some(sampled)
    }
}

impl LineOfSight for NavMesh {
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool {
        let (a, b) = (planar(from), planar(to));
        self.config
            .obstacles
            .iter()
            .any(|obstacle| obstacle.intersects_segment(a, b))
    }
}

/// Yaw-поворот, при котором forward (-Z) смотрит вдоль `direction` (XZ)
pub fn yaw_towards(direction: Vec3) -> Option<Quat> {
    let flat = planar(direction);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y((-flat.x).atan2(-flat.y)))
}

/// SystemParam adapter: NavMesh + агенты → NavigationProvider
#[derive(SystemParam)]
pub struct NavigationQuery<'w, 's> {
    pub mesh: Res<'w, NavMesh>,
    pub agents: Query<'w, 's, (&'static mut Transform, &'static mut NavAgent)>,
}

impl NavigationProvider for NavigationQuery<'_, '_> {
    fn request_destination(
        &mut self,
        agent: Entity,
        desired: Vec3,
        search_radius: f32,
    ) -> Option<Vec3> {
        let point = self.mesh.sample_walkable(desired, search_radius)?;
        let Ok((_, mut nav)) = self.agents.get_mut(agent) else {
            return None;
        };
        nav.destination = Some(point);
        Some(point)
    }

    fn hold_position(&mut self, agent: Entity) {
        if let Ok((transform, mut nav)) = self.agents.get_mut(agent) {
            let position = transform.translation;
            if nav.destination != Some(position) {
                nav.destination = Some(position);
            }
        }
    }

    fn has_arrived(&self, agent: Entity) -> bool {
        self.agents
            .get(agent)
            .map(|(transform, nav)| nav.has_arrived(transform.translation))
            .unwrap_or(true)
    }

    fn set_speed(&mut self, agent: Entity, speed: f32) -> bool {
        match self.agents.get_mut(agent) {
            Ok((_, mut nav)) => {
                nav.speed = speed;
                true
            }
            Err(_) => false,
        }
    }

    fn pose(&self, agent: Entity) -> Option<AgentPose> {
        let (transform, _) = self.agents.get(agent).ok()?;
        Some(AgentPose {
            position: transform.translation,
            forward: transform.forward().as_vec3(),
        })
    }

    fn face_towards(&mut self, agent: Entity, point: Vec3, fraction: f32) {
        let Ok((mut transform, _)) = self.agents.get_mut(agent) else {
            return;
        };
        let Some(target_rotation) = yaw_towards(point - transform.translation) else {
            return;
        };
        transform.rotation = transform
            .rotation
            .slerp(target_rotation, fraction.clamp(0.0, 1.0));
    }
}

/// Система: движение агентов к destination (по прямой)
///
/// По прибытии destination сбрасывается. Если следующий шаг упирается в
/// препятствие: путь считается потерянным (destination = None).
pub fn advance_navigation(
    mut agents: Query<(&mut Transform, &mut NavAgent)>,
    mesh: Res<NavMesh>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut nav) in agents.iter_mut() {
        let Some(destination) = nav.destination else {
            continue;
        };

        let position = transform.translation;
        let to_destination = Vec3::new(destination.x - position.x, 0.0, destination.z - position.z);
        let distance = to_destination.length();

        if distance <= nav.stopping_distance {
            nav.destination = None;
            continue;
        }

        let step = (nav.speed * delta).min(distance);
        let next = position + to_destination / distance * step;

        if !mesh.is_walkable(next) {
            nav.destination = None;
            continue;
        }

        transform.translation = next;
    }
}

/// Navigation Plugin (NavMesh должен быть вставлен снаружи или через SimulationPlugin)
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavMesh>().add_systems(
            FixedUpdate,
            advance_navigation.in_set(crate::SimulationSet::Navigation),
        );
    }
}
