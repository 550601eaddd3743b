//! Progress: счёт игрока и уведомления об изменении
//!
//! Архитектура:
//! - `ProgressTracker` (Resource): score + список подписчиков
//! - `ScoreAwarded` event (вход) → `apply_score_awards` → `ScoreChanged` event (выход)
//! - Подписчики вызываются синхронно, в порядке подписки
//!
//! Подписчик не должен вызывать `add_score` из своего handler (re-entrant
//! threshold scan). Ошибка одного подписчика логируется, остальные получают
//! уведомление.

use bevy::prelude::*;
use thiserror::Error;

/// Начислить очки (вход от gameplay: подбор предмета, выполнение цели)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAwarded {
    pub points: u32,
}

/// Score изменился (old < new)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged {
    pub old: u32,
    pub new: u32,
}

/// Ошибка подписчика (не прерывает рассылку)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("score listener failed: {0}")]
pub struct ScoreListenerError(pub String);

/// Handle для отписки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

type ScoreListener = Box<dyn FnMut(ScoreChanged) -> Result<(), ScoreListenerError> + Send + Sync>;

/// Score tracker
#[derive(Resource, Default)]
pub struct ProgressTracker {
    score: u32,
    next_handle: u64,
    listeners: Vec<(SubscriptionHandle, ScoreListener)>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("score", &self.score)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ProgressTracker {
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Добавить очки
    ///
    /// `points == 0`: no-op без уведомления. Переполнение насыщается на u32::MAX.
    pub fn add_score(&mut self, points: u32) -> Option<ScoreChanged> {
        let old = self.score;
        let new = old.saturating_add(points);
        if new == old {
            return None;
        }

        self.score = new;
        let change = ScoreChanged { old, new };

        for (handle, listener) in self.listeners.iter_mut() {
            if let Err(error) = listener(change) {
                crate::logger::log_error(&format!(
                    "ProgressTracker: listener {:?} failed on {} → {}: {}",
                    handle, old, new, error
                ));
            }
        }

        Some(change)
    }

    /// Подписаться на изменения score
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionHandle
    where
        F: FnMut(ScoreChanged) -> Result<(), ScoreListenerError> + Send + Sync + 'static,
    {
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Отписаться. `false` если handle неизвестен.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    /// Score → 0 без уведомлений (restart). Подписки сохраняются.
    pub fn reset(&mut self) {
        self.score = 0;
    }
}

/// Система: ScoreAwarded → tracker → ScoreChanged
pub fn apply_score_awards(
    mut tracker: ResMut<ProgressTracker>,
    mut awards: EventReader<ScoreAwarded>,
    mut changes: EventWriter<ScoreChanged>,
) {
    for award in awards.read() {
        if let Some(change) = tracker.add_score(award.points) {
            crate::logger::log_info(&format!(
                "⭐ Score {} → {} (+{})",
                change.old, change.new, award.points
            ));
            changes.write(change);
        }
    }
}

/// Progress Plugin
pub struct ProgressPlugin;

impl Plugin for ProgressPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProgressTracker>()
            .add_event::<ScoreAwarded>()
            .add_event::<ScoreChanged>()
            .add_systems(
                FixedUpdate,
                apply_score_awards.in_set(crate::SimulationSet::Progress),
            );
    }
}
