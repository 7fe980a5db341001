//! Enemy spawning, enemy fire and off-screen cleanup

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, EntityId, GameEvent, GameState, SpawnTimer};
use crate::tuning::Tuning;

impl SpawnTimer {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            interval_ms: tuning.spawn_interval_ms,
            last_spawn_ms: 0.0,
        }
    }

    pub fn is_due(&self, now_ms: f64) -> bool {
        now_ms - self.last_spawn_ms >= self.interval_ms
    }

    /// Record a spawn at `now_ms` and tighten the interval toward the floor
    pub fn fire(&mut self, now_ms: f64, tuning: &Tuning) {
        self.last_spawn_ms = now_ms;
        self.interval_ms =
            (self.interval_ms - tuning.spawn_interval_step_ms).max(tuning.spawn_interval_min_ms);
    }
}

/// Spawn at most one enemy if the timer is due, however long the gap was
pub fn update_spawner(state: &mut GameState) -> Option<EntityId> {
    if !state.spawn_timer.is_due(state.clock_ms) {
        return None;
    }
    let id = spawn_enemy(state);
    let now = state.clock_ms;
    state.spawn_timer.fire(now, &state.tuning);
    Some(id)
}

/// Place an enemy just past the right edge at a random height, moving left
pub fn spawn_enemy(state: &mut GameState) -> EntityId {
    let margin = state.tuning.enemy_spawn_margin;
    let max_y = (state.tuning.height - margin).max(margin);
    let y = state.rng().random_range(margin..=max_y);

    let id = state.next_entity_id();
    state.enemies.push(Enemy {
        id,
        pos: Vec2::new(state.tuning.width + state.tuning.enemy_spawn_inset, y),
        vel: Vec2::new(state.tuning.enemy_speed, 0.0),
    });
    state.events.push(GameEvent::EnemySpawned { id });
    id
}

/// Each enemy has a small chance per tick to fire straight ahead
pub fn enemy_fire(state: &mut GameState) {
    let odds = state.tuning.enemy_fire_odds;
    let muzzles: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();
    for pos in muzzles {
        if state.rng().random_ratio(1, odds) {
            let muzzle = pos - Vec2::new(20.0, 0.0);
            let vel = Vec2::new(state.tuning.enemy_shot_speed, 0.0);
            state.spawn_hostile_shot(muzzle, vel);
        }
    }
}

/// Remove projectiles and enemies that have left the playfield
pub fn cull_offscreen(state: &mut GameState) {
    let margin = state.tuning.cull_margin;
    let (w, h) = (state.tuning.width, state.tuning.height);
    let inside = |pos: Vec2| {
        pos.x >= -margin && pos.x <= w + margin && pos.y >= -margin && pos.y <= h + margin
    };

    state.shots.retain(|s| inside(s.pos));
    state.hostile_shots.retain(|s| inside(s.pos));
    // Enemies enter from beyond the right edge, so only the far side counts
    state.enemies.retain(|e| e.pos.x >= -margin);
}
