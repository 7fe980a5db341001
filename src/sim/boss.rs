//! Boss encounters
//!
//! A boss appears when the score crosses the threshold for the next encounter,
//! patrols vertically while firing at the player, and is torn down when its
//! health runs out. Only one boss can be live at a time.

use glam::Vec2;

use super::effects::{FlashTarget, cancel_flash, start_flash};
use super::state::{Boss, GameEvent, GameState, VerticalDirection};
use crate::tuning::Tuning;

/// Threshold growth per encounter once the explicit schedule runs out
const THRESHOLD_STEP: u64 = 3000;
/// Extra score demanded per encounter on top of the step
const THRESHOLD_BONUS: u64 = 1000;

/// Score needed to trigger encounter `encounter` (0 = first boss)
pub fn threshold_for(encounter: u32, schedule: &[u64]) -> u64 {
    match schedule.get(encounter as usize) {
        Some(&score) => score,
        None => {
            let n = encounter as u64;
            (n + 1) * THRESHOLD_STEP + n * THRESHOLD_BONUS
        }
    }
}

/// Health of boss `number` (1-based)
pub fn max_health_for(number: u32, tuning: &Tuning) -> u32 {
    tuning.boss_base_health + number.saturating_sub(1) * tuning.boss_health_step
}

/// Spawn the next boss if none is live and the score has reached its threshold
pub fn check_boss_spawn(state: &mut GameState) -> bool {
    if state.boss.is_some() || state.is_over() {
        return false;
    }
    let required = threshold_for(state.boss_number, &state.tuning.boss_thresholds);
    log::debug!(
        "Boss check: score={} required={} encounter={}",
        state.score,
        required,
        state.boss_number
    );
    if state.score < required {
        return false;
    }
    spawn_boss(state);
    true
}

/// Manual spawn trigger; ignored while a boss is live
pub fn force_spawn(state: &mut GameState) -> bool {
    if state.boss.is_some() {
        return false;
    }
    spawn_boss(state);
    true
}

/// Bring in the next boss. Callers guarantee no boss is live.
pub fn spawn_boss(state: &mut GameState) {
    debug_assert!(state.boss.is_none(), "boss already active");
    state.boss_number += 1;
    let number = state.boss_number;
    let max_health = max_health_for(number, &state.tuning);
    let id = state.next_entity_id();

    state.boss = Some(Boss {
        id,
        pos: Vec2::new(state.tuning.width * 0.7, state.tuning.height / 2.0),
        health: max_health,
        max_health,
        number,
        invulnerable: false,
        direction: VerticalDirection::Up,
        alpha: 1.0,
        last_shot_ms: None,
    });
    log::info!("Boss {} spawned with {} health", number, max_health);
    state.events.push(GameEvent::BossSpawned { number, max_health });
}

/// Patrol between the turn bounds and fire at the player on a fixed cadence
pub fn update_boss(state: &mut GameState, dt: f32) {
    let now = state.clock_ms;
    let target = state.player.pos;
    let tuning = &state.tuning;
    let Some(boss) = state.boss.as_mut() else {
        return;
    };

    let top = tuning.boss_turn_margin;
    let bottom = tuning.height - tuning.boss_turn_margin;
    match boss.direction {
        VerticalDirection::Up if boss.pos.y <= top => boss.direction = VerticalDirection::Down,
        VerticalDirection::Down if boss.pos.y >= bottom => boss.direction = VerticalDirection::Up,
        _ => {}
    }
    let vy = match boss.direction {
        VerticalDirection::Up => -tuning.boss_speed,
        VerticalDirection::Down => tuning.boss_speed,
    };
    let half = tuning.boss_hitbox().y / 2.0;
    boss.pos.y = (boss.pos.y + vy * dt).clamp(half, tuning.height - half);

    let due = boss
        .last_shot_ms
        .is_none_or(|last| now - last >= tuning.boss_fire_interval_ms);
    if !due {
        return;
    }
    boss.last_shot_ms = Some(now);
    let origin = boss.pos;
    let muzzle = origin - Vec2::new(20.0, 0.0);
    let aim = (target - origin).try_normalize().unwrap_or(Vec2::NEG_X);
    let vel = aim * tuning.boss_shot_speed;
    state.spawn_hostile_shot(muzzle, vel);
}

/// Outcome of a player shot reaching the boss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossHit {
    /// Boss was in its grace window; the shot passes through
    Ignored,
    Damaged { health: u32 },
    Defeated,
}

/// Apply one hit to the live boss
pub fn hit_boss(state: &mut GameState) -> BossHit {
    let Some(boss) = state.boss.as_mut() else {
        return BossHit::Ignored;
    };
    if boss.invulnerable {
        return BossHit::Ignored;
    }

    boss.health = boss.health.saturating_sub(1);
    let (health, max_health) = (boss.health, boss.max_health);
    state.events.push(GameEvent::BossDamaged { health, max_health });

    if health == 0 {
        defeat_boss(state);
        BossHit::Defeated
    } else {
        start_flash(state, FlashTarget::Boss);
        BossHit::Damaged { health }
    }
}

/// Award the bonus and remove the boss with everything attached to it
fn defeat_boss(state: &mut GameState) {
    let Some(boss) = state.boss.take() else {
        return;
    };
    cancel_flash(state, FlashTarget::Boss);
    let reward = state.tuning.boss_reward;
    state.award(reward);
    log::info!("Boss {} defeated, score {}", boss.number, state.score);
    state.events.push(GameEvent::BossDefeated {
        number: boss.number,
        reward,
    });
}

/// Fraction of health remaining, for the health bar
pub fn health_fraction(boss: &Boss) -> f32 {
    if boss.max_health == 0 {
        return 0.0;
    }
    boss.health as f32 / boss.max_health as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(5, Tuning::default())
    }

    #[test]
    fn test_threshold_schedule_then_formula() {
        let schedule = Tuning::default().boss_thresholds;
        assert_eq!(threshold_for(0, &schedule), 3000);
        assert_eq!(threshold_for(1, &schedule), 7000);
        assert_eq!(threshold_for(3, &schedule), 15000);
        assert_eq!(threshold_for(4, &schedule), 19000);
        assert_eq!(threshold_for(5, &schedule), 23000);
        assert_eq!(threshold_for(0, &[]), 3000);
    }

    #[test]
    fn test_max_health_grows() {
        let tuning = Tuning::default();
        assert_eq!(max_health_for(1, &tuning), 10);
        assert_eq!(max_health_for(2, &tuning), 15);
        for n in 1..20 {
            assert!(max_health_for(n + 1, &tuning) > max_health_for(n, &tuning));
        }
    }

    #[test]
    fn test_spawn_below_threshold_does_nothing() {
        let mut state = state();
        state.score = 2900;
        assert!(!check_boss_spawn(&mut state));
        assert!(state.boss.is_none());
    }

    #[test]
    fn test_spawn_at_threshold() {
        let mut state = state();
        state.score = 3000;
        assert!(check_boss_spawn(&mut state));
        let boss = state.boss.as_ref().unwrap();
        assert_eq!(boss.number, 1);
        assert_eq!(boss.max_health, 10);
        assert_eq!(boss.health, 10);
        assert_eq!(boss.pos, Vec2::new(560.0, 300.0));
        // Already active: no second boss
        assert!(!check_boss_spawn(&mut state));
        assert_eq!(state.boss_number, 1);
    }

    #[test]
    fn test_force_spawn_ignored_while_active() {
        let mut state = state();
        assert!(force_spawn(&mut state));
        assert!(!force_spawn(&mut state));
        assert_eq!(state.boss_number, 1);
    }

    #[test]
    fn test_patrol_reverses_at_bounds() {
        let mut state = state();
        spawn_boss(&mut state);
        state.boss.as_mut().unwrap().pos.y = 100.0;
        update_boss(&mut state, 0.1);
        let boss = state.boss.as_ref().unwrap();
        assert_eq!(boss.direction, VerticalDirection::Down);
        assert!(boss.pos.y > 100.0);

        state.boss.as_mut().unwrap().pos.y = 500.0;
        update_boss(&mut state, 0.1);
        assert_eq!(state.boss.as_ref().unwrap().direction, VerticalDirection::Up);
    }

    #[test]
    fn test_fires_at_player_on_interval() {
        let mut state = state();
        spawn_boss(&mut state);
        state.clock_ms = 10_000.0;
        update_boss(&mut state, 0.0);
        assert_eq!(state.hostile_shots.len(), 1);
        let shot = &state.hostile_shots[0];
        // Player sits to the left of the boss
        assert!(shot.vel.x < 0.0);
        assert!((shot.vel.length() - 300.0).abs() < 1e-3);

        state.clock_ms = 10_500.0;
        update_boss(&mut state, 0.0);
        assert_eq!(state.hostile_shots.len(), 1);

        state.clock_ms = 11_000.0;
        update_boss(&mut state, 0.0);
        assert_eq!(state.hostile_shots.len(), 2);
    }

    #[test]
    fn test_hit_starts_grace_window() {
        let mut state = state();
        spawn_boss(&mut state);
        assert_eq!(hit_boss(&mut state), BossHit::Damaged { health: 9 });
        assert_eq!(hit_boss(&mut state), BossHit::Ignored);
        assert_eq!(state.boss.as_ref().unwrap().health, 9);
    }

    #[test]
    fn test_final_hit_defeats_boss() {
        let mut state = state();
        state.score = 3000;
        check_boss_spawn(&mut state);
        state.boss.as_mut().unwrap().health = 1;

        assert_eq!(hit_boss(&mut state), BossHit::Defeated);
        assert!(state.boss.is_none());
        assert!(state.effects.is_empty());
        assert_eq!(state.score, 4000);
        // Next threshold is 7000, so nothing respawns yet
        assert!(!check_boss_spawn(&mut state));
        assert!(state.boss.is_none());
    }

    #[test]
    fn test_health_fraction() {
        let mut state = state();
        spawn_boss(&mut state);
        let boss = state.boss.as_mut().unwrap();
        boss.health = 5;
        assert!((health_fraction(boss) - 0.5).abs() < 1e-6);
    }
}
