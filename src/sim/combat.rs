//! Combat resolution
//!
//! Turns the tick's overlap list into damage, destruction and score.

use super::boss::{check_boss_spawn, hit_boss};
use super::collision::{Overlap, OverlapKind};
use super::effects::{FlashTarget, start_flash};
use super::state::{EntityId, GameEvent, GameState, HitAbsorb};

/// Resolve every overlap in order. Pairs whose entities were already destroyed
/// earlier in the tick are skipped, and nothing is processed after game over.
pub fn resolve(state: &mut GameState, overlaps: &[Overlap]) {
    for overlap in overlaps {
        if state.is_over() {
            break;
        }
        match overlap.kind {
            OverlapKind::ShotEnemy => shot_hits_enemy(state, overlap.a, overlap.b),
            OverlapKind::PlayerEnemy => {
                if state.enemies.iter().any(|e| e.id == overlap.b) && hit_player(state) {
                    state.enemies.retain(|e| e.id != overlap.b);
                }
            }
            OverlapKind::PlayerHostileShot => {
                if state.hostile_shots.iter().any(|s| s.id == overlap.b) && hit_player(state) {
                    state.hostile_shots.retain(|s| s.id != overlap.b);
                }
            }
            OverlapKind::ShotBoss => shot_hits_boss(state, overlap.a),
            OverlapKind::PlayerBoss => {
                // The boss shrugs off rams; only the player takes damage
                if state.boss.is_some() {
                    hit_player(state);
                }
            }
        }
    }
}

fn shot_hits_enemy(state: &mut GameState, shot: EntityId, enemy: EntityId) {
    let Some(shot_idx) = state.shots.iter().position(|s| s.id == shot) else {
        return;
    };
    let Some(enemy_idx) = state.enemies.iter().position(|e| e.id == enemy) else {
        return;
    };
    state.shots.remove(shot_idx);
    state.enemies.remove(enemy_idx);

    let reward = state.tuning.enemy_reward;
    state.award(reward);
    state.events.push(GameEvent::EnemyDestroyed { id: enemy, reward });
    check_boss_spawn(state);
}

fn shot_hits_boss(state: &mut GameState, shot: EntityId) {
    let Some(shot_idx) = state.shots.iter().position(|s| s.id == shot) else {
        return;
    };
    if state.boss.as_ref().is_none_or(|b| b.invulnerable) {
        return;
    }
    state.shots.remove(shot_idx);
    hit_boss(state);
}

/// Apply one hit to the player. Returns false if the hit was ignored
/// (player invulnerable or run already over).
pub fn hit_player(state: &mut GameState) -> bool {
    if state.is_over() || state.player.invulnerable {
        return false;
    }

    let player = &mut state.player;
    let absorbed = if player.deflectors > 0 {
        player.deflectors -= 1;
        HitAbsorb::Deflector
    } else if player.lives > 0 {
        player.lives -= 1;
        HitAbsorb::Life
    } else {
        return false;
    };
    let (lives, deflectors) = (player.lives, player.deflectors);

    log::debug!("Player hit ({:?}): lives={} deflectors={}", absorbed, lives, deflectors);
    state.events.push(GameEvent::PlayerHit {
        absorbed,
        lives,
        deflectors,
    });
    start_flash(state, FlashTarget::Player);

    if lives == 0 {
        state.enter_game_over();
    }
    true
}
