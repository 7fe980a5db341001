//! Overlap detection
//!
//! Every entity is an axis-aligned box centred on its position. Once per tick
//! the query walks each interesting pairing and reports the overlapping pairs
//! as events for the combat resolver. Pairs are ordered so `a` is always the
//! player or the player's shot.

use glam::Vec2;

use super::state::{EntityId, GameState, PLAYER_ID};

/// Kind of overlapping pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    /// Player shot `a` overlaps enemy `b`
    ShotEnemy,
    /// Player overlaps enemy `b`
    PlayerEnemy,
    /// Player overlaps hostile shot `b`
    PlayerHostileShot,
    /// Player shot `a` overlaps boss `b`
    ShotBoss,
    /// Player overlaps boss `b`
    PlayerBoss,
}

/// One overlapping pair found this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub kind: OverlapKind,
    pub a: EntityId,
    pub b: EntityId,
}

/// Check whether two centred boxes intersect
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    let delta = (a_pos - b_pos).abs();
    let reach = (a_size + b_size) * 0.5;
    delta.x < reach.x && delta.y < reach.y
}

/// Collect every overlapping pair for this tick in a stable order
pub fn find_overlaps(state: &GameState) -> Vec<Overlap> {
    let tuning = &state.tuning;
    let player_box = tuning.player_hitbox();
    let enemy_box = tuning.enemy_hitbox();
    let shot_box = tuning.shot_size;
    let player_pos = state.player.pos;

    let mut overlaps = Vec::new();

    for shot in &state.shots {
        for enemy in &state.enemies {
            if aabb_overlap(shot.pos, shot_box, enemy.pos, enemy_box) {
                overlaps.push(Overlap {
                    kind: OverlapKind::ShotEnemy,
                    a: shot.id,
                    b: enemy.id,
                });
            }
        }
    }

    for enemy in &state.enemies {
        if aabb_overlap(player_pos, player_box, enemy.pos, enemy_box) {
            overlaps.push(Overlap {
                kind: OverlapKind::PlayerEnemy,
                a: PLAYER_ID,
                b: enemy.id,
            });
        }
    }

    for shot in &state.hostile_shots {
        if aabb_overlap(player_pos, player_box, shot.pos, shot_box) {
            overlaps.push(Overlap {
                kind: OverlapKind::PlayerHostileShot,
                a: PLAYER_ID,
                b: shot.id,
            });
        }
    }

    if let Some(boss) = &state.boss {
        let boss_box = tuning.boss_hitbox();
        for shot in &state.shots {
            if aabb_overlap(shot.pos, shot_box, boss.pos, boss_box) {
                overlaps.push(Overlap {
                    kind: OverlapKind::ShotBoss,
                    a: shot.id,
                    b: boss.id,
                });
            }
        }
        if aabb_overlap(player_pos, player_box, boss.pos, boss_box) {
            overlaps.push(Overlap {
                kind: OverlapKind::PlayerBoss,
                a: PLAYER_ID,
                b: boss.id,
            });
        }
    }

    overlaps
}
