//! Timed flash effects
//!
//! A hit starts a window in which the target blinks and cannot be damaged.
//! Windows are plain records advanced by the tick, one per target at most.

use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::tuning::Tuning;

/// Which entity a flash applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashTarget {
    Player,
    Boss,
}

/// A running invulnerability flash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub target: FlashTarget,
    pub remaining_toggles: u32,
    pub interval_ms: f64,
    /// Time accumulated toward the next toggle
    pub elapsed_ms: f64,
}

impl TimedEffect {
    pub fn flash(target: FlashTarget, tuning: &Tuning) -> Self {
        Self {
            target,
            remaining_toggles: tuning.flash_toggles,
            interval_ms: tuning.flash_interval_ms,
            elapsed_ms: 0.0,
        }
    }
}

/// Start (or restart) the flash on `target` and make it invulnerable
pub fn start_flash(state: &mut GameState, target: FlashTarget) {
    match target {
        FlashTarget::Player => state.player.invulnerable = true,
        FlashTarget::Boss => match state.boss.as_mut() {
            Some(boss) => boss.invulnerable = true,
            None => return,
        },
    }
    state.effects.retain(|e| e.target != target);
    state.effects.push(TimedEffect::flash(target, &state.tuning));
}

/// Drop the flash on `target` without restoring anything
pub fn cancel_flash(state: &mut GameState, target: FlashTarget) {
    state.effects.retain(|e| e.target != target);
}

pub fn is_flashing(state: &GameState, target: FlashTarget) -> bool {
    state.effects.iter().any(|e| e.target == target)
}

/// Advance every running flash by `dt_ms`
pub fn advance_effects(state: &mut GameState, dt_ms: f64) {
    let dim = state.tuning.flash_alpha;
    state.effects.retain_mut(|effect| {
        let (alpha, invulnerable) = match effect.target {
            FlashTarget::Player => (&mut state.player.alpha, &mut state.player.invulnerable),
            FlashTarget::Boss => match state.boss.as_mut() {
                Some(boss) => (&mut boss.alpha, &mut boss.invulnerable),
                // Boss is gone, the window goes with it
                None => return false,
            },
        };

        effect.elapsed_ms += dt_ms;
        while effect.remaining_toggles > 0 && effect.elapsed_ms >= effect.interval_ms {
            effect.elapsed_ms -= effect.interval_ms;
            effect.remaining_toggles -= 1;
            *alpha = if *alpha >= 1.0 { dim } else { 1.0 };
        }

        if effect.remaining_toggles == 0 {
            *alpha = 1.0;
            *invulnerable = false;
            false
        } else {
            true
        }
    });
}
