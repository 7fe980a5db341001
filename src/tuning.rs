//! Data-driven game balance
//!
//! Every gameplay number lives here so a run can be re-tuned from JSON
//! without touching the simulation. Defaults reproduce the arcade cabinet feel.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Gameplay constants for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    pub width: f32,
    pub height: f32,
    /// Distance past the playfield edge before an entity is culled
    pub cull_margin: f32,

    // === Player ===
    pub player_start: Vec2,
    pub player_size: Vec2,
    pub player_hitbox_scale: f32,
    pub player_speed: f32,
    /// Fraction of the gap to target velocity closed each tick
    pub player_lerp: f32,
    pub start_lives: u8,
    pub start_deflectors: u8,

    // === Player fire ===
    pub shot_speed: f32,
    /// Horizontal offset from the ship where shots appear
    pub shot_offset: f32,
    pub shot_size: Vec2,
    /// Maximum live projectiles per pool
    pub max_projectiles: usize,

    // === Enemies ===
    pub enemy_size: Vec2,
    pub enemy_hitbox_scale: f32,
    pub enemy_speed: f32,
    /// Enemies appear this far past the right edge
    pub enemy_spawn_inset: f32,
    /// Vertical margin for random enemy placement
    pub enemy_spawn_margin: f32,
    pub enemy_shot_speed: f32,
    /// One in `enemy_fire_odds` chance per enemy per tick
    pub enemy_fire_odds: u32,
    pub enemy_reward: u64,

    // === Spawn timer ===
    pub spawn_interval_ms: f64,
    pub spawn_interval_min_ms: f64,
    pub spawn_interval_step_ms: f64,

    // === Boss ===
    pub boss_size: Vec2,
    pub boss_scale: f32,
    pub boss_hitbox_scale: f32,
    pub boss_speed: f32,
    /// Boss reverses direction this far from the top/bottom edge
    pub boss_turn_margin: f32,
    pub boss_shot_speed: f32,
    pub boss_fire_interval_ms: f64,
    pub boss_base_health: u32,
    pub boss_health_step: u32,
    pub boss_reward: u64,
    /// Explicit thresholds for the first encounters
    pub boss_thresholds: Vec<u64>,

    // === Flash / invulnerability ===
    pub flash_toggles: u32,
    pub flash_interval_ms: f64,
    pub flash_alpha: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            cull_margin: 64.0,

            player_start: Vec2::new(100.0, 300.0),
            player_size: Vec2::new(64.0, 48.0),
            player_hitbox_scale: 0.7,
            player_speed: 300.0,
            player_lerp: 0.05,
            start_lives: 3,
            start_deflectors: 3,

            shot_speed: 400.0,
            shot_offset: 50.0,
            shot_size: Vec2::new(16.0, 6.0),
            max_projectiles: 30,

            enemy_size: Vec2::new(56.0, 40.0),
            enemy_hitbox_scale: 0.6,
            enemy_speed: -100.0,
            enemy_spawn_inset: 20.0,
            enemy_spawn_margin: 50.0,
            enemy_shot_speed: -250.0,
            enemy_fire_odds: 150,
            enemy_reward: 100,

            spawn_interval_ms: 3000.0,
            spawn_interval_min_ms: 800.0,
            spawn_interval_step_ms: 200.0,

            boss_size: Vec2::new(128.0, 128.0),
            boss_scale: 1.2,
            boss_hitbox_scale: 0.7,
            boss_speed: 100.0,
            boss_turn_margin: 100.0,
            boss_shot_speed: 300.0,
            boss_fire_interval_ms: 1000.0,
            boss_base_health: 10,
            boss_health_step: 5,
            boss_reward: 1000,
            boss_thresholds: vec![3000, 7000, 11000, 15000],

            flash_toggles: 6,
            flash_interval_ms: 100.0,
            flash_alpha: 0.2,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::Invalid("playfield must have positive size".into()));
        }
        if self.start_lives == 0 || self.start_lives > 3 {
            return Err(ConfigError::Invalid(format!(
                "start_lives must be in 1..=3, got {}",
                self.start_lives
            )));
        }
        if self.start_deflectors > 3 {
            return Err(ConfigError::Invalid(format!(
                "start_deflectors must be in 0..=3, got {}",
                self.start_deflectors
            )));
        }
        if self.spawn_interval_min_ms <= 0.0 || self.spawn_interval_ms < self.spawn_interval_min_ms {
            return Err(ConfigError::Invalid(
                "spawn interval must start at or above a positive floor".into(),
            ));
        }
        if self.enemy_fire_odds == 0 {
            return Err(ConfigError::Invalid("enemy_fire_odds must be at least 1".into()));
        }
        if self.boss_base_health == 0 || self.boss_health_step == 0 {
            return Err(ConfigError::Invalid(
                "boss health must start positive and grow every encounter".into(),
            ));
        }
        // Movement clamps need a non-empty range on each axis
        if self.player_size.x >= self.width || self.player_size.y >= self.height {
            return Err(ConfigError::Invalid("player sprite does not fit the playfield".into()));
        }
        if self.boss_hitbox().y >= self.height {
            return Err(ConfigError::Invalid("boss hitbox taller than the playfield".into()));
        }
        if self.boss_turn_margin * 2.0 >= self.height {
            return Err(ConfigError::Invalid("boss turn margins overlap".into()));
        }
        if self.flash_interval_ms <= 0.0 {
            return Err(ConfigError::Invalid("flash_interval_ms must be positive".into()));
        }
        Ok(())
    }

    /// Hitbox of the player ship (scaled down from the sprite)
    pub fn player_hitbox(&self) -> Vec2 {
        self.player_size * self.player_hitbox_scale
    }

    pub fn enemy_hitbox(&self) -> Vec2 {
        self.enemy_size * self.enemy_hitbox_scale
    }

    /// Boss hitbox: the sprite is drawn scaled up, the body shrunk like the player's
    pub fn boss_hitbox(&self) -> Vec2 {
        self.boss_size * self.boss_scale * self.boss_hitbox_scale
    }

    /// Playfield size as a vector
    pub fn playfield(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "enemy_reward": 250 }"#).unwrap();
        assert_eq!(tuning.enemy_reward, 250);
        assert_eq!(tuning.boss_reward, 1000);
        assert_eq!(tuning.boss_thresholds, vec![3000, 7000, 11000, 15000]);
    }

    #[test]
    fn test_rejects_bad_lives() {
        let err = Tuning::from_json(r#"{ "start_lives": 5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_oversized_boss() {
        let err = Tuning::from_json(r#"{ "boss_size": [1000.0, 1000.0] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        // 600 * 1.2 * 0.7 = 504 still fits a 600 tall playfield
        assert!(Tuning::from_json(r#"{ "boss_size": [600.0, 600.0] }"#).is_ok());
    }

    #[test]
    fn test_rejects_oversized_player() {
        let err = Tuning::from_json(r#"{ "player_size": [64.0, 600.0] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_hitboxes_are_scaled() {
        let t = Tuning::default();
        assert!((t.player_hitbox().x - 64.0 * 0.7).abs() < 1e-4);
        assert!((t.enemy_hitbox().y - 40.0 * 0.6).abs() < 1e-4);
        assert!((t.boss_hitbox().x - 128.0 * 1.2 * 0.7).abs() < 1e-3);
    }
}
