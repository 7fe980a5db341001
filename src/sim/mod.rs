//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod combat;
pub mod effects;
pub mod spawner;
pub mod state;
pub mod tick;

pub use boss::{BossHit, check_boss_spawn, force_spawn, health_fraction, max_health_for, threshold_for};
pub use collision::{Overlap, OverlapKind, aabb_overlap, find_overlaps};
pub use combat::{hit_player, resolve};
pub use effects::{FlashTarget, TimedEffect};
pub use state::{
    Boss, Enemy, EntityId, GameEvent, GamePhase, GameState, HitAbsorb, PLAYER_ID, Player,
    Projectile, ProjectileOwner, SpawnTimer, VerticalDirection,
};
pub use tick::{TickInput, tick};
