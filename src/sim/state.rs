//! Game state and core simulation types
//!
//! Everything a run mutates lives in one `GameState`; the tick is its only writer.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::TimedEffect;
use crate::tuning::Tuning;

/// Stable identifier for simulated entities
pub type EntityId = u32;

/// The player ship always carries this id; allocated ids start above it
pub const PLAYER_ID: EntityId = 0;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended, simulation halted until restart
    GameOver,
}

/// The player's ship and survivability counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lives (0..=3)
    pub lives: u8,
    /// Shield charges consumed before lives (0..=3)
    pub deflectors: u8,
    /// True while a hit flash is running
    pub invulnerable: bool,
    /// Render opacity, toggled by the flash effect
    pub alpha: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: tuning.player_start,
            vel: Vec2::ZERO,
            lives: tuning.start_lives,
            deflectors: tuning.start_deflectors,
            invulnerable: false,
            alpha: 1.0,
        }
    }
}

/// A drifting enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    /// Enemies and the boss
    Hostile,
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: ProjectileOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalDirection {
    Up,
    Down,
}

/// The active boss (at most one per run at a time)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub pos: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// Encounter index, 1 for the first boss of a run
    pub number: u32,
    /// Post-hit grace period, cleared by the flash effect
    pub invulnerable: bool,
    pub direction: VerticalDirection,
    pub alpha: f32,
    /// Clock time of the last shot, `None` until the first one
    pub last_shot_ms: Option<f64>,
}

/// Enemy spawn cadence; the interval shrinks toward a floor each time it fires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub interval_ms: f64,
    pub last_spawn_ms: f64,
}

/// Whether a player hit was soaked by a deflector or cost a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitAbsorb {
    Deflector,
    Life,
}

/// Notable things that happened during a tick, drained by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired { id: EntityId },
    EnemySpawned { id: EntityId },
    EnemyDestroyed { id: EntityId, reward: u64 },
    PlayerHit { absorbed: HitAbsorb, lives: u8, deflectors: u8 },
    BossSpawned { number: u32, max_health: u32 },
    BossDamaged { health: u32, max_health: u32 },
    BossDefeated { number: u32, reward: u64 },
    GameOver { score: u64 },
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock in milliseconds
    pub clock_ms: f64,
    pub score: u64,
    pub player: Player,
    /// Latched while the fire key is held so one press fires one shot
    pub fire_held: bool,
    pub enemies: Vec<Enemy>,
    /// Player-owned projectiles
    pub shots: Vec<Projectile>,
    /// Enemy and boss projectiles
    pub hostile_shots: Vec<Projectile>,
    pub boss: Option<Boss>,
    /// Boss encounters started this run
    pub boss_number: u32,
    pub spawn_timer: SpawnTimer,
    /// Running flash/invulnerability windows
    pub effects: Vec<TimedEffect>,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: EntityId,
}

impl GameState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            time_ticks: 0,
            clock_ms: 0.0,
            score: 0,
            player: Player::new(&tuning),
            fire_held: false,
            enemies: Vec::new(),
            shots: Vec::new(),
            hostile_shots: Vec::new(),
            boss: None,
            boss_number: 0,
            spawn_timer: SpawnTimer::new(&tuning),
            effects: Vec::new(),
            events: Vec::new(),
            next_id: PLAYER_ID + 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Score only ever grows during a run
    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Spawn a player shot unless the pool is full
    pub fn spawn_shot(&mut self, pos: Vec2, vel: Vec2) -> Option<EntityId> {
        if self.shots.len() >= self.tuning.max_projectiles {
            return None;
        }
        let id = self.next_entity_id();
        self.shots.push(Projectile {
            id,
            pos,
            vel,
            owner: ProjectileOwner::Player,
        });
        Some(id)
    }

    /// Spawn an enemy/boss shot unless the pool is full
    pub fn spawn_hostile_shot(&mut self, pos: Vec2, vel: Vec2) -> Option<EntityId> {
        if self.hostile_shots.len() >= self.tuning.max_projectiles {
            return None;
        }
        let id = self.next_entity_id();
        self.hostile_shots.push(Projectile {
            id,
            pos,
            vel,
            owner: ProjectileOwner::Hostile,
        });
        Some(id)
    }

    /// Enter the terminal phase. Emits `GameOver` only on the first call.
    pub fn enter_game_over(&mut self) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.player.vel = Vec2::ZERO;
        self.fire_held = false;
        log::info!("Game over with score {}", self.score);
        self.events.push(GameEvent::GameOver { score: self.score });
    }

    /// Take all events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entity lists are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.shots.sort_by_key(|s| s.id);
        self.hostile_shots.sort_by_key(|s| s.id);
    }
}
