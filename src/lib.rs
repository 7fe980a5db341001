//! Deflector - a side-scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, combat, bosses, game state)
//! - `session`: Fixed timestep driver, restart and leaderboard plumbing
//! - `leaderboard`: Eligibility, submission validation and the post-game flow
//! - `gateway`: Leaderboard backend access
//! - `ui`: HUD model derived from state
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod gateway;
pub mod leaderboard;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::{ConfigError, GatewayError, SubmissionError};
pub use gateway::{LeaderboardGateway, MemoryGateway};
pub use leaderboard::{LeaderboardEntry, LeaderboardFlow, LeaderboardPhase, ScoreRow};
pub use session::GameSession;
pub use settings::{GatewayConfig, Settings};
pub use tuning::Tuning;
pub use ui::Hud;

/// Game loop constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame fed to the accumulator, in seconds
    pub const MAX_FRAME_DT: f32 = 0.1;
}
