//! HUD model
//!
//! Everything the overlay shows, derived from state each frame. The host only
//! copies these values into the page.

use glam::Vec2;

use crate::leaderboard::{LeaderboardFlow, LeaderboardPhase, ScoreRow};
use crate::sim::{GameState, health_fraction};

/// Boss health bar width in pixels
pub const BOSS_BAR_WIDTH: f32 = 200.0;
pub const BOSS_BAR_HEIGHT: f32 = 20.0;
/// Distance from the top edge of the playfield
pub const BOSS_BAR_TOP: f32 = 20.0;

pub const RESTART_PROMPT: &str = "Press R to restart";

/// Boss name plate and health bar
#[derive(Debug, Clone, PartialEq)]
pub struct BossPanel {
    pub label: String,
    /// Top-left corner of the bar background
    pub bar_pos: Vec2,
    pub bar_size: Vec2,
    /// Width of the filled part
    pub fill_width: f32,
}

/// What the leaderboard overlay is showing
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardView {
    Hidden,
    /// Waiting on the backend
    Busy,
    /// Name/email form for a qualifying score
    Form { rank: usize },
    Table(Vec<ScoreRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameOverPanel {
    pub title: String,
    pub final_score: String,
    /// Shown once the leaderboard has nothing left to ask
    pub restart_prompt: Option<String>,
    pub leaderboard: LeaderboardView,
    /// Last leaderboard error, if any
    pub message: Option<String>,
}

/// Snapshot of the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: String,
    /// Life indicators to draw
    pub lives: u8,
    /// Deflector indicators to draw
    pub deflectors: u8,
    pub boss: Option<BossPanel>,
    pub game_over: Option<GameOverPanel>,
}

impl Hud {
    pub fn from_state(state: &GameState, flow: &LeaderboardFlow) -> Self {
        let boss = state.boss.as_ref().map(|boss| {
            let bar_pos = Vec2::new(state.tuning.width / 2.0 - BOSS_BAR_WIDTH / 2.0, BOSS_BAR_TOP);
            BossPanel {
                label: format!("Boss {}", boss.number),
                bar_pos,
                bar_size: Vec2::new(BOSS_BAR_WIDTH, BOSS_BAR_HEIGHT),
                fill_width: BOSS_BAR_WIDTH * health_fraction(boss),
            }
        });

        let game_over = state.is_over().then(|| GameOverPanel {
            title: "GAME OVER".to_string(),
            final_score: format!("Final Score: {}", state.score),
            restart_prompt: flow.is_settled().then(|| RESTART_PROMPT.to_string()),
            leaderboard: leaderboard_view(flow.phase()),
            message: flow.message().map(str::to_string),
        });

        Self {
            score: format!("Score: {}", state.score),
            lives: state.player.lives,
            deflectors: state.player.deflectors,
            boss,
            game_over,
        }
    }
}

fn leaderboard_view(phase: &LeaderboardPhase) -> LeaderboardView {
    match phase {
        LeaderboardPhase::Idle | LeaderboardPhase::NotEligible | LeaderboardPhase::Unavailable => {
            LeaderboardView::Hidden
        }
        LeaderboardPhase::Checking | LeaderboardPhase::Submitting | LeaderboardPhase::Loading => {
            LeaderboardView::Busy
        }
        LeaderboardPhase::Prompt { rank } => LeaderboardView::Form { rank: *rank },
        LeaderboardPhase::Showing(rows) => LeaderboardView::Table(rows.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayResponse;
    use crate::sim::{Overlap, OverlapKind, force_spawn, hit_player, resolve};
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(7, Tuning::default())
    }

    #[test]
    fn test_playing_hud() {
        let mut state = state();
        state.score = 1200;
        let hud = Hud::from_state(&state, &LeaderboardFlow::default());
        assert_eq!(hud.score, "Score: 1200");
        assert_eq!(hud.lives, 3);
        assert_eq!(hud.deflectors, 3);
        assert!(hud.boss.is_none());
        assert!(hud.game_over.is_none());
    }

    #[test]
    fn test_boss_panel_tracks_health() {
        let mut state = state();
        assert!(force_spawn(&mut state));
        if let Some(boss) = state.boss.as_mut() {
            boss.health = 5;
        }
        let hud = Hud::from_state(&state, &LeaderboardFlow::default());
        let panel = hud.boss.unwrap();
        assert_eq!(panel.label, "Boss 1");
        assert_eq!(panel.bar_pos, Vec2::new(300.0, 20.0));
        assert_eq!(panel.bar_size, Vec2::new(200.0, 20.0));
        assert!((panel.fill_width - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_boss_panel_gone_after_defeat() {
        let mut state = state();
        assert!(force_spawn(&mut state));
        let (boss_id, boss_pos) = {
            let boss = state.boss.as_mut().unwrap();
            boss.health = 1;
            (boss.id, boss.pos)
        };
        assert!(Hud::from_state(&state, &LeaderboardFlow::default()).boss.is_some());

        let shot = state.spawn_shot(boss_pos, Vec2::X).unwrap();
        resolve(
            &mut state,
            &[Overlap {
                kind: OverlapKind::ShotBoss,
                a: shot,
                b: boss_id,
            }],
        );

        let hud = Hud::from_state(&state, &LeaderboardFlow::default());
        assert!(hud.boss.is_none());
        assert_eq!(state.score, 1000);
        assert_eq!(hud.score, "Score: 1000");
    }

    #[test]
    fn test_game_over_prompt_waits_for_leaderboard() {
        let mut state = state();
        state.score = 400;
        state.player.deflectors = 0;
        state.player.lives = 1;
        hit_player(&mut state);
        assert!(state.is_over());

        let mut flow = LeaderboardFlow::new(0);
        flow.begin_check(state.score, true);
        let hud = Hud::from_state(&state, &flow);
        let panel = hud.game_over.unwrap();
        assert_eq!(panel.title, "GAME OVER");
        assert_eq!(panel.final_score, "Final Score: 400");
        assert_eq!(panel.restart_prompt, None);
        assert_eq!(panel.leaderboard, LeaderboardView::Busy);

        flow.on_response(0, GatewayResponse::TopScores(Ok(Vec::new())));
        let panel = Hud::from_state(&state, &flow).game_over.unwrap();
        assert_eq!(panel.leaderboard, LeaderboardView::Form { rank: 1 });
        assert_eq!(panel.restart_prompt, None);
    }

    #[test]
    fn test_unavailable_shows_restart_prompt() {
        let mut state = state();
        state.enter_game_over();
        let mut flow = LeaderboardFlow::new(0);
        flow.begin_check(0, false);
        let panel = Hud::from_state(&state, &flow).game_over.unwrap();
        assert_eq!(panel.restart_prompt.as_deref(), Some("Press R to restart"));
        assert_eq!(panel.leaderboard, LeaderboardView::Hidden);
        assert_eq!(panel.message.as_deref(), Some("leaderboard backend not configured"));
    }
}
