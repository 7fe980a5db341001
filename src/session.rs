//! Game session
//!
//! Owns the run state and drives it with a fixed timestep. Also owns the
//! post-game leaderboard flow and queues the backend requests it needs; the
//! host runs them and reports back through `on_gateway_response`.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::SubmissionError;
use crate::gateway::{GatewayRequest, GatewayResponse, LeaderboardGateway, execute};
use crate::leaderboard::LeaderboardFlow;
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;
use crate::ui::Hud;

pub struct GameSession {
    pub state: GameState,
    /// Held keys plus one-shot requests for the next tick
    pub input: TickInput,
    accumulator: f32,
    /// Bumped on restart; responses from older generations are dropped
    generation: u64,
    leaderboard: LeaderboardFlow,
    gateway_available: bool,
    pending: Vec<GatewayRequest>,
}

impl GameSession {
    pub fn new(seed: u64, tuning: Tuning, gateway_available: bool) -> Self {
        Self {
            state: GameState::new(seed, tuning),
            input: TickInput::default(),
            accumulator: 0.0,
            generation: 0,
            leaderboard: LeaderboardFlow::new(0),
            gateway_available,
            pending: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn leaderboard(&self) -> &LeaderboardFlow {
        &self.leaderboard
    }

    pub fn gateway_available(&self) -> bool {
        self.gateway_available
    }

    /// Run simulation ticks for a frame of `dt` seconds. Returns the events
    /// those ticks produced.
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.force_boss = false;
        }

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::GameOver { score } = event {
                if let Some(request) = self.leaderboard.begin_check(*score, self.gateway_available) {
                    self.pending.push(request);
                }
            }
        }
        events
    }

    /// Start a new run. Only allowed once the current run is over.
    pub fn restart(&mut self, seed: u64) -> bool {
        if !self.state.is_over() {
            return false;
        }
        self.generation += 1;
        let tuning = self.state.tuning.clone();
        self.state = GameState::new(seed, tuning);
        self.input = TickInput::default();
        self.accumulator = 0.0;
        self.leaderboard = LeaderboardFlow::new(self.generation);
        self.pending.clear();
        log::info!("Game restarted with seed: {} (generation {})", seed, self.generation);
        true
    }

    /// Validate the form and queue the insert
    pub fn submit_score(&mut self, name: &str, email: &str) -> Result<(), SubmissionError> {
        let request = self.leaderboard.submit(name, email)?;
        self.pending.push(request);
        Ok(())
    }

    /// Hand queued backend work to the host
    pub fn take_requests(&mut self) -> Vec<GatewayRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn on_gateway_response(&mut self, generation: u64, response: GatewayResponse) {
        if generation != self.generation {
            log::debug!(
                "Ignoring gateway result from generation {} (now {})",
                generation,
                self.generation
            );
            return;
        }
        if let Some(next) = self.leaderboard.on_response(generation, response) {
            self.pending.push(next);
        }
    }

    /// Run queued requests to completion, one after another, including any
    /// follow-ups they trigger
    pub async fn run_requests<G: LeaderboardGateway>(&mut self, gateway: &G) {
        loop {
            let requests = self.take_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                let response = execute(gateway, &request).await;
                self.on_gateway_response(request.generation, response);
            }
        }
    }

    pub fn hud(&self) -> Hud {
        Hud::from_state(&self.state, &self.leaderboard)
    }
}
