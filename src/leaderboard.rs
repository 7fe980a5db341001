//! Global leaderboard
//!
//! Eligibility rules, submission validation and the post-game flow
//! (check → prompt → submit → show). Network work happens elsewhere; the flow
//! only emits `GatewayRequest`s and consumes their responses. Every request is
//! tagged with the session generation so answers that arrive after a restart
//! are dropped.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, SubmissionError};
use crate::gateway::{GatewayRequest, GatewayResponse, RequestKind};

/// Number of rows shown and used for eligibility
pub const MAX_LEADERBOARD_ROWS: usize = 10;

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 12;

/// A leaderboard row as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub name: String,
    pub score: u64,
}

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub email: String,
    pub score: u64,
}

impl LeaderboardEntry {
    /// Validate form input. Nothing is sent anywhere if this fails.
    pub fn new(name: &str, email: &str, score: u64) -> Result<Self, SubmissionError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(SubmissionError::NameEmpty);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(SubmissionError::NameTooLong {
                len,
                max: MAX_NAME_LEN,
            });
        }
        if !email.contains('@') {
            return Err(SubmissionError::InvalidEmail);
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            score,
        })
    }
}

/// Check if a score makes the top list (rows sorted descending)
pub fn qualifies(rows: &[ScoreRow], score: u64) -> bool {
    if rows.len() < MAX_LEADERBOARD_ROWS {
        return true;
    }
    rows.last().map(|r| score > r.score).unwrap_or(true)
}

/// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
pub fn potential_rank(rows: &[ScoreRow], score: u64) -> Option<usize> {
    if !qualifies(rows, score) {
        return None;
    }
    let rank = rows.iter().position(|r| score > r.score);
    Some(rank.unwrap_or(rows.len()) + 1)
}

/// Where the post-game leaderboard flow stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardPhase {
    /// Run still going
    Idle,
    /// Waiting for the top list to decide eligibility
    Checking,
    /// Score qualifies; show the name/email form
    Prompt { rank: usize },
    /// Score does not qualify
    NotEligible,
    /// No backend, or the check failed
    Unavailable,
    /// Insert in flight
    Submitting,
    /// Insert done, fetching the list to display
    Loading,
    Showing(Vec<ScoreRow>),
}

/// Post-game leaderboard state machine
#[derive(Debug, Clone)]
pub struct LeaderboardFlow {
    generation: u64,
    phase: LeaderboardPhase,
    score: u64,
    rank: usize,
    /// Last user-visible error
    message: Option<String>,
}

impl Default for LeaderboardFlow {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LeaderboardFlow {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            phase: LeaderboardPhase::Idle,
            score: 0,
            rank: 0,
            message: None,
        }
    }

    pub fn phase(&self) -> &LeaderboardPhase {
        &self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// True once the flow has nothing more to ask of the player
    pub fn is_settled(&self) -> bool {
        matches!(
            self.phase,
            LeaderboardPhase::NotEligible
                | LeaderboardPhase::Unavailable
                | LeaderboardPhase::Showing(_)
        )
    }

    /// Run ended: ask for the top list, or settle immediately without a backend
    pub fn begin_check(&mut self, score: u64, backend_available: bool) -> Option<GatewayRequest> {
        if self.phase != LeaderboardPhase::Idle {
            log::warn!("Leaderboard check requested twice, ignoring");
            return None;
        }
        self.score = score;
        if !backend_available {
            let err = GatewayError::NotConfigured;
            log::info!("Skipping high score check: {}", err);
            self.message = Some(err.to_string());
            self.phase = LeaderboardPhase::Unavailable;
            return None;
        }
        self.phase = LeaderboardPhase::Checking;
        Some(self.request(RequestKind::FetchTopScores {
            limit: MAX_LEADERBOARD_ROWS,
        }))
    }

    /// Validate and queue a submission from the form
    pub fn submit(&mut self, name: &str, email: &str) -> Result<GatewayRequest, SubmissionError> {
        if !matches!(self.phase, LeaderboardPhase::Prompt { .. }) {
            return Err(SubmissionError::NotAccepting);
        }
        let entry = LeaderboardEntry::new(name, email, self.score)?;
        self.phase = LeaderboardPhase::Submitting;
        self.message = None;
        Ok(self.request(RequestKind::InsertScore(entry)))
    }

    /// Feed a gateway answer back in. Returns a follow-up request, if any.
    pub fn on_response(
        &mut self,
        generation: u64,
        response: GatewayResponse,
    ) -> Option<GatewayRequest> {
        if generation != self.generation {
            log::debug!(
                "Dropping leaderboard response from generation {} (now {})",
                generation,
                self.generation
            );
            return None;
        }

        match (self.phase.clone(), response) {
            (LeaderboardPhase::Checking, GatewayResponse::TopScores(Ok(rows))) => {
                self.phase = match potential_rank(&rows, self.score) {
                    Some(rank) => {
                        self.rank = rank;
                        LeaderboardPhase::Prompt { rank }
                    }
                    None => LeaderboardPhase::NotEligible,
                };
                None
            }
            (LeaderboardPhase::Checking, GatewayResponse::TopScores(Err(err))) => {
                self.fail("Error checking high score", &err);
                self.phase = LeaderboardPhase::Unavailable;
                None
            }
            (LeaderboardPhase::Submitting, GatewayResponse::Inserted(Ok(()))) => {
                log::info!("Score {} submitted", self.score);
                self.phase = LeaderboardPhase::Loading;
                Some(self.request(RequestKind::FetchTopScores {
                    limit: MAX_LEADERBOARD_ROWS,
                }))
            }
            (LeaderboardPhase::Submitting, GatewayResponse::Inserted(Err(err))) => {
                // Back to the form so the player can try again
                self.fail("Error submitting score", &err);
                self.phase = LeaderboardPhase::Prompt { rank: self.rank };
                None
            }
            (LeaderboardPhase::Loading, GatewayResponse::TopScores(result)) => {
                let rows = result.unwrap_or_else(|err| {
                    self.fail("Error loading leaderboard", &err);
                    Vec::new()
                });
                self.phase = LeaderboardPhase::Showing(rows);
                None
            }
            (phase, response) => {
                log::debug!("Unexpected {:?} while {:?}", response, phase);
                None
            }
        }
    }

    fn fail(&mut self, context: &str, err: &GatewayError) {
        log::error!("{}: {}", context, err);
        self.message = Some(format!("{}: {}", context, err));
    }

    fn request(&self, kind: RequestKind) -> GatewayRequest {
        GatewayRequest {
            generation: self.generation,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(scores: &[u64]) -> Vec<ScoreRow> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| ScoreRow {
                name: format!("p{}", i),
                score,
            })
            .collect()
    }

    fn full_board() -> Vec<ScoreRow> {
        rows(&[10000, 9000, 8000, 7000, 6000, 5000, 4000, 3000, 2000, 1000])
    }

    #[test]
    fn test_entry_validation() {
        assert!(LeaderboardEntry::new("ace", "ace@example.com", 10).is_ok());
        assert_eq!(
            LeaderboardEntry::new("thirteen_char", "a@b", 10),
            Err(SubmissionError::NameTooLong { len: 13, max: 12 })
        );
        assert!(LeaderboardEntry::new("twelve_chars", "a@b", 10).is_ok());
        assert_eq!(
            LeaderboardEntry::new("ace", "nope", 10),
            Err(SubmissionError::InvalidEmail)
        );
        assert_eq!(
            LeaderboardEntry::new("   ", "a@b", 10),
            Err(SubmissionError::NameEmpty)
        );
    }

    #[test]
    fn test_name_length_counts_chars() {
        // 12 multi-byte characters are fine
        assert!(LeaderboardEntry::new("ééééééééé\u{e9}éé", "a@b", 1).is_ok());
    }

    #[test]
    fn test_qualifies() {
        assert!(qualifies(&[], 0));
        assert!(qualifies(&rows(&[500]), 10));
        assert!(qualifies(&full_board(), 1001));
        assert!(!qualifies(&full_board(), 1000));
    }

    #[test]
    fn test_potential_rank() {
        assert_eq!(potential_rank(&full_board(), 9500), Some(2));
        assert_eq!(potential_rank(&full_board(), 20000), Some(1));
        assert_eq!(potential_rank(&full_board(), 900), None);
        assert_eq!(potential_rank(&rows(&[500, 300]), 100), Some(3));
    }

    #[test]
    fn test_flow_eligible_path() {
        let mut flow = LeaderboardFlow::new(3);
        let req = flow.begin_check(5500, true).unwrap();
        assert_eq!(req.generation, 3);
        assert_eq!(flow.phase(), &LeaderboardPhase::Checking);

        flow.on_response(3, GatewayResponse::TopScores(Ok(full_board())));
        assert_eq!(flow.phase(), &LeaderboardPhase::Prompt { rank: 6 });

        let req = flow.submit("ace", "ace@example.com").unwrap();
        match req.kind {
            RequestKind::InsertScore(entry) => assert_eq!(entry.score, 5500),
            other => panic!("unexpected request {:?}", other),
        }
        assert_eq!(flow.phase(), &LeaderboardPhase::Submitting);

        let follow = flow.on_response(3, GatewayResponse::Inserted(Ok(())));
        assert!(matches!(
            follow.map(|r| r.kind),
            Some(RequestKind::FetchTopScores { limit: 10 })
        ));
        flow.on_response(3, GatewayResponse::TopScores(Ok(rows(&[5500]))));
        assert_eq!(flow.phase(), &LeaderboardPhase::Showing(rows(&[5500])));
        assert!(flow.is_settled());
    }

    #[test]
    fn test_flow_not_eligible() {
        let mut flow = LeaderboardFlow::new(0);
        flow.begin_check(10, true);
        flow.on_response(0, GatewayResponse::TopScores(Ok(full_board())));
        assert_eq!(flow.phase(), &LeaderboardPhase::NotEligible);
        assert_eq!(flow.submit("ace", "a@b"), Err(SubmissionError::NotAccepting));
    }

    #[test]
    fn test_flow_without_backend() {
        let mut flow = LeaderboardFlow::new(0);
        assert!(flow.begin_check(10, false).is_none());
        assert_eq!(flow.phase(), &LeaderboardPhase::Unavailable);
        assert!(flow.is_settled());
        assert_eq!(flow.message(), Some("leaderboard backend not configured"));
    }

    #[test]
    fn test_flow_check_only_once() {
        let mut flow = LeaderboardFlow::new(0);
        assert!(flow.begin_check(10, true).is_some());
        assert!(flow.begin_check(10, true).is_none());
    }

    #[test]
    fn test_check_failure_settles_with_message() {
        let mut flow = LeaderboardFlow::new(0);
        flow.begin_check(10, true);
        flow.on_response(
            0,
            GatewayResponse::TopScores(Err(GatewayError::Network("offline".into()))),
        );
        assert_eq!(flow.phase(), &LeaderboardPhase::Unavailable);
        assert!(flow.message().unwrap().contains("offline"));
    }

    #[test]
    fn test_insert_failure_returns_to_form() {
        let mut flow = LeaderboardFlow::new(0);
        flow.begin_check(10, true);
        flow.on_response(0, GatewayResponse::TopScores(Ok(Vec::new())));
        flow.submit("ace", "a@b").unwrap();
        flow.on_response(
            0,
            GatewayResponse::Inserted(Err(GatewayError::Http {
                status: 500,
                message: "boom".into(),
            })),
        );
        assert_eq!(flow.phase(), &LeaderboardPhase::Prompt { rank: 1 });
        assert!(flow.message().is_some());
        // Retry is allowed and clears the message
        assert!(flow.submit("ace", "a@b").is_ok());
        assert!(flow.message().is_none());
    }

    #[test]
    fn test_invalid_submission_keeps_prompt() {
        let mut flow = LeaderboardFlow::new(0);
        flow.begin_check(10, true);
        flow.on_response(0, GatewayResponse::TopScores(Ok(Vec::new())));
        assert!(flow.submit("thirteen_char", "a@b").is_err());
        assert_eq!(flow.phase(), &LeaderboardPhase::Prompt { rank: 1 });
    }

    #[test]
    fn test_stale_generation_ignored() {
        let mut flow = LeaderboardFlow::new(2);
        flow.begin_check(10, true);
        flow.on_response(1, GatewayResponse::TopScores(Ok(Vec::new())));
        assert_eq!(flow.phase(), &LeaderboardPhase::Checking);
    }
}
