//! Leaderboard backend access
//!
//! The backend offers anonymous sign-in plus a shared score table. Everything
//! behind `LeaderboardGateway` is async and may fail; callers turn failures
//! into visible messages and carry on.

use std::cell::{Cell, RefCell};

use crate::error::GatewayError;
use crate::leaderboard::{LeaderboardEntry, ScoreRow};

#[cfg(target_arch = "wasm32")]
pub mod rest;

/// An authenticated backend session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

/// What the leaderboard flow wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    FetchTopScores { limit: usize },
    InsertScore(LeaderboardEntry),
}

/// A request tagged with the session generation that issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub generation: u64,
    pub kind: RequestKind,
}

/// Result of running a `GatewayRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayResponse {
    TopScores(Result<Vec<ScoreRow>, GatewayError>),
    Inserted(Result<(), GatewayError>),
}

/// Anonymous identity plus a global score table
///
/// Futures are not `Send`: the browser build runs them on the single UI thread.
#[allow(async_fn_in_trait)]
pub trait LeaderboardGateway {
    /// Current session, if signed in
    fn session(&self) -> Option<Session>;

    async fn sign_in_anonymous(&self) -> Result<Session, GatewayError>;

    /// Top `limit` rows, highest score first
    async fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreRow>, GatewayError>;

    async fn insert_score(&self, entry: &LeaderboardEntry) -> Result<(), GatewayError>;
}

/// Run one request against a gateway. Inserts sign in first when needed.
pub async fn execute<G: LeaderboardGateway>(gateway: &G, request: &GatewayRequest) -> GatewayResponse {
    match &request.kind {
        RequestKind::FetchTopScores { limit } => {
            GatewayResponse::TopScores(gateway.fetch_top_scores(*limit).await)
        }
        RequestKind::InsertScore(entry) => {
            if gateway.session().is_none() {
                if let Err(err) = gateway.sign_in_anonymous().await {
                    return GatewayResponse::Inserted(Err(err));
                }
            }
            GatewayResponse::Inserted(gateway.insert_score(entry).await)
        }
    }
}

/// In-process gateway: a score table in memory with call counters and
/// injectable failures
#[derive(Debug, Default)]
pub struct MemoryGateway {
    session: RefCell<Option<Session>>,
    rows: RefCell<Vec<ScoreRow>>,
    /// Fail every call with this error while set
    failure: RefCell<Option<GatewayError>>,
    sign_ins: Cell<u32>,
    fetches: Cell<u32>,
    inserts: Cell<u32>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table (kept sorted, highest first)
    pub fn with_rows(rows: Vec<ScoreRow>) -> Self {
        let gateway = Self::default();
        *gateway.rows.borrow_mut() = rows;
        gateway.sort();
        gateway
    }

    pub fn fail_with(&self, err: Option<GatewayError>) {
        *self.failure.borrow_mut() = err;
    }

    /// Total backend calls made so far
    pub fn calls(&self) -> u32 {
        self.sign_ins.get() + self.fetches.get() + self.inserts.get()
    }

    pub fn sign_ins(&self) -> u32 {
        self.sign_ins.get()
    }

    pub fn inserts(&self) -> u32 {
        self.inserts.get()
    }

    pub fn rows(&self) -> Vec<ScoreRow> {
        self.rows.borrow().clone()
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        match self.failure.borrow().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn sort(&self) {
        self.rows.borrow_mut().sort_by(|a, b| b.score.cmp(&a.score));
    }
}

impl LeaderboardGateway for MemoryGateway {
    fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    async fn sign_in_anonymous(&self) -> Result<Session, GatewayError> {
        self.sign_ins.set(self.sign_ins.get() + 1);
        self.check_failure()?;
        let session = Session {
            access_token: format!("memory-token-{}", self.sign_ins.get()),
            user_id: format!("anonymous-{}", self.sign_ins.get()),
        };
        *self.session.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    async fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreRow>, GatewayError> {
        self.fetches.set(self.fetches.get() + 1);
        self.check_failure()?;
        Ok(self.rows.borrow().iter().take(limit).cloned().collect())
    }

    async fn insert_score(&self, entry: &LeaderboardEntry) -> Result<(), GatewayError> {
        self.inserts.set(self.inserts.get() + 1);
        self.check_failure()?;
        if self.session.borrow().is_none() {
            return Err(GatewayError::Auth("no session".into()));
        }
        self.rows.borrow_mut().push(ScoreRow {
            name: entry.name.clone(),
            score: entry.score,
        });
        self.sort();
        Ok(())
    }
}
