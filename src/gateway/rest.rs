//! Browser REST client for a hosted auth + table backend
//!
//! Sign-up lives under `/auth/v1`, the score table under `/rest/v1`.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{LeaderboardGateway, Session};
use crate::error::GatewayError;
use crate::leaderboard::{LeaderboardEntry, ScoreRow};
use crate::settings::GatewayConfig;

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignUpUser {
    id: String,
}

#[derive(Deserialize)]
struct SignUpReply {
    access_token: Option<String>,
    user: Option<SignUpUser>,
}

pub struct RestGateway {
    config: GatewayConfig,
    session: RefCell<Option<Session>>,
}

impl RestGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            session: RefCell::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Bearer token: the session's if signed in, else the public key
    fn bearer(&self) -> String {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<String>,
        prefer: Option<&str>,
    ) -> Result<String, GatewayError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_network)?;
        let headers = request.headers();
        headers
            .set("apikey", &self.config.anon_key)
            .map_err(js_network)?;
        headers
            .set("Authorization", &format!("Bearer {}", self.bearer()))
            .map_err(js_network)?;
        if body.is_some() {
            headers
                .set("Content-Type", "application/json")
                .map_err(js_network)?;
        }
        if let Some(prefer) = prefer {
            headers.set("Prefer", prefer).map_err(js_network)?;
        }

        let window = web_sys::window().ok_or_else(|| GatewayError::Network("no window".into()))?;
        let reply = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_network)?;
        let response: Response = reply.dyn_into().map_err(js_network)?;

        let text = JsFuture::from(response.text().map_err(js_network)?)
            .await
            .map_err(js_network)?
            .as_string()
            .unwrap_or_default();

        if !response.ok() {
            return Err(GatewayError::Http {
                status: response.status(),
                message: text,
            });
        }
        Ok(text)
    }
}

impl LeaderboardGateway for RestGateway {
    fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    async fn sign_in_anonymous(&self) -> Result<Session, GatewayError> {
        let stamp = js_sys::Date::now() as u64;
        let email = format!("anonymous_{}@example.com", stamp);
        let password = format!("anon{}", stamp);
        let body = serde_json::to_string(&SignUpBody {
            email: &email,
            password: &password,
        })
        .map_err(|e| GatewayError::Decode(e.to_string()))?;

        let text = self
            .send("POST", &self.endpoint("/auth/v1/signup"), Some(body), None)
            .await
            .map_err(|err| match err {
                GatewayError::Http { status, message } => {
                    GatewayError::Auth(format!("{}: {}", status, message))
                }
                other => other,
            })?;

        let reply: SignUpReply =
            serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))?;
        let access_token = reply
            .access_token
            .ok_or_else(|| GatewayError::Auth("sign-up returned no session".into()))?;
        let session = Session {
            access_token,
            user_id: reply.user.map(|u| u.id).unwrap_or_default(),
        };

        log::info!("Anonymous session created");
        *self.session.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    async fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreRow>, GatewayError> {
        let url = self.endpoint(&format!(
            "/rest/v1/leaderboard?select=name,score&order=score.desc&limit={}",
            limit
        ));
        let text = self.send("GET", &url, None, None).await?;
        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn insert_score(&self, entry: &LeaderboardEntry) -> Result<(), GatewayError> {
        let body = serde_json::to_string(&[entry]).map_err(|e| GatewayError::Decode(e.to_string()))?;
        self.send(
            "POST",
            &self.endpoint("/rest/v1/leaderboard"),
            Some(body),
            Some("return=minimal"),
        )
        .await?;
        Ok(())
    }
}

fn js_network(err: JsValue) -> GatewayError {
    GatewayError::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}
