//! Wire-level client for the board REST API.
//!
//! Endpoints, relative to the configured base URL:
//!
//! ```text
//! POST   /oauth/token                     password grant, basic auth
//! POST   /boards/{board}/topics           {title, body} -> {id}
//! POST   /topics/{id}/replies             {text} -> {id}
//! POST   /replies/{id}/replies            {text} -> {id}
//! DELETE /topics/{id}                     cascades to the whole reply tree
//! GET    /topics/{id}/replies             nested reply tree
//! GET    /boards/{board}/topics?limit=n   topic summaries, newest first
//! GET    /boards/{board}/search?q=...     approximate title search
//! ```

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use threadkv_core::{Error, Result};

use crate::config::Config;

fn backend_err(e: impl std::fmt::Display) -> Error {
    Error::Backend(e.to_string())
}

#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyTree {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub replies: Vec<ReplyTree>,
}

#[derive(Debug, Serialize)]
struct NewTopic<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct NewReply<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone, Debug)]
struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    /// Treats tokens as expired slightly early so an in-flight request does
    /// not race the real deadline.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(30) >= self.expires_at
    }
}

pub(crate) mod paths {
    pub fn topics(board: &str) -> String {
        format!("/boards/{board}/topics")
    }

    pub fn search(board: &str) -> String {
        format!("/boards/{board}/search")
    }

    pub fn topic(topic_id: &str) -> String {
        format!("/topics/{topic_id}")
    }

    pub fn topic_replies(topic_id: &str) -> String {
        format!("/topics/{topic_id}/replies")
    }

    pub fn reply_replies(reply_id: &str) -> String {
        format!("/replies/{reply_id}/replies")
    }
}

/// Blocking wire client. Owns the credentials and the cached bearer token;
/// the token sits behind a lock so read-only store calls can refresh it.
pub(crate) struct BoardApi {
    http: Client,
    base_url: String,
    config: Config,
    token: Mutex<Option<Token>>,
}

impl BoardApi {
    pub(crate) fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("threadkv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(backend_err)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let token = config
            .access_token
            .clone()
            .zip(config.token_expiry)
            .map(|(access_token, expires_at)| Token {
                access_token,
                expires_at,
            });
        Ok(Self {
            http,
            base_url,
            config,
            token: Mutex::new(token),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Returns a live access token, fetching a fresh one through the
    /// password grant when none is cached or the cached one has expired.
    fn access_token(&self) -> Result<String> {
        let mut slot = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = slot.as_ref() {
            if !token.is_expired(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!(username = %self.config.username, "requesting fresh access token");
        let response: TokenResponse = self
            .http
            .post(self.url("/oauth/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?
            .json()
            .map_err(backend_err)?;

        let token = Token {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        };
        let access = token.access_token.clone();
        *slot = Some(token);
        Ok(access)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        request
            .bearer_auth(self.access_token()?)
            .send()
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?
            .json()
            .map_err(backend_err)
    }

    fn send_expecting_no_body(&self, request: RequestBuilder) -> Result<()> {
        request
            .bearer_auth(self.access_token()?)
            .send()
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?;
        Ok(())
    }

    pub(crate) fn create_topic(&self, board: &str, title: &str, body: &str) -> Result<Created> {
        tracing::debug!(board, title, "create topic");
        let request = self
            .http
            .post(self.url(&paths::topics(board)))
            .json(&NewTopic { title, body });
        self.send(request)
    }

    pub(crate) fn create_topic_reply(&self, topic_id: &str, text: &str) -> Result<Created> {
        tracing::debug!(topic_id, "create top-level reply");
        let request = self
            .http
            .post(self.url(&paths::topic_replies(topic_id)))
            .json(&NewReply { text });
        self.send(request)
    }

    pub(crate) fn create_reply_reply(&self, reply_id: &str, text: &str) -> Result<Created> {
        tracing::debug!(reply_id, "create nested reply");
        let request = self
            .http
            .post(self.url(&paths::reply_replies(reply_id)))
            .json(&NewReply { text });
        self.send(request)
    }

    pub(crate) fn delete_topic(&self, topic_id: &str) -> Result<()> {
        tracing::debug!(topic_id, "delete topic");
        self.send_expecting_no_body(self.http.delete(self.url(&paths::topic(topic_id))))
    }

    pub(crate) fn topic_replies(&self, topic_id: &str) -> Result<Vec<ReplyTree>> {
        self.send(self.http.get(self.url(&paths::topic_replies(topic_id))))
    }

    pub(crate) fn list_topics(&self, board: &str, limit: usize) -> Result<Vec<TopicSummary>> {
        let request = self
            .http
            .get(self.url(&paths::topics(board)))
            .query(&[("limit", limit.to_string())]);
        self.send(request)
    }

    pub(crate) fn search_topics(&self, board: &str, query: &str) -> Result<Vec<TopicSummary>> {
        let request = self
            .http
            .get(self.url(&paths::search(board)))
            .query(&[("q", query)]);
        self.send(request)
    }
}
