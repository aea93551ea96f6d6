//! HTTP session against the remote controller.
//!
//! [`SessionClient`] is the production [`RoverRegistry`]: a cookie-holding
//! reqwest client that logs in once, tracks the rotating `csrftoken`
//! cookie, and speaks the registry endpoints described in
//! [`crate::traits::network`].
//!
//! Protocol quirks live here so the registration loop stays clean:
//!
//! * the CSRF token rides in a cookie and rotates on login, and a
//!   controller that never sets one is served with an empty token;
//! * registry responses that fail to parse are reported as "not
//!   registered" rather than errors, because the remote may legitimately
//!   answer with an HTML error page;
//! * check-in success is strictly status 200 or 201.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::messages::RoverRecord;
use crate::registration::RoverIdentity;
use crate::traits::RoverRegistry;

/// Errors from the controller session.
///
/// Everything here is transport-level; protocol-level refusals are encoded
/// in the [`RoverRegistry`] return values instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The HTTP request itself failed (connect, TLS, timeout).
    #[error("controller transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The configured controller URL does not parse.
    #[error("invalid controller url {url}: {reason}")]
    BadUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// Cookie-session HTTP client for the remote controller.
///
/// Holds the shared cookie jar so the CSRF token can be re-read after each
/// authentication step, the way the controller's Django stack expects.
pub struct SessionClient {
    http: Client,
    jar: Arc<Jar>,
    config: ControllerConfig,
    login_url: Url,
    csrf_token: String,
}

impl SessionClient {
    /// Build a client for the given controller.
    ///
    /// No network traffic happens until [`RoverRegistry::login`] is called.
    pub fn new(config: ControllerConfig) -> Result<Self, SessionError> {
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        let login_url = parse_url(&format!("{}/", config.login_url()))?;
        Ok(Self {
            http,
            jar,
            config,
            login_url,
            csrf_token: String::new(),
        })
    }

    /// The CSRF token currently held for this session.
    ///
    /// Empty until login, and stays empty against controllers that do not
    /// use CSRF cookies.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Re-read the `csrftoken` cookie from the jar.
    ///
    /// A jar without the cookie resets the token to the empty string; the
    /// controller is then expected to accept unprotected requests.
    fn refresh_csrf_token(&mut self) {
        self.csrf_token = self
            .jar
            .cookies(&self.login_url)
            .and_then(|header| header.to_str().map(str::to_owned).ok())
            .and_then(|cookies| {
                cookies
                    .split("; ")
                    .find_map(|pair| pair.strip_prefix("csrftoken=").map(str::to_owned))
            })
            .unwrap_or_default();
    }

    fn identity_form<'a>(&'a self, identity: &'a RoverIdentity) -> [(&'static str, &'a str); 3] {
        [
            ("name", identity.name.as_str()),
            ("local_ip", identity.local_ip.as_str()),
            ("csrfmiddlewaretoken", self.csrf_token.as_str()),
        ]
    }
}

impl RoverRegistry for SessionClient {
    type Error = SessionError;

    async fn login(&mut self) -> Result<(), SessionError> {
        debug!(url = %self.login_url, "probing controller login");
        self.http.get(self.login_url.clone()).send().await?;
        self.refresh_csrf_token();

        let form = [
            ("login", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
            ("csrfmiddlewaretoken", self.csrf_token.as_str()),
        ];
        self.http
            .post(self.login_url.clone())
            .form(&form)
            .send()
            .await?;

        // Login rotates the token.
        self.refresh_csrf_token();
        info!(url = %self.login_url, "controller session established");
        Ok(())
    }

    async fn lookup(&mut self, name: &str) -> Result<Option<RoverRecord>, SessionError> {
        let url = format!("{}?name={}", self.config.registry_url(), name);
        let body = self.http.get(&url).send().await?.text().await?;
        match serde_json::from_str::<Vec<RoverRecord>>(&body) {
            Ok(mut records) if !records.is_empty() => Ok(Some(records.remove(0))),
            Ok(_) => {
                debug!(name, "controller does not know this rover yet");
                Ok(None)
            }
            Err(err) => {
                warn!(name, %err, "unparseable lookup response");
                Ok(None)
            }
        }
    }

    async fn register(&mut self, identity: &RoverIdentity) -> Result<Option<RoverRecord>, SessionError> {
        let url = format!("{}/", self.config.registry_url());
        let body = self
            .http
            .post(&url)
            .form(&self.identity_form(identity))
            .send()
            .await?
            .text()
            .await?;
        match serde_json::from_str::<RoverRecord>(&body) {
            Ok(record) => {
                info!(id = %record.id, "registered with controller");
                Ok(Some(record))
            }
            Err(err) => {
                warn!(%err, "unparseable registration response");
                Ok(None)
            }
        }
    }

    async fn checkin(&mut self, id: &str, identity: &RoverIdentity) -> Result<bool, SessionError> {
        let url = format!("{}/{}/", self.config.registry_url(), id);
        let response = self
            .http
            .put(&url)
            .header("X-CSRFTOKEN", &self.csrf_token)
            .form(&self.identity_form(identity))
            .send()
            .await?;
        let status = response.status();
        Ok(status == StatusCode::OK || status == StatusCode::CREATED)
    }
}

fn parse_url(raw: &str) -> Result<Url, SessionError> {
    Url::parse(raw).map_err(|err| SessionError::BadUrl {
        url: raw.to_owned(),
        reason: err.to_string(),
    })
}
