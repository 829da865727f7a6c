//! HTTP client for the LLMOps backend API.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    config::Config,
    error::RedirectTarget,
    notify::{LogNotifier, Notifier},
    session::{MemorySession, SessionProvider},
    types::{Response, ResponseCode},
    Error,
};

/// Fixed window every non-streaming request is raced against.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the LLMOps backend API.
///
/// Every call attaches the session's bearer token, races a 60-second timeout,
/// and classifies the response envelope by its `code` field. Redirect-class
/// codes (`unauthorized`, `not_found`, `forbidden`) reject with
/// [`Error::Redirected`] so callers always observe an outcome.
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) session: Arc<dyn SessionProvider>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) timeout: Duration,
}

impl Client {
    /// Creates a client from configuration, with an empty in-memory session
    /// and `tracing`-backed notifications.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_base_url(&config.base_url)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Arc::new(MemorySession::new()),
            notifier: Arc::new(LogNotifier),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Replaces the session provider the client reads tokens from.
    pub fn with_session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = session;
        self
    }

    /// Replaces the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Overrides the request timeout. Used in tests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    /// Issues a GET request with percent-encoded query parameters.
    pub async fn get<T>(&self, path: &str, params: &[(&str, String)]) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(path, params)?;
        let req = self.http.get(url);
        self.execute(path, req).await
    }

    /// Issues a POST request with a JSON-serialized body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path, &[])?;
        let req = self.http.post(url).json(body);
        self.execute(path, req).await
    }

    /// Builds the final URL: base prefix, a single leading slash, and each
    /// query parameter appended percent-encoded. `query_pairs_mut` joins with
    /// `?` or `&` depending on whether the path already carries a query.
    pub(crate) fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, Error> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            tracing::error!("invalid URL constructed: {}", e);
            Error::InvalidUrl(e)
        })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub(crate) fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.access_token() {
            Some(token) if !token.is_empty() => req.bearer_auth(token),
            _ => req,
        }
    }

    async fn execute<T>(&self, path: &str, req: reqwest::RequestBuilder) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned,
    {
        let req = self
            .authorize(req)
            .header("content-type", "application/json");
        let send = async {
            let resp = req.send().await?;
            resp.text().await
        };
        let body = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::error!("request to {} failed: {}", path, e);
                self.notifier.error(&e.to_string());
                return Err(Error::Network(e));
            }
            // The in-flight request is dropped, not cancelled server-side.
            Err(_) => {
                tracing::error!("request to {} timed out", path);
                return Err(Error::Timeout);
            }
        };
        let envelope: Response<serde_json::Value> = serde_json::from_str(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("failed to parse envelope: {} | body: {}", e, snippet);
            self.notifier.error(&e.to_string());
            Error::Parse(e)
        })?;
        self.classify(path, envelope)
    }

    /// Classifies an envelope by its `code`, never by HTTP status alone.
    pub(crate) fn classify<T>(
        &self,
        path: &str,
        envelope: Response<serde_json::Value>,
    ) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned,
    {
        match envelope.code {
            ResponseCode::Success => {
                let data = serde_json::from_value(envelope.data)?;
                Ok(Response {
                    code: envelope.code,
                    message: envelope.message,
                    data,
                })
            }
            ResponseCode::Unauthorized => {
                self.session.clear();
                Err(Error::Redirected(RedirectTarget::Login {
                    redirect: Some(path.to_string()),
                }))
            }
            ResponseCode::NotFound => Err(Error::Redirected(RedirectTarget::NotFound)),
            ResponseCode::Forbidden => Err(Error::Redirected(RedirectTarget::Forbidden)),
            ResponseCode::Fail | ResponseCode::ValidateError | ResponseCode::Unknown => {
                self.notifier.error(&envelope.message);
                Err(Error::Api {
                    code: envelope.code,
                    message: envelope.message,
                })
            }
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        format!("{}...[truncated]", &body[..MAX])
    }
}
