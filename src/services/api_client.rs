use crate::auth::routes::Navigator;
use crate::auth::store::SessionStore;
use crate::config::Settings;
use crate::error::{ClientError, ClientResult};
use crate::middleware::{handle_rejection, RejectionOutcome, RequestLog};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Header carrying the per-request correlation id.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credentials {
    Attach,
    Omit,
}

/// HTTP gateway to the condominium API.
///
/// Resolves endpoints against the configured base URL, sends JSON, attaches
/// the current bearer token and turns a 401 on an authenticated request into
/// a session invalidation plus redirect to the login path.
pub struct ApiClient {
    http: Client,
    base_url: String,
    login_path: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        settings: &Settings,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(settings.http_timeout())
            .user_agent(&settings.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            login_path: settings.login_path.clone(),
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Absolute URL for `endpoint`, adding the leading slash if missing.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Authenticated request with an optional JSON body, returning the raw response.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ClientResult<Response> {
        let body = body.map(serde_json::to_vec).transpose()?;
        self.execute(method, endpoint, body, Credentials::Attach).await
    }

    pub async fn get(&self, endpoint: &str) -> ClientResult<Response> {
        self.execute(Method::GET, endpoint, None, Credentials::Attach).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ClientResult<Response> {
        let body = serde_json::to_vec(body)?;
        self.execute(Method::POST, endpoint, Some(body), Credentials::Attach).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ClientResult<Response> {
        let body = serde_json::to_vec(body)?;
        self.execute(Method::PUT, endpoint, Some(body), Credentials::Attach).await
    }

    pub async fn delete(&self, endpoint: &str) -> ClientResult<Response> {
        self.execute(Method::DELETE, endpoint, None, Credentials::Attach).await
    }

    /// POST without credentials. Used for the credential exchange itself, so
    /// a rejected login can never evict an existing session.
    pub async fn post_public<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<Response> {
        let body = serde_json::to_vec(body)?;
        self.execute(Method::POST, endpoint, Some(body), Credentials::Omit).await
    }

    /// GET `endpoint` and decode a JSON body, mapping non-2xx to errors.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        let response = self.get(endpoint).await?;
        decode_json(response).await
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
        credentials: Credentials,
    ) -> ClientResult<Response> {
        let (held, token) = match credentials {
            Credentials::Attach => (
                self.session.held_token().await,
                self.session.unexpired_token().await,
            ),
            Credentials::Omit => (None, None),
        };

        let log = RequestLog::start(&method, endpoint);
        let mut request = self
            .http
            .request(method.clone(), self.url(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .header(CORRELATION_HEADER, log.correlation_id().to_string());

        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log.failed(&e);
                return Err(ClientError::HttpClient(e));
            }
        };
        log.completed(response.status());

        let outcome = handle_rejection(
            response.status(),
            held.as_deref(),
            &self.session,
            self.navigator.as_ref(),
            &self.login_path,
        )
        .await;

        // Held but not attached: the session expired before the request went out
        if outcome == RejectionOutcome::Ignored && held.is_some() && token.is_none() {
            self.session.evict_expired().await;
        }

        Ok(response)
    }
}

/// Decode a 2xx JSON body or convert the failure into a [`ClientError`].
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    if response.status().is_success() {
        let bytes = response.bytes().await?;
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let (status, detail) = error_detail(response).await;
    let detail = detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Authentication(detail),
        _ => ClientError::api(status, detail),
    })
}

/// Status and human-readable message of an error response: the JSON
/// `detail` or `message` field, else the raw body text.
pub async fn error_detail(response: Response) -> (StatusCode, Option<String>) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    (status, detail_from_body(&text))
}

pub(crate) fn detail_from_body(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["detail", "message"].iter().find_map(|field| {
            match value.get(*field) {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                Some(serde_json::Value::Null) | None => None,
                Some(serde_json::Value::String(_)) => None,
                Some(other) => Some(other.to_string()),
            }
        }),
        Err(_) => Some(trimmed.to_string()),
    }
}
