use crate::auth::session::{Session, UserProfile};
use crate::auth::store::SessionStore;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoginRequest, TokenResponse, TokenUser};
use crate::services::api_client::{decode_json, error_detail, ApiClient};
use chrono::Utc;
use reqwest::StatusCode;
use std::fmt;
use std::sync::Arc;

const LOGIN_ENDPOINT: &str = "/auth/login";
const ME_ENDPOINT: &str = "/auth/me";

const INVALID_CREDENTIALS_MESSAGE: &str = "Credenciales inválidas. Verifica tu email y contraseña.";
const BACKEND_UNAVAILABLE_MESSAGE: &str =
    "Error al conectar con la base de datos. Verifica la disponibilidad del backend.";
const UNREACHABLE_MESSAGE: &str =
    "No se pudo conectar con el servidor. Verifica que el backend esté en ejecución.";
const LOGIN_FAILED_MESSAGE: &str = "Error al iniciar sesión";

/// Why a login attempt did not produce a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailureKind {
    InvalidCredentials,
    BackendUnavailable,
    Other,
}

impl LoginFailureKind {
    fn default_message(&self) -> &'static str {
        match self {
            LoginFailureKind::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE,
            LoginFailureKind::BackendUnavailable => BACKEND_UNAVAILABLE_MESSAGE,
            LoginFailureKind::Other => LOGIN_FAILED_MESSAGE,
        }
    }
}

impl fmt::Display for LoginFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoginFailureKind::InvalidCredentials => "invalid_credentials",
            LoginFailureKind::BackendUnavailable => "backend_unavailable",
            LoginFailureKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Result of a credential exchange. Expected failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(UserProfile),
    Failure { kind: LoginFailureKind, message: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success(_) => None,
            LoginOutcome::Failure { message, .. } => Some(message),
        }
    }

    fn failure(kind: LoginFailureKind, detail: Option<String>) -> Self {
        LoginOutcome::Failure {
            kind,
            message: detail.unwrap_or_else(|| kind.default_message().to_string()),
        }
    }
}

/// Maps a login response status to the failure kind it represents.
fn failure_kind(status: StatusCode) -> LoginFailureKind {
    match status {
        StatusCode::UNAUTHORIZED => LoginFailureKind::InvalidCredentials,
        StatusCode::SERVICE_UNAVAILABLE => LoginFailureKind::BackendUnavailable,
        _ => LoginFailureKind::Other,
    }
}

pub struct AuthService {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { client, session }
    }

    /// Exchange credentials for a session. Never returns an error: transport
    /// faults and malformed responses become `LoginOutcome::Failure`, and a
    /// failed attempt leaves any existing session untouched.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let request = LoginRequest { email, password };

        let response = match self.client.post_public(LOGIN_ENDPOINT, &request).await {
            Ok(response) => response,
            Err(ClientError::HttpClient(e)) if e.is_connect() || e.is_timeout() => {
                tracing::warn!(error = %e, "login failed: backend unreachable");
                return LoginOutcome::failure(
                    LoginFailureKind::BackendUnavailable,
                    Some(UNREACHABLE_MESSAGE.to_string()),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "login request failed");
                return LoginOutcome::failure(LoginFailureKind::Other, None);
            }
        };

        if !response.status().is_success() {
            let (status, detail) = error_detail(response).await;
            let kind = failure_kind(status);
            tracing::info!(status = status.as_u16(), kind = %kind, "login rejected");
            return LoginOutcome::failure(kind, detail);
        }

        let token: TokenResponse = match decode_json(response).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "malformed login response");
                return LoginOutcome::failure(LoginFailureKind::Other, None);
            }
        };

        if token.access_token.is_empty() || token.expires_in <= 0 {
            tracing::warn!(expires_in = token.expires_in, "login response without usable token");
            return LoginOutcome::failure(LoginFailureKind::Other, None);
        }

        let profile: UserProfile = token.user.into();
        let session = Session::issued_at(profile.clone(), token.access_token, Utc::now(), token.expires_in);

        match self.session.establish(session).await {
            Ok(session) => {
                tracing::info!(
                    user_id = profile.id,
                    role = %profile.role,
                    expires_at = %session.expires_at,
                    "login succeeded"
                );
                LoginOutcome::Success(profile)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to persist session");
                LoginOutcome::failure(LoginFailureKind::Other, None)
            }
        }
    }

    pub async fn logout(&self) {
        self.session.sign_out().await;
    }

    /// Re-read the signed-in user from `GET /auth/me` and store it.
    pub async fn refresh_profile(&self) -> ClientResult<UserProfile> {
        if self.session.active_session().await.is_none() {
            return Err(ClientError::authentication("Not signed in"));
        }

        let user: TokenUser = self.client.get_json(ME_ENDPOINT).await?;
        let profile: UserProfile = user.into();

        if !self.session.update_profile(profile.clone()).await? {
            return Err(ClientError::authentication("Session ended during profile refresh"));
        }

        tracing::debug!(user_id = profile.id, role = %profile.role, "profile refreshed");
        Ok(profile)
    }
}
