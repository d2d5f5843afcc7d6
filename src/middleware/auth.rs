use crate::auth::routes::{redirect_to_login, Navigator};
use crate::auth::store::SessionStore;
use reqwest::StatusCode;

/// What the client did after seeing a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionOutcome {
    /// Not a rejection, or no credentials were sent with the request.
    Ignored,
    /// The session was already gone or replaced; nothing cleared.
    AlreadyCleared,
    /// This call cleared the session.
    Cleared { redirected: bool },
}

/// Client-side counterpart of the server's auth gate: a 401 on a request made
/// while the session held `held_token` clears that session and sends the
/// navigator to the login path (unless it is already there).
///
/// `held_token` is the token held when the request went out, attached or
/// not. An expired token is not sent, but the 401 still ends its session.
pub async fn handle_rejection(
    status: StatusCode,
    held_token: Option<&str>,
    session: &SessionStore,
    navigator: &dyn Navigator,
    login_path: &str,
) -> RejectionOutcome {
    if status != StatusCode::UNAUTHORIZED {
        return RejectionOutcome::Ignored;
    }

    let Some(token) = held_token else {
        tracing::debug!("401 with no session held");
        return RejectionOutcome::Ignored;
    };

    if !session.invalidate(token).await {
        return RejectionOutcome::AlreadyCleared;
    }

    let redirected = redirect_to_login(navigator, login_path);
    RejectionOutcome::Cleared { redirected }
}
