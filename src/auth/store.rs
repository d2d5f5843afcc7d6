use crate::auth::context::Permissions;
use crate::auth::rbac::Role;
use crate::auth::session::{Session, UserProfile};
use crate::auth::storage::{SessionStorage, SESSION_KEYS, TOKEN_EXP_KEY, TOKEN_KEY, USER_KEY};
use crate::error::ClientResult;
use arc_swap::ArcSwapOption;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Single owner of the bearer session.
///
/// Readers (`auth_headers`, `current_user`, ...) go through an `ArcSwapOption`
/// and never block. Every write to memory or storage happens inside one of
/// this type's methods while holding `write_lock`, so memory and the
/// persisted keys change together.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    current: ArcSwapOption<Session>,
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            current: ArcSwapOption::empty(),
            write_lock: Mutex::new(()),
        }
    }

    /// Load the persisted session, or discard every persisted field if any
    /// of them is missing, expired or unreadable.
    pub async fn restore(&self) -> Option<Arc<Session>> {
        let _guard = self.write_lock.lock().await;

        match self.load_persisted(Utc::now()).await {
            Ok(Some(session)) => {
                let session = Arc::new(session);
                tracing::info!(
                    user_id = session.profile.id,
                    role = %session.profile.role,
                    expires_at = %session.expires_at,
                    "session restored"
                );
                self.current.store(Some(session.clone()));
                Some(session)
            }
            Ok(None) => {
                self.current.store(None);
                self.clear_persisted().await;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted session, starting signed out");
                self.current.store(None);
                self.clear_persisted().await;
                None
            }
        }
    }

    /// Make `session` the current one, in memory and on disk.
    ///
    /// If the write fails nothing is left behind and the store stays empty.
    pub async fn establish(&self, session: Session) -> ClientResult<Arc<Session>> {
        let _guard = self.write_lock.lock().await;

        let profile_json = serde_json::to_string(&session.profile)?;
        let entries = [
            (USER_KEY, profile_json),
            (TOKEN_KEY, session.token.clone()),
            (TOKEN_EXP_KEY, session.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];

        if let Err(e) = self.storage.set_all(&entries).await {
            self.current.store(None);
            self.clear_persisted().await;
            return Err(e);
        }

        let session = Arc::new(session);
        self.current.store(Some(session.clone()));
        Ok(session)
    }

    /// Replace the stored profile of the current session, keeping its token
    /// and expiry. Returns false when there is no session to update.
    pub async fn update_profile(&self, profile: UserProfile) -> ClientResult<bool> {
        let _guard = self.write_lock.lock().await;

        let Some(existing) = self.live() else {
            return Ok(false);
        };

        self.storage
            .set_all(&[(USER_KEY, serde_json::to_string(&profile)?)])
            .await?;

        let updated = Session::new(profile, existing.token.clone(), existing.expires_at);
        self.current.store(Some(Arc::new(updated)));
        Ok(true)
    }

    /// Clear memory and storage. Never fails; storage errors are logged.
    pub async fn sign_out(&self) {
        let _guard = self.write_lock.lock().await;
        let previous = self.current.swap(None);
        self.clear_persisted().await;

        if let Some(previous) = previous {
            tracing::info!(user_id = previous.profile.id, "signed out");
        }
    }

    /// The server rejected `rejected_token`. Clear the session if it is still
    /// the one holding that token.
    ///
    /// Returns true only for the call that actually cleared it; repeated or
    /// concurrent rejections of the same token, and rejections of a token
    /// that has since been replaced, return false.
    pub async fn invalidate(&self, rejected_token: &str) -> bool {
        let _guard = self.write_lock.lock().await;

        let holds_token = match self.current.load_full() {
            Some(session) => session.token == rejected_token,
            None => matches!(
                self.storage.get(TOKEN_KEY).await,
                Ok(Some(ref persisted)) if persisted == rejected_token
            ),
        };

        if !holds_token {
            return false;
        }

        self.current.store(None);
        self.clear_persisted().await;
        tracing::info!("session invalidated by server rejection");
        true
    }

    /// `Authorization: Bearer <token>` for the held token, or an empty map.
    ///
    /// Falls back to the persisted token when memory is still empty, e.g.
    /// before `restore` has completed. An expired session is evicted.
    pub async fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let bearer = match self.live() {
            Some(session) => Some(session.bearer()),
            None => self.valid_token().await.map(|token| format!("Bearer {}", token)),
        };

        if let Some(bearer) = bearer {
            match HeaderValue::from_str(&bearer) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("stored token is not a valid header value, sending no credentials");
                }
            }
        }

        headers
    }

    /// Token that would be attached to a request right now. Finding the
    /// held session expired evicts it.
    pub async fn valid_token(&self) -> Option<String> {
        if let Some(token) = self.unexpired_token().await {
            return Some(token);
        }
        self.evict_expired().await;
        None
    }

    /// Like [`valid_token`](Self::valid_token) but leaves an expired session in place.
    pub async fn unexpired_token(&self) -> Option<String> {
        let now = Utc::now();

        if let Some(session) = self.current.load_full() {
            return (!session.is_expired_at(now)).then(|| session.token.clone());
        }

        let token = self.storage.get(TOKEN_KEY).await.ok().flatten()?;
        let expiry = self.storage.get(TOKEN_EXP_KEY).await.ok().flatten()?;
        let expires_at = parse_instant(&expiry)?;
        (expires_at > now).then_some(token)
    }

    /// Token held right now, in memory or persisted, whether expired or not.
    pub async fn held_token(&self) -> Option<String> {
        match self.token() {
            Some(token) => Some(token),
            None => self.storage.get(TOKEN_KEY).await.ok().flatten(),
        }
    }

    /// Clear the held session if its expiry has passed.
    ///
    /// Returns true only for the call that cleared it. A session that is
    /// still valid, or that replaced the expired one, is left alone.
    pub async fn evict_expired(&self) -> bool {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();

        let expired = match self.current.load_full() {
            Some(session) => session.is_expired_at(now),
            None => match self.storage.get(TOKEN_KEY).await {
                Ok(Some(_)) => {
                    let expiry = self.storage.get(TOKEN_EXP_KEY).await.ok().flatten();
                    expiry
                        .as_deref()
                        .and_then(parse_instant)
                        .map(|expires_at| expires_at <= now)
                        .unwrap_or(true)
                }
                _ => false,
            },
        };

        if !expired {
            return false;
        }

        self.current.store(None);
        self.clear_persisted().await;
        tracing::info!("expired session evicted");
        true
    }

    /// Current session if it has not expired, evicting it otherwise.
    pub async fn active_session(&self) -> Option<Arc<Session>> {
        if let Some(session) = self.live() {
            return Some(session);
        }
        self.evict_expired().await;
        None
    }

    /// Current unexpired session. Expired state is never reported.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.live()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.live().map(|s| s.profile.clone())
    }

    /// Bearer token of the in-memory session, expired or not.
    pub fn token(&self) -> Option<String> {
        self.current.load().as_ref().map(|s| s.token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.live().and_then(|s| s.role())
    }

    pub fn is_authenticated(&self) -> bool {
        self.live().is_some()
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.role())
    }

    fn live(&self) -> Option<Arc<Session>> {
        self.current
            .load_full()
            .filter(|session| !session.is_expired())
    }

    async fn load_persisted(&self, now: DateTime<Utc>) -> ClientResult<Option<Session>> {
        let user = self.storage.get(USER_KEY).await?;
        let token = self.storage.get(TOKEN_KEY).await?;
        let expiry = self.storage.get(TOKEN_EXP_KEY).await?;

        let (Some(user), Some(token), Some(expiry)) = (user, token, expiry) else {
            tracing::debug!("persisted session incomplete, discarding");
            return Ok(None);
        };

        if token.is_empty() {
            tracing::debug!("persisted token empty, discarding");
            return Ok(None);
        }

        let Some(expires_at) = parse_instant(&expiry) else {
            tracing::warn!(expiry = %expiry, "persisted expiry unparsable, discarding session");
            return Ok(None);
        };

        if expires_at <= now {
            tracing::debug!(expires_at = %expires_at, "persisted session expired, discarding");
            return Ok(None);
        }

        let profile = match serde_json::from_str::<UserProfile>(&user) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "persisted profile corrupt, discarding session");
                return Ok(None);
            }
        };

        Ok(Some(Session::new(profile, token, expires_at)))
    }

    async fn clear_persisted(&self) {
        if let Err(e) = self.storage.remove_all(&SESSION_KEYS).await {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
