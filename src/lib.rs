use std::sync::Arc;
use crate::{
    auth::{
        routes::{MemoryNavigator, Navigator},
        storage::{FileStorage, SessionStorage},
        Permissions, SessionStore, UserProfile,
    },
    config::Settings,
    error::ClientResult,
    services::{ApiClient, AuthService, PagosService},
};
use reqwest::header::HeaderMap;

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

/// Shared client state containing all dependencies.
///
/// Built once at process start and passed by reference; cloning is cheap.
#[derive(Clone)]
pub struct ConsoleContext {
    pub settings: Arc<Settings>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<dyn Navigator>,
    pub api: Arc<ApiClient>,
    pub auth: Arc<AuthService>,
    pub pagos: Arc<PagosService>,
}

impl ConsoleContext {
    /// Create the context with file-backed session storage and restore any
    /// persisted session.
    pub async fn new(settings: Settings) -> ClientResult<Self> {
        settings.validate()?;
        let storage: Arc<dyn SessionStorage> = Arc::new(FileStorage::new(settings.session_file.clone()));
        let navigator: Arc<dyn Navigator> = Arc::new(MemoryNavigator::default());
        Self::with_storage(settings, storage, navigator).await
    }

    /// Create the context over an existing storage backend and navigator
    pub async fn with_storage(
        settings: Settings,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let settings = Arc::new(settings);

        let session = Arc::new(SessionStore::new(storage));
        session.restore().await;

        let api = Arc::new(ApiClient::new(&settings, session.clone(), navigator.clone())?);
        let auth = Arc::new(AuthService::new(api.clone(), session.clone()));
        let pagos = Arc::new(PagosService::new(api.clone(), session.clone()));

        Ok(Self {
            settings,
            session,
            navigator,
            api,
            auth,
            pagos,
        })
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    pub fn permissions(&self) -> Permissions {
        self.session.permissions()
    }

    pub async fn auth_headers(&self) -> HeaderMap {
        self.session.auth_headers().await
    }
}
