#![allow(dead_code)]

use chrono::Utc;
use condo_console::{
    auth::{MemoryNavigator, MemoryStorage, Navigator, Session, SessionStorage, UserProfile},
    config::Settings,
    ConsoleContext,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

/// A console context wired to a mock API with in-memory storage
pub struct TestConsole {
    pub server: MockServer,
    pub ctx: ConsoleContext,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<MemoryNavigator>,
}

pub async fn create_test_console() -> TestConsole {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let navigator = Arc::new(MemoryNavigator::default());

    let ctx = ConsoleContext::with_storage(
        Settings::for_api(&server.uri()),
        storage.clone() as Arc<dyn SessionStorage>,
        navigator.clone() as Arc<dyn Navigator>,
    )
    .await
    .expect("Failed to create test console");

    TestConsole {
        server,
        ctx,
        storage,
        navigator,
    }
}

pub fn profile(id: i64, role: &str) -> UserProfile {
    UserProfile {
        id,
        email: format!("user{}@condo.cl", id),
        name: format!("Usuario {}", id),
        role: role.to_string(),
    }
}

/// Put a one-hour session straight into the store
pub async fn sign_in(ctx: &ConsoleContext, id: i64, role: &str, token: &str) {
    ctx.session
        .establish(Session::issued_at(profile(id, role), token.to_string(), Utc::now(), 3600))
        .await
        .expect("Failed to establish test session");
}

pub fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("user{}@condo.cl", id),
        "nombre_completo": format!("Usuario {}", id),
        "rol": role,
    })
}

pub fn token_json(token: &str, id: i64, role: &str, expires_in: i64) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": expires_in,
        "user": user_json(id, role),
    })
}
