mod common;

use common::{create_test_console, sign_in, token_json};
use chrono::{DateTime, Duration, Utc};
use condo_console::{
    auth::{storage::{TOKEN_EXP_KEY, TOKEN_KEY}, MemoryNavigator, MemoryStorage, Navigator, SessionStorage},
    config::Settings,
    services::{LoginFailureKind, LoginOutcome},
    ConsoleContext,
};
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{body_json, header_exists, method, path},
    Mock, ResponseTemplate,
};

#[tokio::test]
async fn test_login_success_establishes_session() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ana@condo.cl", "password": "secreto"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("tok-ana", 12, "residente", 3600)))
        .expect(1)
        .mount(&console.server)
        .await;

    let before = Utc::now();
    let outcome = console.ctx.auth.login("ana@condo.cl", "secreto").await;
    let after = Utc::now();
    assert!(outcome.is_success());

    let expires_at = console.ctx.session.session().unwrap().expires_at;
    let issued_at = expires_at - Duration::seconds(3600);
    assert!(before <= issued_at && issued_at <= after);

    let user = console.ctx.current_user().unwrap();
    assert_eq!(user.id, 12);
    assert_eq!(user.name, "Usuario 12");
    assert_eq!(user.role, "residente");
    assert!(console.ctx.session.is_authenticated());

    let headers = console.ctx.auth_headers().await;
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-ana");

    let persisted = console.storage.snapshot().await;
    assert_eq!(persisted.get(TOKEN_KEY).map(String::as_str), Some("tok-ana"));
    assert_eq!(persisted.len(), 3);
    let persisted_expiry = DateTime::parse_from_rfc3339(&persisted[TOKEN_EXP_KEY]).unwrap();
    assert_eq!(persisted_expiry.timestamp_millis(), expires_at.timestamp_millis());

    let permissions = console.ctx.permissions();
    assert!(!permissions.view_all_reservas());
    assert!(permissions.create_reservas());
}

#[tokio::test]
async fn test_login_sends_no_credentials() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 1, "admin", "existing").await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&console.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("fresh", 2, "conserje", 3600)))
        .mount(&console.server)
        .await;

    assert!(console.ctx.auth.login("c@condo.cl", "pw").await.is_success());
    assert_eq!(console.ctx.session.token().as_deref(), Some("fresh"));
    assert!(console.ctx.permissions().view_novedades());
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Email o contraseña incorrectos"})),
        )
        .mount(&console.server)
        .await;

    let outcome = console.ctx.auth.login("ana@condo.cl", "mala").await;
    assert_eq!(
        outcome,
        LoginOutcome::Failure {
            kind: LoginFailureKind::InvalidCredentials,
            message: "Email o contraseña incorrectos".to_string(),
        }
    );
    assert!(console.ctx.current_user().is_none());
    assert!(console.storage.snapshot().await.is_empty());
    assert_eq!(console.navigator.redirect_count(), 0);
}

#[tokio::test]
async fn test_wrong_password_without_detail_uses_default_message() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&console.server)
        .await;

    match console.ctx.auth.login("ana@condo.cl", "mala").await {
        LoginOutcome::Failure { kind, message } => {
            assert_eq!(kind, LoginFailureKind::InvalidCredentials);
            assert!(message.starts_with("Credenciales inválidas"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_backend_unavailable() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "Base de datos no disponible"})))
        .mount(&console.server)
        .await;

    match console.ctx.auth.login("ana@condo.cl", "secreto").await {
        LoginOutcome::Failure { kind, message } => {
            assert_eq!(kind, LoginFailureKind::BackendUnavailable);
            assert_eq!(message, "Base de datos no disponible");
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(console.storage.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_inactive_user_is_other_failure() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Usuario inactivo"})))
        .mount(&console.server)
        .await;

    let outcome = console.ctx.auth.login("ana@condo.cl", "secreto").await;
    assert_eq!(
        outcome,
        LoginOutcome::Failure {
            kind: LoginFailureKind::Other,
            message: "Usuario inactivo".to_string(),
        }
    );
}

#[tokio::test]
async fn test_malformed_success_body_is_other_failure() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "x"})))
        .mount(&console.server)
        .await;

    match console.ctx.auth.login("ana@condo.cl", "secreto").await {
        LoginOutcome::Failure { kind, .. } => assert_eq!(kind, LoginFailureKind::Other),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(console.storage.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_non_positive_lifetime_is_rejected() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("tok", 3, "admin", 0)))
        .mount(&console.server)
        .await;

    assert!(!console.ctx.auth.login("a@condo.cl", "pw").await.is_success());
    assert!(console.ctx.current_user().is_none());
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 5, "directiva", "keep-me").await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&console.server)
        .await;

    assert!(!console.ctx.auth.login("x@condo.cl", "bad").await.is_success());
    assert_eq!(console.ctx.session.token().as_deref(), Some("keep-me"));
    assert_eq!(console.navigator.redirect_count(), 0);
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Nothing listens on port 1
    let ctx = ConsoleContext::with_storage(
        Settings::for_api("http://127.0.0.1:1"),
        Arc::new(MemoryStorage::new()) as Arc<dyn SessionStorage>,
        Arc::new(MemoryNavigator::default()) as Arc<dyn Navigator>,
    )
    .await
    .unwrap();

    match ctx.auth.login("ana@condo.cl", "secreto").await {
        LoginOutcome::Failure { kind, message } => {
            assert_eq!(kind, LoginFailureKind::BackendUnavailable);
            assert!(!message.is_empty());
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_logout_clears_session() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 7, "admin", "tok").await;

    console.ctx.auth.logout().await;

    assert!(console.ctx.current_user().is_none());
    assert!(console.ctx.auth_headers().await.is_empty());
    assert!(console.storage.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_unresponsive_backend_is_unavailable() {
    let console = create_test_console().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_json("late", 1, "admin", 3600))
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .mount(&console.server)
        .await;

    let settings = Settings {
        http_timeout_seconds: 0.2,
        ..Settings::for_api(&console.server.uri())
    };
    let ctx = ConsoleContext::with_storage(
        settings,
        Arc::new(MemoryStorage::new()) as Arc<dyn SessionStorage>,
        Arc::new(MemoryNavigator::default()) as Arc<dyn Navigator>,
    )
    .await
    .unwrap();

    match ctx.auth.login("ana@condo.cl", "secreto").await {
        LoginOutcome::Failure { kind, .. } => assert_eq!(kind, LoginFailureKind::BackendUnavailable),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(ctx.current_user().is_none());
}
