mod common;

use common::{create_test_console, sign_in};
use condo_console::error::ClientError;
use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, ResponseTemplate,
};

fn breakdown_json() -> serde_json::Value {
    json!({
        "viviendas": [4],
        "cargo_fijo_uf": 1.2,
        "gastos_comunes": [
            {"id": 1, "vivienda_id": 4, "mes": 5, "ano": 2024, "monto_total": 85000.0,
             "estado": "pendiente", "vencimiento": "2024-06-05"}
        ],
        "multas": [
            {"id": 8, "vivienda_id": 4, "monto": 20000.0, "descripcion": "Estacionamiento",
             "fecha_aplicada": null}
        ],
        "reservas": []
    })
}

#[tokio::test]
async fn test_resident_reads_own_breakdown() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 12, "residente", "tok-12").await;

    Mock::given(method("GET"))
        .and(path("/pagos/residente/12"))
        .and(header("authorization", "Bearer tok-12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(breakdown_json()))
        .expect(1)
        .mount(&console.server)
        .await;

    let breakdown = console.ctx.pagos.fetch_own_breakdown().await.unwrap();
    assert_eq!(breakdown.viviendas, vec![4]);
    assert_eq!(breakdown.multas.len(), 1);
    assert_eq!(breakdown.total_due(), 105000.0);
}

#[tokio::test]
async fn test_resident_cannot_read_other_breakdown() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 12, "residente", "tok-12").await;

    let err = console.ctx.pagos.fetch_breakdown(13).await.unwrap_err();
    assert!(matches!(err, ClientError::Authorization(_)));

    let err = console.ctx.pagos.fetch_all().await.unwrap_err();
    assert!(matches!(err, ClientError::Authorization(_)));

    assert!(console.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_lists_all_payments() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 1, "admin", "tok-admin").await;

    Mock::given(method("GET"))
        .and(path("/pagos/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagos": [{
                "id": 30, "usuario_id": 12, "usuario_nombre": "Ana Rojas", "vivienda": "A-101",
                "monto_pagado": 85000.0, "fecha_pago": "2024-05-03T10:00:00", "metodo_pago": "transferencia",
                "gasto_mes": 5, "gasto_ano": 2024, "gasto_estado": "pagado"
            }],
            "total": 1,
            "total_monto": 85000.0
        })))
        .mount(&console.server)
        .await;

    let list = console.ctx.pagos.fetch_all().await.unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.pagos[0].vivienda, "A-101");
}

#[tokio::test]
async fn test_admin_reads_other_breakdown() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 1, "admin", "tok-admin").await;

    Mock::given(method("GET"))
        .and(path("/pagos/residente/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(breakdown_json()))
        .mount(&console.server)
        .await;

    assert!(console.ctx.pagos.fetch_breakdown(12).await.is_ok());
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let console = create_test_console().await;
    sign_in(&console.ctx, 1, "admin", "tok-admin").await;

    Mock::given(method("GET"))
        .and(path("/pagos/todos"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Error interno"})))
        .mount(&console.server)
        .await;

    match console.ctx.pagos.fetch_all().await.unwrap_err() {
        ClientError::Api { status, detail } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(detail, "Error interno");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(console.ctx.current_user().is_some());
}

#[tokio::test]
async fn test_signed_out_payments_make_no_request() {
    let console = create_test_console().await;

    let err = console.ctx.pagos.fetch_own_breakdown().await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)));
    let err = console.ctx.pagos.fetch_all().await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)));

    assert!(console.server.received_requests().await.unwrap().is_empty());
}
