//! Integration tests for the external agent portal.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use shipgate_entity::shipment::ShipmentStatus;

#[tokio::test]
async fn test_session_describes_grant() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(
            shipment.id,
            json!({ "can_change_status": true, "allowed_statuses": ["customs"] }),
        )
        .await;

    let response = app
        .request("GET", "/api/portal/session", None, Some(&grant.token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["shipment_id"], shipment.id.to_string());
    assert_eq!(data["agent"]["agent_type"], "broker");
    assert_eq!(data["capabilities"]["can_change_status"], true);
    assert!(data.get("tenant_id").is_none());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/portal/shipment", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_token_is_invalid() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/portal/shipment", None, Some("ext_nokey.nosecret"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "CREDENTIAL_INVALID");
}

#[tokio::test]
async fn test_token_accepted_from_query_string() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Shipped).await;
    let grant = app.grant(shipment.id, json!({})).await;

    let response = app
        .request(
            "GET",
            &format!("/api/portal/shipment?token={}", grant.token),
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["reference"], "IMP-2026-0142");
}

#[tokio::test]
async fn test_expired_credential_rejected() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Shipped).await;
    let grant = app.grant(shipment.id, json!({})).await;

    let mut stored = app.store.credential(grant.id).await.unwrap();
    stored.expires_at = Utc::now() - Duration::minutes(1);
    app.store.insert_credential(stored).await;

    let response = app
        .request("GET", "/api/portal/shipment", None, Some(&grant.token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "CREDENTIAL_EXPIRED");
}

#[tokio::test]
async fn test_costs_visible_only_with_cost_capability() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    let plain = app.grant(shipment.id, json!({})).await;
    let costs = app.grant(shipment.id, json!({ "can_edit_costs": true })).await;

    let hidden = app
        .request("GET", "/api/portal/shipment", None, Some(&plain.token))
        .await;
    assert_eq!(hidden.status, StatusCode::OK);
    assert!(hidden.data().get("freight_cost").is_none());
    assert_eq!(hidden.data()["vessel_name"], "Maersk Elba");
    assert_eq!(hidden.data()["allowed_next_statuses"], json!([]));

    let shown = app
        .request("GET", "/api/portal/shipment", None, Some(&costs.token))
        .await;
    assert_eq!(shown.data()["freight_cost"], 2400.0);
}

#[tokio::test]
async fn test_denied_field_rejects_whole_batch() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(shipment.id, json!({ "can_edit_dates": true }))
        .await;
    let audit_before = app.store.audit_log().await.len();

    let response = app
        .request(
            "PATCH",
            "/api/portal/shipment/fields",
            Some(json!({ "eta": "2026-11-02", "bl_number": "FORGED123" })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let stored = app.store.shipment(shipment.id).await.unwrap();
    assert!(stored.eta.is_none());
    assert_eq!(stored.bl_number.as_deref(), Some("MAEU20260142"));
    assert_eq!(app.store.audit_log().await.len(), audit_before);
}

#[tokio::test]
async fn test_authorized_field_update_applies() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(
            shipment.id,
            json!({ "can_edit_dates": true, "allowed_fields": ["container_number"] }),
        )
        .await;

    let response = app
        .request(
            "PATCH",
            "/api/portal/shipment/fields",
            Some(json!({ "eta": "2026-11-02", "container_number": " MSKU7781234 " })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.data()["container_number"], "MSKU7781234");
    let stored = app.store.shipment(shipment.id).await.unwrap();
    assert_eq!(stored.eta.unwrap().to_rfc3339(), "2026-11-02T00:00:00+00:00");
}

#[tokio::test]
async fn test_empty_update_rejected() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(shipment.id, json!({ "can_edit_dates": true }))
        .await;

    for body in [json!({}), json!({ "eta": null })] {
        let response = app
            .request(
                "PATCH",
                "/api/portal/shipment/fields",
                Some(body),
                Some(&grant.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "EMPTY_REQUEST");
    }
}

#[tokio::test]
async fn test_malformed_value_rejected() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(shipment.id, json!({ "can_edit_costs": true }))
        .await;

    let response = app
        .request(
            "PATCH",
            "/api/portal/shipment/fields",
            Some(json!({ "customs_duty": -10 })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_legal_status_change() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(
            shipment.id,
            json!({ "can_change_status": true, "allowed_statuses": ["customs", "cleared"] }),
        )
        .await;

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/status",
            Some(json!({ "status": "customs", "note": "Entry lodged" })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.data()["status"], "customs");
    assert_eq!(response.data()["allowed_next_statuses"], json!(["cleared"]));
    let notes = response.data()["notes"].as_str().unwrap();
    assert!(notes.contains("[customs] Rotterdam Customs BV (broker): Entry lodged"));
}

#[tokio::test]
async fn test_clearing_stamps_timestamp() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Customs).await;
    let grant = app
        .grant(shipment.id, json!({ "can_change_status": true }))
        .await;

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/status",
            Some(json!({ "status": "cleared" })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data()["customs_cleared_at"].is_string());
    assert!(response.data()["received_at"].is_null());
}

#[tokio::test]
async fn test_illegal_transition_conflicts() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Customs).await;
    let grant = app
        .grant(shipment.id, json!({ "can_change_status": true }))
        .await;

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/status",
            Some(json!({ "status": "closed" })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "ILLEGAL_TRANSITION");
    assert!(response.body["message"].as_str().unwrap().contains("cleared"));
    let stored = app.store.shipment(shipment.id).await.unwrap();
    assert_eq!(stored.status, ShipmentStatus::Customs);
}

#[tokio::test]
async fn test_status_outside_allow_list_forbidden() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(
            shipment.id,
            json!({ "can_change_status": true, "allowed_statuses": ["at_port"] }),
        )
        .await;

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/status",
            Some(json!({ "status": "customs" })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_change_requires_capability() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app.grant(shipment.id, json!({})).await;

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/status",
            Some(json!({ "status": "customs" })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_document_upload() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    let denied = app.grant(shipment.id, json!({})).await;
    let allowed = app
        .grant(shipment.id, json!({ "can_upload_documents": true }))
        .await;
    let body = json!({
        "document_type": "bill_of_lading",
        "file_name": "MAEU20260142.pdf",
        "url": "https://files.rcbv.example/MAEU20260142.pdf",
    });

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/documents",
            Some(body.clone()),
            Some(&denied.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/documents",
            Some(body),
            Some(&allowed.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let documents = response.data()["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["file_name"], "MAEU20260142.pdf");
}

#[tokio::test]
async fn test_document_url_must_be_http() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    let grant = app
        .grant(shipment.id, json!({ "can_upload_documents": true }))
        .await;

    let response = app
        .request(
            "POST",
            "/api/portal/shipment/documents",
            Some(json!({
                "document_type": "invoice",
                "file_name": "inv.pdf",
                "url": "ftp://files.example/inv.pdf",
            })),
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_note_appends_to_journal() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    let grant = app.grant(shipment.id, json!({})).await;

    for text in ["Vessel berthed", "Awaiting inspection slot"] {
        let response = app
            .request(
                "POST",
                "/api/portal/shipment/notes",
                Some(json!({ "note": text })),
                Some(&grant.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let stored = app.store.shipment(shipment.id).await.unwrap();
    let notes = stored.notes.unwrap();
    let first = notes.find("Vessel berthed").unwrap();
    let second = notes.find("Awaiting inspection slot").unwrap();
    assert!(first < second);
    assert!(notes.contains("[at_port]"));
}

#[tokio::test]
async fn test_credential_confined_to_its_tenant() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app.grant(shipment.id, json!({})).await;

    // Move the shipment under another tenant behind the credential's back.
    let mut moved = app.store.shipment(shipment.id).await.unwrap();
    moved.tenant_id = shipgate_core::types::TenantId::new();
    app.store.insert_shipment(moved).await;

    let response = app
        .request("GET", "/api/portal/shipment", None, Some(&grant.token))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
