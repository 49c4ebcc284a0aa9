//! Integration tests for staff grant management.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use shipgate_core::types::{TenantId, UserId};
use shipgate_entity::shipment::ShipmentStatus;

#[tokio::test]
async fn test_create_grant_returns_token_once() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Confirmed).await;

    let response = app
        .request(
            "POST",
            &format!("/api/shipments/{}/grants", shipment.id),
            Some(json!({
                "agent_type": "forwarder",
                "agent_name": "Blue Anchor Logistics",
                "capabilities": { "can_change_status": true },
                "expiry_days": 14,
            })),
            Some(&app.staff_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let data = response.data();
    let token = data["token"].as_str().unwrap();
    assert!(token.starts_with("ext_"));
    assert_eq!(
        data["portal_url"],
        format!("https://portal.test/portal?token={token}")
    );
    assert_eq!(data["credential"]["is_active"], true);
    assert_eq!(data["credential"]["use_count"], 0);
    assert!(data["credential"].get("secret_hash").is_none());
    assert!(data["credential"].get("lookup_key").is_none());

    let listed = app
        .request(
            "GET",
            &format!("/api/shipments/{}/grants", shipment.id),
            None,
            Some(&app.staff_token),
        )
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    let grants = listed.data().as_array().unwrap();
    assert_eq!(grants.len(), 1);
    assert!(grants[0].get("token").is_none());
}

#[tokio::test]
async fn test_staff_endpoints_require_staff_token() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Confirmed).await;
    let grant = app.grant(shipment.id, json!({})).await;
    let uri = format!("/api/shipments/{}/grants", shipment.id);

    let anonymous = app.request("GET", &uri, None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let external = app.request("GET", &uri, None, Some(&grant.token)).await;
    assert_eq!(external.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_grant_for_unknown_shipment_not_found() {
    let app = helpers::TestApp::new().await;
    let foreign = app
        .seed_shipment_for(TenantId::new(), ShipmentStatus::Confirmed)
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/shipments/{}/grants", foreign.id),
            Some(json!({ "agent_type": "carrier", "agent_name": "Northline" })),
            Some(&app.staff_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.store.audit_log().await.is_empty());
}

#[tokio::test]
async fn test_expiry_bounds_enforced() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Confirmed).await;
    let uri = format!("/api/shipments/{}/grants", shipment.id);

    for days in [0, 366] {
        let response = app
            .request(
                "POST",
                &uri,
                Some(json!({
                    "agent_type": "carrier",
                    "agent_name": "Northline",
                    "expiry_days": days,
                })),
                Some(&app.staff_token),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "expiry {days}");
    }
}

#[tokio::test]
async fn test_unknown_capability_rejected() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Confirmed).await;

    let response = app
        .request(
            "POST",
            &format!("/api/shipments/{}/grants", shipment.id),
            Some(json!({
                "agent_type": "broker",
                "agent_name": "Northline",
                "capabilities": { "allowed_fields": ["freight_cost"] },
            })),
            Some(&app.staff_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_revoke_blocks_further_use() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app.grant(shipment.id, json!({})).await;
    let uri = format!("/api/grants/{}/revoke", grant.id);

    let response = app.request("POST", &uri, None, Some(&app.staff_token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["is_active"], false);
    assert!(response.data()["revoked_at"].is_string());

    let portal = app
        .request("GET", "/api/portal/shipment", None, Some(&grant.token))
        .await;
    assert_eq!(portal.status, StatusCode::UNAUTHORIZED);
    assert_eq!(portal.error_code(), "CREDENTIAL_REVOKED");

    let again = app.request("POST", &uri, None, Some(&app.staff_token)).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rotate_replaces_token() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app.grant(shipment.id, json!({})).await;

    let used = app
        .request("GET", "/api/portal/session", None, Some(&grant.token))
        .await;
    assert_eq!(used.status, StatusCode::OK);
    assert_eq!(app.store.credential(grant.id).await.unwrap().use_count, 1);

    let response = app
        .request(
            "POST",
            &format!("/api/grants/{}/rotate", grant.id),
            None,
            Some(&app.staff_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let new_token = response.data()["token"].as_str().unwrap().to_string();
    assert_ne!(new_token, grant.token);
    assert_eq!(response.data()["credential"]["use_count"], 0);

    let old = app
        .request("GET", "/api/portal/session", None, Some(&grant.token))
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let new = app
        .request("GET", "/api/portal/session", None, Some(&new_token))
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rotate_revoked_conflicts() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app.grant(shipment.id, json!({})).await;

    app.request(
        "POST",
        &format!("/api/grants/{}/revoke", grant.id),
        None,
        Some(&app.staff_token),
    )
    .await;
    let response = app
        .request(
            "POST",
            &format!("/api/grants/{}/rotate", grant.id),
            None,
            Some(&app.staff_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_other_tenant_cannot_manage_grant() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app.grant(shipment.id, json!({})).await;
    let outsider =
        helpers::TestApp::mint_staff_token(&app.config, UserId::new(), TenantId::new());

    let response = app
        .request(
            "POST",
            &format!("/api/grants/{}/revoke", grant.id),
            None,
            Some(&outsider),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.store.credential(grant.id).await.unwrap().is_active);
}
