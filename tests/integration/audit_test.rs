//! Integration tests for the audit trail.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use shipgate_core::types::{TenantId, UserId};
use shipgate_entity::shipment::ShipmentStatus;

#[tokio::test]
async fn test_trail_is_newest_first() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(shipment.id, json!({ "can_change_status": true }))
        .await;

    app.request(
        "POST",
        "/api/portal/shipment/status",
        Some(json!({ "status": "at_port" })),
        Some(&grant.token),
    )
    .await;
    app.request(
        "POST",
        "/api/portal/shipment/notes",
        Some(json!({ "note": "Berth 7" })),
        Some(&grant.token),
    )
    .await;

    let response = app
        .request(
            "GET",
            &format!("/api/shipments/{}/audit", shipment.id),
            None,
            Some(&app.staff_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let actions: Vec<&str> = response.data()["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["note_added", "status_change", "grant_created"]);
    assert_eq!(response.data()["total_items"], 3);
}

#[tokio::test]
async fn test_external_entry_records_actor_and_origin() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::InTransit).await;
    let grant = app
        .grant(shipment.id, json!({ "can_change_status": true }))
        .await;

    let response = app
        .request_with_headers(
            "POST",
            "/api/portal/shipment/status",
            Some(json!({ "status": "customs", "note": "Declaration filed" })),
            Some(&grant.token),
            &[
                ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
                ("user-agent", "rcbv-portal/2.1"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let log = app.store.audit_log().await;
    let entry = log.last().unwrap();
    assert_eq!(entry.action.as_str(), "status_change");
    assert_eq!(entry.credential_id, Some(grant.id));
    assert_eq!(entry.actor_name.as_deref(), Some("Rotterdam Customs BV"));
    assert_eq!(entry.field_name.as_deref(), Some("status"));
    assert_eq!(entry.old_value.as_deref(), Some("in_transit"));
    assert_eq!(entry.new_value.as_deref(), Some("customs"));
    assert_eq!(entry.note.as_deref(), Some("Declaration filed"));
    assert_eq!(entry.ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(entry.user_agent.as_deref(), Some("rcbv-portal/2.1"));
    assert_eq!(entry.tenant_id, app.tenant_id);
}

#[tokio::test]
async fn test_grant_entry_records_staff_actor() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::Confirmed).await;
    let grant = app.grant(shipment.id, json!({})).await;

    let log = app.store.audit_log().await;
    assert_eq!(log.len(), 1);
    let entry = &log[0];
    assert_eq!(entry.action.as_str(), "grant_created");
    assert_eq!(entry.actor_user_id, Some(app.staff_id));
    assert!(entry.credential_id.is_none());
    let details = entry.details.as_ref().unwrap();
    assert_eq!(details["credential_id"], grant.id.to_string());
    assert_eq!(details["agent_type"], "broker");
}

#[tokio::test]
async fn test_cost_only_update_is_cost_action() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    let grant = app
        .grant(
            shipment.id,
            json!({ "can_edit_costs": true, "can_edit_dates": true }),
        )
        .await;

    let response = app
        .request(
            "PATCH",
            "/api/portal/shipment/fields",
            Some(json!({ "freight_cost": 2550 })),
            Some(&grant.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let log = app.store.audit_log().await;
    let entry = log.last().unwrap();
    assert_eq!(entry.action.as_str(), "cost_update");
    assert_eq!(entry.field_name.as_deref(), Some("freight_cost"));
    assert_eq!(entry.old_value.as_deref(), Some("2400.00"));
    assert_eq!(entry.new_value.as_deref(), Some("2550.00"));
}

#[tokio::test]
async fn test_mixed_batch_is_one_field_entry() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    let grant = app
        .grant(
            shipment.id,
            json!({ "can_edit_costs": true, "can_edit_dates": true }),
        )
        .await;
    let before = app.store.audit_log().await.len();

    let response = app
        .request(
            "PATCH",
            "/api/portal/shipment/fields",
            Some(json!({ "port_charges": 310.5, "actual_arrival": "2026-10-18T06:30:00Z" })),
            Some(&grant.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let log = app.store.audit_log().await;
    assert_eq!(log.len(), before + 1);
    let entry = log.last().unwrap();
    assert_eq!(entry.action.as_str(), "field_update");
    assert!(entry.field_name.is_none());
    let changes = entry.details.as_ref().unwrap()["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 2);
}

#[tokio::test]
async fn test_portal_trail_paginates() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    let grant = app.grant(shipment.id, json!({})).await;

    for text in ["one", "two", "three"] {
        app.request(
            "POST",
            "/api/portal/shipment/notes",
            Some(json!({ "note": text })),
            Some(&grant.token),
        )
        .await;
    }

    let response = app
        .request(
            "GET",
            "/api/portal/shipment/audit?page=2&per_page=1",
            None,
            Some(&grant.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["total_items"], 4);
    assert_eq!(data["total_pages"], 4);
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["note"], "two");
}

#[tokio::test]
async fn test_trail_invisible_to_other_tenant() {
    let app = helpers::TestApp::new().await;
    let shipment = app.seed_shipment(ShipmentStatus::AtPort).await;
    app.grant(shipment.id, json!({})).await;
    let outsider =
        helpers::TestApp::mint_staff_token(&app.config, UserId::new(), TenantId::new());

    let response = app
        .request(
            "GET",
            &format!("/api/shipments/{}/audit", shipment.id),
            None,
            Some(&outsider),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["items"], json!([]));
    assert_eq!(response.data()["total_items"], 0);
}
