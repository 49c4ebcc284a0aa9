//! Shared test helpers for integration tests.
//!
//! Each test builds the full router over a fresh in-memory store, so no
//! database is needed and tests can run in parallel.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;

use shipgate_api::{AppState, Stores, build_app};
use shipgate_auth::JwtEncoder;
use shipgate_core::config::AppConfig;
use shipgate_core::types::{CredentialId, ShipmentId, TenantId, UserId};
use shipgate_database::MemoryStore;
use shipgate_entity::shipment::{Shipment, ShipmentStatus};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for seeding and direct inspection
    pub store: MemoryStore,
    /// Application config
    pub config: AppConfig,
    /// Tenant the staff user belongs to
    pub tenant_id: TenantId,
    /// Staff user acting in tests
    pub staff_id: UserId,
    /// Staff bearer token for the tenant
    pub staff_token: String,
}

/// Captured response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The machine-readable code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// A grant issued through the API.
pub struct Grant {
    pub id: CredentialId,
    pub token: String,
}

/// Test configuration: cheap hashing and a fixed secret.
pub fn test_config() -> AppConfig {
    serde_json::from_value(json!({
        "database": { "url": "postgres://unused" },
        "auth": {
            "jwt_secret": "integration-test-secret-0123456789abcdef",
            "argon2": { "memory_kib": 1024, "iterations": 1, "parallelism": 1 }
        },
        "portal": { "public_base_url": "https://portal.test" },
        "logging": { "level": "warn", "format": "pretty" }
    }))
    .expect("test config must deserialize")
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = test_config();
        let store = MemoryStore::new();
        let stores = Stores {
            credentials: Arc::new(store.clone()),
            shipments: Arc::new(store.clone()),
            audit: Arc::new(store.clone()),
        };
        let state = AppState::new(config.clone(), stores, None).expect("Failed to build state");

        let tenant_id = TenantId::new();
        let staff_id = UserId::new();
        let staff_token = Self::mint_staff_token(&config, staff_id, tenant_id);

        Self {
            router: build_app(state),
            store,
            config,
            tenant_id,
            staff_id,
            staff_token,
        }
    }

    /// Sign a staff token for any tenant.
    pub fn mint_staff_token(config: &AppConfig, user: UserId, tenant: TenantId) -> String {
        JwtEncoder::new(&config.auth)
            .issue(user, tenant, Some("Test Staff"))
            .expect("Failed to issue staff token")
            .0
    }

    /// Seed a shipment for the test tenant
    pub async fn seed_shipment(&self, status: ShipmentStatus) -> Shipment {
        self.seed_shipment_for(self.tenant_id, status).await
    }

    /// Seed a shipment for an arbitrary tenant
    pub async fn seed_shipment_for(&self, tenant_id: TenantId, status: ShipmentStatus) -> Shipment {
        let shipment = shipment(tenant_id, status);
        self.store.insert_shipment(shipment.clone()).await;
        shipment
    }

    /// Issue a grant through the staff API
    pub async fn grant(&self, shipment_id: ShipmentId, capabilities: Value) -> Grant {
        let response = self
            .request(
                "POST",
                &format!("/api/shipments/{shipment_id}/grants"),
                Some(json!({
                    "agent_type": "broker",
                    "agent_name": "Rotterdam Customs BV",
                    "agent_email": "desk@rcbv.example",
                    "capabilities": capabilities,
                })),
                Some(&self.staff_token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let id = response.data()["credential"]["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("credential id");
        let token = response.data()["token"]
            .as_str()
            .expect("raw token")
            .to_string();
        Grant { id, token }
    }

    /// Make a request with an optional JSON body and bearer token
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> TestResponse {
        self.request_with_headers(method, uri, body, bearer, &[])
            .await
    }

    /// Make a request with extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// A shipment with a few reference fields and costs filled in.
pub fn shipment(tenant_id: TenantId, status: ShipmentStatus) -> Shipment {
    let now = Utc::now();
    Shipment {
        id: ShipmentId::new(),
        tenant_id,
        reference: "IMP-2026-0142".to_string(),
        status,
        supplier_name: Some("Ningbo Fasteners Ltd".to_string()),
        origin_port: Some("CNNGB".to_string()),
        destination_port: Some("NLRTM".to_string()),
        etd: None,
        eta: None,
        actual_departure: None,
        actual_arrival: None,
        freight_cost: Some(2400.0),
        insurance_cost: Some(120.0),
        customs_duty: None,
        port_charges: None,
        inland_transport_cost: None,
        bl_number: Some("MAEU20260142".to_string()),
        container_number: None,
        vessel_name: Some("Maersk Elba".to_string()),
        voyage_number: None,
        customs_entry_number: None,
        tracking_number: None,
        customs_cleared_at: None,
        received_at: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}
