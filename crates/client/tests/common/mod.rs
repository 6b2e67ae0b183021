#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ipmes_client::http::{ApiClient, Method, ScriptedResponse, ScriptedTransport};
use ipmes_core::session::{InMemoryTokenStore, Session};
use serde_json::{json, Value};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 8, 30, 0).unwrap()
}

pub fn token(role_id: i64, privileges: &[&str]) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "user": {
                "userId": 41,
                "username": "akinyi",
                "firstName": "Akinyi",
                "lastName": "Otieno",
                "roleId": role_id,
                "privileges": privileges,
            },
            "exp": (now() + Duration::hours(8)).timestamp(),
        })
        .to_string(),
    );
    format!("{header}.{payload}.sig")
}

/// A signed-in session whose token is also what the client sends.
pub fn signed_in(role_id: i64, privileges: &[&str]) -> (ApiClient, ScriptedTransport, Session) {
    let tokens = Arc::new(InMemoryTokenStore::with_token(token(role_id, privileges)));
    let session = Session::initialize(tokens.clone(), now());
    assert!(session.is_authenticated(), "fixture token should restore");
    let transport = ScriptedTransport::new();
    let api = ApiClient::new(Arc::new(transport.clone()), tokens);
    (api, transport, session)
}

pub fn payment_request(id: i64, status: &str, level: Option<i64>) -> Value {
    json!({
        "requestId": id,
        "projectId": 3,
        "amount": "1250000.00",
        "description": "Phase 2 works",
        "paymentStatus": status,
        "currentApprovalLevelId": level,
        "submittedAt": "2026-03-01T09:00:00Z",
    })
}

pub fn levels() -> Value {
    json!([
        { "levelId": 2, "levelName": "Finance", "roleId": 20, "approvalOrder": 2 },
        { "levelId": 1, "levelName": "Project Manager", "roleId": 10, "approvalOrder": 1 },
    ])
}

pub fn history(entries: usize) -> Value {
    Value::Array(
        (0..entries)
            .map(|index| {
                json!({
                    "historyId": index + 1,
                    "action": "Approve",
                    "notes": "ok",
                    "actionByUserId": 7,
                    "actionDate": "2026-03-02T10:00:00Z",
                })
            })
            .collect(),
    )
}

pub fn directory() -> Value {
    json!([
        { "userId": 7, "firstName": "Mwangi", "lastName": "Kariuki", "roleId": 10 },
        { "userId": 41, "username": "akinyi", "roleId": 20 },
    ])
}

/// Scripts one full review load for request `id`.
pub fn script_review_load(transport: &ScriptedTransport, id: i64, request: Value, entries: usize) {
    transport.on(Method::Get, format!("/payment-requests/{id}"), ScriptedResponse::json(200, request));
    transport.on(
        Method::Get,
        format!("/payment-requests/{id}/history"),
        ScriptedResponse::json(200, history(entries)),
    );
    transport.on(Method::Get, "/approval/levels", ScriptedResponse::json(200, levels()));
    transport.on(Method::Get, "/users", ScriptedResponse::json(200, directory()));
}

pub fn photo(id: i64, order: i32, document_type: &str) -> Value {
    json!({
        "documentId": id,
        "requestId": 5,
        "documentType": document_type,
        "documentPath": format!("uploads/payments/5/{id}.jpg"),
        "displayOrder": order,
        "isProjectCover": false,
    })
}
