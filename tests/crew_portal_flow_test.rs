mod common;

use axum::http::{header, StatusCode};
use crew_portal_backend::{models::principal::AdminRole, services::admin_service::AdminService};
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn crew_portal_end_to_end() {
    let Some((app, pool, _config)) = live_app().await else {
        return;
    };

    let admin_email = unique_email("ops");
    AdminService::new(pool.clone())
        .create("Ops Desk", &admin_email, "admin-pass-123", AdminRole::Admin)
        .await
        .unwrap();
    let admin = login(&app, "/api/admin/auth/login", &admin_email, "admin-pass-123").await;

    let (c1_id, c1) = create_client(&app, &admin, "Northwind Shipping").await;
    let (_c2_id, c2) = create_client(&app, &admin, "Southern Tankers").await;

    // Role separation
    let (status, _) = call_json(&app, "GET", "/api/admin/crew", Some(&c1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call_json(&app, "GET", "/api/client/crew", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Registration
    let crew_email = unique_email("seafarer");
    let (status, body) = register_crew(&app, &crew_email).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "pending");
    let crew_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = register_crew(&app, &crew_email.to_uppercase()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "duplicate");

    // Pending crew are invisible to clients even when assigned
    let assign_uri = format!("/api/admin/crew/{}/clients/{}", crew_id, c1_id);
    let (status, _) = call_json(&app, "POST", &assign_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let crew_uri = format!("/api/client/crew/{}", crew_id);
    let (status, _) = call_json(&app, "GET", &crew_uri, Some(&c1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Approval
    let (status, body) = call_json(
        &app,
        "PATCH",
        &format!("/api/admin/crew/{}/status", crew_id),
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, body) = call_json(
        &app,
        "PATCH",
        &format!("/api/admin/crew/{}", crew_id),
        Some(&admin),
        Some(json!({ "approved_for_clients": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Assignment is idempotent
    let (status, body) = call_json(&app, "POST", &assign_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let shortlists = body["client_shortlists"].as_array().unwrap();
    assert_eq!(
        shortlists
            .iter()
            .filter(|id| id.as_str() == Some(c1_id.to_string().as_str()))
            .count(),
        1
    );

    // Redacted client view
    let (status, view) = call_json(&app, "GET", &crew_uri, Some(&c1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["name"], "Ana Reyes");
    assert!(view.get("email").is_none());
    assert!(view.get("phone").is_none());
    assert!(view.get("internal_comments").is_none());
    assert!(view.get("documents").is_none());

    let (status, _) = call_json(&app, "GET", &crew_uri, Some(&c2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = call_json(&app, "GET", "/api/client/crew", Some(&c1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["id"] == crew_id.as_str()));

    // Documents
    let (status, body) = call_json(&app, "GET", &format!("{}/cv", crew_uri), Some(&c1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
    let (status, _) = call_json(
        &app,
        "GET",
        &format!("{}/documents/cv", crew_uri),
        Some(&c1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = axum::http::Request::builder()
        .uri(format!("{}/documents/passport", crew_uri))
        .header("authorization", format!("Bearer {}", c1))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, resp) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
    assert!(resp.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("inline"));

    // Requests
    let request_body = json!({
        "crew_id": crew_id,
        "request_type": "interview",
        "message": "Available for a video call next week?",
        "urgency": "urgent",
    });
    let (status, created) = call_json(
        &app,
        "POST",
        "/api/client/requests",
        Some(&c1),
        Some(request_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let request_id = created["id"].as_str().unwrap().to_string();

    let (status, body) = call_json(
        &app,
        "POST",
        "/api/client/requests",
        Some(&c1),
        Some(request_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "duplicate");

    let (status, _) = call_json(
        &app,
        "POST",
        "/api/client/requests",
        Some(&c2),
        Some(request_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call_json(
        &app,
        "POST",
        &format!("/api/client/requests/{}/follow-ups", request_id),
        Some(&c2),
        Some(json!({ "message": "Any news?" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/api/client/requests/{}/follow-ups", request_id),
        Some(&c1),
        Some(json!({ "message": "Any news?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["follow_ups"].as_array().unwrap().len(), 1);

    let respond_uri = format!("/api/admin/requests/{}/respond", request_id);
    let (status, body) = call_json(
        &app,
        "POST",
        &respond_uri,
        Some(&admin),
        Some(json!({ "status": "approved", "admin_response": "Interview set for Tuesday" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "approved");

    let (status, body) = call_json(
        &app,
        "POST",
        &respond_uri,
        Some(&admin),
        Some(json!({ "status": "rejected", "admin_response": "Changed our mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");

    let (status, _) = call_json(
        &app,
        "POST",
        "/api/client/requests",
        Some(&c1),
        Some(request_body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Tags merge as a sorted union
    let tags_uri = format!("/api/admin/crew/{}/tags", crew_id);
    call_json(&app, "POST", &tags_uri, Some(&admin), Some(json!({ "tags": ["tanker", "dp2"] }))).await;
    let (status, body) = call_json(
        &app,
        "POST",
        &tags_uri,
        Some(&admin),
        Some(json!({ "tags": ["dp2", "english"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!(["dp2", "english", "tanker"]));

    // Bulk operations report per-id outcomes
    let (status, body) = call_json(
        &app,
        "POST",
        "/api/admin/crew/bulk/status",
        Some(&admin),
        Some(json!({ "ids": [crew_id, Uuid::new_v4()], "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total"], 2);
    assert_eq!(body["succeeded"], 1);
    assert_eq!(body["failed"], 1);

    // Named export reports ids with no record
    let ghost = Uuid::new_v4();
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/admin/crew/export")
        .header("authorization", format!("Bearer {}", admin))
        .header("content-type", "application/json")
        .body(axum::body::Body::from(json!({ "ids": [crew_id, ghost] }).to_string()))
        .unwrap();
    let (status, resp) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let summary: serde_json::Value =
        serde_json::from_str(resp.headers()["x-export-summary"].to_str().unwrap()).unwrap();
    assert_eq!(summary["succeeded"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["results"][1]["id"], ghost.to_string());

    let (status, body) = call_json(
        &app,
        "POST",
        "/api/admin/crew/bulk/export",
        Some(&admin),
        Some(json!({ "ids": [ghost] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failed"], 1);

    // Unassigning hides the record again
    let (status, _) = call_json(&app, "DELETE", &assign_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call_json(&app, "GET", &crew_uri, Some(&c1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stats) = call_json(&app, "GET", "/api/admin/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["crew"].is_object());
}
