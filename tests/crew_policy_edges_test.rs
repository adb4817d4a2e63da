mod common;

use axum::http::StatusCode;
use crew_portal_backend::policy::visibility::VisibilityMode;
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn removing_absent_memberships_succeeds() {
    let Some((app, pool, _config)) = live_app().await else {
        return;
    };
    let (_, admin) = admin_session(&app, &pool).await;
    let (client_id, client) = create_client(&app, &admin, "Harbour Line").await;
    let crew_id = approved_crew(&app, &admin).await;

    let (status, body) = call_json(
        &app,
        "DELETE",
        &format!("/api/admin/crew/{}/clients/{}", crew_id, client_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["client_shortlists"], json!([]));

    let (status, body) = call_json(
        &app,
        "DELETE",
        &format!("/api/client/crew/{}/shortlist", crew_id),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["shortlisted"], false);
}

#[tokio::test]
async fn status_with_tags_replaces_the_tag_set() {
    let Some((app, pool, _config)) = live_app().await else {
        return;
    };
    let (_, admin) = admin_session(&app, &pool).await;
    let crew_id = approved_crew(&app, &admin).await;

    call_json(
        &app,
        "POST",
        &format!("/api/admin/crew/{}/tags", crew_id),
        Some(&admin),
        Some(json!({ "tags": ["tanker", "dp2"] })),
    )
    .await;
    let (status, body) = call_json(
        &app,
        "PATCH",
        &format!("/api/admin/crew/{}/status", crew_id),
        Some(&admin),
        Some(json!({ "status": "missing_docs", "tags": [" visa expired ", ""] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "missing_docs");
    assert_eq!(body["tags"], json!(["visa expired"]));
}

#[tokio::test]
async fn assigning_names_the_missing_side() {
    let Some((app, pool, _config)) = live_app().await else {
        return;
    };
    let (_, admin) = admin_session(&app, &pool).await;
    let (client_id, _) = create_client(&app, &admin, "Delta Bulk").await;
    let crew_id = approved_crew(&app, &admin).await;

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/api/admin/crew/{}/clients/{}", crew_id, Uuid::new_v4()),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Client not found");

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/api/admin/crew/{}/clients/{}", Uuid::new_v4(), client_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Crew member not found");
}

#[tokio::test]
async fn reminder_lifecycle_is_terminal_after_completion() {
    let Some((app, pool, _config)) = live_app().await else {
        return;
    };
    let (admin_id, admin) = admin_session(&app, &pool).await;
    let crew_id = approved_crew(&app, &admin).await;

    let (status, body) = call_json(
        &app,
        "POST",
        "/api/admin/reminders",
        Some(&admin),
        Some(json!({
            "title": "Chase visa renewal",
            "crew_id": Uuid::new_v4(),
            "due_date": "2030-01-01T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["error"], "Crew member not found");

    let (status, body) = call_json(
        &app,
        "POST",
        "/api/admin/reminders",
        Some(&admin),
        Some(json!({ "title": "   ", "due_date": "2030-01-01T09:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_failed");

    let (status, reminder) = call_json(
        &app,
        "POST",
        "/api/admin/reminders",
        Some(&admin),
        Some(json!({
            "title": "Chase visa renewal",
            "crew_id": crew_id,
            "priority": "high",
            "due_date": "2030-01-01T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{reminder}");
    assert_eq!(reminder["status"], "pending");
    let id = reminder["id"].as_str().unwrap().to_string();

    let (status, done) = call_json(
        &app,
        "POST",
        &format!("/api/admin/reminders/{}/complete", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{done}");
    assert_eq!(done["status"], "completed");
    assert_eq!(done["completed_by"], admin_id.to_string());
    assert!(done["completed_at"].is_string());

    for action in ["complete", "cancel"] {
        let (status, body) = call_json(
            &app,
            "POST",
            &format!("/api/admin/reminders/{}/{}", id, action),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "{action}");
        assert_eq!(body["code"], "invalid_transition");
    }

    let (status, body) = call_json(
        &app,
        "POST",
        "/api/admin/reminders",
        Some(&admin),
        Some(json!({ "title": "Call agency", "due_date": "2030-02-01T09:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, cancelled) = call_json(
        &app,
        "POST",
        &format!("/api/admin/reminders/{}/cancel", body["id"].as_str().unwrap()),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert!(cancelled["completed_by"].is_null());
}

#[tokio::test]
async fn approved_mode_shows_released_crew_to_every_client() {
    let Some((_, pool, config)) = live_app().await else {
        return;
    };
    let mut config = config;
    config.crew_visibility = VisibilityMode::Approved;
    let app = app_with_pool(pool.clone(), &config);

    let (_, admin) = admin_session(&app, &pool).await;
    let (_, client) = create_client(&app, &admin, "Open Roster").await;
    let crew_id = approved_crew(&app, &admin).await;

    let (status, view) = call_json(
        &app,
        "GET",
        &format!("/api/client/crew/{}", crew_id),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{view}");
    assert!(view.get("email").is_none());

    let (status, _) = call_json(
        &app,
        "PATCH",
        &format!("/api/admin/crew/{}", crew_id),
        Some(&admin),
        Some(json!({ "approved_for_clients": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call_json(
        &app,
        "GET",
        &format!("/api/client/crew/{}", crew_id),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_follow_up_keeps_resolved_status() {
    let Some((app, pool, _config)) = live_app().await else {
        return;
    };
    let (_, admin) = admin_session(&app, &pool).await;
    let (client_id, client) = create_client(&app, &admin, "Follow Up Marine").await;
    let crew_id = approved_crew(&app, &admin).await;
    call_json(
        &app,
        "POST",
        &format!("/api/admin/crew/{}/clients/{}", crew_id, client_id),
        Some(&admin),
        None,
    )
    .await;

    let (status, created) = call_json(
        &app,
        "POST",
        "/api/client/requests",
        Some(&client),
        Some(json!({
            "crew_id": crew_id,
            "request_type": "booking",
            "message": "Book for the March rotation",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let request_id = created["id"].as_str().unwrap().to_string();

    let (status, _) = call_json(
        &app,
        "POST",
        &format!("/api/admin/requests/{}/respond", request_id),
        Some(&admin),
        Some(json!({ "status": "rejected", "admin_response": "Already booked elsewhere" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/api/admin/requests/{}/follow-ups", request_id),
        Some(&admin),
        Some(json!({ "message": "We can offer an alternative" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["follow_ups"].as_array().unwrap().len(), 1);

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/api/client/requests/{}/follow-ups", request_id),
        Some(&client),
        Some(json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_failed");
}

#[tokio::test]
async fn out_of_range_pages_return_empty_results() {
    let Some((app, pool, _config)) = live_app().await else {
        return;
    };
    let (_, admin) = admin_session(&app, &pool).await;
    let (status, body) = call_json(
        &app,
        "GET",
        "/api/admin/crew?page=9223372036854775807",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["items"], json!([]));
}
