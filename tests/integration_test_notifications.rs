mod common;

use axum::http::StatusCode;
use common::{body_text, location, TestApp};

#[tokio::test]
async fn test_home_redirect_depends_on_role() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let ana = app.register("ana", false).await;

    let response = app.get("/notifications/", Some(&organizer.cookie)).await;
    assert_eq!(location(&response), "/notifications/manage/");

    let response = app.get("/notifications/", Some(&ana.cookie)).await;
    assert_eq!(location(&response), "/notifications/inbox/");

    let response = app.get("/notifications/manage/", Some(&ana.cookie)).await;
    assert_eq!(location(&response), "/events/");
}

#[tokio::test]
async fn test_direct_notification_reaches_only_recipient() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let ana = app.register("ana", false).await;
    let beto = app.register("beto", false).await;

    let response = app.post_form("/notifications/create/", Some(&organizer.cookie), &[
        ("title", "Cambio de puerta"),
        ("message", "Ingresá por la puerta 3"),
        ("priority", "MEDIUM"),
        ("recipient_type", "usuario"),
        ("username", "ana"),
    ]).await;
    assert_eq!(location(&response), "/notifications/manage/");

    let body = body_text(app.get("/notifications/inbox/", Some(&ana.cookie)).await).await;
    assert!(body.contains("Cambio de puerta"));
    assert!(body.contains("1 nuevas"));

    let body = body_text(app.get("/notifications/inbox/", Some(&beto.cookie)).await).await;
    assert!(!body.contains("Cambio de puerta"));

    let body = body_text(app.get("/notifications/manage/", Some(&organizer.cookie)).await).await;
    assert!(body.contains("Cambio de puerta"));
    assert!(body.contains("ana"));
}

#[tokio::test]
async fn test_global_notification_targets_event_attendees() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let ana = app.register("ana", false).await;
    let beto = app.register("beto", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;
    app.seed_ticket(ana.user.id, event.id, 1).await;
    let id = event.id.to_string();

    app.post_form("/notifications/create/", Some(&organizer.cookie), &[
        ("title", "Traer abrigo"),
        ("message", "Se espera frío"),
        ("priority", "LOW"),
        ("recipient_type", "todos"),
        ("event_id", id.as_str()),
    ]).await;

    let body = body_text(app.get("/notifications/inbox/", Some(&ana.cookie)).await).await;
    assert!(body.contains("Traer abrigo"));

    let body = body_text(app.get("/notifications/inbox/", Some(&beto.cookie)).await).await;
    assert!(!body.contains("Traer abrigo"));
}

#[tokio::test]
async fn test_form_rejects_unknown_recipient() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;

    let response = app.post_form("/notifications/create/", Some(&organizer.cookie), &[
        ("title", "Hola"),
        ("message", "Mensaje"),
        ("priority", "HIGH"),
        ("recipient_type", "usuario"),
        ("username", "nadie"),
    ]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("El usuario no existe."));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_non_organizer_cannot_create_notifications() {
    let app = TestApp::new().await;
    app.register("orga", true).await;
    let ana = app.register("ana", false).await;

    let response = app.post_form("/notifications/create/", Some(&ana.cookie), &[
        ("title", "Spam"),
        ("message", "Spam"),
        ("priority", "HIGH"),
        ("recipient_type", "usuario"),
        ("username", "orga"),
    ]).await;
    assert_eq!(location(&response), "/events/");
    assert!(app.state.notification_repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_and_delete_notification() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    app.register("ana", false).await;

    app.post_form("/notifications/create/", Some(&organizer.cookie), &[
        ("title", "Borrador"),
        ("message", "Texto"),
        ("priority", "LOW"),
        ("recipient_type", "usuario"),
        ("username", "ana"),
    ]).await;
    let id = app.state.notification_repo.list_all().await.unwrap()[0].notification.id;

    let response = app.post_form(&format!("/notifications/{}/edit/", id), Some(&organizer.cookie), &[
        ("title", "Definitivo"),
        ("message", "Texto final"),
        ("priority", "HIGH"),
        ("recipient_type", "usuario"),
        ("username", "ana"),
    ]).await;
    assert_eq!(location(&response), format!("/notifications/{}/", id));

    let body = body_text(app.get(&format!("/notifications/{}/", id), Some(&organizer.cookie)).await).await;
    assert!(body.contains("Definitivo"));
    assert!(body.contains("HIGH"));

    let response = app.get(&format!("/notifications/{}/delete/", id), Some(&organizer.cookie)).await;
    assert_eq!(location(&response), "/notifications/manage/");
    assert!(app.state.notification_repo.find_by_id(id).await.unwrap().is_some());

    app.post_form(&format!("/notifications/{}/delete/", id), Some(&organizer.cookie), &[]).await;
    assert!(app.state.notification_repo.find_by_id(id).await.unwrap().is_none());
}
