mod common;

use axum::http::StatusCode;
use common::{body_text, location, TestApp};

#[tokio::test]
async fn test_list_shows_only_upcoming_events() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;

    app.seed_event(organizer.user.id, "Festival de Primavera", 10).await;
    app.seed_event(organizer.user.id, "Concierto Pasado", -3).await;

    let body = body_text(app.get("/events/", Some(&organizer.cookie)).await).await;
    assert!(body.contains("Festival de Primavera"));
    assert!(!body.contains("Concierto Pasado"));
}

#[tokio::test]
async fn test_empty_listing_message() {
    let app = TestApp::new().await;
    let user = app.register("ana", false).await;

    let body = body_text(app.get("/events/", Some(&user.cookie)).await).await;
    assert!(body.contains("No hay eventos próximos"));
}

#[tokio::test]
async fn test_non_organizer_cannot_create_events() {
    let app = TestApp::new().await;
    let user = app.register("ana", false).await;

    let response = app.get("/events/create/", Some(&user.cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/events/");

    let response = app.post_form("/events/create/", Some(&user.cookie), &[
        ("title", "Colado"),
        ("description", "No debería existir"),
        ("date", "2099-01-01"),
        ("time", "20:00"),
        ("location", "Sótano"),
    ]).await;
    assert_eq!(location(&response), "/events/");
    assert!(app.state.event_repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_organizer_creates_event_and_sees_validation_errors() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;

    let response = app.post_form("/events/create/", Some(&organizer.cookie), &[
        ("title", ""),
        ("description", "Sin título"),
        ("date", "2099-01-01"),
        ("time", "20:00"),
    ]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Por favor ingrese un titulo"));

    let response = app.post_form("/events/create/", Some(&organizer.cookie), &[
        ("title", "Noche de Jazz"),
        ("description", "Trío en vivo"),
        ("date", "2099-01-01"),
        ("time", "20:00"),
        ("location", "Club Central"),
    ]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let events = app.state.event_repo.list_all().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].organizer_id, organizer.user.id);
    assert_eq!(location(&response), format!("/events/{}/", events[0].id));

    let body = body_text(app.get(&location(&response), Some(&organizer.cookie)).await).await;
    assert!(body.contains("Noche de Jazz"));
    assert!(body.contains("Editar evento"));
}

#[tokio::test]
async fn test_only_owner_may_edit_event() {
    let app = TestApp::new().await;
    let owner = app.register("orga", true).await;
    let other = app.register("otro", true).await;
    let event = app.seed_event(owner.user.id, "Feria", 5).await;

    let response = app.get(&format!("/events/{}/edit/", event.id), Some(&other.cookie)).await;
    assert_eq!(location(&response), "/events/");

    let body = body_text(app.get(&format!("/events/{}/", event.id), Some(&other.cookie)).await).await;
    assert!(!body.contains("Editar evento"));
}

#[tokio::test]
async fn test_get_on_delete_does_not_delete() {
    let app = TestApp::new().await;
    let owner = app.register("orga", true).await;
    let event = app.seed_event(owner.user.id, "Feria", 5).await;

    let response = app.get(&format!("/events/{}/delete/", event.id), Some(&owner.cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.state.event_repo.find_by_id(event.id).await.unwrap().is_some());

    let stranger = app.register("otro", true).await;
    app.post_form(&format!("/events/{}/delete/", event.id), Some(&stranger.cookie), &[]).await;
    assert!(app.state.event_repo.find_by_id(event.id).await.unwrap().is_some());

    let response = app.post_form(&format!("/events/{}/delete/", event.id), Some(&owner.cookie), &[]).await;
    assert_eq!(location(&response), "/events/");
    assert!(app.state.event_repo.find_by_id(event.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let app = TestApp::new().await;
    let user = app.register("ana", false).await;

    let response = app.get("/events/9999/", Some(&user.cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
