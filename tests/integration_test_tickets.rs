mod common;

use axum::http::StatusCode;
use common::{body_text, location, Client, TestApp};

fn purchase_fields<'a>(event_id: &'a str, quantity: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("id_evento", event_id),
        ("cantidad", quantity),
        ("tipo", "general"),
        ("numero_tarjeta", "4111 1111 1111 1111"),
        ("expiracion", "12/99"),
        ("cvv", "123"),
        ("nombre_tarjeta", "Ana Pérez"),
        ("acepta_terminos", "on"),
    ]
}

async fn buy(app: &TestApp, client: &Client, event_id: i64, quantity: &str) -> axum::response::Response {
    let id = event_id.to_string();
    app.post_form("/tickets/confirm/", Some(&client.cookie), &purchase_fields(&id, quantity)).await
}

#[tokio::test]
async fn test_purchase_redirects_to_manage_with_success_message() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;

    let response = buy(&app, &buyer, event.id, "2").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/tickets/manage/{}/", event.id));

    let flash = common::cookie_value(&response, "flash").expect("flash cookie");
    let messages = eventhub::api::flash::decode(&flash);
    assert_eq!(messages[0].text, "¡Compra realizada con éxito!");

    let held = app.state.ticket_repo.quantity_held(buyer.user.id, event.id, None).await.unwrap();
    assert_eq!(held, 2);
}

#[tokio::test]
async fn test_cap_of_four_per_event() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;

    assert_eq!(buy(&app, &buyer, event.id, "3").await.status(), StatusCode::SEE_OTHER);

    let response = buy(&app, &buyer, event.id, "2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Ya tienes 3 entradas"));
    assert!(body.contains("límite de 4 entradas"));
    assert_eq!(app.state.ticket_repo.quantity_held(buyer.user.id, event.id, None).await.unwrap(), 3);

    assert_eq!(buy(&app, &buyer, event.id, "1").await.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.state.ticket_repo.quantity_held(buyer.user.id, event.id, None).await.unwrap(), 4);

    let response = buy(&app, &buyer, event.id, "1").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cap_is_per_event_and_per_user() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let ana = app.register("ana", false).await;
    let beto = app.register("beto", false).await;
    let first = app.seed_event(organizer.user.id, "Uno", 7).await;
    let second = app.seed_event(organizer.user.id, "Dos", 8).await;

    assert_eq!(buy(&app, &ana, first.id, "4").await.status(), StatusCode::SEE_OTHER);
    assert_eq!(buy(&app, &ana, second.id, "4").await.status(), StatusCode::SEE_OTHER);
    assert_eq!(buy(&app, &beto, first.id, "4").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_purchase_form_validation() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;
    let id = event.id.to_string();

    let response = app.post_form("/tickets/confirm/", Some(&buyer.cookie), &[
        ("id_evento", id.as_str()),
        ("cantidad", "0"),
        ("tipo", "general"),
        ("numero_tarjeta", "1234"),
        ("expiracion", "01/20"),
        ("cvv", "12"),
        ("nombre_tarjeta", "Ana"),
    ]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("La cantidad debe ser al menos 1."));
    assert!(body.contains("16 dígitos"));
    assert!(body.contains("La tarjeta está vencida."));
    assert!(body.contains("términos y condiciones"));

    assert_eq!(app.state.ticket_repo.quantity_held(buyer.user.id, event.id, None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_edit_respects_cap_excluding_edited_ticket() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;

    let first = app.seed_ticket(buyer.user.id, event.id, 1).await;
    app.seed_ticket(buyer.user.id, event.id, 2).await;

    let uri = format!("/tickets/{}/edit/", first.ticket_code);
    let response = app.post_form(&uri, Some(&buyer.cookie), &[("cantidad", "2"), ("tipo", "VIP")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.post_form(&uri, Some(&buyer.cookie), &[("cantidad", "3"), ("tipo", "VIP")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("límite de 4 entradas"));

    let stored = app.state.ticket_repo.find_by_code(first.ticket_code).await.unwrap().unwrap();
    assert_eq!(stored.quantity, 2);
    assert_eq!(stored.ticket_type.as_str(), "VIP");
}

#[tokio::test]
async fn test_other_users_cannot_touch_tickets() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let ana = app.register("ana", false).await;
    let beto = app.register("beto", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;
    let ticket = app.seed_ticket(ana.user.id, event.id, 1).await;

    let response = app.post_form(&format!("/tickets/{}/delete/", ticket.ticket_code), Some(&beto.cookie), &[]).await;
    assert_eq!(location(&response), "/events/");
    assert!(app.state.ticket_repo.find_by_code(ticket.ticket_code).await.unwrap().is_some());

    let body = body_text(app.get(&format!("/tickets/manage/{}/", event.id), Some(&beto.cookie)).await).await;
    assert!(body.contains("No hay entradas"));

    let body = body_text(app.get(&format!("/tickets/manage/{}/", event.id), Some(&organizer.cookie)).await).await;
    assert!(body.contains("ana"));

    let response = app.post_form(&format!("/tickets/{}/delete/", ticket.ticket_code), Some(&ana.cookie), &[]).await;
    assert_eq!(location(&response), format!("/tickets/manage/{}/", event.id));
    assert!(app.state.ticket_repo.find_by_code(ticket.ticket_code).await.unwrap().is_none());
}

#[tokio::test]
async fn test_huge_quantity_is_rejected_on_purchase_and_edit() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;
    let first = app.seed_ticket(buyer.user.id, event.id, 1).await;
    app.seed_ticket(buyer.user.id, event.id, 1).await;

    let huge = i64::MAX.to_string();
    let response = buy(&app, &buyer, event.id, &huge).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("límite de 4 entradas"));

    let uri = format!("/tickets/{}/edit/", first.ticket_code);
    let response = app.post_form(&uri, Some(&buyer.cookie), &[("cantidad", huge.as_str()), ("tipo", "general")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("límite de 4 entradas"));

    assert_eq!(app.state.ticket_repo.quantity_held(buyer.user.id, event.id, None).await.unwrap(), 2);
}
