mod common;

use common::TestApp;
use eventhub::{
    domain::models::{
        refund::NewRefundRequest,
        ticket::{NewTicket, TicketType},
    },
    error::{is_unique_violation, AppError},
};
use chrono::Utc;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_ticket_guard_rejects_writes_over_cap() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;

    let first = app.seed_ticket(buyer.user.id, event.id, 1).await;
    app.seed_ticket(buyer.user.id, event.id, 2).await;

    let over = NewTicket::new(buyer.user.id, event.id, 2, TicketType::General);
    let inserted = app.state.ticket_repo.create_within_cap(&over, 4).await.unwrap();
    assert!(inserted.is_none(), "3 held + 2 requested must not be stored");

    let mut grown = first.clone();
    grown.quantity = 3;
    let updated = app.state.ticket_repo.update_within_cap(&grown, 4).await.unwrap();
    assert!(updated.is_none(), "2 other + 3 edited must not be stored");

    let mut fits = first.clone();
    fits.quantity = 2;
    assert!(app.state.ticket_repo.update_within_cap(&fits, 4).await.unwrap().is_some());

    assert_eq!(app.state.ticket_repo.quantity_held(buyer.user.id, event.id, None).await.unwrap(), 4);
}

#[tokio::test]
async fn test_concurrent_purchases_never_exceed_cap() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;

    let attempts = 12;
    let mut set = JoinSet::new();
    for _ in 0..attempts {
        let state = app.state.clone();
        let (user_id, event_id) = (buyer.user.id, event.id);
        set.spawn(async move {
            state.ticket_service.purchase(user_id, event_id, 1, TicketType::General).await
        });
    }

    let mut accepted = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::Validation(msg)) => assert!(msg.contains("límite de 4 entradas"), "unexpected message: {}", msg),
            Err(e) => panic!("Unexpected purchase failure: {:?}", e),
        }
    }

    let held = app.state.ticket_repo.quantity_held(buyer.user.id, event.id, None).await.unwrap();
    println!("Attempts: {}, accepted: {}, held: {}", attempts, accepted, held);

    assert_eq!(accepted, 4, "Exactly four single-ticket purchases fit under the cap");
    assert_eq!(held, 4, "Cap exceeded! Race condition exists.");
}

#[tokio::test]
async fn test_concurrent_refund_requests_leave_one_pending() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;

    let mut codes = Vec::new();
    for _ in 0..4 {
        codes.push(app.seed_ticket(buyer.user.id, event.id, 1).await.ticket_code);
    }

    let mut set = JoinSet::new();
    for code in codes.into_iter().cycle().take(10) {
        let state = app.state.clone();
        let user_id = buyer.user.id;
        set.spawn(async move {
            state.refund_service.create(NewRefundRequest {
                ticket_code: code,
                reason: "No puedo asistir por viaje".to_string(),
                user_id,
            }).await
        });
    }

    let mut created = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("Unexpected refund failure: {:?}", e),
        }
    }

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM refund_requests WHERE user_id = ? AND status = 'pendiente'"
    )
        .bind(buyer.user.id)
        .fetch_one(&app.pool)
        .await
        .unwrap();

    assert_eq!(created, 1, "Only one request may be accepted");
    assert_eq!(pending, 1, "Duplicate pending refunds detected! Race condition exists.");
}

#[tokio::test]
async fn test_refund_guard_and_pending_index() {
    let app = TestApp::new().await;
    let organizer = app.register("orga", true).await;
    let buyer = app.register("ana", false).await;
    let event = app.seed_event(organizer.user.id, "Recital", 7).await;
    let ticket = app.seed_ticket(buyer.user.id, event.id, 1).await;

    let request = NewRefundRequest {
        ticket_code: ticket.ticket_code,
        reason: "No puedo asistir por viaje".to_string(),
        user_id: buyer.user.id,
    };
    assert!(app.state.refund_repo.create_if_none_pending(&request).await.unwrap().is_some());
    assert!(app.state.refund_repo.create_if_none_pending(&request).await.unwrap().is_none());

    // A write that skips the guard still hits the partial unique index
    let err = sqlx::query(
        "INSERT INTO refund_requests (ticket_code, reason, created_at, user_id, status) VALUES (?, ?, ?, ?, 'pendiente')"
    )
        .bind(ticket.ticket_code)
        .bind("Otro motivo cualquiera")
        .bind(Utc::now())
        .bind(buyer.user.id)
        .execute(&app.pool)
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));

    // Decided requests do not count as pending
    sqlx::query("UPDATE refund_requests SET status = 'rechazado' WHERE user_id = ?")
        .bind(buyer.user.id)
        .execute(&app.pool)
        .await
        .unwrap();
    assert!(app.state.refund_repo.create_if_none_pending(&request).await.unwrap().is_some());
}
