mod common;

use common::{balance_of, logged_in, seeded_store, BOSTON, SEATTLE};
use flightbook_core::outcome::{BookOutcome, CancelOutcome, PayOutcome, ReservationsOutcome};

#[tokio::test]
async fn test_pay_then_cancel_refunds_in_full() {
    let store = seeded_store();
    let mut session = logged_in(&store, "alice", 500).await;
    session.search(SEATTLE, BOSTON, true, 1, 10).await;
    assert_eq!(session.book(1).await, BookOutcome::Success { rid: 1 });

    let paid = session.pay(1).await;
    assert_eq!(paid, PayOutcome::Success { rid: 1, remaining_balance: 200 });
    assert_eq!(paid.to_string(), "Paid reservation: 1 remaining balance: 200");
    assert_eq!(balance_of(&store, "alice").await, 200);

    assert_eq!(
        session.pay(1).await,
        PayOutcome::NotFoundOrPaid { rid: 1, username: "alice".to_string() }
    );
    assert_eq!(balance_of(&store, "alice").await, 200);

    assert_eq!(session.cancel(1).await, CancelOutcome::Success { rid: 1, refunded: 300 });
    assert_eq!(balance_of(&store, "alice").await, 500);
    assert_eq!(session.reservations().await, ReservationsOutcome::Empty);
}

#[tokio::test]
async fn test_missing_and_paid_reservations_look_the_same() {
    let store = seeded_store();
    let mut session = logged_in(&store, "bob", 1000).await;
    session.search(SEATTLE, BOSTON, true, 1, 10).await;
    session.book(1).await;
    session.pay(1).await;

    let already_paid = session.pay(1).await.to_string();
    let missing = session.pay(1).await.to_string();
    let unknown = session.pay(42).await.to_string();

    assert_eq!(already_paid, missing);
    assert_eq!(unknown, "Cannot find unpaid reservation 42 under user: bob");
}

#[tokio::test]
async fn test_cannot_pay_for_someone_else() {
    let store = seeded_store();
    let mut owner = logged_in(&store, "carol", 1000).await;
    let other = logged_in(&store, "dave", 1000).await;
    owner.search(SEATTLE, BOSTON, true, 1, 10).await;
    owner.book(1).await;

    assert_eq!(
        other.pay(1).await,
        PayOutcome::NotFoundOrPaid { rid: 1, username: "dave".to_string() }
    );
    assert_eq!(other.cancel(1).await, CancelOutcome::NotFoundOrAlreadyCancelled { rid: 1 });
    assert_eq!(balance_of(&store, "carol").await, 1000);
}

#[tokio::test]
async fn test_insufficient_funds_leaves_everything_untouched() {
    let store = seeded_store();
    let mut session = logged_in(&store, "erin", 250).await;
    session.search(SEATTLE, BOSTON, true, 1, 10).await;
    session.book(0).await;

    let outcome = session.pay(1).await;

    assert_eq!(outcome, PayOutcome::InsufficientFunds { balance: 250, cost: 400 });
    assert_eq!(outcome.to_string(), "User has only 250 in account but itinerary costs 400");
    assert_eq!(balance_of(&store, "erin").await, 250);
    match session.reservations().await {
        ReservationsOutcome::Success { reservations } => assert!(!reservations[0].paid),
        other => panic!("expected reservations, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unpaid_cancel_refunds_nothing_and_only_once() {
    let store = seeded_store();
    let mut session = logged_in(&store, "frank", 700).await;
    session.search(SEATTLE, BOSTON, true, 1, 10).await;
    session.book(1).await;

    assert_eq!(session.cancel(1).await, CancelOutcome::Success { rid: 1, refunded: 0 });
    assert_eq!(session.cancel(1).await, CancelOutcome::NotFoundOrAlreadyCancelled { rid: 1 });
    assert_eq!(session.cancel(1).await.to_string(), "Failed to cancel reservation 1");
    assert_eq!(balance_of(&store, "frank").await, 700);

    // Cancelled reservations cannot be paid either
    assert_eq!(
        session.pay(1).await,
        PayOutcome::NotFoundOrPaid { rid: 1, username: "frank".to_string() }
    );
}

#[tokio::test]
async fn test_listing_shows_live_reservations_in_rid_order() {
    let store = seeded_store();
    let mut session = logged_in(&store, "gina", 1000).await;
    session.search(SEATTLE, BOSTON, false, 1, 10).await;
    session.book(2).await;
    session.search(SEATTLE, BOSTON, true, 2, 10).await;
    session.book(0).await;
    session.pay(2).await;

    let reservations = match session.reservations().await {
        ReservationsOutcome::Success { reservations } => reservations,
        other => panic!("expected reservations, got {:?}", other),
    };

    let summary: Vec<(i64, bool, usize)> = reservations
        .iter()
        .map(|r| (r.rid, r.paid, r.itinerary.leg_count()))
        .collect();
    assert_eq!(summary, vec![(1, false, 2), (2, true, 1)]);

    let rendered = session.reservations().await.to_string();
    assert!(rendered.starts_with("Reservation 1 paid: false:\nID: 3 Day: 1"));
    assert!(rendered.contains("Reservation 2 paid: true:\nID: 10 Day: 2"));
}
