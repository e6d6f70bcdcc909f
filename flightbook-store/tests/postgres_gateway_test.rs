//! Runs against a real PostgreSQL database:
//! `DATABASE_URL=postgres://... cargo test -p flightbook-store -- --ignored --test-threads=1`

use flightbook_core::{FlightStore, NewReservation, StoreError};
use flightbook_store::app_config::{DatabaseConfig, IsolationLevel};
use flightbook_store::PgFlightStore;

async fn connect() -> PgFlightStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = DatabaseConfig {
        url,
        max_connections: 5,
        acquire_timeout_seconds: 3,
        isolation_level: IsolationLevel::Serializable,
        run_migrations: true,
    };
    let store = PgFlightStore::connect(&config).await.expect("Failed to connect");
    store.migrate().await.expect("Failed to migrate");

    sqlx::query(
        r#"
        INSERT INTO flights (fid, day_of_month, carrier_id, flight_num, origin_city, dest_city, cancelled, actual_time, capacity, price)
        VALUES (900001, 9, 'ZZ', '1', 'Testville', 'Mockton', 0, 100, 1, 250),
               (900002, 9, 'ZZ', '2', 'Testville', 'Hubcity', 0, 40, 3, 100),
               (900003, 9, 'ZZ', '3', 'Hubcity', 'Mockton', 0, 50, 3, 100)
        ON CONFLICT (fid) DO NOTHING
        "#,
    )
    .execute(&store.pool)
    .await
    .expect("Failed to seed flights");

    store.clear_tables().await.expect("Failed to clear tables");
    store
}

#[tokio::test]
#[ignore]
async fn test_duplicate_customer_is_reported() {
    let store = connect().await;
    store.create_customer("pg-user", "hash", 100).await.unwrap();

    let err = store.create_customer("pg-user", "hash", 100).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
}

#[tokio::test]
#[ignore]
async fn test_search_queries() {
    let store = connect().await;

    let direct = store.direct_flights("Testville", "Mockton", 9, 10).await.unwrap();
    assert_eq!(direct.iter().map(|f| f.fid).collect::<Vec<_>>(), vec![900001]);

    let pairs = store.connecting_flights("Testville", "Mockton", 9, 10).await.unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!((pairs[0].0.fid, pairs[0].1.fid), (900002, 900003));
}

#[tokio::test]
#[ignore]
async fn test_booking_unit_commits_atomically() {
    let store = connect().await;
    store.create_customer("pg-booker", "hash", 500).await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert_eq!(tx.seats_left(900001).await.unwrap(), 1);
    tx.increment_booked(900001).await.unwrap();
    let rid = tx.allocate_rid().await.unwrap();
    tx.insert_reservation(&NewReservation {
        rid,
        username: "pg-booker".to_string(),
        trip_day: 9,
        fid1: 900001,
        fid2: None,
        cost: 250,
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(rid, 1);

    let mut tx = store.begin().await.unwrap();
    assert_eq!(tx.seats_left(900001).await.unwrap(), 0);
    assert_eq!(tx.reservations_on_day("pg-booker", 9).await.unwrap(), 1);
    assert_eq!(tx.adjust_balance("pg-booker", -250).await.unwrap(), 250);
    tx.rollback().await.unwrap();

    let customer = store.find_customer("pg-booker").await.unwrap().unwrap();
    assert_eq!(customer.balance, 500);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_increments_on_last_seat_conflict() {
    let store = connect().await;

    let mut first = store.begin().await.unwrap();
    let mut second = store.begin().await.unwrap();
    assert_eq!(first.seats_left(900001).await.unwrap(), 1);
    assert_eq!(second.seats_left(900001).await.unwrap(), 1);

    first.increment_booked(900001).await.unwrap();

    // Blocks on the row lock until `first` finishes
    let contender = tokio::spawn(async move {
        let result = second.increment_booked(900001).await;
        (second, result)
    });

    first.commit().await.unwrap();
    let (second, result) = contender.await.unwrap();
    assert!(matches!(result, Err(StoreError::Conflict(_))), "got {:?}", result);
    second.rollback().await.unwrap();

    let mut check = store.begin().await.unwrap();
    assert_eq!(check.seats_left(900001).await.unwrap(), 0);
    check.rollback().await.unwrap();
}
