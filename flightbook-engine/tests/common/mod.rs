#![allow(dead_code)]

use std::sync::Arc;

use flightbook_core::Flight;
use flightbook_engine::Session;
use flightbook_store::{FlightRecord, MemoryFlightStore};

pub const SEATTLE: &str = "Seattle WA";
pub const BOSTON: &str = "Boston MA";

pub fn flight(
    fid: i32,
    day_of_month: i32,
    origin: &str,
    dest: &str,
    minutes: i32,
    capacity: i32,
    price: i32,
) -> FlightRecord {
    FlightRecord::new(Flight {
        fid,
        day_of_month,
        carrier_id: "AS".to_string(),
        flight_num: format!("{}", 1000 + fid),
        origin_city: origin.to_string(),
        dest_city: dest.to_string(),
        duration_minutes: minutes,
        capacity,
        price,
    })
}

/// Seattle -> Boston on day 1, as a full search (limit 10) orders it:
///   0: fid 5 + fid 6 via Denver, 180 min (fid 6 has no seats)
///   1: fid 2 direct, 200 min, 1 seat, price 400
///   2: fid 3 + fid 4 via Chicago, 250 min, price 300
///   3: fid 1 direct, 300 min, 2 seats, price 300
/// fid 7 is cancelled. Day 2 has one direct flight, fid 10.
pub fn seeded_store() -> Arc<MemoryFlightStore> {
    let mut cancelled = flight(7, 1, SEATTLE, BOSTON, 90, 10, 50);
    cancelled.cancelled = true;

    Arc::new(MemoryFlightStore::with_flights(vec![
        flight(1, 1, SEATTLE, BOSTON, 300, 2, 300),
        flight(2, 1, SEATTLE, BOSTON, 200, 1, 400),
        flight(3, 1, SEATTLE, "Chicago IL", 100, 5, 120),
        flight(4, 1, "Chicago IL", BOSTON, 150, 5, 180),
        flight(5, 1, SEATTLE, "Denver CO", 60, 5, 100),
        flight(6, 1, "Denver CO", BOSTON, 120, 0, 100),
        cancelled,
        flight(10, 2, SEATTLE, BOSTON, 310, 3, 250),
    ]))
}

/// Registers `username` with `balance` and returns a logged-in session.
pub async fn logged_in(store: &Arc<MemoryFlightStore>, username: &str, balance: i32) -> Session {
    let mut session = Session::new(store.clone());
    session.create_customer(username, "secret", balance).await;
    session.login(username, "secret").await;
    assert_eq!(session.current_user(), Some(username));
    session
}

pub async fn balance_of(store: &Arc<MemoryFlightStore>, username: &str) -> i32 {
    use flightbook_core::FlightStore;

    store.find_customer(username).await.unwrap().unwrap().balance
}
