//! In-memory store gateway. A transaction holds the whole-store lock from
//! `begin` until commit or drop, so concurrent units run one at a time
//! and every schedule is serializable.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use flightbook_core::{
    Customer, Flight, FlightId, FlightStore, NewReservation, Reservation, ReservationId,
    StoreError, StoreResult, StoreTransaction,
};

/// A flight as held in the inventory, with its mutable seat counter.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightRecord {
    #[serde(flatten)]
    pub flight: Flight,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub num_booked: i32,
}

impl FlightRecord {
    pub fn new(flight: Flight) -> Self {
        Self { flight, cancelled: false, num_booked: 0 }
    }
}

#[derive(Debug, Clone)]
struct Tables {
    customers: HashMap<String, Customer>,
    flights: BTreeMap<FlightId, FlightRecord>,
    reservations: BTreeMap<ReservationId, Reservation>,
    next_rid: ReservationId,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            customers: HashMap::new(),
            flights: BTreeMap::new(),
            reservations: BTreeMap::new(),
            next_rid: 1,
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryFlightStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryFlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flights(records: impl IntoIterator<Item = FlightRecord>) -> Self {
        let mut tables = Tables::default();
        for record in records {
            tables.flights.insert(record.flight.fid, record);
        }
        Self { tables: Arc::new(Mutex::new(tables)) }
    }

    /// Parses a JSON array of flight records.
    pub fn from_seed_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<FlightRecord> = serde_json::from_str(json)?;
        Ok(Self::with_flights(records))
    }

    /// Seats booked on a flight, for inspecting inventory from tests and tools.
    pub async fn booked_seats(&self, fid: FlightId) -> Option<i32> {
        self.tables.lock().await.flights.get(&fid).map(|r| r.num_booked)
    }

    pub async fn flight_count(&self) -> usize {
        self.tables.lock().await.flights.len()
    }
}

fn live(record: &FlightRecord, origin: &str, day_of_month: i32) -> bool {
    !record.cancelled && record.flight.origin_city == origin && record.flight.day_of_month == day_of_month
}

#[async_trait]
impl FlightStore for MemoryFlightStore {
    async fn create_customer(
        &self,
        username: &str,
        password_hash: &str,
        balance: i32,
    ) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.customers.contains_key(username) {
            return Err(StoreError::Duplicate(format!("customer {}", username)));
        }
        tables.customers.insert(
            username.to_string(),
            Customer {
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                balance,
            },
        );
        Ok(())
    }

    async fn find_customer(&self, username: &str) -> StoreResult<Option<Customer>> {
        Ok(self.tables.lock().await.customers.get(username).cloned())
    }

    async fn direct_flights(
        &self,
        origin: &str,
        destination: &str,
        day_of_month: i32,
        limit: usize,
    ) -> StoreResult<Vec<Flight>> {
        let tables = self.tables.lock().await;
        let mut flights: Vec<Flight> = tables
            .flights
            .values()
            .filter(|r| live(r, origin, day_of_month) && r.flight.dest_city == destination)
            .map(|r| r.flight.clone())
            .collect();

        flights.sort_by_key(|f| (f.duration_minutes, f.fid));
        flights.truncate(limit);
        Ok(flights)
    }

    async fn connecting_flights(
        &self,
        origin: &str,
        destination: &str,
        day_of_month: i32,
        limit: usize,
    ) -> StoreResult<Vec<(Flight, Flight)>> {
        let tables = self.tables.lock().await;
        let mut pairs = Vec::new();

        for first in tables.flights.values().filter(|r| live(r, origin, day_of_month)) {
            for second in tables.flights.values().filter(|r| {
                live(r, &first.flight.dest_city, day_of_month) && r.flight.dest_city == destination
            }) {
                pairs.push((first.flight.clone(), second.flight.clone()));
            }
        }

        pairs.sort_by_key(|(a, b)| (a.duration_minutes + b.duration_minutes, a.fid, b.fid));
        pairs.truncate(limit);
        Ok(pairs)
    }

    async fn flight(&self, fid: FlightId) -> StoreResult<Option<Flight>> {
        Ok(self.tables.lock().await.flights.get(&fid).map(|r| r.flight.clone()))
    }

    async fn reservations_for(&self, username: &str) -> StoreResult<Vec<Reservation>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reservations
            .values()
            .filter(|r| r.username == username)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn clear_tables(&self) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables.customers.clear();
        tables.reservations.clear();
        tables.next_rid = 1;
        for record in tables.flights.values_mut() {
            record.num_booked = 0;
        }
        Ok(())
    }
}

/// Writes go to `working`; commit swaps it into the locked tables.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl MemoryTransaction {
    fn flight_mut(&mut self, fid: FlightId) -> StoreResult<&mut FlightRecord> {
        self.working
            .flights
            .get_mut(&fid)
            .ok_or_else(|| StoreError::NotFound(format!("flight {}", fid)))
    }

    fn customer_mut(&mut self, username: &str) -> StoreResult<&mut Customer> {
        self.working
            .customers
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(format!("customer {}", username)))
    }

    fn reservation_mut(&mut self, rid: ReservationId, username: &str) -> Option<&mut Reservation> {
        self.working
            .reservations
            .get_mut(&rid)
            .filter(|r| r.username == username)
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn reservations_on_day(&mut self, username: &str, day_of_month: i32) -> StoreResult<i64> {
        let count = self
            .working
            .reservations
            .values()
            .filter(|r| r.username == username && r.trip_day == day_of_month)
            .count();
        Ok(count as i64)
    }

    async fn seats_left(&mut self, fid: FlightId) -> StoreResult<i32> {
        let record = self.flight_mut(fid)?;
        Ok(record.flight.capacity - record.num_booked)
    }

    async fn increment_booked(&mut self, fid: FlightId) -> StoreResult<()> {
        self.flight_mut(fid)?.num_booked += 1;
        Ok(())
    }

    async fn allocate_rid(&mut self) -> StoreResult<ReservationId> {
        let rid = self.working.next_rid;
        self.working.next_rid += 1;
        Ok(rid)
    }

    async fn insert_reservation(&mut self, reservation: &NewReservation) -> StoreResult<()> {
        if self.working.reservations.contains_key(&reservation.rid) {
            return Err(StoreError::Duplicate(format!("reservation {}", reservation.rid)));
        }
        self.working
            .reservations
            .insert(reservation.rid, reservation.clone().into_reservation(Utc::now()));
        Ok(())
    }

    async fn reservation(
        &mut self,
        rid: ReservationId,
        username: &str,
    ) -> StoreResult<Option<Reservation>> {
        Ok(self.reservation_mut(rid, username).map(|r| r.clone()))
    }

    async fn balance(&mut self, username: &str) -> StoreResult<i32> {
        Ok(self.customer_mut(username)?.balance)
    }

    async fn adjust_balance(&mut self, username: &str, delta: i32) -> StoreResult<i32> {
        let customer = self.customer_mut(username)?;
        let updated = customer.balance + delta;
        // Mirrors the CHECK (balance >= 0) constraint of the relational schema
        if updated < 0 {
            return Err(StoreError::Database(format!("balance of {} would become negative", username)));
        }
        customer.balance = updated;
        Ok(updated)
    }

    async fn mark_paid(&mut self, rid: ReservationId, username: &str) -> StoreResult<()> {
        if let Some(reservation) = self.reservation_mut(rid, username) {
            reservation.paid = true;
        }
        Ok(())
    }

    async fn mark_cancelled(&mut self, rid: ReservationId, username: &str) -> StoreResult<()> {
        if let Some(reservation) = self.reservation_mut(rid, username) {
            reservation.cancelled = true;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
