use async_trait::async_trait;

use crate::customer::Customer;
use crate::error::StoreResult;
use crate::flight::{Flight, FlightId};
use crate::reservation::{NewReservation, Reservation, ReservationId};

/// Store gateway: reads with default consistency, plus `begin` for the
/// multi-step units that must run serializably.
#[async_trait]
pub trait FlightStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the username is taken.
    async fn create_customer(
        &self,
        username: &str,
        password_hash: &str,
        balance: i32,
    ) -> StoreResult<()>;

    async fn find_customer(&self, username: &str) -> StoreResult<Option<Customer>>;

    /// Non-cancelled direct flights, ordered by duration then fid.
    async fn direct_flights(
        &self,
        origin: &str,
        destination: &str,
        day_of_month: i32,
        limit: usize,
    ) -> StoreResult<Vec<Flight>>;

    /// Same-day two-leg pairs through any connecting city, ordered by
    /// total duration, then first-leg fid, then second-leg fid.
    async fn connecting_flights(
        &self,
        origin: &str,
        destination: &str,
        day_of_month: i32,
        limit: usize,
    ) -> StoreResult<Vec<(Flight, Flight)>>;

    async fn flight(&self, fid: FlightId) -> StoreResult<Option<Flight>>;

    /// Every reservation held by `username`, cancelled ones included, by rid.
    async fn reservations_for(&self, username: &str) -> StoreResult<Vec<Reservation>>;

    /// Opens a transaction at the store's configured isolation level.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;

    /// Removes customers and reservations, zeroes booked seats and
    /// restarts reservation ids at 1. Flights are kept.
    async fn clear_tables(&self) -> StoreResult<()>;
}

/// One unit of work. Dropping it without `commit` discards every write.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Count of reservations, cancelled or not, the user holds on that day.
    async fn reservations_on_day(&mut self, username: &str, day_of_month: i32) -> StoreResult<i64>;

    /// `capacity - booked` for the flight.
    async fn seats_left(&mut self, fid: FlightId) -> StoreResult<i32>;

    async fn increment_booked(&mut self, fid: FlightId) -> StoreResult<()>;

    /// Takes the next reservation id from the store-owned counter.
    async fn allocate_rid(&mut self) -> StoreResult<ReservationId>;

    async fn insert_reservation(&mut self, reservation: &NewReservation) -> StoreResult<()>;

    async fn reservation(
        &mut self,
        rid: ReservationId,
        username: &str,
    ) -> StoreResult<Option<Reservation>>;

    async fn balance(&mut self, username: &str) -> StoreResult<i32>;

    /// Adds `delta` (negative to debit) and returns the new balance.
    async fn adjust_balance(&mut self, username: &str, delta: i32) -> StoreResult<i32>;

    async fn mark_paid(&mut self, rid: ReservationId, username: &str) -> StoreResult<()>;

    async fn mark_cancelled(&mut self, rid: ReservationId, username: &str) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
