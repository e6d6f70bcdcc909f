use std::sync::Arc;
use tracing::info;

use flightbook_core::{
    BookingError, ConflictKind, FlightStore, Itinerary, NewReservation, ReservationId,
    StoreTransaction,
};

use crate::unit::finish;

/// Reserves an itinerary for a customer. The same-day check, the seat
/// checks, the seat increments and the insert share one transaction.
pub struct BookingEngine {
    store: Arc<dyn FlightStore>,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn FlightStore>) -> Self {
        Self { store }
    }

    pub async fn book(
        &self,
        username: &str,
        itinerary: &Itinerary,
    ) -> Result<ReservationId, BookingError> {
        let mut tx = self.store.begin().await?;
        let result = Self::reserve(tx.as_mut(), username, itinerary).await;
        let rid = finish(tx, result).await?;

        info!(rid, username, legs = itinerary.leg_count(), "Reservation booked");
        Ok(rid)
    }

    async fn reserve(
        tx: &mut dyn StoreTransaction,
        username: &str,
        itinerary: &Itinerary,
    ) -> Result<ReservationId, BookingError> {
        // 1. One reservation per customer per day, cancelled ones included
        if tx.reservations_on_day(username, itinerary.trip_day()).await? > 0 {
            return Err(BookingError::Conflict(ConflictKind::SameDayReservation));
        }

        // 2. Every leg needs a free seat before anything is written
        for leg in itinerary.legs() {
            if tx.seats_left(leg.fid).await? <= 0 {
                return Err(BookingError::Conflict(ConflictKind::NoSeatsLeft));
            }
        }

        // 3. Take the seats and the next id
        for leg in itinerary.legs() {
            tx.increment_booked(leg.fid).await?;
        }
        let rid = tx.allocate_rid().await?;

        tx.insert_reservation(&NewReservation {
            rid,
            username: username.to_string(),
            trip_day: itinerary.trip_day(),
            fid1: itinerary.first_leg().fid,
            fid2: itinerary.second_leg().map(|leg| leg.fid),
            cost: itinerary.cost(),
        })
        .await?;

        Ok(rid)
    }
}
