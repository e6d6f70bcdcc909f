use std::collections::HashMap;
use std::sync::Arc;

use flightbook_core::outcome::ReservationView;
use flightbook_core::{BookingError, Flight, FlightId, FlightStore, Itinerary, StoreError};

/// Live (non-cancelled) reservations of `username`, with legs re-read from
/// the flight inventory on every call.
pub async fn live_reservations(
    store: &Arc<dyn FlightStore>,
    username: &str,
) -> Result<Vec<ReservationView>, BookingError> {
    let reservations = store.reservations_for(username).await?;
    let mut legs: HashMap<FlightId, Flight> = HashMap::new();
    let mut views = Vec::new();

    for reservation in reservations.into_iter().filter(|r| !r.cancelled) {
        for fid in reservation.fids() {
            if !legs.contains_key(&fid) {
                let flight = store
                    .flight(fid)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("flight {}", fid)))?;
                legs.insert(fid, flight);
            }
        }

        let first = legs[&reservation.fid1].clone();
        let itinerary = match reservation.fid2 {
            Some(fid2) => Itinerary::connecting(first, legs[&fid2].clone()),
            None => Itinerary::direct(first),
        };

        views.push(ReservationView {
            rid: reservation.rid,
            paid: reservation.paid,
            itinerary,
        });
    }

    Ok(views)
}
