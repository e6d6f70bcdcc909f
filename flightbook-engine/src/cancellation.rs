use std::sync::Arc;
use tracing::info;

use flightbook_core::{BookingError, ConflictKind, FlightStore, ReservationId, StoreTransaction};

use crate::unit::finish;

/// Cancels a reservation, refunding its cost if it was paid. Booked seats
/// stay consumed and the rid is never handed out again.
pub struct CancellationEngine {
    store: Arc<dyn FlightStore>,
}

impl CancellationEngine {
    pub fn new(store: Arc<dyn FlightStore>) -> Self {
        Self { store }
    }

    /// Returns the amount refunded (0 for an unpaid reservation).
    pub async fn cancel(&self, username: &str, rid: ReservationId) -> Result<i32, BookingError> {
        let mut tx = self.store.begin().await?;
        let result = Self::retire(tx.as_mut(), username, rid).await;
        let refunded = finish(tx, result).await?;

        info!(rid, username, refunded, "Reservation cancelled");
        Ok(refunded)
    }

    async fn retire(
        tx: &mut dyn StoreTransaction,
        username: &str,
        rid: ReservationId,
    ) -> Result<i32, BookingError> {
        let reservation = tx
            .reservation(rid, username)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {} for {}", rid, username)))?;

        if !reservation.can_cancel() {
            return Err(BookingError::Conflict(ConflictKind::AlreadyCancelled));
        }

        let refund = reservation.refund_due();
        if refund > 0 {
            tx.adjust_balance(username, refund).await?;
        }
        tx.mark_cancelled(rid, username).await?;

        Ok(refund)
    }
}
