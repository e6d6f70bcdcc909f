use std::sync::Arc;
use tracing::info;

use flightbook_core::{
    BookingError, ConflictKind, FlightStore, ReservationId, ReservationState, StoreTransaction,
};

use crate::unit::finish;

/// Pays for a reservation out of the customer's balance.
pub struct PaymentEngine {
    store: Arc<dyn FlightStore>,
}

impl PaymentEngine {
    pub fn new(store: Arc<dyn FlightStore>) -> Self {
        Self { store }
    }

    /// Returns the balance left after the debit.
    pub async fn pay(&self, username: &str, rid: ReservationId) -> Result<i32, BookingError> {
        let mut tx = self.store.begin().await?;
        let result = Self::debit(tx.as_mut(), username, rid).await;
        let remaining = finish(tx, result).await?;

        info!(rid, username, remaining, "Reservation paid");
        Ok(remaining)
    }

    async fn debit(
        tx: &mut dyn StoreTransaction,
        username: &str,
        rid: ReservationId,
    ) -> Result<i32, BookingError> {
        let reservation = tx
            .reservation(rid, username)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {} for {}", rid, username)))?;

        match reservation.state() {
            ReservationState::Reserved => {}
            ReservationState::Paid => return Err(BookingError::Conflict(ConflictKind::AlreadyPaid)),
            ReservationState::Cancelled => {
                return Err(BookingError::Conflict(ConflictKind::AlreadyCancelled))
            }
        }

        let balance = tx.balance(username).await?;
        if balance < reservation.cost {
            return Err(BookingError::InsufficientFunds {
                balance,
                cost: reservation.cost,
            });
        }

        let remaining = tx.adjust_balance(username, -reservation.cost).await?;
        tx.mark_paid(rid, username).await?;
        Ok(remaining)
    }
}
