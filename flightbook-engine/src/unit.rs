use tracing::warn;

use flightbook_core::{BookingError, StoreTransaction};

/// Commits `tx` when the unit succeeded and rolls it back otherwise, so a
/// failed unit leaves none of its writes behind.
pub(crate) async fn finish<T>(
    tx: Box<dyn StoreTransaction>,
    result: Result<T, BookingError>,
) -> Result<T, BookingError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
