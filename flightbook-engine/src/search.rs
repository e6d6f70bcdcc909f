use std::sync::Arc;
use tracing::debug;

use flightbook_core::itinerary::sort_by_total_time;
use flightbook_core::{FlightStore, Itinerary, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub direct_only: bool,
    pub day_of_month: i32,
    pub limit: usize,
}

/// Builds the itinerary list for a search: direct flights first, topped up
/// with connecting pairs, then ordered by total time.
pub struct SearchEngine {
    store: Arc<dyn FlightStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn FlightStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, query: &SearchQuery) -> StoreResult<Vec<Itinerary>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let direct = self
            .store
            .direct_flights(&query.origin, &query.destination, query.day_of_month, query.limit)
            .await?;
        let mut itineraries: Vec<Itinerary> = direct.into_iter().map(Itinerary::direct).collect();

        if !query.direct_only && itineraries.len() < query.limit {
            let remaining = query.limit - itineraries.len();
            let pairs = self
                .store
                .connecting_flights(&query.origin, &query.destination, query.day_of_month, remaining)
                .await?;
            itineraries.extend(pairs.into_iter().map(|(first, second)| Itinerary::connecting(first, second)));
        }

        sort_by_total_time(&mut itineraries);
        itineraries.truncate(query.limit);

        debug!(
            "Search {} -> {} day {}: {} itineraries",
            query.origin,
            query.destination,
            query.day_of_month,
            itineraries.len()
        );
        Ok(itineraries)
    }
}
