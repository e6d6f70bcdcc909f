use std::sync::Arc;
use tracing::{error, info, warn};

use flightbook_core::outcome::{
    BookOutcome, CancelOutcome, CreateCustomerOutcome, LoginOutcome, LogoutOutcome, PayOutcome,
    ReservationsOutcome, SearchOutcome,
};
use flightbook_core::{BookingError, ConflictKind, FlightStore, Itinerary, ReservationId};

use crate::booking::BookingEngine;
use crate::cancellation::CancellationEngine;
use crate::listing::live_reservations;
use crate::password::{spawn_hash, spawn_verify};
use crate::payment::PaymentEngine;
use crate::search::{SearchEngine, SearchQuery};
use crate::state::SessionState;

fn validate_credentials(username: &str, password: &str) -> Result<(), BookingError> {
    if username.is_empty() {
        return Err(BookingError::invalid_input("username must not be empty"));
    }
    if password.is_empty() {
        return Err(BookingError::invalid_input("password must not be empty"));
    }
    Ok(())
}

/// One user's session against a shared store. Each operation returns a
/// tagged outcome; store failures never escape past this boundary.
pub struct Session {
    store: Arc<dyn FlightStore>,
    search: SearchEngine,
    booking: BookingEngine,
    payment: PaymentEngine,
    cancellation: CancellationEngine,
    state: SessionState,
}

impl Session {
    pub fn new(store: Arc<dyn FlightStore>) -> Self {
        Self {
            search: SearchEngine::new(store.clone()),
            booking: BookingEngine::new(store.clone()),
            payment: PaymentEngine::new(store.clone()),
            cancellation: CancellationEngine::new(store.clone()),
            store,
            state: SessionState::default(),
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.state.user()
    }

    pub fn last_results(&self) -> &[Itinerary] {
        self.state.results()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        if let Err(e) = self.state.require_logged_out() {
            warn!("Login as {} rejected: {}", username, e);
            return LoginOutcome::AlreadyLoggedIn;
        }

        let verified = match self.store.find_customer(username).await {
            Ok(Some(customer)) => spawn_verify(password, &customer.password_hash).await,
            Ok(None) => false,
            Err(e) => {
                error!(username, "Login failed: {}", e);
                return LoginOutcome::InvalidCredentials;
            }
        };

        if !verified {
            warn!(username, "Login rejected");
            return LoginOutcome::InvalidCredentials;
        }

        self.state.bind(username);
        info!(username, "Logged in");
        LoginOutcome::Success { username: username.to_string() }
    }

    pub fn logout(&mut self) -> LogoutOutcome {
        match self.state.unbind() {
            Some(username) => {
                info!(username = %username, "Logged out");
                LogoutOutcome::Success { username }
            }
            None => LogoutOutcome::NotLoggedIn,
        }
    }

    pub async fn create_customer(
        &self,
        username: &str,
        password: &str,
        initial_balance: i32,
    ) -> CreateCustomerOutcome {
        if initial_balance < 0 {
            return CreateCustomerOutcome::InvalidAmount;
        }
        if let Err(e) = validate_credentials(username, password) {
            warn!("Failed to create user: {}", e);
            return CreateCustomerOutcome::InvalidInput;
        }

        let hash = match spawn_hash(password).await {
            Ok(hash) => hash,
            Err(e) => {
                error!(username, "Failed to create user: {}", e);
                return CreateCustomerOutcome::Failed;
            }
        };

        match self.store.create_customer(username, &hash, initial_balance).await {
            Ok(()) => {
                info!(username, initial_balance, "Created user");
                CreateCustomerOutcome::Success { username: username.to_string() }
            }
            Err(e) => {
                warn!(username, "Failed to create user: {}", e);
                CreateCustomerOutcome::Failed
            }
        }
    }

    /// Replaces the session's itinerary list; indices restart at 0. A failed
    /// search leaves the list empty.
    pub async fn search(
        &mut self,
        origin: &str,
        destination: &str,
        direct_only: bool,
        day_of_month: i32,
        limit: usize,
    ) -> SearchOutcome {
        let query = SearchQuery {
            origin: origin.to_string(),
            destination: destination.to_string(),
            direct_only,
            day_of_month,
            limit,
        };

        match self.search.search(&query).await {
            Ok(itineraries) if itineraries.is_empty() => {
                self.state.replace_results(Vec::new());
                SearchOutcome::Empty
            }
            Ok(itineraries) => {
                self.state.replace_results(itineraries.clone());
                SearchOutcome::Success { itineraries }
            }
            Err(e) => {
                self.state.replace_results(Vec::new());
                error!("Search {} -> {} failed: {}", origin, destination, e);
                SearchOutcome::StoreError
            }
        }
    }

    pub async fn book(&self, itinerary_index: i64) -> BookOutcome {
        let Ok(username) = self.state.require_user() else {
            return BookOutcome::NotLoggedIn;
        };
        let Some(itinerary) = self.state.itinerary(itinerary_index) else {
            return BookOutcome::InvalidIndex { index: itinerary_index };
        };

        match self.booking.book(username, itinerary).await {
            Ok(rid) => BookOutcome::Success { rid },
            Err(BookingError::Conflict(ConflictKind::SameDayReservation)) => {
                warn!(username, "Booking rejected: already booked that day");
                BookOutcome::SameDayConflict
            }
            Err(BookingError::Conflict(ConflictKind::NoSeatsLeft)) => {
                warn!(username, "Booking rejected: no seats left");
                BookOutcome::NoCapacity
            }
            Err(e) => {
                error!(username, "Booking failed: {}", e);
                BookOutcome::StoreError
            }
        }
    }

    pub async fn pay(&self, rid: ReservationId) -> PayOutcome {
        let Ok(username) = self.state.require_user() else {
            return PayOutcome::NotLoggedIn;
        };

        match self.payment.pay(username, rid).await {
            Ok(remaining_balance) => PayOutcome::Success { rid, remaining_balance },
            Err(BookingError::NotFound(_)) | Err(BookingError::Conflict(_)) => {
                warn!(rid, username, "Payment rejected: no unpaid reservation");
                PayOutcome::NotFoundOrPaid { rid, username: username.to_string() }
            }
            Err(BookingError::InsufficientFunds { balance, cost }) => {
                warn!(rid, username, balance, cost, "Payment rejected: insufficient funds");
                PayOutcome::InsufficientFunds { balance, cost }
            }
            Err(e) => {
                error!(rid, username, "Payment failed: {}", e);
                PayOutcome::StoreError { rid }
            }
        }
    }

    pub async fn reservations(&self) -> ReservationsOutcome {
        let Ok(username) = self.state.require_user() else {
            return ReservationsOutcome::NotLoggedIn;
        };

        match live_reservations(&self.store, username).await {
            Ok(reservations) if reservations.is_empty() => ReservationsOutcome::Empty,
            Ok(reservations) => ReservationsOutcome::Success { reservations },
            Err(e) => {
                error!(username, "Failed to retrieve reservations: {}", e);
                ReservationsOutcome::StoreError
            }
        }
    }

    pub async fn cancel(&self, rid: ReservationId) -> CancelOutcome {
        let Ok(username) = self.state.require_user() else {
            return CancelOutcome::NotLoggedIn;
        };

        match self.cancellation.cancel(username, rid).await {
            Ok(refunded) => CancelOutcome::Success { rid, refunded },
            Err(BookingError::NotFound(_)) | Err(BookingError::Conflict(_)) => {
                warn!(rid, username, "Cancellation rejected");
                CancelOutcome::NotFoundOrAlreadyCancelled { rid }
            }
            Err(e) => {
                error!(rid, username, "Cancellation failed: {}", e);
                CancelOutcome::StoreError { rid }
            }
        }
    }
}
