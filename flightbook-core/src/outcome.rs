//! Tagged results of the session operations. `Display` renders the
//! status line a console front end prints for each outcome.

use serde::Serialize;
use std::fmt;

use crate::itinerary::Itinerary;
use crate::reservation::ReservationId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginOutcome {
    AlreadyLoggedIn,
    /// Unknown user, wrong password and store failures all land here.
    InvalidCredentials,
    Success { username: String },
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginOutcome::AlreadyLoggedIn => write!(f, "User already logged in"),
            LoginOutcome::InvalidCredentials => write!(f, "Login failed"),
            LoginOutcome::Success { username } => write!(f, "Logged in as {}", username),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogoutOutcome {
    NotLoggedIn,
    Success { username: String },
}

impl fmt::Display for LogoutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutOutcome::NotLoggedIn => write!(f, "Cannot log out, not logged in"),
            LogoutOutcome::Success { username } => write!(f, "Logged out {}", username),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateCustomerOutcome {
    InvalidAmount,
    InvalidInput,
    /// Duplicate username or store failure.
    Failed,
    Success { username: String },
}

impl fmt::Display for CreateCustomerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateCustomerOutcome::Success { username } => write!(f, "Created user {}", username),
            _ => write!(f, "Failed to create user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchOutcome {
    Empty,
    StoreError,
    Success { itineraries: Vec<Itinerary> },
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Empty => write!(f, "No flights match your selection"),
            SearchOutcome::StoreError => write!(f, "Failed to search"),
            SearchOutcome::Success { itineraries } => {
                for (index, itinerary) in itineraries.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "Itinerary {}: {}", index, itinerary)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookOutcome {
    NotLoggedIn,
    InvalidIndex { index: i64 },
    SameDayConflict,
    NoCapacity,
    StoreError,
    Success { rid: ReservationId },
}

impl fmt::Display for BookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookOutcome::NotLoggedIn => write!(f, "Cannot book reservations, not logged in"),
            BookOutcome::InvalidIndex { index } => write!(f, "No such itinerary {}", index),
            BookOutcome::SameDayConflict => write!(f, "You cannot book two flights in the same day"),
            BookOutcome::NoCapacity | BookOutcome::StoreError => write!(f, "Booking failed"),
            BookOutcome::Success { rid } => write!(f, "Booked flight(s), reservation ID: {}", rid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayOutcome {
    NotLoggedIn,
    /// Unknown rid, another user's rid, or already paid: deliberately one case.
    NotFoundOrPaid { rid: ReservationId, username: String },
    InsufficientFunds { balance: i32, cost: i32 },
    StoreError { rid: ReservationId },
    Success { rid: ReservationId, remaining_balance: i32 },
}

impl fmt::Display for PayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayOutcome::NotLoggedIn => write!(f, "Cannot pay, not logged in"),
            PayOutcome::NotFoundOrPaid { rid, username } => {
                write!(f, "Cannot find unpaid reservation {} under user: {}", rid, username)
            }
            PayOutcome::InsufficientFunds { balance, cost } => {
                write!(f, "User has only {} in account but itinerary costs {}", balance, cost)
            }
            PayOutcome::StoreError { rid } => write!(f, "Failed to pay for reservation {}", rid),
            PayOutcome::Success { rid, remaining_balance } => write!(
                f,
                "Paid reservation: {} remaining balance: {}",
                rid, remaining_balance
            ),
        }
    }
}

/// A live reservation with its legs re-read from the flight inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationView {
    pub rid: ReservationId,
    pub paid: bool,
    pub itinerary: Itinerary,
}

impl fmt::Display for ReservationView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reservation {} paid: {}:", self.rid, self.paid)?;
        for leg in self.itinerary.legs() {
            write!(f, "\n{}", leg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationsOutcome {
    NotLoggedIn,
    Empty,
    StoreError,
    Success { reservations: Vec<ReservationView> },
}

impl fmt::Display for ReservationsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationsOutcome::NotLoggedIn => write!(f, "Cannot view reservations, not logged in"),
            ReservationsOutcome::Empty => write!(f, "No reservations found"),
            ReservationsOutcome::StoreError => write!(f, "Failed to retrieve reservations"),
            ReservationsOutcome::Success { reservations } => {
                for (index, view) in reservations.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", view)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelOutcome {
    NotLoggedIn,
    NotFoundOrAlreadyCancelled { rid: ReservationId },
    StoreError { rid: ReservationId },
    Success { rid: ReservationId, refunded: i32 },
}

impl fmt::Display for CancelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelOutcome::NotLoggedIn => write!(f, "Cannot cancel reservations, not logged in"),
            CancelOutcome::NotFoundOrAlreadyCancelled { rid } | CancelOutcome::StoreError { rid } => {
                write!(f, "Failed to cancel reservation {}", rid)
            }
            CancelOutcome::Success { rid, .. } => write!(f, "Canceled reservation {}", rid),
        }
    }
}
