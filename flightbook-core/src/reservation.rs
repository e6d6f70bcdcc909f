use crate::flight::FlightId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ReservationId = i64;

/// A persisted reservation row. The store is the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub rid: ReservationId,
    pub username: String,
    pub trip_day: i32,
    pub fid1: FlightId,
    pub fid2: Option<FlightId>,
    pub cost: i32,
    pub paid: bool,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle: Reserved -> Paid -> Cancelled, or Reserved -> Cancelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationState {
    Reserved,
    Paid,
    Cancelled,
}

impl Reservation {
    pub fn state(&self) -> ReservationState {
        if self.cancelled {
            ReservationState::Cancelled
        } else if self.paid {
            ReservationState::Paid
        } else {
            ReservationState::Reserved
        }
    }

    pub fn can_cancel(&self) -> bool {
        self.state() != ReservationState::Cancelled
    }

    /// Amount returned to the customer when this reservation is cancelled now.
    pub fn refund_due(&self) -> i32 {
        if self.paid && !self.cancelled { self.cost } else { 0 }
    }

    pub fn fids(&self) -> impl Iterator<Item = FlightId> {
        std::iter::once(self.fid1).chain(self.fid2)
    }
}

/// Row written by the booking transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub rid: ReservationId,
    pub username: String,
    pub trip_day: i32,
    pub fid1: FlightId,
    pub fid2: Option<FlightId>,
    pub cost: i32,
}

impl NewReservation {
    pub fn into_reservation(self, created_at: DateTime<Utc>) -> Reservation {
        Reservation {
            rid: self.rid,
            username: self.username,
            trip_day: self.trip_day,
            fid1: self.fid1,
            fid2: self.fid2,
            cost: self.cost,
            paid: false,
            cancelled: false,
            created_at,
        }
    }
}
