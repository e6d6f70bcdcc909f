pub mod customer;
pub mod error;
pub mod flight;
pub mod itinerary;
pub mod outcome;
pub mod repository;
pub mod reservation;

pub use customer::Customer;
pub use error::{BookingError, ConflictKind, PreconditionKind, StoreError, StoreResult};
pub use flight::{Flight, FlightId};
pub use itinerary::Itinerary;
pub use repository::{FlightStore, StoreTransaction};
pub use reservation::{NewReservation, Reservation, ReservationId, ReservationState};
