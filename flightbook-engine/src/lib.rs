pub mod booking;
pub mod cancellation;
pub mod listing;
pub mod password;
pub mod payment;
pub mod search;
pub mod session;
pub mod state;
mod unit;

pub use booking::BookingEngine;
pub use cancellation::CancellationEngine;
pub use payment::PaymentEngine;
pub use search::{SearchEngine, SearchQuery};
pub use session::Session;
pub use state::SessionState;
