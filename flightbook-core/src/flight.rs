use serde::{Deserialize, Serialize};
use std::fmt;

pub type FlightId = i32;

/// A single leg from the flight inventory, as shown to customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub fid: FlightId,
    pub day_of_month: i32,
    pub carrier_id: String,
    pub flight_num: String,
    pub origin_city: String,
    pub dest_city: String,
    pub duration_minutes: i32,
    pub capacity: i32,
    pub price: i32,
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} Day: {} Carrier: {} Number: {} Origin: {} Dest: {} Duration: {} Capacity: {} Price: {}",
            self.fid,
            self.day_of_month,
            self.carrier_id,
            self.flight_num,
            self.origin_city,
            self.dest_city,
            self.duration_minutes,
            self.capacity,
            self.price
        )
    }
}
