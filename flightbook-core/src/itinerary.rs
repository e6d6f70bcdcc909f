use crate::flight::Flight;
use serde::Serialize;
use std::fmt;

/// One bookable search result: a single flight or two same-day legs
/// meeting in a connecting city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Itinerary {
    Direct { leg: Flight },
    Connecting { first: Flight, second: Flight },
}

impl Itinerary {
    pub fn direct(leg: Flight) -> Self {
        Itinerary::Direct { leg }
    }

    pub fn connecting(first: Flight, second: Flight) -> Self {
        Itinerary::Connecting { first, second }
    }

    pub fn first_leg(&self) -> &Flight {
        match self {
            Itinerary::Direct { leg } => leg,
            Itinerary::Connecting { first, .. } => first,
        }
    }

    pub fn second_leg(&self) -> Option<&Flight> {
        match self {
            Itinerary::Direct { .. } => None,
            Itinerary::Connecting { second, .. } => Some(second),
        }
    }

    pub fn legs(&self) -> impl Iterator<Item = &Flight> {
        std::iter::once(self.first_leg()).chain(self.second_leg())
    }

    pub fn leg_count(&self) -> usize {
        if self.second_leg().is_some() { 2 } else { 1 }
    }

    /// Sum of leg durations in minutes; the only ordering key between itineraries.
    pub fn total_time(&self) -> i32 {
        self.legs().map(|leg| leg.duration_minutes).sum()
    }

    /// Price charged for a reservation on this itinerary.
    pub fn cost(&self) -> i32 {
        self.legs().map(|leg| leg.price).sum()
    }

    /// Both legs fly on the same day, so the first leg decides the trip date.
    pub fn trip_day(&self) -> i32 {
        self.first_leg().day_of_month
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Itinerary::Direct { .. })
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} flight(s), {} minutes", self.leg_count(), self.total_time())?;
        for leg in self.legs() {
            write!(f, "\n{}", leg)?;
        }
        Ok(())
    }
}

/// Orders itineraries by total time. The sort is stable, so equal totals
/// keep the order in which the store produced them.
pub fn sort_by_total_time(itineraries: &mut [Itinerary]) {
    itineraries.sort_by_key(Itinerary::total_time);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(fid: i32, origin: &str, dest: &str, minutes: i32, price: i32) -> Flight {
        Flight {
            fid,
            day_of_month: 5,
            carrier_id: "UA".to_string(),
            flight_num: format!("{}", 100 + fid),
            origin_city: origin.to_string(),
            dest_city: dest.to_string(),
            duration_minutes: minutes,
            capacity: 10,
            price,
        }
    }

    #[test]
    fn test_connecting_totals() {
        let itin = Itinerary::connecting(flight(1, "A", "B", 60, 100), flight(2, "B", "C", 45, 150));

        assert_eq!(itin.leg_count(), 2);
        assert_eq!(itin.total_time(), 105);
        assert_eq!(itin.cost(), 250);
        assert_eq!(itin.trip_day(), 5);
        assert!(!itin.is_direct());
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut itins = vec![
            Itinerary::direct(flight(9, "A", "C", 120, 100)),
            Itinerary::direct(flight(3, "A", "C", 90, 100)),
            Itinerary::connecting(flight(1, "A", "B", 30, 10), flight(2, "B", "C", 60, 10)),
        ];

        sort_by_total_time(&mut itins);

        let firsts: Vec<i32> = itins.iter().map(|i| i.first_leg().fid).collect();
        // fid 3 and the connecting pair both take 90 minutes; the direct one came first
        assert_eq!(firsts, vec![3, 1, 9]);
    }

    #[test]
    fn test_display_lists_every_leg() {
        let itin = Itinerary::connecting(flight(1, "A", "B", 60, 100), flight(2, "B", "C", 45, 150));
        let rendered = itin.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2 flight(s), 105 minutes");
        assert!(lines[1].starts_with("ID: 1 "));
        assert!(lines[2].starts_with("ID: 2 "));
    }
}
