use flightbook_core::{BookingError, Itinerary};

/// Per-session state: who is logged in and what the last search returned.
/// Owned by exactly one session, never shared.
#[derive(Debug, Default)]
pub struct SessionState {
    user: Option<String>,
    itineraries: Vec<Itinerary>,
}

impl SessionState {
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The logged-in user, or a `NotLoggedIn` precondition failure.
    pub fn require_user(&self) -> Result<&str, BookingError> {
        self.user().ok_or_else(BookingError::not_logged_in)
    }

    pub fn require_logged_out(&self) -> Result<(), BookingError> {
        match self.user() {
            Some(username) => Err(BookingError::already_logged_in(username)),
            None => Ok(()),
        }
    }

    /// Binds the user and drops results from any earlier search.
    pub fn bind(&mut self, username: &str) {
        self.user = Some(username.to_string());
        self.itineraries.clear();
    }

    pub fn unbind(&mut self) -> Option<String> {
        self.itineraries.clear();
        self.user.take()
    }

    pub fn replace_results(&mut self, itineraries: Vec<Itinerary>) {
        self.itineraries = itineraries;
    }

    pub fn results(&self) -> &[Itinerary] {
        &self.itineraries
    }

    /// Resolves an index from the latest search; negative or past-the-end is `None`.
    pub fn itinerary(&self, index: i64) -> Option<&Itinerary> {
        usize::try_from(index).ok().and_then(|i| self.itineraries.get(i))
    }
}
