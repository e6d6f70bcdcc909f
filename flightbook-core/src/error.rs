/// Failures surfaced by a store gateway.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Serialization failure or deadlock; the transaction was aborted and may be resubmitted.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionKind {
    NotLoggedIn,
    AlreadyLoggedIn,
    InvalidInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    SameDayReservation,
    NoSeatsLeft,
    AlreadyPaid,
    AlreadyCancelled,
}

/// Error taxonomy shared by the session engines. Every session operation
/// maps these into its own outcome before returning.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Precondition failed ({kind:?}): {message}")]
    Precondition {
        kind: PreconditionKind,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0:?}")]
    Conflict(ConflictKind),

    #[error("Insufficient funds: balance {balance}, cost {cost}")]
    InsufficientFunds {
        balance: i32,
        cost: i32,
    },

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn not_logged_in() -> Self {
        BookingError::Precondition {
            kind: PreconditionKind::NotLoggedIn,
            message: "no user is logged in".to_string(),
        }
    }

    pub fn already_logged_in(username: &str) -> Self {
        BookingError::Precondition {
            kind: PreconditionKind::AlreadyLoggedIn,
            message: format!("{} is already logged in", username),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        BookingError::Precondition {
            kind: PreconditionKind::InvalidInput,
            message: message.into(),
        }
    }
}
