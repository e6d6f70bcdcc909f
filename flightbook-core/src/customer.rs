use serde::{Deserialize, Serialize};

/// A registered customer. `password_hash` is an Argon2id PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub balance: i32,
}
