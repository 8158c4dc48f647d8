use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Email/password pair presented by an operator.
#[derive(Clone, Deserialize)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminLogRow {
    pub id: i64,
    pub admin_email: String,
    pub action: String,
    pub timestamp: NaiveDateTime,
}
