use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub contact_email: Option<String>,
    pub gbp_review_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Company {
    /// Enrollment and redirects both require a non-empty review link.
    pub fn review_link(&self) -> Option<&str> {
        self.gbp_review_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}
