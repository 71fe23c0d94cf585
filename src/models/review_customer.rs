use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recipient enrolled in the review-request sequence. The three sent
/// flags are monotonic and form the prerequisite chain day0 -> day1 -> day3;
/// `created_at` is the sole basis for the day-1/day-3 due times.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewCustomer {
    pub id: i32,
    pub phone_number: String,
    pub company_id: i32,
    pub created_at: DateTime<Utc>,
    pub day0_sent: bool,
    pub day1_sent: bool,
    pub day3_sent: bool,
    pub is_active: bool,
}

/// A due customer joined with the company fields the composer needs.
#[derive(Debug, Clone, FromRow)]
pub struct PendingCustomer {
    pub id: i32,
    pub phone_number: String,
    pub company_id: i32,
    pub created_at: DateTime<Utc>,
    pub company_name: String,
    pub gbp_review_link: Option<String>,
}

impl PendingCustomer {
    pub fn review_link(&self) -> Option<&str> {
        self.gbp_review_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}
