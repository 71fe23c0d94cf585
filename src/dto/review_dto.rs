use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::review_customer::ReviewCustomer;

/// Enrollment request. `phone_number` accepts a single number or a
/// comma-separated batch (e.g. "9876543210, 9876543211").
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddReviewCustomersPayload {
    #[validate(length(min = 1, max = 1000))]
    pub phone_number: String,
    pub company_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AddReviewCustomersResult {
    pub added: Vec<ReviewCustomerResponse>,
    pub invalid: Vec<String>,
    pub duplicates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCustomerResponse {
    pub id: i32,
    pub phone_number: String,
    pub company_id: i32,
    pub created_at: DateTime<Utc>,
    pub day0_sent: bool,
    pub day1_sent: bool,
    pub day3_sent: bool,
    pub is_active: bool,
}

impl From<ReviewCustomer> for ReviewCustomerResponse {
    fn from(customer: ReviewCustomer) -> Self {
        Self {
            id: customer.id,
            phone_number: customer.phone_number,
            company_id: customer.company_id,
            created_at: customer.created_at,
            day0_sent: customer.day0_sent,
            day1_sent: customer.day1_sent,
            day3_sent: customer.day3_sent,
            is_active: customer.is_active,
        }
    }
}
