use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::company::Company;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(url)]
    pub gbp_review_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(url)]
    pub gbp_review_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub id: i32,
    pub name: String,
    pub contact_email: Option<String>,
    pub gbp_review_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            contact_email: company.contact_email,
            gbp_review_link: company.gbp_review_link,
            created_at: company.created_at,
        }
    }
}
