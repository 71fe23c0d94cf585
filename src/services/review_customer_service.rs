use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::review_customer::{PendingCustomer, ReviewCustomer};

/// Durable store for review customer records. Every mutation is a
/// single-row update; the sent flags are only ever raised, never cleared,
/// which is what makes redelivery safe across intake and scheduler.
#[derive(Clone)]
pub struct ReviewCustomerService {
    pool: PgPool,
}

const PENDING_COLUMNS: &str = r#"
    rc.id, rc.phone_number, rc.company_id, rc.created_at,
    c.name AS company_name, c.gbp_review_link
"#;

impl ReviewCustomerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, company_id: i32, phone_number: &str) -> Result<ReviewCustomer> {
        let customer = sqlx::query_as::<_, ReviewCustomer>(
            r#"
            INSERT INTO review_customers (phone_number, company_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(phone_number)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Duplicate check for enrollment. Deactivated records still count:
    /// re-adding the same number for the same company is always rejected.
    pub async fn exists(&self, company_id: i32, phone_number: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"SELECT id FROM review_customers WHERE company_id = $1 AND phone_number = $2"#,
        )
        .bind(company_id)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<ReviewCustomer>> {
        let customer =
            sqlx::query_as::<_, ReviewCustomer>(r#"SELECT * FROM review_customers WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(customer)
    }

    pub async fn list_by_company(&self, company_id: i32) -> Result<Vec<ReviewCustomer>> {
        let customers = sqlx::query_as::<_, ReviewCustomer>(
            r#"
            SELECT * FROM review_customers
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Active customers whose day-0 message has not gone out yet (failed
    /// inline send at enrollment, retried by the scheduler).
    pub async fn pending_day0(&self) -> Result<Vec<PendingCustomer>> {
        let customers = sqlx::query_as::<_, PendingCustomer>(&format!(
            r#"
            SELECT {PENDING_COLUMNS}
            FROM review_customers rc
            JOIN companies c ON c.id = rc.company_id
            WHERE NOT rc.day0_sent AND rc.is_active
            ORDER BY rc.id
            "#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Active customers due for the day-1 reminder: day 0 delivered, day 1
    /// not yet, created at or before the cutoff.
    pub async fn pending_day1(&self, cutoff: DateTime<Utc>) -> Result<Vec<PendingCustomer>> {
        let customers = sqlx::query_as::<_, PendingCustomer>(&format!(
            r#"
            SELECT {PENDING_COLUMNS}
            FROM review_customers rc
            JOIN companies c ON c.id = rc.company_id
            WHERE rc.day0_sent AND NOT rc.day1_sent AND rc.is_active AND rc.created_at <= $1
            ORDER BY rc.id
            "#
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Active customers due for the day-3 final reminder.
    pub async fn pending_day3(&self, cutoff: DateTime<Utc>) -> Result<Vec<PendingCustomer>> {
        let customers = sqlx::query_as::<_, PendingCustomer>(&format!(
            r#"
            SELECT {PENDING_COLUMNS}
            FROM review_customers rc
            JOIN companies c ON c.id = rc.company_id
            WHERE rc.day1_sent AND NOT rc.day3_sent AND rc.is_active AND rc.created_at <= $1
            ORDER BY rc.id
            "#
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn mark_day0_sent(&self, id: i32) -> Result<()> {
        sqlx::query(r#"UPDATE review_customers SET day0_sent = TRUE WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_day1_sent(&self, id: i32) -> Result<()> {
        sqlx::query(r#"UPDATE review_customers SET day1_sent = TRUE WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_day3_sent(&self, id: i32) -> Result<()> {
        sqlx::query(r#"UPDATE review_customers SET day3_sent = TRUE WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Permanently stops the sequence for one customer. Idempotent: a
    /// second call on an already-inactive record is a no-op; only an
    /// unknown id reports not-found.
    pub async fn deactivate(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(r#"UPDATE review_customers SET is_active = FALSE WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolves a customer id from a message button click to the company's
    /// review link. Deliberately ignores `is_active`: historical links from
    /// already-sent messages must keep working.
    pub async fn review_link_for(&self, id: i32) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT c.gbp_review_link
            FROM review_customers rc
            JOIN companies c ON c.id = rc.company_id
            WHERE rc.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .and_then(|(link,)| link)
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty()))
    }
}
