use sqlx::PgPool;

use crate::dto::company_dto::{CreateCompanyPayload, UpdateCompanyPayload};
use crate::error::{Error, Result};
use crate::models::company::Company;

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCompanyPayload) -> Result<Company> {
        let exists: Option<(i32,)> =
            sqlx::query_as(r#"SELECT id FROM companies WHERE name = $1"#)
                .bind(&payload.name)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_some() {
            return Err(Error::BadRequest("Company name already exists".into()));
        }

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, contact_email, gbp_review_link)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.contact_email)
        .bind(&payload.gbp_review_link)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(r#"SELECT * FROM companies WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    pub async fn list(&self) -> Result<Vec<Company>> {
        let companies =
            sqlx::query_as::<_, Company>(r#"SELECT * FROM companies ORDER BY created_at DESC"#)
                .fetch_all(&self.pool)
                .await?;
        Ok(companies)
    }

    pub async fn update(&self, id: i32, payload: UpdateCompanyPayload) -> Result<Company> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = COALESCE($1, name),
                contact_email = COALESCE($2, contact_email),
                gbp_review_link = COALESCE($3, gbp_review_link)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.contact_email)
        .bind(&payload.gbp_review_link)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;

        Ok(company)
    }
}
