use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::review_dto::{AddReviewCustomersPayload, AddReviewCustomersResult},
    error::{Error, Result},
    utils::phone::normalize_phone,
    AppState,
};

/// Enrolls one or more customers (comma-separated phone numbers) and fires
/// the immediate day-0 message inline. A failed send does not fail the
/// enrollment; the background scheduler retries it on its next cycle.
#[utoipa::path(
    post,
    path = "/api/review/customer",
    request_body = AddReviewCustomersPayload,
    responses(
        (status = 201, description = "Per-number enrollment result", body = Json<AddReviewCustomersResult>),
        (status = 400, description = "No numbers given or review link missing"),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn add_customers(
    State(state): State<AppState>,
    Json(payload): Json<AddReviewCustomersPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let raw_numbers: Vec<String> = payload
        .phone_number
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if raw_numbers.is_empty() {
        return Err(Error::BadRequest(
            "At least one phone number is required. Provide a single number or comma-separated values (e.g. 9876543210, 9876543211)."
                .into(),
        ));
    }

    let company = state
        .company_service
        .get_by_id(payload.company_id)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;

    let Some(review_link) = company.review_link().map(str::to_string) else {
        return Err(Error::BadRequest(
            "Company does not have a GBP review link configured. Please update the company's GBP review link first."
                .into(),
        ));
    };

    let mut result = AddReviewCustomersResult::default();

    for raw in raw_numbers {
        let Some(normalized) = normalize_phone(&raw) else {
            result.invalid.push(raw);
            continue;
        };

        if state
            .review_customer_service
            .exists(payload.company_id, &normalized)
            .await?
        {
            result.duplicates.push(raw);
            continue;
        }

        let mut customer = state
            .review_customer_service
            .create(payload.company_id, &normalized)
            .await?;

        let message =
            state
                .review_message_service
                .day0_message(customer.id, &company.name, &review_link);

        if state
            .whatsapp_service
            .send_template(&customer.phone_number, &message)
            .await
        {
            state
                .review_customer_service
                .mark_day0_sent(customer.id)
                .await?;
            customer.day0_sent = true;
            info!(
                "Day 0 message sent to customer {} ({})",
                customer.id, customer.phone_number
            );
        } else {
            warn!(
                "Failed to send Day 0 message to customer {} ({}). Will retry on next scheduler run.",
                customer.id, customer.phone_number
            );
        }

        result.added.push(customer.into());
    }

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/review/customers/{company_id}",
    params(
        ("company_id" = i32, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Review customers for the company"),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn list_by_company(
    State(state): State<AppState>,
    Path(company_id): Path<i32>,
) -> Result<impl IntoResponse> {
    if state.company_service.get_by_id(company_id).await?.is_none() {
        return Err(Error::NotFound("Company not found".into()));
    }

    let customers = state
        .review_customer_service
        .list_by_company(company_id)
        .await?;
    let responses: Vec<crate::dto::review_dto::ReviewCustomerResponse> =
        customers.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/review/customer/{id}",
    params(
        ("id" = i32, Path, description = "Review customer ID")
    ),
    responses(
        (status = 200, description = "Review customer found"),
        (status = 404, description = "Review customer not found")
    )
)]
#[axum::debug_handler]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let customer = state
        .review_customer_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Review customer not found".into()))?;
    Ok(Json(crate::dto::review_dto::ReviewCustomerResponse::from(
        customer,
    )))
}

/// Deactivation is permanent and idempotent; there is no reactivation path.
#[utoipa::path(
    delete,
    path = "/api/review/customer/{id}",
    params(
        ("id" = i32, Path, description = "Review customer ID")
    ),
    responses(
        (status = 200, description = "Customer deactivated"),
        (status = 404, description = "Review customer not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let found = state.review_customer_service.deactivate(id).await?;
    if !found {
        return Err(Error::NotFound("Review customer not found".into()));
    }

    info!("Review customer {} deactivated. Future messages stopped.", id);

    Ok(Json(json!({
        "message": "Customer deactivated. No further review messages will be sent."
    })))
}
