use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::{info, warn};

use crate::{error::Result, AppState};

/// Public redirect for WhatsApp review button clicks: /r/{id} resolves the
/// customer to the company's review page. Works for deactivated customers
/// too, since their messages are already out in the wild.
#[utoipa::path(
    get,
    path = "/r/{id}",
    params(
        ("id" = i32, Path, description = "Review customer ID")
    ),
    responses(
        (status = 302, description = "Redirect to the company review page"),
        (status = 404, description = "Unknown customer or no review link configured")
    )
)]
#[axum::debug_handler]
pub async fn redirect_to_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<axum::response::Response> {
    match state.review_customer_service.review_link_for(id).await? {
        Some(link) => {
            info!(
                "Review redirect: customer {} clicked review link, redirecting to {}",
                id, link
            );
            // Plain 302, as review-page links have always been issued; axum's
            // Redirect helpers only cover 303/307/308.
            Ok((StatusCode::FOUND, [(header::LOCATION, link)]).into_response())
        }
        None => {
            warn!("Review redirect: customer {} not found or link missing", id);
            Ok((
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Review link not found" })),
            )
                .into_response())
        }
    }
}
