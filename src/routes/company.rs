use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::company_dto::{CompanyResponse, CreateCompanyPayload, UpdateCompanyPayload},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/company",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Company created", body = Json<CompanyResponse>),
        (status = 400, description = "Invalid payload or duplicate name")
    )
)]
#[axum::debug_handler]
pub async fn create_company(
    State(state): State<AppState>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state.company_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(CompanyResponse::from(company))))
}

#[utoipa::path(
    get,
    path = "/api/company",
    responses(
        (status = 200, description = "All companies")
    )
)]
#[axum::debug_handler]
pub async fn list_companies(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let companies = state.company_service.list().await?;
    let responses: Vec<CompanyResponse> = companies.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/company/{id}",
    params(
        ("id" = i32, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Company found", body = Json<CompanyResponse>),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let company = state
        .company_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;
    Ok(Json(CompanyResponse::from(company)))
}

#[utoipa::path(
    put,
    path = "/api/company/{id}",
    params(
        ("id" = i32, Path, description = "Company ID")
    ),
    request_body = UpdateCompanyPayload,
    responses(
        (status = 200, description = "Company updated", body = Json<CompanyResponse>),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state.company_service.update(id, payload).await?;
    Ok(Json(CompanyResponse::from(company)))
}
