use crate::dtos::{
    CreateReceiptRequest, MarkVerifiedRequest, QuoteRequest, QuoteResponse, ReceiptListParams,
    ReceiptListResponse, ReceiptResponse, RejectRequest, VerificationResponse, VerifyRequest,
};
use crate::services::pricing;
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::error::AppError;
use validator::Validate;

pub async fn create_receipt(
    State(state): State<AppState>,
    Json(request): Json<CreateReceiptRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let receipt = state.service.create(request.into()).await?;

    Ok((StatusCode::CREATED, Json(ReceiptResponse::from(receipt))))
}

pub async fn get_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = state.service.get(&receipt_id).await?;
    Ok(Json(ReceiptResponse::from(receipt)))
}

pub async fn list_receipts(
    State(state): State<AppState>,
    Query(params): Query<ReceiptListParams>,
) -> Result<impl IntoResponse, AppError> {
    let receipts = match (&params.user_id, &params.provider_id) {
        (Some(user_id), _) => state.service.list_for_user(user_id).await?,
        (None, Some(provider_id)) => state.service.list_for_provider(provider_id).await?,
        (None, None) => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Either user_id or provider_id is required"
            )))
        }
    };

    let receipts: Vec<ReceiptResponse> = receipts.into_iter().map(ReceiptResponse::from).collect();
    let total = receipts.len();

    Ok(Json(ReceiptListResponse { receipts, total }))
}

/// Public verification endpoint: anyone holding a verification code can
/// check a receipt's authenticity.
pub async fn verify_receipt(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let result = state.service.verify(&request.code).await?;

    Ok(Json(VerificationResponse::from(result)))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Path(receipt_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = state.service.mark_paid(&receipt_id).await?;
    Ok(Json(ReceiptResponse::from(receipt)))
}

pub async fn mark_verified(
    State(state): State<AppState>,
    Path(receipt_id): Path<String>,
    Json(request): Json<MarkVerifiedRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let receipt = state
        .service
        .mark_verified(&receipt_id, &request.verified_by, request.notes)
        .await?;

    Ok(Json(ReceiptResponse::from(receipt)))
}

pub async fn reject_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let receipt = state
        .service
        .reject(&receipt_id, &request.verified_by, &request.reason)
        .await?;

    Ok(Json(ReceiptResponse::from(receipt)))
}

/// Price quote for a prospective booking, the same arithmetic that feeds
/// receipt creation.
pub async fn quote_booking(
    State(_state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    if request.unit_price < Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Unit price cannot be negative"
        )));
    }

    let start = parse_date(&request.start_date)?;
    let end = match &request.end_date {
        Some(raw) => parse_date(raw)?,
        None => start,
    };

    let days = pricing::compute_days(start, end);
    let subtotal = pricing::compute_subtotal(request.unit_price, days, request.adults, request.children);

    Ok(Json(QuoteResponse {
        days,
        subtotal: subtotal.to_string(),
    }))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid date '{}': {}", raw, e)))
}
