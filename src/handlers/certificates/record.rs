use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dto::{GiftCertificateDto, GiftCertificateRequest};

/// GET /api/certificates/:id - Get a single certificate with its tags
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<GiftCertificateDto> {
    let Path(id) = path?;
    let certificate = state.certificates.find_by_id(id).await?;
    Ok(ApiResponse::success(certificate))
}

/// PATCH /api/certificates/:id - Partial update
///
/// Only fields present in the body change. A present `tags` array replaces
/// the whole tag set; an absent one leaves it alone.
pub async fn patch(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<GiftCertificateRequest>, JsonRejection>,
) -> ApiResult<GiftCertificateDto> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let certificate = state.certificates.update(id, request).await?;
    Ok(ApiResponse::success(certificate))
}

/// DELETE /api/certificates/:id
pub async fn delete(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> ApiResult<()> {
    let Path(id) = path?;
    state.certificates.delete(id).await?;
    Ok(ApiResponse::no_content())
}
