use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    Json,
};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dto::{GiftCertificateDto, GiftCertificateRequest, Page};
use crate::services::SearchParams;

/// GET /api/certificates - Filter, sort and page certificates
///
/// Query: `tagName` (repeatable), `name`, `description`, `sort` (repeatable
/// and/or comma-separated `field.direction`), `page`, `pageSize`.
/// The raw query is parsed directly so repeated keys survive.
pub async fn get(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Page<GiftCertificateDto>> {
    let params = SearchParams::from_query(query.as_deref());
    let page = state.certificates.filter(params).await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/certificates - Create a certificate with its tags
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<GiftCertificateRequest>, JsonRejection>,
) -> ApiResult<GiftCertificateDto> {
    let Json(request) = payload?;
    let certificate = state.certificates.create(request).await?;
    Ok(ApiResponse::created(certificate))
}
