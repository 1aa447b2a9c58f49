use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dto::{GiftCertificateDto, TagRequest};

/// POST /api/certificates/:id/tags - Attach a tag by name, creating it if needed
pub async fn post(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TagRequest>, JsonRejection>,
) -> ApiResult<GiftCertificateDto> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let certificate = state.certificates.add_tag(id, request).await?;
    Ok(ApiResponse::success(certificate))
}

/// DELETE /api/certificates/:id/tags/:tag_id - Detach a tag
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<()> {
    let Path((id, tag_id)) = path?;
    state.certificates.remove_tag(id, tag_id).await?;
    Ok(ApiResponse::no_content())
}
