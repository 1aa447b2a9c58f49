use axum::extract::{rejection::PathRejection, Path, State};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dto::TagDto;

/// GET /api/tags/:id - Get a single tag by ID
pub async fn get(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> ApiResult<TagDto> {
    let Path(id) = path?;
    let tag = state.tags.find_by_id(id).await?;
    Ok(ApiResponse::success(tag))
}

/// DELETE /api/tags/:id - Delete a tag and its certificate links
pub async fn delete(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> ApiResult<()> {
    let Path(id) = path?;
    state.tags.delete(id).await?;
    Ok(ApiResponse::no_content())
}
