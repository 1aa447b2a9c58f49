use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dto::{TagDto, TagRequest};

/// GET /api/tags - List all tags
pub async fn get(State(state): State<AppState>) -> ApiResult<Vec<TagDto>> {
    let tags = state.tags.find_all().await?;
    Ok(ApiResponse::success(tags))
}

/// POST /api/tags - Create a tag; 409 if the name is taken
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<TagRequest>, JsonRejection>,
) -> ApiResult<TagDto> {
    let Json(request) = payload?;
    let tag = state.tags.create(request).await?;
    Ok(ApiResponse::created(tag))
}
