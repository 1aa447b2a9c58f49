use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CONFIG;
use crate::database::{
    DatabaseManager, GiftCertificateRepository, PgGiftCertificateRepository, PgTagRepository, TagRepository,
};
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::method_not_allowed_json;
use crate::services::{GiftCertificateService, TagService};

#[derive(Clone)]
pub struct AppState {
    pub tags: TagService,
    pub certificates: GiftCertificateService,
    pool: Option<PgPool>,
}

impl AppState {
    pub fn new(tags: Arc<dyn TagRepository>, certificates: Arc<dyn GiftCertificateRepository>) -> Self {
        Self {
            tags: TagService::new(tags.clone()),
            certificates: GiftCertificateService::new(certificates, tags),
            pool: None,
        }
    }

    /// Services backed by the Postgres repositories
    pub fn postgres(pool: PgPool) -> Self {
        let tags: Arc<dyn TagRepository> = Arc::new(PgTagRepository::new(pool.clone()));
        let certificates: Arc<dyn GiftCertificateRepository> =
            Arc::new(PgGiftCertificateRepository::new(pool.clone()));
        Self {
            pool: Some(pool),
            ..Self::new(tags, certificates)
        }
    }
}

pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(CONFIG.api.max_request_size_bytes));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(tag_routes())
        .merge(certificate_routes())
        .fallback(not_found)
        .layer(map_response(method_not_allowed_json))
        // Global middleware
        .layer(middleware)
        .with_state(state)
}

fn tag_routes() -> Router<AppState> {
    use handlers::tags;

    Router::new()
        .route("/api/tags", get(tags::collection_get).post(tags::collection_post))
        .route("/api/tags/:id", get(tags::record_get).delete(tags::record_delete))
}

fn certificate_routes() -> Router<AppState> {
    use handlers::certificates;

    Router::new()
        // Collection: filter/sort/page and create
        .route(
            "/api/certificates",
            get(certificates::collection_get).post(certificates::collection_post),
        )
        // Record-level operations
        .route(
            "/api/certificates/:id",
            get(certificates::record_get)
                .patch(certificates::record_patch)
                .delete(certificates::record_delete),
        )
        // Tag links
        .route("/api/certificates/:id/tags", post(certificates::tag_post))
        .route("/api/certificates/:id/tags/:tag_id", delete(certificates::tag_delete))
}

fn cors_layer() -> CorsLayer {
    let security = &CONFIG.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn not_found() -> ApiError {
    ApiError::resource_not_found("Resource not found")
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Gift Certificates API",
            "version": version,
            "endpoints": {
                "health": "/health",
                "tags": "/api/tags[/:id]",
                "certificates": "/api/certificates[/:id]",
                "certificate_tags": "/api/certificates/:id/tags[/:tag_id]",
            },
            "query": {
                "certificates": ["tagName", "name", "description", "sort", "page", "pageSize"],
                "sort": "name|lastUpdateDate . asc|desc",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "memory" }
            })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
