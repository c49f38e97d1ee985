pub mod books;
pub mod server;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::models::MessageResponse;
use crate::state::AppState;

/// API error, rendered as `{"message": ...}` / API错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid limit")]
    InvalidLimit,
    #[error("invalid offset")]
    InvalidOffset,
    #[error("invalid book data")]
    InvalidBook,
    #[error("invalid query parameters")]
    InvalidParameters,
    #[error("query parameter 'q' is required")]
    MissingQuery,
    #[error("book not found")]
    NotFound,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidLimit
            | ApiError::InvalidOffset
            | ApiError::InvalidBook
            | ApiError::InvalidParameters
            | ApiError::MissingQuery => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

/// CORS policy: any origin, CRUD methods, JSON bodies / 跨域策略
///
/// Every `OPTIONS` request is answered by the layer itself with 200 and the
/// CORS headers; it never reaches the router.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(server::health_check))
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
