use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::ApiError;
use crate::models::{Book, MessageResponse, PaginationQuery, SearchQuery};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_OFFSET: usize = 0;

/// Parse `limit`/`offset`, limit >= 1 and offset >= 0 / 解析分页参数
pub fn parse_pagination(params: &PaginationQuery) -> Result<(usize, usize), ApiError> {
    let limit = match params.limit.as_deref() {
        None => DEFAULT_LIMIT,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 1 => usize::try_from(n).map_err(|_| ApiError::InvalidLimit)?,
            _ => return Err(ApiError::InvalidLimit),
        },
    };

    let offset = match params.offset.as_deref() {
        None => DEFAULT_OFFSET,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 0 => usize::try_from(n).map_err(|_| ApiError::InvalidOffset)?,
            _ => return Err(ApiError::InvalidOffset),
        },
    };

    Ok((limit, offset))
}

fn reject_query(e: QueryRejection) -> ApiError {
    tracing::debug!("Rejected query string: {}", e);
    ApiError::InvalidParameters
}

/// GET /books - 分页列出图书
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let Query(params) = params.map_err(reject_query)?;
    let (limit, offset) = parse_pagination(&params)?;
    Ok(Json(state.catalog.list(limit, offset)))
}

/// POST /books - 新增图书
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let Json(book) = payload.map_err(|e| {
        tracing::debug!("Rejected book body: {}", e);
        ApiError::InvalidBook
    })?;
    let created = state.catalog.create(book);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /books/:id - 获取图书
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    state.catalog.get(&id).map(Json).ok_or(ApiError::NotFound)
}

/// PUT /books/:id - 更新图书
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Json(book) = payload.map_err(|e| {
        tracing::debug!("Rejected book body: {}", e);
        ApiError::InvalidBook
    })?;
    state.catalog.update(&id, book).map(Json).ok_or(ApiError::NotFound)
}

/// DELETE /books/:id - 删除图书
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.catalog.delete(&id) {
        Ok(Json(MessageResponse::new("book deleted")))
    } else {
        Err(ApiError::NotFound)
    }
}

/// GET /books/search?q= - 搜索图书
///
/// The scan blocks, so it runs on the blocking pool.
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let Query(params) = params.map_err(reject_query)?;
    let query = match params.q {
        Some(q) if !q.is_empty() => q,
        _ => return Err(ApiError::MissingQuery),
    };

    let results = tokio::task::spawn_blocking(move || state.catalog.search(&state.engine, &query))
        .await
        .map_err(|e| {
            tracing::error!("Search task failed: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::catalog::Catalog;
    use crate::search::SearchEngine;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let catalog = Catalog::from_books(vec![
            Book {
                price: 9.99,
                quantity: 10,
                ..Book::new("1", "Test Book 1", "A test book description 1")
            },
            Book {
                price: 12.99,
                quantity: 5,
                ..Book::new("2", "Test Book 2", "A test book description 2")
            },
        ]);
        router(Arc::new(AppState::new(catalog, SearchEngine::default())))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn titles(value: &Value) -> Vec<String> {
        let mut titles: Vec<String> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap().to_string())
            .collect();
        titles.sort();
        titles
    }

    #[test]
    fn test_parse_pagination() {
        let params = |limit: Option<&str>, offset: Option<&str>| PaginationQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        };
        assert_eq!(parse_pagination(&params(None, None)).unwrap(), (10, 0));
        assert_eq!(parse_pagination(&params(Some("3"), Some("7"))).unwrap(), (3, 7));
        assert!(matches!(parse_pagination(&params(Some("0"), None)), Err(ApiError::InvalidLimit)));
        assert!(matches!(parse_pagination(&params(Some("x"), None)), Err(ApiError::InvalidLimit)));
        assert!(matches!(parse_pagination(&params(None, Some("-1"))), Err(ApiError::InvalidOffset)));
    }

    #[tokio::test]
    async fn test_get_books() {
        let (status, body) = send(test_app(), Method::GET, "/books", None).await;
        assert_eq!(status, StatusCode::OK);
        let books = body.as_array().unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0]["title"], "Test Book 1");
        assert_eq!(books[1]["title"], "Test Book 2");
    }

    #[tokio::test]
    async fn test_get_books_paginated() {
        let (status, body) = send(test_app(), Method::GET, "/books?limit=1&offset=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Test Book 2"]);

        let (status, body) = send(test_app(), Method::GET, "/books?offset=50", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_get_books_invalid_pagination() {
        let (status, body) = send(test_app(), Method::GET, "/books?limit=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid limit");

        let (status, body) = send(test_app(), Method::GET, "/books?offset=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid offset");
    }

    #[tokio::test]
    async fn test_book_crud_flow() {
        let app = test_app();

        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/books",
            Some(r#"{"ID":"3","title":"Dune","description":"Desert planet","price":7.5}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["ID"], "3");

        let (status, fetched) = send(app.clone(), Method::GET, "/books/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Dune");

        let (status, updated) = send(
            app.clone(),
            Method::PUT,
            "/books/3",
            Some(r#"{"ID":"3","title":"Dune Messiah","description":"Sequel"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Dune Messiah");

        let (status, body) = send(app.clone(), Method::DELETE, "/books/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "book deleted");

        let (status, body) = send(app, Method::GET, "/books/3", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "book not found");
    }

    #[tokio::test]
    async fn test_invalid_book_body() {
        let (status, body) = send(test_app(), Method::POST, "/books", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid book data");

        let (status, body) = send(test_app(), Method::PUT, "/books/1", Some("[1,2]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid book data");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let (status, _) = send(test_app(), Method::PUT, "/books/99", Some(r#"{"title":"x"}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(test_app(), Method::DELETE, "/books/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "book not found");
    }

    #[tokio::test]
    async fn test_search_books() {
        let (status, body) = send(test_app(), Method::GET, "/books/search?q=test%20book%201", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Test Book 1"]);

        let (status, body) = send(test_app(), Method::GET, "/books/search?q=DESCRIPTION", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Test Book 1", "Test Book 2"]);
    }

    #[tokio::test]
    async fn test_search_no_matches_is_empty_list() {
        let (status, body) = send(test_app(), Method::GET, "/books/search?q=nope", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        for uri in ["/books/search", "/books/search?q="] {
            let (status, body) = send(test_app(), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "query parameter 'q' is required");
        }
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/books")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_undecodable_query_string() {
        for uri in ["/books?limit=1&limit=2", "/books/search?q=a&q=b"] {
            let (status, body) = send(test_app(), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "invalid query parameters");
        }
    }

    #[tokio::test]
    async fn test_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/books/1")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        let methods = headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("PUT"));
        assert!(methods.contains("DELETE"));
    }

    #[tokio::test]
    async fn test_options_without_origin_answered_by_cors() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/books")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(test_app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
