use serde::{Deserialize, Serialize};

/// Book record / 图书记录
///
/// Only `id`, `title` and `description` are inspected by the catalog and the
/// search engine; everything else is opaque payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "bookId")]
    pub book_id: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    #[serde(rename = "publisherId")]
    pub publisher_id: String,
    pub title: String,
    #[serde(rename = "publicationDate")]
    pub publication_date: String,
    pub isbn: String,
    pub pages: i64,
    pub genre: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
}

impl Book {
    /// Minimal record with identifier, title and description / 创建最简记录
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Pagination query for `GET /books` / 分页参数
///
/// Kept as raw strings so malformed values map to `invalid limit` /
/// `invalid offset` instead of a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
