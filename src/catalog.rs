//! Catalog store - ordered in-memory book collection / 图书目录存储
//!
//! Owns the records behind a `parking_lot::RwLock`. CRUD takes the write lock;
//! search holds the read lock for its whole duration so the snapshot handed to
//! the workers cannot change underneath them.

use std::path::Path;

use parking_lot::RwLock;
use thiserror::Error;

use crate::models::Book;
use crate::search::SearchEngine;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Book catalog / 图书目录
#[derive(Debug, Default)]
pub struct Catalog {
    books: RwLock<Vec<Book>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_books(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
        }
    }

    /// Load catalog from a JSON array file / 从JSON文件加载
    ///
    /// A missing file is not an error: the catalog starts empty.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Catalog file {:?} not found, starting empty", path);
                return Ok(Self::new());
            }
            Err(source) => return Err(CatalogError::Io { path: display, source }),
        };

        let books: Vec<Book> = serde_json::from_str(&content)
            .map_err(|source| CatalogError::Parse { path: display, source })?;

        tracing::info!("Loaded {} books from {:?}", books.len(), path);
        Ok(Self::from_books(books))
    }

    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }

    /// Page through the catalog in insertion order / 分页列出
    pub fn list(&self, limit: usize, offset: usize) -> Vec<Book> {
        let books = self.books.read();
        let start = offset.min(books.len());
        let end = offset.saturating_add(limit).min(books.len());
        books[start..end].to_vec()
    }

    pub fn get(&self, id: &str) -> Option<Book> {
        self.books.read().iter().find(|b| b.id == id).cloned()
    }

    /// Append a book, assigning an ID when the body has none / 新增图书
    pub fn create(&self, mut book: Book) -> Book {
        if book.id.is_empty() {
            book.id = uuid::Uuid::new_v4().to_string();
        }
        self.books.write().push(book.clone());
        tracing::debug!("Book created: {}", book.id);
        book
    }

    /// Replace a book in place; the path ID is kept / 更新图书
    pub fn update(&self, id: &str, mut book: Book) -> Option<Book> {
        let mut books = self.books.write();
        let slot = books.iter_mut().find(|b| b.id == id)?;
        book.id = id.to_string();
        *slot = book.clone();
        Some(book)
    }

    /// Remove the first book with this ID / 删除图书
    pub fn delete(&self, id: &str) -> bool {
        let mut books = self.books.write();
        match books.iter().position(|b| b.id == id) {
            Some(index) => {
                books.remove(index);
                true
            }
            None => false,
        }
    }

    /// Run a search against a stable snapshot / 在快照上搜索
    pub fn search(&self, engine: &SearchEngine, query: &str) -> Vec<Book> {
        let books = self.books.read();
        engine.search(query, &books)
    }
}
