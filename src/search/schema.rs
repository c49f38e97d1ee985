//! Search outcome, cancellation and error types / 搜索结果与错误类型

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::models::Book;

/// Result of one search invocation / 单次搜索结果
///
/// `books` has no meaningful order. `complete` is false when the search was
/// cancelled before every record had been evaluated.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub books: Vec<Book>,
    pub complete: bool,
}

impl SearchOutcome {
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Turn a partial outcome into `SearchError::Cancelled` / 部分结果转为错误
    pub fn into_complete(self) -> Result<Vec<Book>, SearchError> {
        if self.complete {
            Ok(self.books)
        } else {
            Err(SearchError::Cancelled {
                partial: self.books.len(),
            })
        }
    }
}

/// Cooperative cancellation signal / 取消标记
///
/// Cheap to clone; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// A predicate evaluation failed; the in-flight search was aborted / 谓词执行失败
    #[error("search worker fault: {0}")]
    WorkerFault(String),
    #[error("search cancelled after {partial} matches")]
    Cancelled { partial: usize },
}
