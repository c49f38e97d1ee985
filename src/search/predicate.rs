//! Query normalization and record matching / 查询规范化与匹配
//!
//! The query is case-folded once; every worker shares the same predicate.

use crate::models::Book;

/// Case-insensitive substring predicate over title and description / 匹配谓词
#[derive(Debug, Clone)]
pub struct MatchPredicate {
    needle: String,
}

impl MatchPredicate {
    /// Normalize the raw query / 规范化查询
    ///
    /// An empty query is not rejected here: it matches every record.
    pub fn new(query: &str) -> Self {
        Self {
            needle: normalize(query),
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// True iff the folded title or folded description contains the query / 判断是否匹配
    pub fn matches(&self, book: &Book) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        normalize(&book.title).contains(&self.needle)
            || normalize(&book.description).contains(&self.needle)
    }
}

/// Lowercase folding used for both query and fields / 转小写
///
/// Each character is folded on its own to a single character: no final-sigma
/// context rule, and `İ` folds to plain `i`.
pub fn normalize(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
