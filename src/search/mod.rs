//! Search module - substring search over an in-memory catalog snapshot / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Search only borrows a read-only snapshot, it never owns or mutates records
//! - Every call is self-contained: queues and worker threads live only for that call
//! - Call direction: Catalog → Search (unidirectional) / 调用方向
//!
//! Matching / 匹配规则：
//! - Query and fields are lowercased, then tested with substring containment
//! - Title and description are the only inspected fields
//! - No index, no ranking: every record is evaluated exactly once

pub mod engine;
pub mod predicate;
pub mod schema;

pub use engine::{SearchEngine, DEFAULT_WORKERS};
pub use predicate::MatchPredicate;
pub use schema::{CancelFlag, SearchError, SearchOutcome};
