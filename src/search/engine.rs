//! Search engine - concurrent full scan over a catalog snapshot / 搜索引擎
//!
//! Fan-out/fan-in over crossbeam channels / 扇出扇入：
//! - distributor pushes every record into the work queue, then drops its sender
//! - each worker drains the work queue and pushes matches into the result queue
//! - the result queue closes when the last worker drops its sender, so the
//!   collector stops only after every worker has finished

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded};

use super::predicate::MatchPredicate;
use super::schema::{CancelFlag, SearchError, SearchOutcome};
use crate::models::Book;

/// Default worker pool size / 默认工作线程数
pub const DEFAULT_WORKERS: usize = 4;

/// Search engine / 搜索引擎
///
/// Holds no state besides its pool size; every call builds and tears down its
/// own queues and threads.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine {
    workers: usize,
}

impl SearchEngine {
    /// Create engine with a fixed worker count (at least one) / 创建搜索引擎
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Search snapshot, blocking until every worker is done / 搜索（阻塞）
    pub fn search(&self, query: &str, books: &[Book]) -> Vec<Book> {
        self.search_with_cancel(query, books, &CancelFlag::new()).books
    }

    /// Search that stops early when `cancel` trips / 可取消搜索
    pub fn search_with_cancel(&self, query: &str, books: &[Book], cancel: &CancelFlag) -> SearchOutcome {
        let started = Instant::now();
        let predicate = MatchPredicate::new(query);

        let outcome = match self.run(books, cancel, |book| Ok::<_, Infallible>(predicate.matches(book))) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        };

        tracing::debug!(
            query = predicate.needle(),
            records = books.len(),
            workers = self.workers,
            matches = outcome.books.len(),
            complete = outcome.complete,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        outcome
    }

    /// Scan with a fallible predicate / 使用可失败谓词扫描
    ///
    /// The first error cancels the remaining workers and is returned alone;
    /// matches collected so far are discarded.
    pub fn try_scan<F, E>(&self, books: &[Book], predicate: F) -> Result<Vec<Book>, SearchError>
    where
        F: Fn(&Book) -> Result<bool, E> + Sync,
        E: std::fmt::Display + Send,
    {
        let cancel = CancelFlag::new();
        match self.run(books, &cancel, predicate) {
            Ok(outcome) => Ok(outcome.books),
            Err(err) => {
                tracing::warn!("search aborted by worker fault: {}", err);
                Err(SearchError::WorkerFault(err.to_string()))
            }
        }
    }

    fn run<F, E>(&self, books: &[Book], cancel: &CancelFlag, predicate: F) -> Result<SearchOutcome, E>
    where
        F: Fn(&Book) -> Result<bool, E> + Sync,
        E: Send,
    {
        // Sized to the snapshot so the distributor never blocks on enqueue
        let (work_tx, work_rx) = bounded::<&Book>(books.len().max(1));
        let (result_tx, result_rx) = unbounded::<&Book>();
        let (fault_tx, fault_rx) = bounded::<E>(1);
        let evaluated = AtomicUsize::new(0);
        let predicate = &predicate;
        let evaluated_ref = &evaluated;

        let matches: Vec<Book> = thread::scope(|scope| {
            scope.spawn(move || {
                for book in books {
                    if cancel.is_cancelled() || work_tx.send(book).is_err() {
                        break;
                    }
                }
                // work_tx dropped: work queue exhausted
            });

            for _ in 0..self.workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let fault_tx = fault_tx.clone();
                scope.spawn(move || {
                    for book in work_rx.iter() {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let verdict = predicate(book);
                        evaluated_ref.fetch_add(1, Ordering::SeqCst);
                        match verdict {
                            Ok(true) => {
                                if result_tx.send(book).is_err() {
                                    break;
                                }
                            }
                            Ok(false) => {}
                            Err(err) => {
                                cancel.cancel();
                                // Only the first fault is kept
                                let _ = fault_tx.try_send(err);
                                break;
                            }
                        }
                    }
                    // result_tx dropped: this worker is done
                });
            }

            // Only workers may hold queue handles from here on
            drop(work_rx);
            drop(result_tx);
            drop(fault_tx);

            result_rx.iter().cloned().collect()
        });

        if let Ok(err) = fault_rx.try_recv() {
            return Err(err);
        }

        Ok(SearchOutcome {
            books: matches,
            complete: evaluated.load(Ordering::SeqCst) == books.len(),
        })
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}
