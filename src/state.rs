use crate::catalog::Catalog;
use crate::search::SearchEngine;

/// Shared application state / 应用共享状态
pub struct AppState {
    pub catalog: Catalog,
    pub engine: SearchEngine,
}

impl AppState {
    pub fn new(catalog: Catalog, engine: SearchEngine) -> Self {
        Self { catalog, engine }
    }
}
