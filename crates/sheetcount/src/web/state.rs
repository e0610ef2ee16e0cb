use std::sync::Arc;

use sheetcount_core::SheetCounter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the counter holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub counter: Arc<SheetCounter>,
}

impl AppState {
    pub fn new(counter: SheetCounter) -> Self {
        Self {
            counter: Arc::new(counter),
        }
    }
}
