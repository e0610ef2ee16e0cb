//! Browser front end: a single page plus the JSON endpoints it calls.
//!
//! - `GET /` serves the page
//! - `GET /health` and `GET /api/status` report liveness and configuration
//! - `POST /api/inspect` and `POST /api/analyze` take a multipart `file` upload

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{AppError, AppResult};
pub use router::build_app_router;
pub use state::AppState;
