//! Local HTTP service: command endpoint, sensor event stream, and block
//! diagram storage routes.

pub mod api;
pub mod shared;
pub mod web;

pub use api::{ApiResponse, DiagramList, SavedDiagram, UploadRequest};
pub use shared::AppState;
pub use web::{build_router, run_server};
