//! subway-server: HTTP admin backend for subway lines
//!
//! Stations, lines and their sections over a REST API, stored in
//! PostgreSQL (or in process for tests and demos).

pub mod db;
pub mod http;
pub mod service;
pub mod state;

pub use http::{build_router, run_server, ServerConfig, ServerError};
pub use service::{LineService, ServiceError, StationService};
pub use state::{AppState, Storage};
