//! HTTP services for jukebox.
//!
//! This crate provides:
//! - The resource service: MP3 upload, download and bulk delete
//! - The song service: song metadata create, fetch and bulk delete
//! - Cross-store orchestration with compensation and background reconciliation
//! - Prometheus metrics

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod orchestrator;
pub mod reconcile;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use orchestrator::{OrchestratorError, ResourceOrchestrator};
pub use reconcile::{ReconcileStats, Reconciler, Repair};
pub use routes::create_router;
pub use state::{AppState, ServiceRole};
