//! Application state shared across handlers.

use crate::error::{ApiError, ApiResult};
use crate::orchestrator::ResourceOrchestrator;
use jukebox_core::config::AppConfig;
use jukebox_metadata::MetadataStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Which services a process exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    /// `/resources` only; song metadata goes to a remote song service.
    Resources,
    /// `/songs` only.
    Songs,
    /// Both services in one process, sharing the metadata store.
    Combined,
}

impl ServiceRole {
    pub fn serves_resources(self) -> bool {
        matches!(self, Self::Resources | Self::Combined)
    }

    pub fn serves_songs(self) -> bool {
        matches!(self, Self::Songs | Self::Combined)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resources => "resources",
            Self::Songs => "songs",
            Self::Combined => "combined",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    pub role: ServiceRole,
    /// Present when the role serves `/resources`.
    pub orchestrator: Option<Arc<ResourceOrchestrator>>,
    /// Present when the role serves `/songs`.
    pub songs: Option<Arc<dyn MetadataStore>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        role: ServiceRole,
        orchestrator: Option<ResourceOrchestrator>,
        songs: Option<Arc<dyn MetadataStore>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            role,
            orchestrator: orchestrator.map(Arc::new),
            songs,
        }
    }

    pub fn orchestrator(&self) -> ApiResult<&Arc<ResourceOrchestrator>> {
        self.orchestrator
            .as_ref()
            .ok_or_else(|| ApiError::Internal("resource service is not enabled".to_string()))
    }

    pub fn songs(&self) -> ApiResult<&Arc<dyn MetadataStore>> {
        self.songs
            .as_ref()
            .ok_or_else(|| ApiError::Internal("song service is not enabled".to_string()))
    }

    /// Interval for the reconciliation task, if this process should run one.
    /// Returns None when reconciliation is disabled or there is no orchestrator.
    pub fn reconcile_interval(&self) -> Option<Duration> {
        if self.orchestrator.is_none() || !self.config.reconcile.enabled {
            return None;
        }
        let interval = self.config.reconcile.interval();
        // Guard against zero interval, which would spin the loop
        if interval.is_zero() {
            tracing::warn!("reconcile.interval_secs is 0, using default of 30 seconds");
            Some(Duration::from_secs(30))
        } else {
            Some(interval)
        }
    }
}
