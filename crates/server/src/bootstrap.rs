//! Wiring of stores and clients for a service role.

use crate::orchestrator::ResourceOrchestrator;
use crate::state::{AppState, ServiceRole};
use anyhow::{Context, Result};
use jukebox_client::{HttpMetadataClient, LocalMetadataClient, MetadataServiceClient};
use jukebox_core::config::AppConfig;
use jukebox_metadata::MetadataStore;
use jukebox_tags::TagExtractor;
use std::sync::Arc;

/// Build the application state for `role`, opening only the stores it needs.
///
/// Storage and metadata connectivity is verified before returning, so a
/// misconfigured process fails at startup instead of reporting healthy.
pub async fn build_state(config: AppConfig, role: ServiceRole) -> Result<AppState> {
    config.validate().context("invalid configuration")?;

    let songs: Option<Arc<dyn MetadataStore>> = if role.serves_songs() {
        let store = jukebox_metadata::from_config(&config.metadata)
            .await
            .context("failed to initialize metadata store")?;
        store
            .health_check()
            .await
            .context("metadata store health check failed")?;
        tracing::info!("Song metadata store initialized");
        Some(store)
    } else {
        None
    };

    let orchestrator = if role.serves_resources() {
        let storage = jukebox_storage::from_config(&config.storage)
            .await
            .context("failed to initialize storage")?;
        storage
            .health_check()
            .await
            .context("storage health check failed")?;
        tracing::info!(backend = storage.backend_name(), "Resource storage initialized");

        let client: Arc<dyn MetadataServiceClient> = match &songs {
            Some(store) => Arc::new(LocalMetadataClient::new(store.clone())),
            None => Arc::new(
                HttpMetadataClient::from_config(&config.song_service)
                    .context("failed to build song service client")?,
            ),
        };
        tracing::info!(client = client.name(), "Song service client configured");

        let orchestrator =
            ResourceOrchestrator::new(storage, Arc::new(TagExtractor::new()), client);
        if config.reconcile.enabled && config.reconcile.sweep_on_startup {
            let queued = orchestrator
                .reconciler()
                .seed_from_store()
                .await
                .context("startup reconciliation sweep failed")?;
            tracing::info!(queued, "Stored resources queued for reconciliation");
        }
        Some(orchestrator)
    } else {
        None
    };

    Ok(AppState::new(config, role, orchestrator, songs))
}
