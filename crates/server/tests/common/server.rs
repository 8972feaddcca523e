//! Server test utilities.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use jukebox_client::{LocalMetadataClient, MetadataServiceClient};
use jukebox_core::config::{AppConfig, MetadataConfig, StorageConfig};
use jukebox_metadata::{MetadataStore, SqliteStore};
use jukebox_server::{AppState, ResourceOrchestrator, ServiceRole, create_router};
use jukebox_storage::{FilesystemBackend, ResourceStore};
use jukebox_tags::TagExtractor;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Both services in one process, on-disk stores in a temp directory.
    pub async fn new() -> Self {
        Self::build(ServiceRole::Combined, None, |_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        Self::build(ServiceRole::Combined, None, modifier).await
    }

    /// Resource service only, talking to `client` instead of a song service.
    pub async fn with_client(client: Arc<dyn MetadataServiceClient>) -> Self {
        Self::build(ServiceRole::Resources, Some(client), |_| {}).await
    }

    /// Song service only.
    pub async fn songs_only() -> Self {
        Self::build(ServiceRole::Songs, None, |_| {}).await
    }

    async fn build<F>(
        role: ServiceRole,
        client: Option<Arc<dyn MetadataServiceClient>>,
        modifier: F,
    ) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("resources");
        let db_path = temp_dir.path().join("songs.db");

        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem {
            path: storage_path.clone(),
        };
        config.metadata = MetadataConfig::Sqlite {
            path: db_path.clone(),
            query_timeout_secs: None,
        };
        modifier(&mut config);

        let songs: Option<Arc<dyn MetadataStore>> = if role.serves_songs() {
            Some(Arc::new(
                SqliteStore::new(&db_path, None)
                    .await
                    .expect("Failed to create metadata store"),
            ))
        } else {
            None
        };

        let orchestrator = if role.serves_resources() {
            let storage: Arc<dyn ResourceStore> = Arc::new(
                FilesystemBackend::new(&storage_path)
                    .await
                    .expect("Failed to create storage backend"),
            );
            let client = match (client, &songs) {
                (Some(client), _) => client,
                (None, Some(store)) => Arc::new(LocalMetadataClient::new(store.clone())),
                (None, None) => panic!("resource role needs a client"),
            };
            Some(ResourceOrchestrator::new(
                storage,
                Arc::new(TagExtractor::new()),
                client,
            ))
        } else {
            None
        };

        let state = AppState::new(config, role, orchestrator, songs);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    pub fn orchestrator(&self) -> Arc<ResourceOrchestrator> {
        self.state.orchestrator.clone().expect("resource service enabled")
    }

    pub fn store(&self) -> Arc<dyn ResourceStore> {
        self.orchestrator().store().clone()
    }

    pub fn songs(&self) -> Arc<dyn MetadataStore> {
        self.state.songs.clone().expect("song service enabled")
    }

    /// Send a request and return status, headers and raw body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let request = builder.body(body.into()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    /// Send a request and decode the response body as JSON.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, Value) {
        let (status, _, body) = self.send(method, uri, content_type, body).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// POST an MP3 to /resources.
    pub async fn upload(&self, data: Bytes) -> (StatusCode, Value) {
        self.json("POST", "/resources", Some("audio/mpeg"), data).await
    }
}
