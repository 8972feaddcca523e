//! HTTP client for a remote song service.

use crate::error::{ClientError, ClientResult};
use crate::retry::RetryPolicy;
use crate::traits::MetadataServiceClient;
use async_trait::async_trait;
use jukebox_core::config::SongServiceConfig;
use jukebox_core::{IdResponse, IdSet, IdsResponse, SongMetadata};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Talks to a song service at its collection URL (e.g. `http://songs:8081/songs`).
#[derive(Clone)]
pub struct HttpMetadataClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl HttpMetadataClient {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
        retry: RetryPolicy,
    ) -> ClientResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid song service URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            retry,
        })
    }

    pub fn from_config(config: &SongServiceConfig) -> ClientResult<Self> {
        config.validate().map_err(ClientError::Config)?;
        Self::new(
            &config.base_url,
            config.request_timeout(),
            config.connect_timeout(),
            RetryPolicy::from_config(config),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> ClientResult<T> {
        let response = req.send().await.map_err(classify_send_error)?;
        let status = response.status();
        let body = response.text().await.map_err(classify_body_error)?;

        if status.is_client_error() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::MalformedResponse(format!("{e}: {body}")))
    }

    async fn create_once(&self, song: &SongMetadata, maybe_applied: bool) -> ClientResult<i64> {
        let req = self.http.post(self.base_url.clone()).json(&song.to_dto());
        match self.send_json::<IdResponse>(req).await {
            Ok(created) => Ok(created.id),
            Err(ClientError::Rejected { status, .. })
                if status == StatusCode::CONFLICT.as_u16() && maybe_applied =>
            {
                // An earlier attempt whose response was lost got there first
                info!(resource_id = song.id, "Create retry found existing record");
                Ok(song.id)
            }
            Err(ClientError::Rejected { status, .. })
                if status == StatusCode::CONFLICT.as_u16() =>
            {
                Err(ClientError::Conflict(song.id))
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_once(&self, ids: &IdSet) -> ClientResult<Vec<i64>> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("id", &ids.to_csv());
        let deleted: IdsResponse = self.send_json(self.http.delete(url)).await?;
        Ok(deleted.ids)
    }
}

fn classify_send_error(e: reqwest::Error) -> ClientError {
    // Connect failures (including connect timeouts) happen before the request is written
    if e.is_connect() {
        ClientError::Unreachable(e.to_string())
    } else if e.is_timeout() {
        ClientError::Timeout(e.to_string())
    } else {
        ClientError::Transport(e.to_string())
    }
}

fn classify_body_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(e.to_string())
    } else {
        ClientError::Transport(e.to_string())
    }
}

#[async_trait]
impl MetadataServiceClient for HttpMetadataClient {
    async fn create(&self, song: &SongMetadata) -> ClientResult<i64> {
        debug!(resource_id = song.id, url = %self.base_url, "Creating song metadata");
        self.retry
            .run("create", |maybe_applied| self.create_once(song, maybe_applied))
            .await
    }

    async fn delete(&self, ids: &IdSet) -> ClientResult<Vec<i64>> {
        debug!(ids = %ids.to_csv(), url = %self.base_url, "Deleting song metadata");
        self.retry.run("delete", |_| self.delete_once(ids)).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
