//! Clients for the song metadata service.
//!
//! The resource service never touches song records directly; it goes through
//! [`MetadataServiceClient`], either over HTTP ([`HttpMetadataClient`]) or,
//! when both services run in one process, straight to the store
//! ([`LocalMetadataClient`]). Every failure carries an [`Outcome`] so callers
//! can tell "definitely not applied" from "maybe applied".

pub mod error;
pub mod http;
pub mod local;
pub mod retry;
pub mod traits;

pub use error::{ClientError, ClientResult, Outcome};
pub use http::HttpMetadataClient;
pub use local::LocalMetadataClient;
pub use retry::RetryPolicy;
pub use traits::MetadataServiceClient;
