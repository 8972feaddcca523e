//! Core domain types and shared logic for the jukebox services.
//!
//! This crate defines the data model used across all other crates:
//! - Resource id parsing (single ids and CSV id lists)
//! - Song metadata, its wire form and field validation
//! - Normalization of extracted tag values
//! - Service configuration

pub mod api;
pub mod config;
pub mod error;
pub mod ids;
pub mod song;

pub use api::{IdResponse, IdsResponse};
pub use error::{Error, Result};
pub use ids::{IdSet, MAX_ID_LIST_LENGTH, parse_id_set, parse_positive_id};
pub use song::{FieldErrors, SongMetadata, SongMetadataDto};

/// Content type of stored resources.
pub const AUDIO_MPEG: &str = "audio/mpeg";
