//! MPEG audio detection and tag metadata extraction.
//!
//! - [`sniff`] decides from the payload bytes alone whether an upload is MPEG audio.
//! - [`MetadataExtractor`] turns an accepted payload into a [`jukebox_core::SongMetadata`].

pub mod extract;
pub mod sniff;

pub use extract::{MetadataExtractor, TagExtractor};
pub use sniff::{ProbedAudio, is_mpeg_audio, probe, sniff};
