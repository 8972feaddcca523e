//! Metadata extraction from MP3 payloads.

use bytes::Bytes;
use id3::frame::Content;
use id3::{Tag, TagLike};
use std::io::Cursor;
use tracing::debug;

use jukebox_core::SongMetadata;
use jukebox_core::song::{
    UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE, format_duration,
    format_duration_secs, normalize_year, text_or_default,
};

use crate::sniff;

const DEFAULT_YEAR_NUMBER: i32 = 1900;

/// Turns an accepted payload into a normalized metadata record.
///
/// Extraction never fails: unreadable or missing tags yield default values.
pub trait MetadataExtractor: Send + Sync + 'static {
    fn extract(&self, data: &Bytes, id: i64) -> SongMetadata;
}

/// ID3v2 based extractor.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagExtractor;

impl TagExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for TagExtractor {
    fn extract(&self, data: &Bytes, id: i64) -> SongMetadata {
        let tag = match Tag::read_from2(Cursor::new(data.as_ref())) {
            Ok(tag) => Some(tag),
            Err(e) => {
                debug!(resource_id = id, error = %e, "No readable ID3 tag, using defaults");
                None
            }
        };
        let tag = tag.as_ref();

        let duration = match tag.and_then(duration_millis) {
            Some(ms) => format_duration(Some(&ms)),
            None => match sniff::probe(data).and_then(|p| p.duration_ms) {
                Some(ms) => format_duration_secs(ms / 1000),
                None => format_duration(None),
            },
        };

        // normalize_year only returns four ASCII digits
        let year = normalize_year(tag.and_then(year_text).as_deref())
            .parse::<i32>()
            .unwrap_or(DEFAULT_YEAR_NUMBER);

        SongMetadata {
            id,
            name: text_or_default(tag.and_then(|t| t.title()), UNKNOWN_TITLE),
            artist: text_or_default(tag.and_then(|t| t.artist()), UNKNOWN_ARTIST),
            album: text_or_default(tag.and_then(|t| t.album()), UNKNOWN_ALBUM),
            duration,
            year,
        }
    }
}

/// `TLEN` when it holds a plain millisecond count.
fn duration_millis(tag: &Tag) -> Option<String> {
    text_frame(tag, "TLEN")
        .map(|s| s.trim().to_string())
        .filter(|s| s.parse::<u64>().is_ok())
}

/// Release year: `TYER`, then the year part of `TDRC`, then raw `TDRC` text.
fn year_text(tag: &Tag) -> Option<String> {
    tag.year()
        .map(|y| y.to_string())
        .or_else(|| tag.date_recorded().map(|ts| ts.year.to_string()))
        .or_else(|| text_frame(tag, "TDRC"))
}

fn text_frame(tag: &Tag, id: &str) -> Option<String> {
    let frame = tag.get(id)?;
    match frame.content() {
        Content::Text(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use id3::Frame;

    fn extract(data: &Bytes) -> SongMetadata {
        TagExtractor::new().extract(data, 7)
    }

    #[test]
    fn test_extract_reads_tag_fields() {
        let mut tag = Tag::new();
        tag.set_title("Paranoid Android");
        tag.set_artist("Radiohead");
        tag.set_album("OK Computer");
        tag.set_year(1997);
        tag.add_frame(Frame::text("TLEN", "383000"));

        let song = extract(&fixtures::tagged_mp3(&tag, 20));
        assert_eq!(song.id, 7);
        assert_eq!(song.name, "Paranoid Android");
        assert_eq!(song.artist, "Radiohead");
        assert_eq!(song.album, "OK Computer");
        assert_eq!(song.duration, "06:23");
        assert_eq!(song.year, 1997);
    }

    #[test]
    fn test_extract_defaults_without_tag() {
        let song = extract(&fixtures::mpeg_frames(40));
        assert_eq!(song.name, "Unknown Title");
        assert_eq!(song.artist, "Unknown Artist");
        assert_eq!(song.album, "Unknown Album");
        assert_eq!(song.year, 1900);

        let (minutes, seconds) = song.duration.split_once(':').unwrap();
        assert_eq!(minutes.len(), 2);
        assert_eq!(seconds.len(), 2);
    }

    #[test]
    fn test_extract_never_fails_on_garbage() {
        let song = extract(&Bytes::from_static(b"ID3\x04\x00\x00\xff\xff\xff\xffgarbage"));
        assert_eq!(song.name, "Unknown Title");
        assert_eq!(song.duration, "00:00");
        assert_eq!(song.year, 1900);
    }

    #[test]
    fn test_extract_normalizes_bad_values() {
        let mut tag = Tag::new();
        tag.set_title("   ");
        tag.set_artist("x".repeat(150));
        tag.set_year(1850);
        tag.add_frame(Frame::text("TLEN", "not-a-number"));

        let song = extract(&fixtures::tagged_mp3(&tag, 20));
        assert_eq!(song.name, "Unknown Title");
        assert_eq!(song.artist.chars().count(), 100);
        assert_eq!(song.year, 1900);
        assert_ne!(song.duration, "");
    }

    #[test]
    fn test_extract_year_from_recording_date() {
        let mut tag = Tag::new();
        tag.add_frame(Frame::text("TDRC", "2019-05-01"));

        let song = extract(&fixtures::tagged_mp3(&tag, 20));
        assert_eq!(song.year, 2019);
    }

    #[test]
    fn test_extract_long_duration_is_not_wrapped() {
        let mut tag = Tag::new();
        tag.add_frame(Frame::text("TLEN", "3725000"));

        let song = extract(&fixtures::tagged_mp3(&tag, 20));
        assert_eq!(song.duration, "62:05");
    }
}
