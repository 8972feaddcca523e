//! Test fixtures for generating MP3 payloads.
//! Note: #[allow(dead_code)] because each test file compiles common/ separately.

use bytes::Bytes;
use id3::{Frame, Tag, TagLike, Version};
use jukebox_core::SongMetadata;

/// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, no CRC, no padding.
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
const FRAME_LEN: usize = 417;

/// Untagged MPEG audio made of `count` silent frames.
#[allow(dead_code)]
pub fn mpeg_frames(count: usize) -> Bytes {
    let mut out = Vec::with_capacity(count * FRAME_LEN);
    for _ in 0..count {
        out.extend_from_slice(&FRAME_HEADER);
        out.resize(out.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    out.into()
}

/// A tagged MP3 with the given title, artist, album, year and TLEN in milliseconds.
#[allow(dead_code)]
pub fn tagged_mp3(title: &str, artist: &str, album: &str, year: i32, length_ms: u64) -> Bytes {
    let mut tag = Tag::new();
    tag.set_title(title);
    tag.set_artist(artist);
    tag.set_album(album);
    tag.set_year(year);
    tag.add_frame(Frame::text("TLEN", length_ms.to_string()));

    let mut out = Vec::new();
    tag.write_to(&mut out, Version::Id3v24)
        .expect("failed to write ID3 tag");
    out.extend_from_slice(&mpeg_frames(20));
    out.into()
}

/// The MP3 most tests upload.
#[allow(dead_code)]
pub fn sample_mp3() -> Bytes {
    tagged_mp3("Blue in Green", "Miles Davis", "Kind of Blue", 1959, 337_000)
}

/// Bytes that are definitely not audio.
#[allow(dead_code)]
pub fn not_audio() -> Bytes {
    Bytes::from_static(b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n")
}

#[allow(dead_code)]
pub fn song(id: i64) -> SongMetadata {
    SongMetadata {
        id,
        name: "Song".into(),
        artist: "Artist".into(),
        album: "Album".into(),
        duration: "01:05".into(),
        year: 2023,
    }
}
