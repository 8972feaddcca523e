//! Database models mapping to the song schema.

use jukebox_core::SongMetadata;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Song metadata record.
///
/// `id` is supplied by the caller and equals the id of the resource it
/// describes; the database never generates it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SongRow {
    pub id: i64,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration: String,
    pub year: i32,
    pub created_at: OffsetDateTime,
}

impl SongRow {
    /// Build a row for a new record, stamped with the current time.
    pub fn new(song: &SongMetadata) -> Self {
        Self {
            id: song.id,
            name: song.name.clone(),
            artist: song.artist.clone(),
            album: song.album.clone(),
            duration: song.duration.clone(),
            year: song.year,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn to_metadata(&self) -> SongMetadata {
        SongMetadata {
            id: self.id,
            name: self.name.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            duration: self.duration.clone(),
            year: self.year,
        }
    }
}

impl From<SongRow> for SongMetadata {
    fn from(row: SongRow) -> Self {
        SongMetadata {
            id: row.id,
            name: row.name,
            artist: row.artist,
            album: row.album,
            duration: row.duration,
            year: row.year,
        }
    }
}
