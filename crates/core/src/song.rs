//! Song metadata record, wire format and field normalization.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum length (in characters) of name, artist and album.
pub const MAX_TEXT_LENGTH: usize = 100;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const DEFAULT_DURATION: &str = "00:00";
pub const DEFAULT_YEAR: &str = "1900";

/// Metadata describing one stored resource.
///
/// `id` is the id of the resource in the blob store. The two records live in
/// different stores, so nothing but application logic keeps them paired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongMetadata {
    pub id: i64,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// `mm:ss`, minutes zero-padded to at least two digits.
    pub duration: String,
    pub year: i32,
}

impl SongMetadata {
    pub fn to_dto(&self) -> SongMetadataDto {
        SongMetadataDto {
            id: self.id.to_string(),
            name: self.name.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            duration: self.duration.clone(),
            year: self.year.to_string(),
        }
    }
}

/// Per-field validation messages, keyed by JSON field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Wire representation used by the song service.
///
/// Every field travels as a string. Missing fields deserialize as empty
/// strings so that they are reported by [`SongMetadataDto::validate`] rather
/// than by the JSON decoder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadataDto {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
}

impl SongMetadataDto {
    /// Validate every field and convert into a [`SongMetadata`].
    pub fn validate(&self) -> Result<SongMetadata, FieldErrors> {
        let mut errors = FieldErrors::new();

        let id = if self.id.trim().is_empty() {
            errors.insert("id".into(), "ID is required".into());
            None
        } else {
            match crate::ids::parse_positive_id(&self.id) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.insert("id".into(), "ID must be a positive integer".into());
                    None
                }
            }
        };

        for (field, value) in [
            ("name", &self.name),
            ("artist", &self.artist),
            ("album", &self.album),
        ] {
            if value.trim().is_empty() {
                errors.insert(field.into(), "must not be blank".into());
            } else if value.chars().count() > MAX_TEXT_LENGTH {
                errors.insert(
                    field.into(),
                    format!("size must be between 0 and {MAX_TEXT_LENGTH}"),
                );
            }
        }

        if !is_valid_duration(&self.duration) {
            errors.insert(
                "duration".into(),
                "Duration must be in mm:ss format with leading zeros".into(),
            );
        }

        let year = if is_valid_year(&self.year) {
            self.year.parse::<i32>().ok()
        } else {
            errors.insert("year".into(), "Year must be between 1900 and 2099".into());
            None
        };

        match (id, year) {
            (Some(id), Some(year)) if errors.is_empty() => Ok(SongMetadata {
                id,
                name: self.name.clone(),
                artist: self.artist.clone(),
                album: self.album.clone(),
                duration: self.duration.clone(),
                year,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&SongMetadata> for SongMetadataDto {
    fn from(song: &SongMetadata) -> Self {
        song.to_dto()
    }
}

fn is_valid_duration(value: &str) -> bool {
    let Some((minutes, seconds)) = value.split_once(':') else {
        return false;
    };
    let seconds = seconds.as_bytes();
    minutes.len() >= 2
        && minutes.bytes().all(|b| b.is_ascii_digit())
        && seconds.len() == 2
        && matches!(seconds[0], b'0'..=b'5')
        && seconds[1].is_ascii_digit()
}

fn is_valid_year(value: &str) -> bool {
    value.len() == 4
        && (value.starts_with("19") || value.starts_with("20"))
        && value.bytes().all(|b| b.is_ascii_digit())
}

/// Substitute `default` for a missing or blank value and cap the result at
/// [`MAX_TEXT_LENGTH`] characters.
pub fn text_or_default(value: Option<&str>, default: &str) -> String {
    let value = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default,
    };
    value.chars().take(MAX_TEXT_LENGTH).collect()
}

/// Format a millisecond count as `mm:ss`.
///
/// Minutes are not wrapped into hours. Missing or non-numeric input gives
/// [`DEFAULT_DURATION`].
pub fn format_duration(millis: Option<&str>) -> String {
    match millis.and_then(|m| m.trim().parse::<u64>().ok()) {
        Some(ms) => format_duration_secs(ms / 1000),
        None => DEFAULT_DURATION.to_string(),
    }
}

pub fn format_duration_secs(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Keep a four-digit year in 1900..=2099, otherwise [`DEFAULT_YEAR`].
pub fn normalize_year(year: Option<&str>) -> String {
    match year.map(str::trim) {
        Some(y) if is_valid_year(y) => y.to_string(),
        _ => DEFAULT_YEAR.to_string(),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl Visitor<'_> for StringOrNumber {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> SongMetadataDto {
        SongMetadataDto {
            id: "12".into(),
            name: "Song".into(),
            artist: "Artist".into(),
            album: "Album".into(),
            duration: "03:21".into(),
            year: "2023".into(),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some("0")), "00:00");
        assert_eq!(format_duration(Some("65000")), "01:05");
        assert_eq!(format_duration(Some("65999")), "01:05");
        assert_eq!(format_duration(Some("3600000")), "60:00");
        assert_eq!(format_duration(Some("abc")), "00:00");
        assert_eq!(format_duration(Some("-5000")), "00:00");
        assert_eq!(format_duration(None), "00:00");
    }

    #[test]
    fn test_normalize_year() {
        assert_eq!(normalize_year(Some("2023")), "2023");
        assert_eq!(normalize_year(Some("1900")), "1900");
        assert_eq!(normalize_year(Some("2099")), "2099");
        assert_eq!(normalize_year(Some("1850")), "1900");
        assert_eq!(normalize_year(Some("2100")), "1900");
        assert_eq!(normalize_year(Some("abcd")), "1900");
        assert_eq!(normalize_year(Some("2023-05-01")), "1900");
        assert_eq!(normalize_year(None), "1900");
    }

    #[test]
    fn test_text_or_default() {
        assert_eq!(text_or_default(None, UNKNOWN_TITLE), "Unknown Title");
        assert_eq!(text_or_default(Some("  "), UNKNOWN_ARTIST), "Unknown Artist");
        assert_eq!(text_or_default(Some("Abbey Road"), UNKNOWN_ALBUM), "Abbey Road");

        let long = "é".repeat(150);
        let truncated = text_or_default(Some(&long), UNKNOWN_TITLE);
        assert_eq!(truncated.chars().count(), MAX_TEXT_LENGTH);
    }

    #[test]
    fn test_validate_accepts_valid_record() {
        let song = valid_dto().validate().unwrap();
        assert_eq!(song.id, 12);
        assert_eq!(song.year, 2023);
        assert_eq!(song.to_dto(), valid_dto());
    }

    #[test]
    fn test_validate_accepts_long_durations() {
        let dto = SongMetadataDto {
            duration: "123:04".into(),
            ..valid_dto()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_bad_field() {
        let dto = SongMetadataDto {
            id: "0".into(),
            name: " ".into(),
            artist: "a".repeat(101),
            album: "ok".into(),
            duration: "3:21".into(),
            year: "1850".into(),
        };

        let errors = dto.validate().unwrap_err();
        assert_eq!(errors["id"], "ID must be a positive integer");
        assert_eq!(errors["name"], "must not be blank");
        assert_eq!(errors["artist"], "size must be between 0 and 100");
        assert!(errors["duration"].contains("mm:ss"));
        assert_eq!(errors["year"], "Year must be between 1900 and 2099");
        assert!(!errors.contains_key("album"));
    }

    #[test]
    fn test_validate_rejects_bad_seconds() {
        let dto = SongMetadataDto {
            duration: "01:60".into(),
            ..valid_dto()
        };
        assert!(dto.validate().unwrap_err().contains_key("duration"));
    }

    #[test]
    fn test_dto_deserializes_missing_fields_and_numbers() {
        let dto: SongMetadataDto =
            serde_json::from_str(r#"{"id": 5, "name": "n", "year": 2001}"#).unwrap();
        assert_eq!(dto.id, "5");
        assert_eq!(dto.year, "2001");
        assert_eq!(dto.artist, "");

        let errors = dto.validate().unwrap_err();
        assert!(!errors.contains_key("id"));
        assert!(!errors.contains_key("name"));
        assert_eq!(errors["artist"], "must not be blank");
        assert!(errors.contains_key("duration"));

        let dto: SongMetadataDto = serde_json::from_str(r#"{"id": null}"#).unwrap();
        assert_eq!(dto.validate().unwrap_err()["id"], "ID is required");
    }
}
