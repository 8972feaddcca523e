//! Content sniffing for uploaded payloads.
//!
//! Only the bytes decide whether a payload is MPEG audio. The probe skips a
//! leading ID3v2 tag, instantiates the MPEG audio reader and reads the first
//! packet; anything short of that is rejected.

use bytes::Bytes;
use std::io::Cursor;
use symphonia::core::codecs::{CODEC_TYPE_MP1, CODEC_TYPE_MP2, CODEC_TYPE_MP3, CodecType};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::debug;

use jukebox_core::AUDIO_MPEG;

/// Stream facts gathered while probing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbedAudio {
    pub codec: CodecType,
    /// Track length computed from frame count and time base, when known.
    pub duration_ms: Option<u64>,
}

/// Return the detected content type, or `None` if the payload is not MPEG audio.
pub fn sniff(data: &Bytes) -> Option<&'static str> {
    probe(data).map(|_| AUDIO_MPEG)
}

pub fn is_mpeg_audio(data: &Bytes) -> bool {
    sniff(data).is_some()
}

/// Probe `data` as MPEG audio.
pub fn probe(data: &Bytes) -> Option<ProbedAudio> {
    if data.is_empty() {
        return None;
    }

    let mss = MediaSourceStream::new(
        Box::new(Cursor::new(data.clone())),
        MediaSourceStreamOptions::default(),
    );

    let probed = match symphonia::default::get_probe().format(
        &Hint::new(),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    ) {
        Ok(probed) => probed,
        Err(e) => {
            debug!(error = %e, len = data.len(), "Format probe rejected payload");
            return None;
        }
    };

    let mut format = probed.format;
    let track = format.default_track()?;
    let codec = track.codec_params.codec;
    if !matches!(codec, CODEC_TYPE_MP1 | CODEC_TYPE_MP2 | CODEC_TYPE_MP3) {
        debug!(?codec, "Probed stream is not MPEG audio");
        return None;
    }
    let duration_ms = duration_from_params(track.codec_params.time_base, track.codec_params.n_frames);

    if let Err(e) = format.next_packet() {
        debug!(error = %e, "No readable MPEG frame after header");
        return None;
    }

    Some(ProbedAudio { codec, duration_ms })
}

fn duration_from_params(time_base: Option<TimeBase>, n_frames: Option<u64>) -> Option<u64> {
    let tb = time_base?;
    let frames = n_frames?;

    let t = tb.calc_time(frames);
    let ms = (t.seconds as f64 * 1000.0) + (t.frac * 1000.0);
    Some(ms.round() as u64)
}
