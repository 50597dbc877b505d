// crates/matchline-media/src/probe.rs
//
// In-process FFmpeg probing: duration, frame rate, frame count, dimensions.
// Runs once per load, before the decode session is built.

use std::path::Path;

use anyhow::{anyhow, Result};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

#[derive(Clone, Copy, Debug)]
pub struct MediaInfo {
    pub duration_secs: f64,
    pub fps:           f64,
    pub frame_count:   u64,
    pub width:         u32,
    pub height:        u32,
}

/// Probe a source file. Duration prefers the container value and falls back
/// to the stream duration; frame count prefers the stream header and falls
/// back to duration × fps.
pub fn probe(path: &Path) -> Result<MediaInfo> {
    let ictx = input(path)?;
    let stream = ictx
        .streams()
        .best(Type::Video)
        .ok_or_else(|| anyhow!("no video stream in {}", path.display()))?;

    let tb = stream.time_base();
    let container_dur = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    let stream_dur =
        stream.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64;
    let duration_secs = if container_dur > 0.0 {
        container_dur
    } else {
        stream_dur.max(0.0)
    };

    let rate = stream.avg_frame_rate();
    let fps = if rate.denominator() > 0 && rate.numerator() > 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        30.0 // header carries no rate — assume the common default
    };

    let header_frames = stream.frames();
    let frame_count = if header_frames > 0 {
        header_frames as u64
    } else {
        (duration_secs * fps).round() as u64
    };

    let (width, height) = unsafe {
        let p = stream.parameters().as_ptr();
        ((*p).width as u32, (*p).height as u32)
    };

    if duration_secs <= 0.0 {
        return Err(anyhow!("duration unknown for {}", path.display()));
    }

    Ok(MediaInfo {
        duration_secs,
        fps,
        frame_count,
        width,
        height,
    })
}
