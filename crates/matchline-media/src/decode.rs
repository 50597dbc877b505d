// crates/matchline-media/src/decode.rs
//
// ClipDecoder: stateful per-source decoder implementing FrameSource.
// Keeps the demuxer and codec context open across reads so sequential
// playback never re-opens the file; seeks go backward to the preceding
// keyframe and burn forward (decode-only, no scale) to the exact target.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use crate::probe::{probe, MediaInfo};
use crate::source::{FrameSource, SourceFrame};

pub struct ClipDecoder {
    pub path: PathBuf,
    info:     MediaInfo,

    ictx:      ffmpeg::format::context::Input,
    decoder:   ffmpeg::decoder::video::Video,
    video_idx: usize,
    tb_num:    i32,
    tb_den:    i32,
    out_w:     u32,
    out_h:     u32,
    scaler:    SwsContext,

    /// PTS of the most recently decoded frame.
    last_pts: i64,
    /// Burn-forward target after a seek: frames with pts below this are
    /// decoded but not scaled or delivered, so the first delivered frame is
    /// at the seek target rather than the preceding keyframe.
    skip_until_pts: i64,
}

impl ClipDecoder {
    pub fn open(path: &Path) -> Result<Self> {
        let info = probe(path)?;
        let ictx = input(path)?;
        let video_idx = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow!("no video stream"))?
            .index();

        let (tb_num, tb_den) = {
            let stream = ictx.stream(video_idx).unwrap();
            let tb = stream.time_base();
            (tb.numerator(), tb.denominator())
        };

        // Second context for decoder params (avoids borrow conflict with ictx).
        let ictx2 = input(path)?;
        let stream2 = ictx2.stream(video_idx).unwrap();
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
        let decoder = dec_ctx.decoder().video()?;

        let (out_w, out_h) = (info.width.max(2), info.height.max(2));
        let scaler = SwsContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            out_w,
            out_h,
            Flags::BILINEAR,
        )?;

        Ok(Self {
            path: path.to_path_buf(),
            info,
            ictx,
            decoder,
            video_idx,
            tb_num,
            tb_den,
            out_w,
            out_h,
            scaler,
            last_pts: 0,
            skip_until_pts: 0,
        })
    }

    fn ts_to_pts(&self, t: f64) -> i64 {
        (t * self.tb_den as f64 / self.tb_num as f64) as i64
    }

    /// Backward keyframe seek + burn-forward target. A forward seek would
    /// land on the keyframe AFTER the target, dropping every frame between
    /// target and keyframe; backward + pts filter delivers the exact frame.
    fn seek_to_pts(&mut self, pts: i64) {
        let pts = pts.max(0);
        if let Err(e) = self.ictx.seek(pts, ..=pts) {
            eprintln!(
                "[decode] seek soft-fail at pts {pts} in {}: {e} — decoding from current position",
                self.path.display()
            );
        }
        self.decoder.flush();
        self.skip_until_pts = pts;
        self.last_pts = pts;
    }
}

impl FrameSource for ClipDecoder {
    fn fps(&self) -> f64 {
        self.info.fps
    }

    fn frame_count(&self) -> u64 {
        self.info.frame_count
    }

    fn duration_secs(&self) -> f64 {
        self.info.duration_secs
    }

    fn read_frame(&mut self) -> Option<SourceFrame> {
        // Copied out so the loop body never re-borrows `self` while the
        // packet iterator holds `self.ictx`.
        let (tb_num, tb_den, fps) = (self.tb_num as f64, self.tb_den as f64, self.info.fps);
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                // Pre-roll from a keyframe-aligned seek: decode-only, no
                // scale or alloc, until we reach the burn target.
                if pts < self.skip_until_pts {
                    continue;
                }
                let mut out = ffmpeg::util::frame::video::Video::empty();
                if self.scaler.run(&decoded, &mut out).is_err() {
                    return None;
                }
                // Destripe: copy only visible pixels, not stride padding.
                let stride = out.stride(0);
                let raw = out.data(0);
                let data: Vec<u8> = (0..self.out_h as usize)
                    .flat_map(|row| {
                        let s = row * stride;
                        &raw[s..s + self.out_w as usize * 4]
                    })
                    .copied()
                    .collect();
                let time_secs = pts as f64 * tb_num / tb_den;
                return Some(SourceFrame {
                    data,
                    width: self.out_w,
                    height: self.out_h,
                    time_secs,
                    frame_number: (time_secs * fps).round() as u64,
                });
            }
        }
        None
    }

    fn seek(&mut self, time_secs: f64) {
        let pts = self.ts_to_pts(time_secs.max(0.0));
        self.seek_to_pts(pts);
    }

    fn rewind_frame(&mut self) {
        // Re-target the frame we just delivered: the next read burns back to
        // last_pts and emits the same frame again.
        self.seek_to_pts(self.last_pts);
    }
}
