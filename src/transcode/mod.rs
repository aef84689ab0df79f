//! Image normalization for ingested emotes
//!
//! Normalization fits the source image onto a fixed-size transparent canvas:
//! downscale-to-fit preserving aspect ratio (never upscaling), centered, with
//! per-frame durations and the loop count carried over for animations.
//! Animated output is encoded as GIF, the one animated container the image
//! stack both decodes and encodes; static output is PNG so transparency
//! survives exactly.
//!
//! When a byte budget is given, encoding is retried at decreasing quality
//! steps; if no step fits the budget the smallest attempt is returned rather
//! than failing.

use std::io::Cursor;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPDecoder;
use image::imageops::FilterType;
use image::{
    AnimationDecoder, Delay, DynamicImage, ExtendedColorType, Frame, ImageEncoder, ImageFormat,
    Rgba, RgbaImage, imageops,
};

use crate::errors::TranscodeError;

/// Fallback frame duration when a source frame carries none
const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// GIF quantizer speed steps tried in order under a byte budget.
/// Speed 1 is the highest-quality quantization; the animated list takes
/// coarser steps than the static one.
const ANIMATED_QUALITY_STEPS: [i32; 3] = [1, 10, 30];

/// PNG compression-effort steps tried in order under a byte budget.
const STATIC_QUALITY_STEPS: [CompressionType; 3] = [
    CompressionType::Fast,
    CompressionType::Default,
    CompressionType::Best,
];

/// Normalize raw image bytes onto a transparent canvas of exactly `target`.
///
/// Animated sources keep frame count, per-frame durations (defaulting to
/// 100 ms) and loop count. `max_bytes` bounds the output size on a
/// best-effort basis; the smallest attempted encoding is returned when the
/// budget is unreachable. Pure bytes-in/bytes-out, no side effects.
pub fn normalize(
    raw: &[u8],
    target: (u32, u32),
    max_bytes: Option<usize>,
) -> Result<Vec<u8>, TranscodeError> {
    let format = image::guess_format(raw).map_err(|e| TranscodeError::Decode {
        message: e.to_string(),
    })?;

    match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(Cursor::new(raw)).map_err(decode_error)?;
            let frames = decoder
                .into_frames()
                .collect_frames()
                .map_err(decode_error)?;
            if frames.len() > 1 {
                normalize_animated(frames, gif_loop_count(raw), target, max_bytes)
            } else {
                normalize_static_frames(frames, raw, target, max_bytes)
            }
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(Cursor::new(raw)).map_err(decode_error)?;
            if decoder.has_animation() {
                let frames = decoder
                    .into_frames()
                    .collect_frames()
                    .map_err(decode_error)?;
                normalize_animated(frames, webp_loop_count(raw), target, max_bytes)
            } else {
                normalize_static(raw, target, max_bytes)
            }
        }
        _ => normalize_static(raw, target, max_bytes),
    }
}

fn decode_error(err: image::ImageError) -> TranscodeError {
    TranscodeError::Decode {
        message: err.to_string(),
    }
}

fn encode_error(err: image::ImageError) -> TranscodeError {
    TranscodeError::Encode {
        message: err.to_string(),
    }
}

/// Single-frame animated containers are flattened to the static path.
fn normalize_static_frames(
    frames: Vec<Frame>,
    raw: &[u8],
    target: (u32, u32),
    max_bytes: Option<usize>,
) -> Result<Vec<u8>, TranscodeError> {
    match frames.into_iter().next() {
        Some(frame) => encode_static_with_budget(&compose_canvas(frame.buffer(), target), max_bytes),
        None => normalize_static(raw, target, max_bytes),
    }
}

fn normalize_static(
    raw: &[u8],
    target: (u32, u32),
    max_bytes: Option<usize>,
) -> Result<Vec<u8>, TranscodeError> {
    let image: DynamicImage = image::load_from_memory(raw).map_err(decode_error)?;
    let canvas = compose_canvas(&image.to_rgba8(), target);
    encode_static_with_budget(&canvas, max_bytes)
}

fn normalize_animated(
    frames: Vec<Frame>,
    loop_count: Option<u16>,
    target: (u32, u32),
    max_bytes: Option<usize>,
) -> Result<Vec<u8>, TranscodeError> {
    let repeat = match loop_count {
        Some(0) | None => Repeat::Infinite,
        Some(n) => Repeat::Finite(n),
    };

    let composed: Vec<Frame> = frames
        .iter()
        .map(|frame| {
            let canvas = compose_canvas(frame.buffer(), target);
            Frame::from_parts(canvas, 0, 0, effective_delay(frame.delay()))
        })
        .collect();

    match max_bytes {
        None => encode_animated(&composed, repeat, ANIMATED_QUALITY_STEPS[0]),
        Some(budget) => {
            let mut smallest: Option<Vec<u8>> = None;
            for speed in ANIMATED_QUALITY_STEPS {
                let encoded = encode_animated(&composed, repeat, speed)?;
                if encoded.len() <= budget {
                    return Ok(encoded);
                }
                if smallest.as_ref().is_none_or(|s| encoded.len() < s.len()) {
                    smallest = Some(encoded);
                }
            }
            // Budget unreachable: return the smallest attempt instead of failing.
            Ok(smallest.unwrap_or_default())
        }
    }
}

fn encode_static_with_budget(
    canvas: &RgbaImage,
    max_bytes: Option<usize>,
) -> Result<Vec<u8>, TranscodeError> {
    match max_bytes {
        None => encode_static(canvas, STATIC_QUALITY_STEPS[0]),
        Some(budget) => {
            let mut smallest: Option<Vec<u8>> = None;
            for compression in STATIC_QUALITY_STEPS {
                let encoded = encode_static(canvas, compression)?;
                if encoded.len() <= budget {
                    return Ok(encoded);
                }
                if smallest.as_ref().is_none_or(|s| encoded.len() < s.len()) {
                    smallest = Some(encoded);
                }
            }
            Ok(smallest.unwrap_or_default())
        }
    }
}

fn encode_animated(
    frames: &[Frame],
    repeat: Repeat,
    speed: i32,
) -> Result<Vec<u8>, TranscodeError> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut out, speed);
        encoder.set_repeat(repeat).map_err(encode_error)?;
        for frame in frames {
            encoder.encode_frame(frame.clone()).map_err(encode_error)?;
        }
    }
    Ok(out)
}

fn encode_static(
    canvas: &RgbaImage,
    compression: CompressionType,
) -> Result<Vec<u8>, TranscodeError> {
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression, PngFilterType::Adaptive);
    encoder
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(encode_error)?;
    Ok(out)
}

/// Downscale-to-fit and center onto a fully transparent canvas of `target`.
fn compose_canvas(frame: &RgbaImage, target: (u32, u32)) -> RgbaImage {
    let (tw, th) = target;
    let (fw, fh) = fit_dimensions((frame.width(), frame.height()), target);

    let mut canvas = RgbaImage::from_pixel(tw, th, Rgba([0, 0, 0, 0]));
    let resized;
    let content: &RgbaImage = if (fw, fh) == (frame.width(), frame.height()) {
        frame
    } else {
        resized = imageops::resize(frame, fw, fh, FilterType::Lanczos3);
        &resized
    };

    let x = (i64::from(tw) - i64::from(fw)) / 2;
    let y = (i64::from(th) - i64::from(fh)) / 2;
    imageops::overlay(&mut canvas, content, x, y);
    canvas
}

/// Scale dimensions down to fit within the target, never upscaling.
fn fit_dimensions((w, h): (u32, u32), (tw, th): (u32, u32)) -> (u32, u32) {
    if w <= tw && h <= th {
        return (w, h);
    }
    let ratio = f64::min(f64::from(tw) / f64::from(w), f64::from(th) / f64::from(h));
    let fw = ((f64::from(w) * ratio).floor() as u32).max(1);
    let fh = ((f64::from(h) * ratio).floor() as u32).max(1);
    (fw.min(tw), fh.min(th))
}

fn effective_delay(delay: Delay) -> Delay {
    let (numer, denom) = delay.numer_denom_ms();
    let ms = if denom == 0 { 0 } else { numer / denom };
    if ms == 0 {
        Delay::from_numer_denom_ms(DEFAULT_FRAME_DURATION_MS, 1)
    } else {
        Delay::from_numer_denom_ms(ms, 1)
    }
}

/// Loop count from the GIF NETSCAPE2.0 application extension.
///
/// The `image` decoder does not surface the repeat count, so it is probed
/// from the raw container: `21 FF 0B "NETSCAPE2.0" 03 01 <u16 le>`.
/// `Some(0)` means loop forever.
fn gif_loop_count(raw: &[u8]) -> Option<u16> {
    const MARKER: &[u8] = b"NETSCAPE2.0";
    let pos = raw
        .windows(MARKER.len())
        .position(|window| window == MARKER)?;
    let tail = &raw[pos + MARKER.len()..];
    if tail.len() >= 4 && tail[0] == 0x03 && tail[1] == 0x01 {
        Some(u16::from_le_bytes([tail[2], tail[3]]))
    } else {
        None
    }
}

/// Loop count from the WebP ANIM chunk (u16 le at offset 12 into the chunk
/// payload header: background color (4 bytes) precedes the loop field).
fn webp_loop_count(raw: &[u8]) -> Option<u16> {
    const MARKER: &[u8] = b"ANIM";
    let pos = raw
        .windows(MARKER.len())
        .position(|window| window == MARKER)?;
    // chunk: "ANIM" + u32 size + u32 background + u16 loop_count
    let payload = &raw[pos + MARKER.len() + 4..];
    if payload.len() >= 6 {
        Some(u16::from_le_bytes([payload[4], payload[5]]))
    } else {
        None
    }
}
