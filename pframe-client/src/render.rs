//! Frame preparation for the display panel
//!
//! Turns a frame payload into panel-sized pixels: decode the base64 image
//! bytes, scale to cover the panel, crop with the item's display offsets,
//! and apply the saturation setting. Decode or render failures never touch
//! playlist state; the caller retries on its own schedule.

use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};

use pframe_common::FramePayload;

/// Decode the payload's base64 image bytes into a pixel image
pub fn decode_frame_image(payload: &FramePayload) -> Result<DynamicImage> {
    let bytes = general_purpose::STANDARD
        .decode(&payload.image_base64)
        .context("frame payload carries invalid base64")?;
    image::load_from_memory(&bytes).context("failed to decode image bytes")
}

/// Produce a panel-sized image: cover-scale, offset crop, saturation
pub fn prepare(
    img: &DynamicImage,
    width: u32,
    height: u32,
    offset_x: f64,
    offset_y: f64,
    saturation: f64,
) -> RgbaImage {
    let covered = resize_to_cover(img, width, height);
    let cropped = crop_with_offset(&covered, width, height, offset_x, offset_y);
    apply_saturation(cropped, saturation)
}

/// Scale so the image covers the target box in both dimensions
fn resize_to_cover(img: &DynamicImage, target_w: u32, target_h: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }
    let scale = f64::max(
        f64::from(target_w) / f64::from(w),
        f64::from(target_h) / f64::from(h),
    );
    let scaled_w = ((f64::from(w) * scale).ceil() as u32).max(target_w);
    let scaled_h = ((f64::from(h) * scale).ceil() as u32).max(target_h);
    if (scaled_w, scaled_h) == (w, h) {
        img.clone()
    } else {
        img.resize_exact(scaled_w, scaled_h, FilterType::CatmullRom)
    }
}

/// Crop a target-sized window whose position within the overflow is set by
/// the offsets: -1 pins to the top/left edge, 0 centers, 1 pins bottom/right
fn crop_with_offset(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
    offset_x: f64,
    offset_y: f64,
) -> RgbaImage {
    let (w, h) = img.dimensions();
    let x = offset_origin(w, target_w, offset_x);
    let y = offset_origin(h, target_h, offset_y);
    img.crop_imm(x, y, target_w, target_h).to_rgba8()
}

fn offset_origin(full: u32, target: u32, offset: f64) -> u32 {
    let overflow = full.saturating_sub(target);
    if overflow == 0 {
        return 0;
    }
    let fraction = (offset.clamp(-1.0, 1.0) + 1.0) / 2.0;
    ((f64::from(overflow) * fraction).round() as u32).min(overflow)
}

/// Blend each pixel against its luma: 0.0 greys the image out, 0.5 leaves
/// it untouched, 1.0 doubles the distance from grey
fn apply_saturation(mut img: RgbaImage, saturation: f64) -> RgbaImage {
    let factor = saturation.clamp(0.0, 1.0) * 2.0;
    if (factor - 1.0).abs() < 1e-9 {
        return img;
    }
    for pixel in img.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        let blend = |channel: u8| -> u8 {
            (luma + (f64::from(channel) - luma) * factor)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        pixel.0 = [blend(r), blend(g), blend(b), a];
    }
    img
}
