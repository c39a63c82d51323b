//! Clip compositor: normalized rectangles + rotation + page raster → image.
//!
//! The pipeline is deterministic and takes everything it needs as arguments:
//!
//! 1. Render the page at [`EXPORT_SCALE`](crate::rendering::EXPORT_SCALE)
//!    with the rotation baked in (the raster's bounding box grows to the
//!    rotated page's AABB).
//! 2. Paint every mask as an opaque page-background fill, scaled by the
//!    rotated raster's pixel dimensions.
//! 3. Substitute the whole page for an empty crop rectangle.
//! 4. Extract the crop sub-raster at exactly the crop's pixel dimensions.
//! 5. JPEG-encode at fixed high quality.
//!
//! Masks are painted on the full raster *before* cropping, so a mask outside
//! the crop bounds is legal and simply has no visible effect.

use crate::error::{Error, Result};
use crate::geometry::NormRect;
use crate::rendering::{RenderSource, EXPORT_SCALE};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgba, RgbaImage};

/// JPEG quality for composed clip images.
pub const JPEG_QUALITY: u8 = 95;

/// Page background color used for mask fills.
const MASK_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A composed (cropped and masked) clip image.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComposedImage {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// MIME content type of `data`
    pub content_type: String,
}

/// Compose the final clip image for a page.
///
/// Pure function of its five inputs; composing twice with identical inputs
/// yields identical pixel dimensions and content up to encoder
/// nondeterminism. On [`Error::RenderFailure`] nothing is created or
/// modified.
pub fn compose(
    source: &dyn RenderSource,
    page_number: u32,
    rotation_degrees: f64,
    crop: NormRect,
    masks: &[NormRect],
) -> Result<ComposedImage> {
    let raster = source.render_page(page_number, EXPORT_SCALE, rotation_degrees)?;
    let mut img = raster.into_image();
    let (rw, rh) = (img.width(), img.height());
    log::debug!(
        "Composing page {} at {}x{} (rotation {:.1} deg, {} masks)",
        page_number,
        rw,
        rh,
        rotation_degrees,
        masks.len()
    );

    for mask in masks {
        fill_rect(&mut img, mask, MASK_FILL);
    }

    let crop = if crop.is_empty() {
        NormRect::full_page()
    } else {
        crop
    };
    let (cx, cy, cw, ch) = crop_pixels(&crop, rw, rh);
    let cropped = image::imageops::crop_imm(&img, cx, cy, cw, ch).to_image();

    encode_jpeg(&cropped)
}

/// Clamp a normalized crop rectangle to integral raster coordinates.
fn crop_pixels(crop: &NormRect, raster_w: u32, raster_h: u32) -> (u32, u32, u32, u32) {
    let (x, y, w, h) = crop.to_pixels(raster_w, raster_h);
    let cx = (x.floor().max(0.0) as u32).min(raster_w.saturating_sub(1));
    let cy = (y.floor().max(0.0) as u32).min(raster_h.saturating_sub(1));
    let cw = (w.round() as u32).clamp(1, raster_w - cx);
    let ch = (h.round() as u32).clamp(1, raster_h - cy);
    (cx, cy, cw, ch)
}

/// Opaque fill of a normalized rectangle onto the raster.
fn fill_rect(img: &mut RgbaImage, rect: &NormRect, color: Rgba<u8>) {
    let rect = rect.normalized();
    let (x, y, w, h) = rect.to_pixels(img.width(), img.height());
    let x0 = x.floor().max(0.0) as u32;
    let y0 = y.floor().max(0.0) as u32;
    let x1 = ((x + w).ceil() as u32).min(img.width());
    let y1 = ((y + h).ceil() as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, color);
        }
    }
}

fn encode_jpeg(img: &RgbaImage) -> Result<ComposedImage> {
    let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let mut data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| Error::RenderFailure(format!("JPEG encoding failed: {}", e)))?;
    Ok(ComposedImage {
        data,
        width: img.width(),
        height: img.height(),
        content_type: "image/jpeg".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_covers_exact_region() {
        let mut img = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        fill_rect(
            &mut img,
            &NormRect::new(0.25, 0.25, 0.5, 0.5),
            Rgba([255, 255, 255, 255]),
        );
        assert_eq!(img.get_pixel(50, 50), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(90, 90), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_crop_pixels_clamped_to_raster() {
        let crop = NormRect::new(0.5, 0.5, 0.6, 0.6);
        let (cx, cy, cw, ch) = crop_pixels(&crop, 100, 100);
        assert_eq!((cx, cy), (50, 50));
        assert!(cx + cw <= 100);
        assert!(cy + ch <= 100);
    }

    #[test]
    fn test_full_page_crop_dimensions() {
        let (cx, cy, cw, ch) = crop_pixels(&NormRect::full_page(), 300, 150);
        assert_eq!((cx, cy, cw, ch), (0, 0, 300, 150));
    }
}
