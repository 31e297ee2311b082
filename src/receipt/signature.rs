use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use printpdf::image_crate::{self, DynamicImage, Rgb, RgbImage};

use super::ReceiptError;

/// Decode the payload of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(value: &str) -> Result<Vec<u8>, ReceiptError> {
    let (_, payload) = value
        .split_once(',')
        .ok_or_else(|| ReceiptError::Signature("missing data-URL separator".to_string()))?;

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| ReceiptError::Signature(e.to_string()))
}

/// Decode a signature data URL into an image flattened onto white.
pub fn signature_image(value: &str) -> Result<DynamicImage, ReceiptError> {
    let bytes = decode_data_url(value)?;
    let image = image_crate::load_from_memory(&bytes)
        .map_err(|e| ReceiptError::Signature(e.to_string()))?;
    Ok(flatten_on_white(&image))
}

/// Canvas signatures are transparent strokes; composite them over white so
/// they stay legible regardless of how the viewer treats alpha.
pub fn flatten_on_white(image: &DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    DynamicImage::ImageRgb8(out)
}
