//! The fixed enhancement chain: crop, pad, brightness, contrast, saturation,
//! sharpen, JPEG encode.
//!
//! The colour adjustments are lookup-table / HSL operations on 8-bit RGB so a
//! given input always produces the same output bytes.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, ImageReader, Rgb, RgbImage};
use std::io::Cursor;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};

/// MIME type of the encoder output.
pub const OUTPUT_MIME: &str = "image/jpeg";

/// Output of [`Enhancer::enhance`].
#[derive(Debug, Clone)]
pub struct EnhancedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Applies the enhancement chain with the configured parameters.
#[derive(Debug, Clone)]
pub struct Enhancer {
    config: ProcessingConfig,
}

impl Enhancer {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Decode `bytes`, run the chain and re-encode as JPEG.
    ///
    /// `origin` only labels decode errors.
    pub fn enhance(&self, bytes: &[u8], origin: &str) -> PipelineResult<EnhancedImage> {
        let img = decode(bytes, origin)?;
        let img = self.apply(img);
        let (width, height) = img.dimensions();
        let bytes = encode_jpeg(&img, self.config.jpeg_quality)?;
        Ok(EnhancedImage {
            bytes,
            width,
            height,
        })
    }

    /// Run every pixel transform, in order, on a decoded image.
    pub fn apply(&self, img: RgbImage) -> RgbImage {
        let c = &self.config;
        let mut img = crop_and_pad(&img, c.crop_bottom);
        apply_lut(&mut img, &brightness_lut(c.brightness));
        apply_lut(&mut img, &contrast_lut(c.contrast));
        adjust_saturation(&mut img, c.saturation);
        sharpen(&img, c.sharpen_sigma)
    }
}

fn decode(bytes: &[u8], origin: &str) -> PipelineResult<RgbImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            url: origin.to_string(),
            message: format!("Cannot detect image format: {e}"),
        })?;
    let img = reader.decode().map_err(|e| PipelineError::Decode {
        url: origin.to_string(),
        message: e.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Encode as baseline JPEG at `quality`.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> PipelineResult<Vec<u8>> {
    let mut buffer = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
        .map_err(|e| PipelineError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Drop the bottom `band` rows and paste the rest onto a black canvas of the
/// original size, so the band comes back black.
pub fn crop_and_pad(img: &RgbImage, band: u32) -> RgbImage {
    let (width, height) = img.dimensions();
    let keep = height.saturating_sub(band);
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    if keep > 0 {
        let cropped = imageops::crop_imm(img, 0, 0, width, keep).to_image();
        imageops::replace(&mut canvas, &cropped, 0, 0);
    }
    canvas
}

fn clamp_u8(v: f64) -> u8 {
    (v.clamp(0.0, 255.0) + 0.5) as u8
}

/// Lookup table shifting every channel by `percentage` of full scale.
pub fn brightness_lut(percentage: f32) -> [u8; 256] {
    let shift = 255.0 * f64::from(percentage.clamp(-100.0, 100.0)) / 100.0;
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = clamp_u8(i as f64 + shift);
    }
    lut
}

/// Lookup table stretching channels away from (or toward) mid-grey.
pub fn contrast_lut(percentage: f32) -> [u8; 256] {
    let v = (100.0 + f64::from(percentage.clamp(-100.0, 100.0))) / 100.0;
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let x = i as f64 / 255.0 - 0.5;
        *slot = if (0.0..=1.0).contains(&v) {
            clamp_u8((0.5 + x * v) * 255.0)
        } else if v < 2.0 {
            clamp_u8((0.5 + x * (1.0 / (2.0 - v))) * 255.0)
        } else {
            // +100%: hard threshold at mid-grey
            if i as f64 / 255.0 + 0.5 >= 1.0 {
                255
            } else {
                0
            }
        };
    }
    lut
}

fn apply_lut(img: &mut RgbImage, lut: &[u8; 256]) {
    for pixel in img.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = lut[usize::from(*channel)];
        }
    }
}

/// Scale HSL saturation by `1 + percentage / 100`, capped at fully saturated.
pub fn adjust_saturation(img: &mut RgbImage, percentage: f32) {
    let multiplier = 1.0 + f64::from(percentage.clamp(-100.0, 500.0)) / 100.0;
    if (multiplier - 1.0).abs() < f64::EPSILON {
        return;
    }
    for pixel in img.pixels_mut() {
        let [r, g, b] = pixel.0;
        let (h, s, l) = rgb_to_hsl(r, g, b);
        pixel.0 = hsl_to_rgb(h, (s * multiplier).min(1.0), l);
    }
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let mut h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    h /= 6.0;
    (h, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s == 0.0 {
        let v = clamp_u8(l * 255.0);
        return [v, v, v];
    }
    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    [
        clamp_u8(hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0),
        clamp_u8(hue_to_channel(p, q, h) * 255.0),
        clamp_u8(hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0),
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Unsharp mask with a zero threshold. A non-positive `sigma` is a no-op.
pub fn sharpen(img: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 {
        return img.clone();
    }
    imageops::unsharpen(img, sigma, 0)
}
