//! Shared image fixtures for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage};

/// Smooth colour blobs: an 8x8 grid of seeded colours stretched to size.
///
/// Every low-frequency component carries energy, so the hash bits sit far
/// from the median and survive recompression and resizing.
pub fn blob_image(width: u32, height: u32, seed: u64) -> DynamicImage {
    let grid: RgbImage = ImageBuffer::from_fn(8, 8, |x, y| {
        let v = mix(seed ^ u64::from(y * 8 + x).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Rgb([(v & 0xFF) as u8, ((v >> 8) & 0xFF) as u8, ((v >> 16) & 0xFF) as u8])
    });
    DynamicImage::ImageRgb8(imageops::resize(&grid, width, height, FilterType::Triangle))
}

/// The logo most tests share between domains.
pub fn brand_image(width: u32, height: u32) -> DynamicImage {
    blob_image(width, height, 0xB1A5_7ED0)
}

fn mix(mut v: u64) -> u64 {
    v ^= v >> 33;
    v = v.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    v ^= v >> 33;
    v = v.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    v ^ (v >> 33)
}

/// Blocky pseudo-random pattern; different seeds give unrelated images.
pub fn noise_image(size: u32, seed: u64) -> DynamicImage {
    let img: RgbImage = ImageBuffer::from_fn(size, size, |x, y| {
        let cell = u64::from((y / 8) * 1024 + x / 8);
        let v = mix(seed ^ cell.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Rgb([(v & 0xFF) as u8, ((v >> 8) & 0xFF) as u8, ((v >> 16) & 0xFF) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .expect("Image encoding failed");
    buffer.into_inner()
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

/// Write `image` as `{dir}/{file_name}` in the format implied by the name.
pub fn write_asset(dir: &Path, file_name: &str, image: &DynamicImage) {
    image
        .save(dir.join(file_name))
        .expect("Failed to write asset");
}
