pub mod dicom;

use std::io::Cursor;

use image::{GrayImage, ImageFormat};

use crate::error::Result;
use crate::export::ExportFormat;

/// Encode one transformed frame into the target format, in memory.
pub fn encode(pixels: &GrayImage, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Png => encode_with(pixels, ImageFormat::Png),
        ExportFormat::Jpeg => encode_with(pixels, ImageFormat::Jpeg),
        ExportFormat::Tiff => encode_with(pixels, ImageFormat::Tiff),
        ExportFormat::Dicom => dicom::encode_frame(pixels),
    }
}

fn encode_with(pixels: &GrayImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    pixels.write_to(&mut buf, format)?;
    Ok(buf.into_inner())
}
