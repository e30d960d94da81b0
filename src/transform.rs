// Pure per-frame transform: clockwise rotation first, then a crop applied
// in post-rotation coordinates. Always allocates a fresh buffer.

use image::{GrayImage, imageops};

use crate::error::{OctExtractError, Result};
use crate::scan::Frame;

/// Clockwise rotation, restricted to the four orientations the scanners
/// produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Parse a rotation from whole degrees. Any value other than
    /// 0/90/180/270 is rejected.
    pub fn from_degrees(degrees: u32) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::R0),
            90 => Ok(Rotation::R90),
            180 => Ok(Rotation::R180),
            270 => Ok(Rotation::R270),
            other => Err(OctExtractError::invalid_parameter(format!(
                "Rotation angle must be 0, 90, 180, or 270 degrees, got {other}"
            ))),
        }
    }

    /// Parse the UI-style label form, e.g. `"90°"` or `"270"`.
    pub fn parse(s: &str) -> Result<Self> {
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(OctExtractError::invalid_parameter(format!(
                "Rotation angle must be 0, 90, 180, or 270 degrees, got '{s}'"
            )));
        }
        let degrees: u32 = digits.parse().map_err(|_| {
            OctExtractError::invalid_parameter(format!("Invalid rotation value: '{s}'"))
        })?;
        Self::from_degrees(degrees)
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// The rotation that undoes this one (total 360°).
    pub fn inverse(&self) -> Self {
        match self {
            Rotation::R0 => Rotation::R0,
            Rotation::R90 => Rotation::R270,
            Rotation::R180 => Rotation::R180,
            Rotation::R270 => Rotation::R90,
        }
    }
}

/// Crop rectangle in post-rotation pixel coordinates, offsets from the
/// top-left corner of the rotated buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    pub top: u32,
    pub left: u32,
    pub width: u32,
    pub height: u32,
}

/// Rotate/crop parameters for one export run. Value object; `Default` is
/// the identity transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformParameters {
    pub rotation: Rotation,
    pub crop: Option<CropRect>,
}

/// Apply `params` to a frame, producing a new buffer. The input frame is
/// never mutated, which is what allows preview rendering to keep reading
/// the store while an export runs.
pub fn apply(frame: &Frame, params: &TransformParameters) -> Result<GrayImage> {
    let rotated = rotate(&frame.pixels, params.rotation);
    match params.crop {
        Some(crop) => crop_image(&rotated, crop),
        None => Ok(rotated),
    }
}

fn rotate(pixels: &GrayImage, rotation: Rotation) -> GrayImage {
    match rotation {
        Rotation::R0 => pixels.clone(),
        Rotation::R90 => imageops::rotate90(pixels),
        Rotation::R180 => imageops::rotate180(pixels),
        Rotation::R270 => imageops::rotate270(pixels),
    }
}

fn crop_image(pixels: &GrayImage, crop: CropRect) -> Result<GrayImage> {
    if crop.width == 0 || crop.height == 0 {
        return Err(OctExtractError::crop_out_of_bounds(format!(
            "Crop dimensions must be positive, got {}x{}",
            crop.width, crop.height
        )));
    }

    let right = crop.left.checked_add(crop.width);
    let bottom = crop.top.checked_add(crop.height);
    let in_bounds = matches!((right, bottom), (Some(r), Some(b))
        if r <= pixels.width() && b <= pixels.height());
    if !in_bounds {
        return Err(OctExtractError::crop_out_of_bounds(format!(
            "Crop region {}x{}+{}+{} exceeds image dimensions {}x{}",
            crop.width,
            crop.height,
            crop.left,
            crop.top,
            pixels.width(),
            pixels.height()
        )));
    }

    Ok(imageops::crop_imm(pixels, crop.left, crop.top, crop.width, crop.height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_degrees_rejects_invalid() {
        assert!(Rotation::from_degrees(45).is_err());
        assert!(Rotation::from_degrees(360).is_err());
    }

    #[test]
    fn test_rotation_parse_label_form() {
        assert_eq!(Rotation::parse("90°").unwrap(), Rotation::R90);
        assert_eq!(Rotation::parse("0").unwrap(), Rotation::R0);
        assert!(Rotation::parse("ninety").is_err());
    }

    #[test]
    fn test_rotation_inverse_totals_360() {
        for r in [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270] {
            assert_eq!((r.degrees() + r.inverse().degrees()) % 360, 0);
        }
    }
}
