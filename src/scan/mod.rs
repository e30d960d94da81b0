pub mod reader;

use std::collections::BTreeMap;
use std::path::PathBuf;

use image::{GrayImage, RgbImage};

/// Vendor container kind, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Heidelberg,
    Zeiss,
    TopconFds,
    TopconFda,
    Bioptigen,
    Poct,
    Dicom,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Heidelberg => "heidelberg",
            FormatKind::Zeiss => "zeiss",
            FormatKind::TopconFds => "topcon-fds",
            FormatKind::TopconFda => "topcon-fda",
            FormatKind::Bioptigen => "bioptigen",
            FormatKind::Poct => "poct",
            FormatKind::Dicom => "dicom",
        }
    }
}

/// One exportable B-scan frame. `index` is the 0-based acquisition order,
/// unique within its document. The pixel buffer is never mutated after
/// decode; transforms always allocate a new buffer.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    pub pixels: GrayImage,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Surface photograph accompanying a scan volume. Not part of the frame
/// index domain.
#[derive(Debug, Clone)]
pub struct FundusImage {
    pub pixels: RgbImage,
}

/// Result of importing one scan container: the ordered B-scan frames,
/// an optional fundus photograph, and the patient/scan metadata mapping.
#[derive(Debug, Clone)]
pub struct ScanDocument {
    pub source_path: PathBuf,
    pub kind: FormatKind,
    pub frames: Vec<Frame>,
    pub fundus: Option<FundusImage>,
    pub metadata: BTreeMap<String, String>,
}

impl ScanDocument {
    /// Source file stem used for default export naming.
    pub fn source_stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scan".to_string())
    }
}

/// Per-frame summary for the headless `list_frames` operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FrameSummary {
    pub index: usize,
    pub width: u32,
    pub height: u32,
}

/// Summarize every frame of a document in index order.
pub fn list_frames(document: &ScanDocument) -> Vec<FrameSummary> {
    document
        .frames
        .iter()
        .map(|f| FrameSummary {
            index: f.index,
            width: f.width(),
            height: f.height(),
        })
        .collect()
}
