pub mod executor;
pub mod planner;

use std::path::PathBuf;

use serde::Deserialize;

use crate::transform::TransformParameters;

/// Output image format for exported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Tiff,
    Dicom,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Tiff => "tiff",
            ExportFormat::Dicom => "dcm",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Tiff => "TIFF",
            ExportFormat::Dicom => "DICOM",
        }
    }
}

/// How exported files are named. Either policy appends the zero-padded
/// frame index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `{source stem}_{index}`.
    OriginalNamePlusIndex,
    /// `{prefix}_{index}`.
    CustomPrefix(String),
}

/// What to do when a planned output filename already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    Overwrite,
    Skip,
    #[serde(rename = "rename", alias = "unique")]
    AutoRename,
}

/// One fully resolved, not-yet-executed output file. `file_name` is
/// relative to the plan's output directory.
#[derive(Debug, Clone)]
pub struct ExportPlanItem {
    pub frame_index: usize,
    pub file_name: String,
    pub format: ExportFormat,
    pub transform: TransformParameters,
}

/// A selected frame dropped at plan time under the `Skip` policy. Carried
/// separately so the executor can report it as `Skipped`, not `Failed`.
#[derive(Debug, Clone)]
pub struct SkippedItem {
    pub frame_index: usize,
    pub file_name: String,
}

/// Concrete write plan for one export run. Generated fresh per run, never
/// persisted.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub output_dir: PathBuf,
    pub items: Vec<ExportPlanItem>,
    pub skipped: Vec<SkippedItem>,
}

/// Why a single plan item failed. Failures are contained per item and
/// never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The plan referenced a frame index the store does not hold.
    FrameLookup(String),
    Transform(String),
    Encode(String),
    Io(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::FrameLookup(msg) => write!(f, "frame lookup: {msg}"),
            FailureReason::Transform(msg) => write!(f, "transform: {msg}"),
            FailureReason::Encode(msg) => write!(f, "encode: {msg}"),
            FailureReason::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

/// Final state of one item after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Written,
    Skipped,
    Failed(FailureReason),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ItemResult {
    pub frame_index: usize,
    pub file_name: String,
    pub status: ItemStatus,
}

/// Aggregate outcome of an export run: one result per planned or skipped
/// item, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<ItemResult>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Written))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Cancelled))
    }

    /// True when every item ended `Written` or `Skipped`.
    pub fn is_success(&self) -> bool {
        self.results
            .iter()
            .all(|r| matches!(r.status, ItemStatus::Written | ItemStatus::Skipped))
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}
