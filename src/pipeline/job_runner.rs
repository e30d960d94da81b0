// ジョブ単位: スキャン読込 -> フレーム選択 -> プラン解決 -> エクスポート実行

use std::path::PathBuf;

use tracing::info;

use crate::error::{OctExtractError, Result};
use crate::export::executor::CancelToken;
use crate::export::{BatchReport, DuplicatePolicy, ExportFormat, NamingPolicy};
use crate::pipeline;
use crate::scan::reader;
use crate::selection::SelectionSet;
use crate::store::FrameStore;
use crate::transform::TransformParameters;

/// Configuration for a single export job.
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    /// 1-based frame numbers (from the job file); `None` selects all.
    pub frames: Option<Vec<u32>>,
    pub format: ExportFormat,
    pub transform: TransformParameters,
    pub naming: NamingPolicy,
    pub duplicate_policy: DuplicatePolicy,
    pub export_metadata: bool,
}

/// Result of processing a single job.
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub report: BatchReport,
}

/// Run one export job: load the document, resolve the selection, plan and
/// execute the batch, and optionally write the metadata sidecar.
pub fn run_job(config: &JobConfig) -> Result<JobResult> {
    let document = reader::load(&config.input_path)?;
    let store = FrameStore::new(document);
    let frame_count = store.frame_count();

    let mut selection = SelectionSet::new();
    match &config.frames {
        Some(frames) => {
            for &frame_num in frames {
                if frame_num == 0 {
                    return Err(OctExtractError::config(
                        "Frame numbers are 1-based; 0 is not a valid frame",
                    ));
                }
                if frame_num as usize > frame_count {
                    return Err(OctExtractError::config(format!(
                        "Frame {} out of range (document has {} frames)",
                        frame_num, frame_count
                    )));
                }
                selection.select(frame_num as usize - 1, frame_count)?;
            }
        }
        None => selection.select_all(frame_count),
    }

    info!(
        input = %config.input_path.display(),
        selected = selection.len(),
        format = config.format.as_str(),
        "starting export job"
    );

    let cancel = CancelToken::new();
    let report = pipeline::export(
        &store,
        &selection,
        &config.output_dir,
        config.format,
        config.naming.clone(),
        config.duplicate_policy,
        config.transform,
        &cancel,
        None,
    )?;

    if config.export_metadata && !store.metadata().is_empty() {
        write_metadata_sidecar(&store, &config.output_dir)?;
    }

    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_dir: config.output_dir.clone(),
        report,
    })
}

/// Write the document metadata next to the exported frames as
/// `{stem}_metadata.json`.
fn write_metadata_sidecar(store: &FrameStore, output_dir: &std::path::Path) -> Result<()> {
    let sidecar = output_dir.join(format!("{}_metadata.json", store.source_stem()));
    let json = serde_json::to_string_pretty(store.metadata())
        .map_err(|e| OctExtractError::encode(e.to_string()))?;
    std::fs::write(&sidecar, json.as_bytes())?;
    info!(file = %sidecar.display(), "wrote metadata sidecar");
    Ok(())
}
