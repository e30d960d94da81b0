pub mod job_runner;
pub mod orchestrator;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::export::executor::{self, CancelToken, ItemObserver};
use crate::export::planner::{self, PlanRequest};
use crate::export::{BatchReport, DuplicatePolicy, ExportFormat, NamingPolicy};
use crate::selection::SelectionSet;
use crate::store::FrameStore;
use crate::transform::TransformParameters;

/// Plan and execute one export run against a loaded document.
///
/// Parameter validation (output directory, name resolution) happens before
/// any write; per-item failures during execution are contained in the
/// returned report.
#[allow(clippy::too_many_arguments)]
pub fn export(
    store: &FrameStore,
    selection: &SelectionSet,
    output_dir: &Path,
    format: ExportFormat,
    naming: NamingPolicy,
    duplicate_policy: DuplicatePolicy,
    transform: TransformParameters,
    cancel: &CancelToken,
    observer: Option<ItemObserver<'_>>,
) -> Result<BatchReport> {
    let indices = selection.indices();
    let stem = store.source_stem();
    let base_stems: BTreeMap<usize, String> =
        indices.iter().map(|&i| (i, stem.clone())).collect();

    let plan = planner::plan(&PlanRequest {
        selection: &indices,
        output_dir,
        format,
        naming,
        duplicate_policy,
        transform,
        base_stems: &base_stems,
    })?;

    Ok(executor::execute(&plan, store, cancel, observer))
}
