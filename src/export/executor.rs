// Plan execution: transform -> encode -> atomic write per item, with
// per-item failure isolation. One bad frame or unwritable path degrades
// that single result, never the batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::export::{
    BatchReport, ExportPlan, ExportPlanItem, FailureReason, ItemResult, ItemStatus,
};
use crate::store::FrameStore;
use crate::transform;

/// Cooperative cancellation signal, checked between plan items (never
/// mid-item). Cloneable so a front end can keep one end while the export
/// thread holds the other.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-item completion observer, invoked as each result is produced.
/// Front ends use this for progress display.
pub type ItemObserver<'a> = &'a mut dyn FnMut(&ItemResult);

/// Walk the plan in order, producing exactly one result per planned or
/// skipped item.
///
/// Skipped items forwarded from planning are reported first. On
/// cancellation, already-written files remain and every unprocessed item is
/// reported `Cancelled`.
pub fn execute(
    plan: &ExportPlan,
    store: &FrameStore,
    cancel: &CancelToken,
    mut observer: Option<ItemObserver<'_>>,
) -> BatchReport {
    let mut report = BatchReport::default();

    for skipped in &plan.skipped {
        push_result(
            &mut report,
            &mut observer,
            ItemResult {
                frame_index: skipped.frame_index,
                file_name: skipped.file_name.clone(),
                status: ItemStatus::Skipped,
            },
        );
    }

    let mut cancelled = false;
    for item in &plan.items {
        if !cancelled && cancel.is_cancelled() {
            info!("export cancelled, remaining items not attempted");
            cancelled = true;
        }

        let status = if cancelled {
            ItemStatus::Cancelled
        } else {
            match execute_item(plan, store, item) {
                Ok(()) => ItemStatus::Written,
                Err(reason) => {
                    warn!(frame = item.frame_index, file = %item.file_name, %reason, "item failed");
                    ItemStatus::Failed(reason)
                }
            }
        };

        push_result(
            &mut report,
            &mut observer,
            ItemResult {
                frame_index: item.frame_index,
                file_name: item.file_name.clone(),
                status,
            },
        );
    }

    info!(
        written = report.written(),
        skipped = report.skipped(),
        failed = report.failed(),
        cancelled = report.cancelled(),
        "export run complete"
    );
    report
}

fn push_result(report: &mut BatchReport, observer: &mut Option<ItemObserver<'_>>, result: ItemResult) {
    if let Some(observe) = observer.as_mut() {
        observe(&result);
    }
    report.results.push(result);
}

/// Transform, encode, then publish atomically: the encoded bytes go to a
/// temporary name first and are renamed into place on success, so a failed
/// item never leaves a partial file.
fn execute_item(
    plan: &ExportPlan,
    store: &FrameStore,
    item: &ExportPlanItem,
) -> std::result::Result<(), FailureReason> {
    let frame = store
        .frame_at(item.frame_index)
        .map_err(|e| FailureReason::FrameLookup(e.to_string()))?;

    let pixels =
        transform::apply(frame, &item.transform).map_err(|e| FailureReason::Transform(e.to_string()))?;

    let encoded = crate::codec::encode(&pixels, item.format)
        .map_err(|e| FailureReason::Encode(e.to_string()))?;

    let final_path = plan.output_dir.join(&item.file_name);
    let tmp_path = plan.output_dir.join(format!("{}.tmp", item.file_name));

    if let Err(e) = std::fs::write(&tmp_path, &encoded) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(FailureReason::Io(e.to_string()));
    }
    if let Err(e) = std::fs::rename(&tmp_path, &final_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(FailureReason::Io(e.to_string()));
    }

    info!(frame = item.frame_index, file = %item.file_name, "written");
    Ok(())
}
