// Export planning: filename construction + deterministic duplicate
// resolution. Planning performs no writes and never touches pixel data;
// the only filesystem access is existence checks and the one up-front
// writability probe on the output directory.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{OctExtractError, Result};
use crate::export::{
    DuplicatePolicy, ExportFormat, ExportPlan, ExportPlanItem, NamingPolicy, SkippedItem,
};
use crate::transform::TransformParameters;

/// Inputs to one planning run.
pub struct PlanRequest<'a> {
    /// Selected frame indices, ascending.
    pub selection: &'a [usize],
    pub output_dir: &'a Path,
    pub format: ExportFormat,
    pub naming: NamingPolicy,
    pub duplicate_policy: DuplicatePolicy,
    pub transform: TransformParameters,
    /// Source-derived stem per frame index, used by
    /// [`NamingPolicy::OriginalNamePlusIndex`].
    pub base_stems: &'a BTreeMap<usize, String>,
}

/// Compute a concrete write plan for the selection.
///
/// Pure with respect to (selection, filesystem snapshot, naming, duplicate
/// policy): identical inputs yield identical plans. Name collisions are
/// checked against both the on-disk state and names claimed earlier in the
/// same plan, so two plan items can never target the same file.
pub fn plan(request: &PlanRequest<'_>) -> Result<ExportPlan> {
    validate_output_dir(request.output_dir)?;

    let pad = pad_width(request.selection);
    let mut claimed: HashSet<String> = HashSet::new();
    let mut items: Vec<ExportPlanItem> = Vec::new();
    let mut skipped: Vec<SkippedItem> = Vec::new();

    for &index in request.selection {
        let stem = match &request.naming {
            NamingPolicy::OriginalNamePlusIndex => request
                .base_stems
                .get(&index)
                .map(String::as_str)
                .unwrap_or("frame"),
            NamingPolicy::CustomPrefix(prefix) => prefix.as_str(),
        };
        let base = format!("{stem}_{index:0pad$}");
        let file_name = format!("{base}.{}", request.format.extension());

        let resolved = if !collides(&claimed, request.output_dir, &file_name) {
            file_name
        } else {
            match request.duplicate_policy {
                DuplicatePolicy::Overwrite => file_name,
                DuplicatePolicy::Skip => {
                    debug!(frame = index, file = %file_name, "duplicate, skipping");
                    skipped.push(SkippedItem {
                        frame_index: index,
                        file_name,
                    });
                    continue;
                }
                DuplicatePolicy::AutoRename => {
                    let unique = unique_name(
                        &base,
                        request.format.extension(),
                        &claimed,
                        request.output_dir,
                    );
                    debug!(frame = index, file = %unique, "duplicate, renamed");
                    unique
                }
            }
        };

        claimed.insert(resolved.clone());
        items.push(ExportPlanItem {
            frame_index: index,
            file_name: resolved,
            format: request.format,
            transform: request.transform,
        });
    }

    info!(
        dir = %request.output_dir.display(),
        planned = items.len(),
        skipped = skipped.len(),
        "export plan resolved"
    );

    Ok(ExportPlan {
        output_dir: request.output_dir.to_path_buf(),
        items,
        skipped,
    })
}

/// Zero-padding width for frame indices: digit count of the largest
/// selected index, but at least 3 for visual consistency.
fn pad_width(selection: &[usize]) -> usize {
    let max = selection.iter().copied().max().unwrap_or(0);
    let digits = max.checked_ilog10().map(|d| d as usize + 1).unwrap_or(1);
    digits.max(3)
}

/// A name collides when it exists on disk or was already claimed by an
/// earlier item in the same plan.
fn collides(claimed: &HashSet<String>, output_dir: &Path, name: &str) -> bool {
    claimed.contains(name) || output_dir.join(name).exists()
}

/// Lowest `_1`, `_2`, ... suffix that produces an unclaimed name.
fn unique_name(base: &str, ext: &str, claimed: &HashSet<String>, output_dir: &Path) -> String {
    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}_{counter}.{ext}");
        if !collides(claimed, output_dir, &candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// The output directory must already exist and be writable; checked once
/// before any name resolution. Metadata alone cannot establish writability
/// (permission bits miss read-only mounts and ACLs), so the check writes
/// and immediately removes a throwaway probe file. The plan itself still
/// creates no output files.
fn validate_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(OctExtractError::invalid_output_dir(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(OctExtractError::invalid_output_dir(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let probe = dir.join(format!(".oct_extract_probe_{}", std::process::id()));
    match std::fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            Ok(())
        }
        Err(e) => Err(OctExtractError::invalid_output_dir(format!(
            "Directory is not writable: {} ({e})",
            dir.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_width_minimum_three() {
        assert_eq!(pad_width(&[0]), 3);
        assert_eq!(pad_width(&[7, 42]), 3);
        assert_eq!(pad_width(&[]), 3);
    }

    #[test]
    fn test_pad_width_grows_with_max_index() {
        assert_eq!(pad_width(&[999]), 3);
        assert_eq!(pad_width(&[1000]), 4);
        assert_eq!(pad_width(&[3, 12345]), 5);
    }

    #[test]
    fn test_unique_name_picks_lowest_free_suffix() {
        let claimed: HashSet<String> =
            ["a_001_1.png".to_string(), "a_001_2.png".to_string()].into();
        assert_eq!(
            unique_name("a_001", "png", &claimed, Path::new("/nonexistent")),
            "a_001_3.png"
        );
    }
}
