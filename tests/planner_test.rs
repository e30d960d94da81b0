use std::collections::BTreeMap;
use std::path::Path;

use oct_extract::error::OctExtractError;
use oct_extract::export::planner::{PlanRequest, plan};
use oct_extract::export::{DuplicatePolicy, ExportFormat, NamingPolicy};
use oct_extract::transform::TransformParameters;

fn stems_for(selection: &[usize], stem: &str) -> BTreeMap<usize, String> {
    selection.iter().map(|&i| (i, stem.to_string())).collect()
}

fn request<'a>(
    selection: &'a [usize],
    output_dir: &'a Path,
    naming: NamingPolicy,
    duplicate_policy: DuplicatePolicy,
    base_stems: &'a BTreeMap<usize, String>,
) -> PlanRequest<'a> {
    PlanRequest {
        selection,
        output_dir,
        format: ExportFormat::Png,
        naming,
        duplicate_policy,
        transform: TransformParameters::default(),
        base_stems,
    }
}

// ============================================================
// 1. Filename construction
// ============================================================

#[test]
fn test_original_name_plus_index_with_min_padding() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let selection = [0, 7];
    let stems = stems_for(&selection, "retina");

    let plan = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::Overwrite,
        &stems,
    ))
    .unwrap();

    let names: Vec<&str> = plan.items.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(names, vec!["retina_000.png", "retina_007.png"]);
}

#[test]
fn test_padding_grows_with_max_selected_index() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let selection = [3, 1200];
    let stems = stems_for(&selection, "retina");

    let plan = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::Overwrite,
        &stems,
    ))
    .unwrap();

    let names: Vec<&str> = plan.items.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(names, vec!["retina_0003.png", "retina_1200.png"]);
}

#[test]
fn test_custom_prefix_naming() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let selection = [2];
    let stems = stems_for(&selection, "retina");

    let plan = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::CustomPrefix("macula".to_string()),
        DuplicatePolicy::Overwrite,
        &stems,
    ))
    .unwrap();

    assert_eq!(plan.items[0].file_name, "macula_002.png");
}

// ============================================================
// 2. Duplicate policies
// ============================================================

#[test]
fn test_overwrite_keeps_colliding_name() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("a_001.png"), b"existing").unwrap();
    let selection = [1];
    let stems = stems_for(&selection, "a");

    let plan = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::Overwrite,
        &stems,
    ))
    .unwrap();

    assert_eq!(plan.items[0].file_name, "a_001.png");
    assert!(plan.skipped.is_empty());
}

#[test]
fn test_skip_omits_item_from_plan() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("a_001.png"), b"existing").unwrap();
    let selection = [1, 2];
    let stems = stems_for(&selection, "a");

    let plan = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::Skip,
        &stems,
    ))
    .unwrap();

    let planned: Vec<&str> = plan.items.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(planned, vec!["a_002.png"]);
    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].frame_index, 1);
    assert_eq!(plan.skipped[0].file_name, "a_001.png");
}

#[test]
fn test_auto_rename_picks_lowest_unused_suffix() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("a_001.png"), b"existing").unwrap();
    std::fs::write(dir.path().join("a_001_1.png"), b"existing").unwrap();
    let selection = [1];
    let stems = stems_for(&selection, "a");

    let plan = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::AutoRename,
        &stems,
    ))
    .unwrap();

    assert_eq!(plan.items[0].file_name, "a_001_2.png");
}

#[test]
fn test_auto_rename_does_not_consume_names() {
    // Renaming claims names only within one plan; with the filesystem
    // unchanged, replanning resolves to the same renamed output.
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("scan_001.png"), b"existing").unwrap();
    let selection = [1];
    let stems = stems_for(&selection, "scan");

    let first = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::AutoRename,
        &stems,
    ))
    .unwrap();
    assert_eq!(first.items[0].file_name, "scan_001_1.png");

    // Without writing anything, a second plan of the same selection claims
    // the same name again (plan is pure, filesystem unchanged).
    let second = plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::AutoRename,
        &stems,
    ))
    .unwrap();
    assert_eq!(second.items[0].file_name, "scan_001_1.png");
}

// ============================================================
// 3. Determinism and validation
// ============================================================

#[test]
fn test_plan_is_deterministic_for_fixed_inputs() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("scan_002.png"), b"existing").unwrap();
    let selection = [0, 2, 5];
    let stems = stems_for(&selection, "scan");

    let make = || {
        plan(&request(
            &selection,
            dir.path(),
            NamingPolicy::OriginalNamePlusIndex,
            DuplicatePolicy::AutoRename,
            &stems,
        ))
        .unwrap()
    };

    let first = make();
    let second = make();
    let names = |p: &oct_extract::export::ExportPlan| {
        p.items
            .iter()
            .map(|i| (i.frame_index, i.file_name.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn test_missing_output_directory_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let missing = dir.path().join("does_not_exist");
    let selection = [0];
    let stems = stems_for(&selection, "scan");

    let result = plan(&request(
        &selection,
        &missing,
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::Overwrite,
        &stems,
    ));
    assert!(matches!(
        result,
        Err(OctExtractError::InvalidOutputDirectory(_))
    ));
}

#[test]
fn test_file_as_output_directory_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let file_path = dir.path().join("not_a_dir");
    std::fs::write(&file_path, b"file").unwrap();
    let selection = [0];
    let stems = stems_for(&selection, "scan");

    let result = plan(&request(
        &selection,
        &file_path,
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::Overwrite,
        &stems,
    ));
    assert!(matches!(
        result,
        Err(OctExtractError::InvalidOutputDirectory(_))
    ));
}

#[test]
fn test_planning_writes_nothing() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let selection = [0, 1, 2];
    let stems = stems_for(&selection, "scan");

    plan(&request(
        &selection,
        dir.path(),
        NamingPolicy::OriginalNamePlusIndex,
        DuplicatePolicy::AutoRename,
        &stems,
    ))
    .unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(entries.is_empty(), "planner must not leave files behind");
}
