use std::path::{Path, PathBuf};
use std::process::ExitCode;

use oct_extract::config::job::JobFile;
use oct_extract::config::merged::MergedConfig;
use oct_extract::config::{self};
use oct_extract::export::NamingPolicy;
use oct_extract::pipeline::job_runner::JobConfig;
use oct_extract::pipeline::orchestrator::run_all_jobs;
use oct_extract::preset::PresetStore;
use oct_extract::scan::{self, reader};
use oct_extract::transform::{Rotation, TransformParameters};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: oct_extract <jobs.yaml>...");
        eprintln!("       oct_extract --list <scan-file>");
        eprintln!("  Export frames from ophthalmology scan files per job specifications.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("oct_extract {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    if args[0] == "--list" {
        let Some(scan_file) = args.get(1) else {
            eprintln!("ERROR: --list requires a scan file argument");
            return ExitCode::FAILURE;
        };
        return list_frames(Path::new(scan_file));
    }

    // Collect job configs from all job files.
    let mut job_configs: Vec<JobConfig> = Vec::new();

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        // Load settings from the same directory as the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Read and parse the job YAML file.
        let yaml_content = match std::fs::read_to_string(job_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file: JobFile = match serde_yml::from_str(&yaml_content) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Resolve job file directory for relative paths.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        // Merge settings with each job and construct JobConfig.
        for job in &job_file.jobs {
            let merged = MergedConfig::new(&settings, job);

            let input_path = resolve_path(&job_dir, &job.input);
            let output_dir = resolve_path(&job_dir, &job.output_dir);

            let rotation = match job.rotation.map(Rotation::from_degrees).transpose() {
                Ok(r) => r.unwrap_or_default(),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    return ExitCode::FAILURE;
                }
            };

            // Explicit crop wins; otherwise look up the named preset.
            let crop = match (&job.crop, &job.preset) {
                (Some(crop), _) => Some(*crop),
                (None, Some(preset_name)) => {
                    let preset_path = resolve_path(&job_dir, &merged.preset_file.to_string_lossy());
                    let store = match PresetStore::load(&preset_path) {
                        Ok(s) => s,
                        Err(e) => {
                            eprintln!("ERROR: Failed to load presets from {}: {e}", preset_path.display());
                            return ExitCode::FAILURE;
                        }
                    };
                    match store.get(preset_name) {
                        Ok(preset) => Some(preset.crop),
                        Err(e) => {
                            eprintln!("ERROR: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                }
                (None, None) => None,
            };

            let naming = match &job.prefix {
                Some(prefix) => NamingPolicy::CustomPrefix(prefix.clone()),
                None => NamingPolicy::OriginalNamePlusIndex,
            };

            job_configs.push(JobConfig {
                input_path,
                output_dir,
                frames: job.frames.clone(),
                format: merged.format,
                transform: TransformParameters { rotation, crop },
                naming,
                duplicate_policy: merged.on_duplicate,
                export_metadata: merged.export_metadata,
            });
        }
    }

    // Run all jobs through the pipeline.
    let results = run_all_jobs(&job_configs);

    // Report per-job outcomes.
    let mut has_error = false;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(job_result) => {
                let report = &job_result.report;
                eprintln!(
                    "{}: {} -> {} ({} written, {} skipped, {} failed)",
                    if report.is_success() { "OK" } else { "ERROR" },
                    job_result.input_path.display(),
                    job_result.output_dir.display(),
                    report.written(),
                    report.skipped(),
                    report.failed()
                );
                for item in &report.results {
                    if let oct_extract::export::ItemStatus::Failed(reason) = &item.status {
                        eprintln!("  FAILED frame {}: {reason}", item.frame_index);
                    }
                }
                if !report.is_success() {
                    has_error = true;
                }
            }
            Err(e) => {
                eprintln!(
                    "ERROR: {} -> {}: {e}",
                    job_configs[i].input_path.display(),
                    job_configs[i].output_dir.display()
                );
                has_error = true;
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Print frame summaries and document metadata for one scan file.
fn list_frames(path: &Path) -> ExitCode {
    let document = match reader::load(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    for summary in scan::list_frames(&document) {
        println!("frame {:>4}  {}x{}", summary.index, summary.width, summary.height);
    }
    if document.fundus.is_some() {
        println!("fundus image present");
    }
    for (key, value) in &document.metadata {
        println!("{key}: {value}");
    }
    ExitCode::SUCCESS
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
