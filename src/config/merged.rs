use std::path::PathBuf;

use super::job::Job;
use super::settings::Settings;
use crate::export::{DuplicatePolicy, ExportFormat};

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub format: ExportFormat,
    pub on_duplicate: DuplicatePolicy,
    pub export_metadata: bool,
    pub preset_file: PathBuf,
}

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    pub fn new(settings: &Settings, job: &Job) -> Self {
        MergedConfig {
            format: job.format.unwrap_or(settings.format),
            on_duplicate: job.on_duplicate.unwrap_or(settings.on_duplicate),
            export_metadata: job.export_metadata.unwrap_or(settings.export_metadata),
            preset_file: settings.preset_file.clone(),
        }
    }
}
