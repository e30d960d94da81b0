use serde::Deserialize;

use crate::export::{DuplicatePolicy, ExportFormat};
use crate::transform::CropRect;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub input: String,
    pub output_dir: String,
    /// 1-based frame selection; omitted means all frames.
    #[serde(default, deserialize_with = "deserialize_frames")]
    pub frames: Option<Vec<u32>>,
    pub format: Option<ExportFormat>,
    /// Whole degrees: 0, 90, 180, or 270.
    pub rotation: Option<u32>,
    pub crop: Option<CropRect>,
    /// Name of a saved crop preset. An explicit `crop` wins over this.
    pub preset: Option<String>,
    pub on_duplicate: Option<DuplicatePolicy>,
    /// Custom filename prefix; omitted means source stem + index naming.
    pub prefix: Option<String>,
    pub export_metadata: Option<bool>,
}

/// フレーム範囲文字列をパースしてフレーム番号のベクタに変換する。
///
/// 形式:
/// - 単一フレーム: `"5"`
/// - 範囲: `"5-10"` (5, 6, 7, 8, 9, 10)
/// - 混合（カンマ区切り）: `"1, 3, 5-10, 15"`
///
/// 結果はソート済み・重複なし。番号は1始まり。
pub fn parse_frame_range(s: &str) -> crate::error::Result<Vec<u32>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(crate::error::OctExtractError::config(
            "Frame range cannot be empty",
        ));
    }

    let mut frames = Vec::new();

    for part in trimmed.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = part.split_once('-') {
            let start: u32 = start_str.trim().parse().map_err(|_| {
                crate::error::OctExtractError::config(format!(
                    "Invalid frame number in range: '{start_str}'"
                ))
            })?;
            let end: u32 = end_str.trim().parse().map_err(|_| {
                crate::error::OctExtractError::config(format!(
                    "Invalid frame number in range: '{end_str}'"
                ))
            })?;

            if start > end {
                return Err(crate::error::OctExtractError::config(format!(
                    "Invalid frame range: start ({start}) > end ({end})"
                )));
            }

            for frame in start..=end {
                frames.push(frame);
            }
        } else {
            let frame: u32 = part.parse().map_err(|_| {
                crate::error::OctExtractError::config(format!("Invalid frame number: '{part}'"))
            })?;
            frames.push(frame);
        }
    }

    if frames.is_empty() {
        return Err(crate::error::OctExtractError::config(
            "Frame range resolved to empty set",
        ));
    }

    if frames.contains(&0) {
        return Err(crate::error::OctExtractError::config(
            "Frame numbers are 1-based; 0 is not a valid frame",
        ));
    }

    frames.sort();
    frames.dedup();
    Ok(frames)
}

/// serdeのdeserialize_withで使用するフレーム範囲デシリアライザ
fn deserialize_frames<'de, D>(deserializer: D) -> Result<Option<Vec<u32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) => parse_frame_range(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
