// Scan container import boundary: extension-based format detection plus a
// reader seam for the external parsing library. Only the DICOM kind has a
// built-in decoder; vendor containers come through a `ScanReader`.

use std::path::Path;

use tracing::info;

use crate::error::{OctExtractError, Result};
use crate::scan::{FormatKind, ScanDocument};

/// External parsing collaborator. The GUI (or a test harness) supplies an
/// implementation backed by the real vendor decoding library.
pub trait ScanReader {
    fn load(&self, path: &Path, kind: FormatKind) -> Result<ScanDocument>;
}

/// Detect the container kind from the file extension, case-insensitive.
/// Returns `None` for unknown extensions.
pub fn detect_format(path: &Path) -> Option<FormatKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "e2e" => Some(FormatKind::Heidelberg),
        "img" => Some(FormatKind::Zeiss),
        "fds" => Some(FormatKind::TopconFds),
        "fda" => Some(FormatKind::TopconFda),
        "oct" => Some(FormatKind::Bioptigen),
        "poct" => Some(FormatKind::Poct),
        "dcm" => Some(FormatKind::Dicom),
        _ => None,
    }
}

/// Load a scan document using the built-in decoders.
///
/// DICOM files produced by this crate's own writer (and other uncompressed
/// 8-bit grayscale secondary captures) decode directly; every vendor kind
/// requires an external [`ScanReader`] and fails with `FormatError` here.
pub fn load(path: &Path) -> Result<ScanDocument> {
    let kind = detect_format(path).ok_or_else(|| {
        OctExtractError::format(format!("Unsupported file extension: {}", path.display()))
    })?;
    load_with(path, kind, None)
}

/// Load a scan document, preferring the supplied external reader for vendor
/// container kinds.
pub fn load_with(
    path: &Path,
    kind: FormatKind,
    reader: Option<&dyn ScanReader>,
) -> Result<ScanDocument> {
    if !path.is_file() {
        return Err(OctExtractError::format(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let document = match kind {
        FormatKind::Dicom => crate::codec::dicom::read_document(path)?,
        other => match reader {
            Some(r) => r.load(path, other)?,
            None => {
                return Err(OctExtractError::format(format!(
                    "No decoder available for {} container: {}",
                    other.as_str(),
                    path.display()
                )));
            }
        },
    };

    info!(
        path = %path.display(),
        kind = kind.as_str(),
        frames = document.frames.len(),
        "loaded scan document"
    );
    Ok(document)
}
