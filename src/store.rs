use std::collections::BTreeMap;

use crate::error::{OctExtractError, Result};
use crate::scan::{Frame, FundusImage, ScanDocument};

/// Read-only holder for the decoded frames and metadata of one imported
/// document. Frames are immutable after construction, so a preview renderer
/// and an export run may read the same store concurrently without locking.
pub struct FrameStore {
    document: ScanDocument,
}

impl FrameStore {
    pub fn new(document: ScanDocument) -> Self {
        Self { document }
    }

    /// Frames in acquisition order (iteration order == index order).
    pub fn frames(&self) -> &[Frame] {
        &self.document.frames
    }

    pub fn frame_count(&self) -> usize {
        self.document.frames.len()
    }

    pub fn frame_at(&self, index: usize) -> Result<&Frame> {
        self.document.frames.get(index).ok_or_else(|| {
            OctExtractError::index_out_of_range(format!(
                "frame {} out of range (document has {} frames)",
                index,
                self.document.frames.len()
            ))
        })
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.document.metadata
    }

    pub fn fundus(&self) -> Option<&FundusImage> {
        self.document.fundus.as_ref()
    }

    /// Source file stem, used for `OriginalNamePlusIndex` naming.
    pub fn source_stem(&self) -> String {
        self.document.source_stem()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::FormatKind;
    use image::GrayImage;
    use std::path::PathBuf;

    fn store_with_frames(n: usize) -> FrameStore {
        let frames = (0..n)
            .map(|index| Frame {
                index,
                pixels: GrayImage::new(4, 2),
            })
            .collect();
        FrameStore::new(ScanDocument {
            source_path: PathBuf::from("retina.dcm"),
            kind: FormatKind::Dicom,
            frames,
            fundus: None,
            metadata: BTreeMap::new(),
        })
    }

    #[test]
    fn test_frame_at_valid_index() {
        let store = store_with_frames(3);
        assert_eq!(store.frame_count(), 3);
        assert_eq!(store.frame_at(2).unwrap().index, 2);
    }

    #[test]
    fn test_frame_at_out_of_range() {
        let store = store_with_frames(3);
        assert!(matches!(
            store.frame_at(3),
            Err(OctExtractError::IndexOutOfRange(_))
        ));
    }

    #[test]
    fn test_frames_in_index_order() {
        let store = store_with_frames(5);
        let order: Vec<usize> = store.frames().iter().map(|f| f.index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_source_stem() {
        let store = store_with_frames(1);
        assert_eq!(store.source_stem(), "retina");
    }
}
