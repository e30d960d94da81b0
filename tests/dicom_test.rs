use std::collections::BTreeMap;

use image::{GrayImage, Luma};

use oct_extract::codec::dicom::{encode_frame, read_document, write_document};
use oct_extract::scan::FormatKind;

fn gradient(width: u32, height: u32, seed: u8) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([seed.wrapping_add((x + y * width) as u8)])
    })
}

#[test]
fn test_single_frame_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("frame.dcm");
    let pixels = gradient(16, 8, 3);

    std::fs::write(&path, encode_frame(&pixels).unwrap()).unwrap();
    let document = read_document(&path).unwrap();

    assert_eq!(document.kind, FormatKind::Dicom);
    assert_eq!(document.frames.len(), 1);
    let frame = &document.frames[0];
    assert_eq!((frame.width(), frame.height()), (16, 8));
    assert_eq!(frame.pixels.as_raw(), pixels.as_raw());
}

#[test]
fn test_multi_frame_round_trip_preserves_order() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("volume.dcm");
    let frames: Vec<GrayImage> = (0..4u8).map(|i| gradient(12, 6, i * 40)).collect();

    write_document(&path, &frames, &BTreeMap::new()).unwrap();
    let document = read_document(&path).unwrap();

    assert_eq!(document.frames.len(), 4);
    for (i, frame) in document.frames.iter().enumerate() {
        assert_eq!(frame.index, i, "frames keep acquisition order");
        assert_eq!(frame.pixels.as_raw(), frames[i].as_raw());
    }
}

#[test]
fn test_patient_metadata_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("patient.dcm");
    let mut metadata = BTreeMap::new();
    metadata.insert("patient_name".to_string(), "Doe^Jane".to_string());
    metadata.insert("patient_id".to_string(), "OCT-0042".to_string());

    write_document(&path, &[gradient(8, 8, 0)], &metadata).unwrap();
    let document = read_document(&path).unwrap();

    assert_eq!(
        document.metadata.get("patient_name").map(String::as_str),
        Some("Doe^Jane")
    );
    assert_eq!(
        document.metadata.get("patient_id").map(String::as_str),
        Some("OCT-0042")
    );
}

#[test]
fn test_odd_pixel_count_is_padded_and_restored() {
    // 5x3 = 15 bytes, forcing the even-length pad path.
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("odd.dcm");
    let pixels = gradient(5, 3, 9);

    std::fs::write(&path, encode_frame(&pixels).unwrap()).unwrap();
    let document = read_document(&path).unwrap();
    assert_eq!(document.frames[0].pixels.as_raw(), pixels.as_raw());
}

#[test]
fn test_read_rejects_garbage_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("garbage.dcm");
    std::fs::write(&path, b"definitely not dicom").unwrap();
    assert!(read_document(&path).is_err());
}
