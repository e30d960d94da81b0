// Minimal DICOM secondary-capture codec: explicit VR little endian,
// MONOCHROME2, 8 bits per sample. Covers the DICOM export format and an
// import round trip for files this writer (or an equivalent uncompressed
// secondary capture) produced. Not a general DICOM implementation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use image::GrayImage;

use crate::error::{OctExtractError, Result};
use crate::scan::{FormatKind, Frame, ScanDocument};

const TRANSFER_SYNTAX_EXPLICIT_LE: &str = "1.2.840.10008.1.2.1";
const SOP_CLASS_SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";

/// UID root for generated SOP instance UIDs (freely usable test root).
const UID_ROOT: &str = "1.2.826.0.1.3680043.8.498";

/// Metadata keys mapped to patient-level DICOM attributes.
const KEY_PATIENT_NAME: &str = "patient_name";
const KEY_PATIENT_ID: &str = "patient_id";

/// Encode a single frame as a standalone secondary-capture file.
pub fn encode_frame(pixels: &GrayImage) -> Result<Vec<u8>> {
    encode(std::slice::from_ref(pixels), &BTreeMap::new())
}

/// Write a multi-frame document, carrying the patient metadata entries this
/// codec understands. Used by the headless harness to materialize fixtures.
pub fn write_document(
    path: &Path,
    frames: &[GrayImage],
    metadata: &BTreeMap<String, String>,
) -> Result<()> {
    let bytes = encode(frames, metadata)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn encode(frames: &[GrayImage], metadata: &BTreeMap<String, String>) -> Result<Vec<u8>> {
    let first = frames.first().ok_or_else(|| {
        OctExtractError::encode("DICOM encode requires at least one frame".to_string())
    })?;
    let (width, height) = (first.width(), first.height());
    if frames.iter().any(|f| f.width() != width || f.height() != height) {
        return Err(OctExtractError::encode(
            "All frames of a DICOM file must share dimensions".to_string(),
        ));
    }
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(OctExtractError::encode(format!(
            "Frame dimensions {width}x{height} exceed DICOM limits"
        )));
    }

    let instance_uid = new_uid();

    // File meta group, assembled first so its group length is known.
    let mut meta = Vec::new();
    put_long(&mut meta, 0x0002, 0x0001, b"OB", &[0x00, 0x01]);
    put_short(&mut meta, 0x0002, 0x0002, b"UI", &pad_uid(SOP_CLASS_SECONDARY_CAPTURE));
    put_short(&mut meta, 0x0002, 0x0003, b"UI", &pad_uid(&instance_uid));
    put_short(&mut meta, 0x0002, 0x0010, b"UI", &pad_uid(TRANSFER_SYNTAX_EXPLICIT_LE));

    let mut out = vec![0u8; 128];
    out.extend_from_slice(b"DICM");
    put_short(&mut out, 0x0002, 0x0000, b"UL", &(meta.len() as u32).to_le_bytes());
    out.extend_from_slice(&meta);

    // Main dataset, ascending tag order.
    put_short(&mut out, 0x0008, 0x0016, b"UI", &pad_uid(SOP_CLASS_SECONDARY_CAPTURE));
    put_short(&mut out, 0x0008, 0x0018, b"UI", &pad_uid(&instance_uid));
    put_short(&mut out, 0x0008, 0x0060, b"CS", &pad_text("OT"));
    if let Some(name) = metadata.get(KEY_PATIENT_NAME) {
        put_short(&mut out, 0x0010, 0x0010, b"PN", &pad_text(name));
    }
    if let Some(id) = metadata.get(KEY_PATIENT_ID) {
        put_short(&mut out, 0x0010, 0x0020, b"LO", &pad_text(id));
    }
    put_short(&mut out, 0x0028, 0x0002, b"US", &1u16.to_le_bytes());
    put_short(&mut out, 0x0028, 0x0004, b"CS", &pad_text("MONOCHROME2"));
    put_short(&mut out, 0x0028, 0x0008, b"IS", &pad_text(&frames.len().to_string()));
    put_short(&mut out, 0x0028, 0x0010, b"US", &(height as u16).to_le_bytes());
    put_short(&mut out, 0x0028, 0x0011, b"US", &(width as u16).to_le_bytes());
    put_short(&mut out, 0x0028, 0x0100, b"US", &8u16.to_le_bytes());
    put_short(&mut out, 0x0028, 0x0101, b"US", &8u16.to_le_bytes());
    put_short(&mut out, 0x0028, 0x0102, b"US", &7u16.to_le_bytes());
    put_short(&mut out, 0x0028, 0x0103, b"US", &0u16.to_le_bytes());

    let mut pixel_data: Vec<u8> = Vec::with_capacity((width * height) as usize * frames.len());
    for frame in frames {
        pixel_data.extend_from_slice(frame.as_raw());
    }
    if pixel_data.len() % 2 != 0 {
        pixel_data.push(0);
    }
    put_long(&mut out, 0x7FE0, 0x0010, b"OB", &pixel_data);

    Ok(out)
}

/// Read a document back from an uncompressed explicit-VR-LE grayscale file.
pub fn read_document(path: &Path) -> Result<ScanDocument> {
    let bytes = std::fs::read(path)?;
    let parsed = parse(&bytes)
        .map_err(|msg| OctExtractError::format(format!("{}: {msg}", path.display())))?;

    let frame_size = (parsed.rows as usize) * (parsed.columns as usize);
    let expected = frame_size
        .checked_mul(parsed.number_of_frames)
        .filter(|n| *n > 0 && *n <= parsed.pixel_data.len())
        .ok_or_else(|| {
            OctExtractError::format(format!(
                "{}: pixel data too short for {} frames of {}x{}",
                path.display(),
                parsed.number_of_frames,
                parsed.columns,
                parsed.rows
            ))
        })?;

    let frames = parsed.pixel_data[..expected]
        .chunks_exact(frame_size)
        .enumerate()
        .map(|(index, chunk)| {
            GrayImage::from_raw(parsed.columns as u32, parsed.rows as u32, chunk.to_vec())
                .map(|pixels| Frame { index, pixels })
                .ok_or_else(|| OctExtractError::format("pixel buffer size mismatch".to_string()))
        })
        .collect::<Result<Vec<Frame>>>()?;

    Ok(ScanDocument {
        source_path: path.to_path_buf(),
        kind: FormatKind::Dicom,
        frames,
        fundus: None,
        metadata: parsed.metadata,
    })
}

struct ParsedDataset {
    rows: u16,
    columns: u16,
    number_of_frames: usize,
    pixel_data: Vec<u8>,
    metadata: BTreeMap<String, String>,
}

/// VRs that use the 12-byte (reserved + 32-bit length) header form.
fn is_long_vr(vr: &[u8]) -> bool {
    matches!(vr, b"OB" | b"OW" | b"OF" | b"SQ" | b"UT" | b"UN")
}

fn parse(bytes: &[u8]) -> std::result::Result<ParsedDataset, String> {
    if bytes.len() < 132 || &bytes[128..132] != b"DICM" {
        return Err("not a DICOM file (missing DICM marker)".to_string());
    }

    let mut pos = 132usize;
    let mut rows: Option<u16> = None;
    let mut columns: Option<u16> = None;
    let mut number_of_frames = 1usize;
    let mut pixel_data: Option<Vec<u8>> = None;
    let mut metadata = BTreeMap::new();

    while pos + 8 <= bytes.len() {
        let group = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
        let element = u16::from_le_bytes([bytes[pos + 2], bytes[pos + 3]]);
        let vr = &bytes[pos + 4..pos + 6];
        if !vr.iter().all(u8::is_ascii_uppercase) {
            return Err("unsupported transfer syntax (implicit VR)".to_string());
        }

        let (header, length) = if is_long_vr(vr) {
            if pos + 12 > bytes.len() {
                return Err("truncated element header".to_string());
            }
            let len = u32::from_le_bytes([
                bytes[pos + 8],
                bytes[pos + 9],
                bytes[pos + 10],
                bytes[pos + 11],
            ]);
            if len == u32::MAX {
                return Err("undefined-length pixel data is not supported".to_string());
            }
            (12usize, len as usize)
        } else {
            let len = u16::from_le_bytes([bytes[pos + 6], bytes[pos + 7]]);
            (8usize, len as usize)
        };

        let start = pos + header;
        let end = start.checked_add(length).filter(|e| *e <= bytes.len());
        let Some(end) = end else {
            return Err("element length exceeds file size".to_string());
        };
        let value = &bytes[start..end];

        match (group, element) {
            (0x0002, 0x0010) => {
                if trim_text(value) != TRANSFER_SYNTAX_EXPLICIT_LE {
                    return Err(format!(
                        "unsupported transfer syntax '{}'",
                        trim_text(value)
                    ));
                }
            }
            (0x0010, 0x0010) => {
                metadata.insert(KEY_PATIENT_NAME.to_string(), trim_text(value));
            }
            (0x0010, 0x0020) => {
                metadata.insert(KEY_PATIENT_ID.to_string(), trim_text(value));
            }
            (0x0028, 0x0008) => {
                number_of_frames = trim_text(value)
                    .parse()
                    .map_err(|_| "invalid NumberOfFrames value".to_string())?;
            }
            (0x0028, 0x0010) => rows = Some(read_u16(value)?),
            (0x0028, 0x0011) => columns = Some(read_u16(value)?),
            (0x0028, 0x0100) => {
                if read_u16(value)? != 8 {
                    return Err("only 8-bit grayscale files are supported".to_string());
                }
            }
            (0x7FE0, 0x0010) => pixel_data = Some(value.to_vec()),
            _ => {}
        }

        pos = end;
    }

    Ok(ParsedDataset {
        rows: rows.ok_or("missing Rows attribute")?,
        columns: columns.ok_or("missing Columns attribute")?,
        number_of_frames,
        pixel_data: pixel_data.ok_or("missing PixelData attribute")?,
        metadata,
    })
}

fn read_u16(value: &[u8]) -> std::result::Result<u16, String> {
    if value.len() < 2 {
        return Err("truncated US value".to_string());
    }
    Ok(u16::from_le_bytes([value[0], value[1]]))
}

fn trim_text(value: &[u8]) -> String {
    String::from_utf8_lossy(value)
        .trim_end_matches(['\0', ' '])
        .to_string()
}

/// Short-form element: 2-byte VR, 16-bit length. Value must already be
/// even-length.
fn put_short(out: &mut Vec<u8>, group: u16, element: u16, vr: &[u8; 2], value: &[u8]) {
    debug_assert!(value.len() % 2 == 0);
    out.extend_from_slice(&group.to_le_bytes());
    out.extend_from_slice(&element.to_le_bytes());
    out.extend_from_slice(vr);
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend_from_slice(value);
}

/// Long-form element: 2-byte VR, 2 reserved bytes, 32-bit length. Pads the
/// value to even length.
fn put_long(out: &mut Vec<u8>, group: u16, element: u16, vr: &[u8; 2], value: &[u8]) {
    let padded_len = value.len() + value.len() % 2;
    out.extend_from_slice(&group.to_le_bytes());
    out.extend_from_slice(&element.to_le_bytes());
    out.extend_from_slice(vr);
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(padded_len as u32).to_le_bytes());
    out.extend_from_slice(value);
    if value.len() % 2 != 0 {
        out.push(0);
    }
}

/// UI values pad to even length with NUL.
fn pad_uid(uid: &str) -> Vec<u8> {
    let mut v = uid.as_bytes().to_vec();
    if v.len() % 2 != 0 {
        v.push(0);
    }
    v
}

/// Text values pad to even length with a space.
fn pad_text(text: &str) -> Vec<u8> {
    let mut v = text.as_bytes().to_vec();
    if v.len() % 2 != 0 {
        v.push(b' ');
    }
    v
}

fn new_uid() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{UID_ROOT}.{stamp}.{seq}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame_has_preamble_and_marker() {
        let img = GrayImage::from_pixel(4, 4, image::Luma([7]));
        let bytes = encode_frame(&img).unwrap();
        assert!(bytes.len() > 132);
        assert!(bytes[..128].iter().all(|b| *b == 0));
        assert_eq!(&bytes[128..132], b"DICM");
    }

    #[test]
    fn test_encode_rejects_mismatched_frame_dimensions() {
        let frames = vec![GrayImage::new(4, 4), GrayImage::new(4, 6)];
        assert!(encode(&frames, &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_parse_rejects_non_dicom_bytes() {
        assert!(parse(b"not a dicom file").is_err());
    }
}
