//! Reader for the IDX binary format used by MNIST and Fashion-MNIST.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use log::info;

use crate::data::dataset::Dataset;
use crate::error::{NnError, Result};

/// Pixels are divided by this, mapping uint8 intensities into [0, 1).
const PIXEL_SCALE: f64 = 256.0;

fn be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

fn check_header(bytes: &[u8], what: &str, header_len: usize, dims: u8) -> Result<()> {
    if bytes.len() < header_len {
        return Err(NnError::Dataset(format!(
            "IDX {what} file too short: expected at least {header_len} header bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(NnError::Dataset(format!(
            "IDX {what} file: bytes 0-1 must be zero, got 0x{:02X} 0x{:02X}",
            bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(NnError::Dataset(format!(
            "IDX {what} file: dtype must be 0x08 (uint8), got 0x{:02X}",
            bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(NnError::Dataset(format!(
            "IDX {what} file: expected {dims} dimensions, got {}",
            bytes[3]
        )));
    }
    Ok(())
}

/// Parses an IDX3 image file and its IDX1 label file into a [`Dataset`]
/// whose samples are flattened row-major images.
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<Dataset> {
    check_header(image_bytes, "image", 16, 0x03)?;
    check_header(label_bytes, "label", 8, 0x01)?;

    let n_items = be_u32(image_bytes, 4);
    let rows = be_u32(image_bytes, 8);
    let cols = be_u32(image_bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        NnError::Dataset(format!("IDX image file: {rows}x{cols} pixels overflow usize"))
    })?;
    let data_len = n_items.checked_mul(n_pixels).ok_or_else(|| {
        NnError::Dataset("IDX image file: data length overflows usize".to_owned())
    })?;
    let data_end = data_len.checked_add(16).ok_or_else(|| {
        NnError::Dataset("IDX image file: data length overflows usize".to_owned())
    })?;
    if image_bytes.len() < data_end {
        return Err(NnError::Dataset(format!(
            "IDX image file too short: header declares {n_items} images of {rows}x{cols} \
             pixels but file is only {} bytes",
            image_bytes.len()
        )));
    }

    let label_count = be_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(NnError::Dataset(format!(
            "IDX file mismatch: {n_items} images but {label_count} labels"
        )));
    }
    if label_bytes.len().saturating_sub(8) < n_items {
        return Err(NnError::Dataset(format!(
            "IDX label file too short: header declares {n_items} labels but file is only {} bytes",
            label_bytes.len()
        )));
    }

    let features: Vec<Vec<f64>> = image_bytes[16..data_end]
        .chunks_exact(n_pixels.max(1))
        .map(|chunk| chunk.iter().map(|&px| px as f64 / PIXEL_SCALE).collect())
        .collect();
    let labels: Vec<usize> = label_bytes[8..8 + n_items].iter().map(|&l| l as usize).collect();

    Ok(Dataset::new(features, labels)?.with_image_shape(rows, cols))
}

/// Reads and parses an image/label file pair from disk.
pub fn load_idx_pair(image_path: &str, label_path: &str) -> Result<Dataset> {
    let images = std::fs::read(image_path)?;
    let labels = std::fs::read(label_path)?;
    let dataset = parse_idx_pair(&images, &labels)?;
    info!(
        "loaded {} samples with {} features from {image_path}",
        dataset.len(),
        dataset.num_features()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_file(n: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x03];
        for v in [n, rows, cols] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.extend_from_slice(pixels);
        bytes
    }

    fn label_file(labels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x01];
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    #[test]
    fn parses_images_and_labels() {
        let images = image_file(2, 2, 2, &[0, 64, 128, 255, 1, 2, 3, 4]);
        let labels = label_file(&[7, 3]);
        let data = parse_idx_pair(&images, &labels).unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.num_features(), 4);
        assert_eq!(data.image_shape(), Some((2, 2)));
        assert_eq!(data.labels(), &[7, 3]);
        assert_eq!(data.sample(0).0, &[0.0, 0.25, 0.5, 255.0 / 256.0]);
    }

    #[test]
    fn rejects_truncated_or_mismatched_files() {
        let labels = label_file(&[1, 2]);
        let short = image_file(2, 2, 2, &[0, 0, 0]);
        assert!(matches!(parse_idx_pair(&short, &labels), Err(NnError::Dataset(_))));

        let images = image_file(2, 1, 1, &[0, 0]);
        assert!(matches!(parse_idx_pair(&images, &label_file(&[1])), Err(NnError::Dataset(_))));

        let huge = image_file(u32::MAX, u32::MAX, u32::MAX, &[]);
        assert!(matches!(parse_idx_pair(&huge, &labels), Err(NnError::Dataset(_))));

        let mut wrong_dims = images.clone();
        wrong_dims[3] = 0x02;
        assert!(matches!(parse_idx_pair(&wrong_dims, &labels), Err(NnError::Dataset(_))));
    }
}
