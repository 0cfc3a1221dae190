#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Creates `<temp>/images` holding one BMP per `(name, width, height)`.
pub fn image_dir(temp: &Path, images: &[(&str, u32, u32)]) -> PathBuf {
    let dir = temp.join("images");
    fs::create_dir_all(&dir).expect("create images dir");
    for (name, width, height) in images {
        write_bmp(&dir.join(name), *width, *height);
    }
    dir
}

pub fn write_label(temp: &Path, stem: &str, content: &str) -> PathBuf {
    let labels = temp.join("labels");
    fs::create_dir_all(&labels).expect("create labels dir");
    let path = labels.join(format!("{stem}.txt"));
    fs::write(&path, content).expect("write label file");
    path
}
