//! Preview image dimensions
//!
//! Each map may ship a PNG preview next to its description file. The catalog
//! records the preview's pixel dimensions so clients can lay out the lobby
//! without opening the image. Only the fixed-offset IHDR header is read.
//!
//! "No preview present" and "file is not a PNG" are distinct failures; the
//! caller records a note for either and omits the field.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// PNG signature, first four bytes
const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

/// Offset of the IHDR width field from the start of the file
const IHDR_DIMS_OFFSET: usize = 16;

/// Errors when reading a preview header
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("no preview image at {0}")]
    NotFound(PathBuf),

    #[error("{0} is not a PNG image")]
    NotPng(PathBuf),

    #[error("failed to read preview {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// Read the width and height of a PNG preview from its header
pub fn png_dimensions(path: &Path) -> Result<(u32, u32), PreviewError> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PreviewError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(PreviewError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    // signature + IHDR length/type + width + height
    let mut header = [0u8; IHDR_DIMS_OFFSET + 8];
    file.read_exact(&mut header)
        .map_err(|_| PreviewError::NotPng(path.to_path_buf()))?;

    if header[..4] != PNG_MAGIC {
        return Err(PreviewError::NotPng(path.to_path_buf()));
    }

    let width = u32::from_be_bytes(header[16..20].try_into().unwrap());
    let height = u32::from_be_bytes(header[20..24].try_into().unwrap());
    Ok((width, height))
}

/// The preview path for a map: same path with the extension swapped to `.png`
pub fn preview_path(map_path: &Path) -> PathBuf {
    map_path.with_extension("png")
}
