//! Signature trailer layout
//!
//! | TAG  | original size (u64 BE) | signature (modulus width) | TAG  | EOF
//! |  6 B |          8 B           |            k B            |  6 B |

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Marker at both ends of the trailer.
pub const TAG: &[u8; TAG_LEN] = b"ozzero";
pub const TAG_LEN: usize = 6;

/// Width of the original size field.
pub const SIZE_FIELD_LEN: usize = 8;

/// Extension added to a file's name once it carries a trailer.
pub const SIGNED_SUFFIX: &str = "sig";

/// Total trailer length for a signature of `cipher_width` bytes.
pub fn trailer_len(cipher_width: usize) -> usize {
    TAG.len() * 2 + SIZE_FIELD_LEN + cipher_width
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock {
    pub original_size: u64,
    /// Fixed-width signature, already padded to the modulus length.
    pub cipher: Vec<u8>,
}

impl SignatureBlock {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(trailer_len(self.cipher.len()));
        out.extend_from_slice(TAG);
        out.extend_from_slice(&self.original_size.to_be_bytes());
        out.extend_from_slice(&self.cipher);
        out.extend_from_slice(TAG);
        out
    }
}

/// `file.txt` -> `file.txt.sig`
pub fn signed_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(SIGNED_SUFFIX);
    PathBuf::from(name)
}

/// `file.txt.sig` -> `file.txt`; `None` if the name does not carry the suffix.
pub fn unsigned_path(path: &Path) -> Option<PathBuf> {
    if path.extension()? != SIGNED_SUFFIX || path.file_stem()?.is_empty() {
        return None;
    }
    Some(path.with_extension(""))
}
