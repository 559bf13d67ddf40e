//! Error types for key generation, signing and verification
//!
//! Every failure cause is its own variant so that callers can branch on it and the CLI
//! can print one message per cause. `Error::kind` groups the variants into categories.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unreadable target file, missing or malformed key file, bad parameters.
    Input,
    /// The trailer is absent, truncated, or carries the wrong tag or size.
    Structural,
    /// The trailer parses but the decrypted signature does not match the content.
    Cryptographic,
    /// Bytes follow the closing tag.
    TrailingGarbage,
    /// Key files or the signed file could not be written.
    Resource,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("file {} cannot be read: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("key file {} cannot be read: {source}", .path.display())]
    KeyUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("key file {} is malformed: {reason}", .path.display())]
    MalformedKey { path: PathBuf, reason: String },

    #[error("failed to write key files: {0}")]
    KeyWrite(#[source] io::Error),

    #[error("invalid key generation parameters: {0}")]
    InvalidConfig(String),

    #[error("no modular inverse exists: operands are not coprime")]
    NoInverse,

    #[error("digest is not smaller than the key modulus")]
    DigestTooLarge,

    #[error("{} already exists", .0.display())]
    DestinationExists(PathBuf),

    #[error("failed to detect start of signature: file is {size} bytes, the signature needs {trailer}")]
    SizeDetection { size: u64, trailer: u64 },

    #[error("failed to find start of signature")]
    LeadingTagMismatch,

    #[error("file size mismatch detected: signature records {recorded} bytes, content has {actual}")]
    SizeMismatch { recorded: u64, actual: u64 },

    #[error("hash sum is not equal")]
    HashMismatch,

    #[error("failed to find end of signature")]
    TrailingTagMismatch,

    #[error("unexpected bytes after end of signature")]
    TrailingGarbage,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileUnreadable { .. }
            | Error::KeyUnreadable { .. }
            | Error::MalformedKey { .. }
            | Error::InvalidConfig(_)
            | Error::NoInverse
            | Error::DigestTooLarge
            | Error::DestinationExists(_) => ErrorKind::Input,
            Error::SizeDetection { .. }
            | Error::LeadingTagMismatch
            | Error::SizeMismatch { .. }
            | Error::TrailingTagMismatch => ErrorKind::Structural,
            Error::HashMismatch => ErrorKind::Cryptographic,
            Error::TrailingGarbage => ErrorKind::TrailingGarbage,
            Error::Io(_) | Error::KeyWrite(_) => ErrorKind::Resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::HashMismatch.kind(), ErrorKind::Cryptographic);
        assert_eq!(Error::LeadingTagMismatch.kind(), ErrorKind::Structural);
        assert_eq!(Error::TrailingTagMismatch.kind(), ErrorKind::Structural);
        let mismatch = Error::SizeMismatch {
            recorded: 1,
            actual: 2,
        };
        assert_eq!(mismatch.kind(), ErrorKind::Structural);
        assert_eq!(Error::TrailingGarbage.kind(), ErrorKind::TrailingGarbage);
        assert_eq!(
            Error::KeyWrite(io::Error::new(io::ErrorKind::Other, "disk full")).kind(),
            ErrorKind::Resource
        );
    }

    #[test]
    fn test_messages_are_distinct() {
        let messages = [
            Error::SizeDetection {
                size: 3,
                trailer: 84,
            }
            .to_string(),
            Error::LeadingTagMismatch.to_string(),
            Error::SizeMismatch {
                recorded: 1,
                actual: 2,
            }
            .to_string(),
            Error::HashMismatch.to_string(),
            Error::TrailingTagMismatch.to_string(),
            Error::TrailingGarbage.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            assert!(!a.contains('\n'));
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
