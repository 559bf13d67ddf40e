//! File signing and verification
//!
//! Signing
//! The SHA-256 digest `h` of the whole file is signed with the private exponent,
//! s = h^d mod n, and a trailer carrying the original size and `s` is appended.
//! The file is then renamed to `<name>.sig`.
//!
//! Verification
//! The trailer length follows from the public key's modulus, so the content length is
//! `file size - trailer length`. The digest of the content is recomputed and compared
//! with h' = s^e mod n. Only when every check passes is the trailer truncated and the
//! suffix removed. A rejected file is left exactly as it was.

use crate::cipher::{modulus_len, recover_digest, sign_digest};
use crate::error::{Error, Result};
use crate::io::{read_private_key, read_public_key};
use crate::keygen::PublicKey;
use crate::sha256::{sha256, Digest};
use crate::trailer::{
    signed_path, trailer_len, unsigned_path, SignatureBlock, SIZE_FIELD_LEN, TAG, TAG_LEN,
};

use log::{debug, info, warn};
use num_bigint::BigUint;
use std::fmt::{self, Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Progress of a single verification.
///
/// A failure after `SizeChecked` rejects the file from whichever state was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyState {
    Start,
    SizeChecked,
    HashComputed,
    TrailerParsed,
    SignatureDecrypted,
    HashCompared,
    TrailerConfirmed,
    Restored,
}

impl Display for VerifyState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            VerifyState::Start => "start",
            VerifyState::SizeChecked => "size checked",
            VerifyState::HashComputed => "hash computed",
            VerifyState::TrailerParsed => "trailer parsed",
            VerifyState::SignatureDecrypted => "signature decrypted",
            VerifyState::HashCompared => "hash compared",
            VerifyState::TrailerConfirmed => "trailer confirmed",
            VerifyState::Restored => "restored",
        };
        f.write_str(name)
    }
}

/// Appends a signature trailer to `path` and renames it to `<path>.sig`.
///
/// Returns the new path.
pub fn sign_file(path: &Path, private_key: &Path) -> Result<PathBuf> {
    let key = read_private_key(private_key)?;

    let content = fs::read(path).map_err(|source| Error::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let original_size = content.len() as u64;

    let digest = sha256(&content);
    debug!(
        "hash of first {} bytes of {} = {}",
        original_size,
        path.display(),
        hex::encode(digest)
    );

    let block = SignatureBlock {
        original_size,
        cipher: sign_digest(&digest, &key)?,
    };

    let target = signed_path(path);
    if target.exists() {
        return Err(Error::DestinationExists(target));
    }

    let file = OpenOptions::new().append(true).open(path)?;
    append_trailer(&file, &mut &file, &block.to_bytes(), original_size, || {
        file.sync_all()?;
        fs::rename(path, &target)
    })?;

    info!("signed {} -> {}", path.display(), target.display());

    Ok(target)
}

/// Checks the trailer of `path` against `public_key`, then strips it and the `.sig` suffix.
///
/// Returns the restored path. A file without the suffix is restored in place.
pub fn verify_file(path: &Path, public_key: &Path) -> Result<PathBuf> {
    let key = read_public_key(public_key)?;
    let cipher_width = modulus_len(&key.n);
    let trailer = trailer_len(cipher_width) as u64;

    let mut state = VerifyState::Start;
    let mut advance = |next: VerifyState| {
        debug!("verify {}: {} -> {}", path.display(), state, next);
        state = next;
    };

    let mut file = File::open(path).map_err(|source| Error::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let size = file.metadata()?.len();
    let content_len = size
        .checked_sub(trailer)
        .ok_or(Error::SizeDetection { size, trailer })?;
    advance(VerifyState::SizeChecked);

    let mut content = Vec::with_capacity(content_len as usize);
    (&mut file).take(content_len).read_to_end(&mut content)?;
    if content.len() as u64 != content_len {
        return Err(Error::SizeDetection { size, trailer });
    }
    let digest = sha256(&content);
    drop(content);
    debug!(
        "hash of first {} bytes of {} = {}",
        content_len,
        path.display(),
        hex::encode(digest)
    );
    advance(VerifyState::HashComputed);

    check_trailer(&mut file, content_len, &digest, &key, &mut advance)?;
    drop(file);

    let target = match unsigned_path(path) {
        Some(target) => {
            if target.exists() {
                return Err(Error::DestinationExists(target));
            }
            target
        }
        None => {
            warn!("{} has no .sig suffix, restoring in place", path.display());
            path.to_path_buf()
        }
    };

    OpenOptions::new()
        .write(true)
        .open(path)?
        .set_len(content_len)?;
    if target != path {
        fs::rename(path, &target)?;
    }
    advance(VerifyState::Restored);
    info!("verified {} -> {}", path.display(), target.display());

    Ok(target)
}

/// Writes `trailer` through `writer`, then runs `finish`.
///
/// If either step fails, `file` is cut back to `original_size` so no partial trailer remains.
fn append_trailer<W: Write>(
    file: &File,
    writer: &mut W,
    trailer: &[u8],
    original_size: u64,
    finish: impl FnOnce() -> std::io::Result<()>,
) -> std::io::Result<()> {
    let appended = writer
        .write_all(trailer)
        .and_then(|_| writer.flush())
        .and_then(|_| finish());
    if let Err(err) = appended {
        if let Err(rollback) = file.set_len(original_size) {
            warn!("failed to roll back partial trailer: {}", rollback);
        }
        return Err(err);
    }
    Ok(())
}

/// Checks the trailer starting at `content_len`: leading tag, recorded size, signature
/// against `digest`, closing tag, and that nothing follows the closing tag.
fn check_trailer<R: Read + Seek>(
    reader: &mut R,
    content_len: u64,
    digest: &Digest,
    key: &PublicKey,
    advance: &mut impl FnMut(VerifyState),
) -> Result<()> {
    reader.seek(SeekFrom::Start(content_len))?;
    if !read_tag(reader)? {
        return Err(Error::LeadingTagMismatch);
    }
    let mut size_field = [0u8; SIZE_FIELD_LEN];
    read_or_short(reader, &mut size_field, Error::LeadingTagMismatch)?;
    let recorded = u64::from_be_bytes(size_field);
    if recorded != content_len {
        return Err(Error::SizeMismatch {
            recorded,
            actual: content_len,
        });
    }
    let mut signature = vec![0u8; modulus_len(&key.n)];
    read_or_short(reader, &mut signature, Error::TrailingTagMismatch)?;
    advance(VerifyState::TrailerParsed);

    let decrypted = recover_digest(&signature, key);
    advance(VerifyState::SignatureDecrypted);

    if decrypted != Some(BigUint::from_bytes_be(digest)) {
        return Err(Error::HashMismatch);
    }
    advance(VerifyState::HashCompared);

    if !read_tag(reader)? {
        return Err(Error::TrailingTagMismatch);
    }
    let mut rest = [0u8; 1];
    if reader.read(&mut rest)? != 0 {
        return Err(Error::TrailingGarbage);
    }
    advance(VerifyState::TrailerConfirmed);
    Ok(())
}

/// Reads one tag; `false` if it differs or the input ends first.
fn read_tag<R: Read>(reader: &mut R) -> Result<bool> {
    let mut tag = [0u8; TAG_LEN];
    match reader.read_exact(&mut tag) {
        Ok(()) => Ok(&tag == TAG),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// `read_exact`, mapping a premature end of input onto `short`.
fn read_or_short<R: Read>(reader: &mut R, buf: &mut [u8], short: Error) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Err(short),
        Err(err) => Err(err.into()),
    }
}
