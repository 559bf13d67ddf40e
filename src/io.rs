//! Key file I/O
//!
//! A key file holds two decimal integers on two lines:
//!   - line 1: the exponent (`e` for the public key, `d` for the private key)
//!   - line 2: the modulus `N`
//!
//! A generated pair is written as `PublicKey<id>` and `PrivateKey<id>` so the two halves
//! can be matched by their shared random id.

use crate::error::{Error, Result};
use crate::keygen::{KeyPair, PrivateKey, PublicKey};

use log::{info, warn};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PUBLIC_KEY_PREFIX: &str = "PublicKey";
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey";

/// Key ids are drawn from `0..KEY_ID_RANGE`.
pub const KEY_ID_RANGE: u32 = 10_000_000;

/// Writes `PublicKey<id>` and `PrivateKey<id>` into `dir` with a random id.
///
/// Returns the public and private key paths. If either file cannot be written, the files
/// created by this call are removed again and the error is returned.
pub fn write_keypair<R: Rng + ?Sized>(
    keypair: &KeyPair,
    dir: &Path,
    rng: &mut R,
) -> Result<(PathBuf, PathBuf)> {
    let id = rng.gen_range(0..KEY_ID_RANGE);
    write_keypair_with_id(keypair, dir, id)
}

fn write_keypair_with_id(keypair: &KeyPair, dir: &Path, id: u32) -> Result<(PathBuf, PathBuf)> {
    let pub_path = dir.join(format!("{}{}", PUBLIC_KEY_PREFIX, id));
    let priv_path = dir.join(format!("{}{}", PRIVATE_KEY_PREFIX, id));

    let mut created = Vec::with_capacity(2);
    let result = write_key_file(&pub_path, &keypair.public.e, &keypair.public.n, &mut created)
        .and_then(|_| {
            write_key_file(&priv_path, &keypair.private.d, &keypair.private.n, &mut created)
        });

    if let Err(err) = result {
        for path in &created {
            if let Err(cleanup) = fs::remove_file(path) {
                warn!("failed to remove {}: {}", path.display(), cleanup);
            }
        }
        return Err(Error::KeyWrite(err));
    }

    info!(
        "wrote key pair {} and {}",
        pub_path.display(),
        priv_path.display()
    );
    Ok((pub_path, priv_path))
}

/// Creates `path` (failing if it exists) and records it in `created` before writing.
fn write_key_file(
    path: &Path,
    exponent: &BigUint,
    modulus: &BigUint,
    created: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    created.push(path.to_path_buf());

    write!(file, "{}\n{}\n", exponent, modulus)?;
    file.sync_all()
}

pub fn read_public_key(path: &Path) -> Result<PublicKey> {
    let (e, n) = read_key_file(path)?;
    Ok(PublicKey { e, n })
}

pub fn read_private_key(path: &Path) -> Result<PrivateKey> {
    let (d, n) = read_key_file(path)?;
    Ok(PrivateKey { d, n })
}

/// Reads (exponent, modulus) from a key file
fn read_key_file(path: &Path) -> Result<(BigUint, BigUint)> {
    let text = fs::read_to_string(path).map_err(|source| Error::KeyUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let malformed = |reason: String| Error::MalformedKey {
        path: path.to_path_buf(),
        reason,
    };

    let mut lines = text.lines();
    let exponent = parse_line(lines.next(), "exponent").map_err(malformed)?;
    let modulus = parse_line(lines.next(), "modulus").map_err(malformed)?;

    if lines.any(|line| !line.trim().is_empty()) {
        return Err(malformed("unexpected data after the modulus".to_string()));
    }
    if modulus <= BigUint::from(1u32) {
        return Err(malformed("modulus must be greater than 1".to_string()));
    }
    if exponent.is_zero() {
        return Err(malformed("exponent must not be zero".to_string()));
    }

    Ok((exponent, modulus))
}

fn parse_line(line: Option<&str>, what: &str) -> std::result::Result<BigUint, String> {
    let line = line
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| format!("missing {} line", what))?;

    if !line.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{} is not a decimal integer", what));
    }

    line.parse::<BigUint>()
        .map_err(|err| format!("{} is not a decimal integer: {}", what, err))
}
