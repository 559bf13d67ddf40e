//! Textbook RSA on digests
//!
//! Signing a digest: s = h^d mod n
//! Recovering a digest: h' = s^e mod n
//!
//! No padding scheme is applied. The signature is written at a fixed width equal to the
//! byte length of `n`, left-padded with zeros, so the trailer length never depends on
//! the value of the signature.

use num_bigint::BigUint;

use crate::error::{Error, Result};
use crate::keygen::{PrivateKey, PublicKey};
use crate::math::mod_pow;
use crate::sha256::Digest;

/// Byte length of the modulus, which is also the signature width
pub fn modulus_len(n: &BigUint) -> usize {
    ((n.bits() + 7) / 8) as usize
}

/// value^exponent mod n
pub fn cipher(value: &BigUint, exponent: &BigUint, n: &BigUint) -> Result<BigUint> {
    if value >= n {
        return Err(Error::DigestTooLarge);
    }
    Ok(mod_pow(value, exponent, n))
}

/// Big-endian encoding of `value`, left-padded with zeros to `width` bytes.
/// Returns `None` when `value` does not fit.
pub fn to_fixed_width(value: &BigUint, width: usize) -> Option<Vec<u8>> {
    let bytes = value.to_bytes_be();
    // zero encodes as [0]
    let bytes: &[u8] = if bytes == [0] { &[] } else { &bytes };
    if bytes.len() > width {
        return None;
    }

    let mut padded = vec![0u8; width - bytes.len()];
    padded.extend_from_slice(bytes);
    Some(padded)
}

/// s = h^d mod n, encoded at `modulus_len(n)` bytes
pub fn sign_digest(digest: &Digest, key: &PrivateKey) -> Result<Vec<u8>> {
    let h = BigUint::from_bytes_be(digest);
    let s = cipher(&h, &key.d, &key.n)?;
    to_fixed_width(&s, modulus_len(&key.n)).ok_or(Error::DigestTooLarge)
}

/// h' = s^e mod n
///
/// A signature that is not below the modulus cannot have been produced by
/// `sign_digest`, so it yields `None`.
pub fn recover_digest(signature: &[u8], key: &PublicKey) -> Option<BigUint> {
    let s = BigUint::from_bytes_be(signature);
    cipher(&s, &key.e, &key.n).ok()
}
