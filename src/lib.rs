//! Appends a tamper-evident RSA signature to a file, and later verifies and strips it,
//! restoring the file byte for byte.
//!
//! The arithmetic, the SHA-256 digest and the trailer format are all implemented here:
//! textbook RSA over `num-bigint`, a FIPS 180-4 SHA-256, and a fixed-width binary trailer.

pub mod cipher;
pub mod error;
pub mod io;
pub mod keygen;
pub mod math;
pub mod sha256;
pub mod sig;
pub mod trailer;

pub use error::{Error, ErrorKind, Result};
pub use keygen::{generate_keypair, KeyGenConfig, KeyPair, PrivateKey, PublicKey};
pub use sig::{sign_file, verify_file, VerifyState};
