//! RSA key generation
//!
//! Choose two primes `p` and `q` of equal bit length, `p` != `q`.
//!
//! Derive the modulus `N` = `p` * `q` and Euler's totient `φ(N)` = `(p-1)` × `(q-1)`.
//!
//! Draw the public exponent `e` as a small random prime and advance it to the next probable
//! prime until `gcd(e, φ(N))` = 1. The search space for `e` is deliberately narrow
//! (`exponent_bits` in 5..=24), which is the behaviour existing key files were produced with.
//!
//! Calculate the private exponent `d` such that (`d` * `e`) mod `φ(N)` = 1 by the extended
//! Euclidean algorithm.
//!
//! We end up with:
//!   - Pubkey: (e, N)
//!   - Privkey: (d, N)
//!
//! This is textbook RSA without padding. It is not a production signature scheme.

use log::{debug, info};
use num_bigint::BigUint;
use num_traits::identities::One;
use rand::Rng;

use crate::error::{Error, Result};
use crate::math::{gcd, mod_inverse, next_probable_prime, random_prime};

pub const DEFAULT_PRIME_BITS: u64 = 1024;
pub const DEFAULT_EXPONENT_BITS: u64 = 16;
pub const DEFAULT_ROUNDS: u32 = 50;

/// Smallest prime size whose product still exceeds any 256-bit digest.
pub const MIN_PRIME_BITS: u64 = 129;

/// Key generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyGenConfig {
    /// Size of each of `p` and `q`, in bits.
    pub prime_bits: u64,
    /// Size of the initial public exponent candidate, in bits.
    pub exponent_bits: u64,
    /// Miller-Rabin rounds per primality test.
    pub rounds: u32,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            prime_bits: DEFAULT_PRIME_BITS,
            exponent_bits: DEFAULT_EXPONENT_BITS,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl KeyGenConfig {
    pub fn validate(&self) -> Result<()> {
        if !(5..=24).contains(&self.exponent_bits) {
            return Err(Error::InvalidConfig(format!(
                "exponent size must be between 5 and 24 bits, got {}",
                self.exponent_bits
            )));
        }
        if self.prime_bits < MIN_PRIME_BITS {
            return Err(Error::InvalidConfig(format!(
                "prime size must be at least {} bits, got {}",
                MIN_PRIME_BITS, self.prime_bits
            )));
        }
        if self.rounds == 0 {
            return Err(Error::InvalidConfig(
                "at least one primality round is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub e: BigUint,
    pub n: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub d: BigUint,
    pub n: BigUint,
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Generate a `KeyPair` with a modulus of 2 * `config.prime_bits` bits
pub fn generate_keypair<R: Rng + ?Sized>(rng: &mut R, config: &KeyGenConfig) -> Result<KeyPair> {
    config.validate()?;

    let p = random_prime(rng, config.prime_bits, config.rounds)?;
    let q = loop {
        let q = random_prime(rng, config.prime_bits, config.rounds)?;
        if q != p {
            break q;
        }
    };

    let n = &p * &q;

    // `φ(N)` = `(p-1)` × `(q-1)`
    let phi_n = (p - BigUint::one()) * (q - BigUint::one());

    let mut e = random_prime(rng, config.exponent_bits, config.rounds)?;
    while !gcd(&e, &phi_n).is_one() {
        e = next_probable_prime(rng, &e, config.rounds);
    }
    debug!("public exponent {} after coprimality search", e);

    // `d` is the modular inverse of `e` mod `phi_n`
    let d = mod_inverse(&e, &phi_n)?;

    info!("generated {}-bit RSA key pair", n.bits());

    Ok(KeyPair {
        public: PublicKey { e, n: n.clone() },
        private: PrivateKey { d, n },
    })
}
