//! Modular arithmetic over `BigUint`
//!
//! Modular inverse by the extended Euclidean algorithm, modular exponentiation,
//! and probable primes via trial division followed by Miller-Rabin.
//!
//! The Miller-Rabin error probability is at most 4^-k for `k` rounds, so 50 rounds
//! bound the chance of accepting a composite at 2^-100.

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::identities::{One, Zero};
use rand::Rng;

use crate::error::{Error, Result};

const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Modular inverse (v * v^-1 (mod m) = 1)
/// Fails when `gcd(v, m) != 1`, since then no inverse exists.
pub fn mod_inverse(v: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(Error::NoInverse);
    }

    let (mut t, mut newt) = (BigInt::zero(), BigInt::one());
    let (mut r, mut newr) = (
        BigInt::from_biguint(Sign::Plus, m.clone()),
        BigInt::from_biguint(Sign::Plus, v % m),
    );

    while !newr.is_zero() {
        let quotient = &r / &newr;

        let next_t = &t - &quotient * &newt;
        t = std::mem::replace(&mut newt, next_t);

        let next_r = &r - &quotient * &newr;
        r = std::mem::replace(&mut newr, next_r);
    }

    if !r.is_one() {
        return Err(Error::NoInverse);
    }

    // |t| < m, a single correction brings it into [0, m)
    if t.sign() == Sign::Minus {
        t += BigInt::from_biguint(Sign::Plus, m.clone());
    }

    t.to_biguint().ok_or(Error::NoInverse)
}

/// base^exponent mod modulus, always in [0, modulus)
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exponent, modulus)
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let (mut a, mut b) = (a.clone(), b.clone());
    while !b.is_zero() {
        let r = &a % &b;
        a = std::mem::replace(&mut b, r);
    }
    a
}

/// Draws a probable prime of exactly `bits` bits
pub fn random_prime<R: Rng + ?Sized>(rng: &mut R, bits: u64, rounds: u32) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::InvalidConfig(format!("no prime has exactly {} bits", bits)));
    }

    loop {
        let mut n = rng.gen_biguint(bits);
        n.set_bit(0, true);
        n.set_bit(bits - 1, true);

        if is_probable_prime(rng, &n, rounds) {
            return Ok(n);
        }
    }
}

/// Smallest probable prime strictly greater than `n`
pub fn next_probable_prime<R: Rng + ?Sized>(rng: &mut R, n: &BigUint, rounds: u32) -> BigUint {
    let two = BigUint::from(2u32);
    if n < &two {
        return two;
    }

    let mut candidate = n + BigUint::one();
    if !candidate.bit(0) {
        candidate += BigUint::one();
    }
    while !is_probable_prime(rng, &candidate, rounds) {
        candidate += &two;
    }
    candidate
}

/// Trial division by small primes, then `rounds` Miller-Rabin witnesses
pub fn is_probable_prime<R: Rng + ?Sized>(rng: &mut R, n: &BigUint, rounds: u32) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    if !n.bit(0) {
        return false;
    }

    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    miller_rabin(rng, n, rounds)
}

/// `n` must be odd and greater than 3
fn miller_rabin<R: Rng + ?Sized>(rng: &mut R, n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;

    // n - 1 = 2^r * d with d odd
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_one {
            continue 'witness;
        }

        for _ in 1..r {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
            if x == one {
                return false;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_mod_inverse() {
        let a0 = BigUint::from(2u32);
        let m0 = BigUint::from(1000000007u32);
        assert_eq!(mod_inverse(&a0, &m0).unwrap(), BigUint::from(500000004u32));

        let a1 = BigUint::from(17u32);
        let m1 = BigUint::from(3120u32);
        assert_eq!(mod_inverse(&a1, &m1).unwrap(), BigUint::from(2753u32));

        // the raw Euclidean coefficient is negative here (-3), normalised by adding m
        let a2 = BigUint::from(7u32);
        let m2 = BigUint::from(20u32);
        assert_eq!(mod_inverse(&a2, &m2).unwrap(), BigUint::from(3u32));
        let a3 = BigUint::from(3u32);
        let m3 = BigUint::from(20u32);
        assert_eq!(mod_inverse(&a3, &m3).unwrap(), BigUint::from(7u32));

        assert!(matches!(
            mod_inverse(&BigUint::from(15u32), &BigUint::from(45u32)),
            Err(Error::NoInverse)
        ));
        assert!(matches!(
            mod_inverse(&BigUint::from(14u32), &BigUint::from(28u32)),
            Err(Error::NoInverse)
        ));
    }

    #[test]
    fn test_mod_inverse_identity() {
        let m = BigUint::from(3120u32);
        for v in 1u32..200 {
            let v = BigUint::from(v);
            if gcd(&v, &m).is_one() {
                let i = mod_inverse(&v, &m).unwrap();
                assert!(i < m);
                assert!((&v * &i % &m).is_one());
            }
        }
    }

    #[test]
    fn test_mod_pow() {
        let n = BigUint::from(3233u32);
        let c = mod_pow(&BigUint::from(42u32), &BigUint::from(17u32), &n);
        assert_eq!(c, BigUint::from(2557u32));
        assert_eq!(mod_pow(&c, &BigUint::from(2753u32), &n), BigUint::from(42u32));
        assert!(mod_pow(&BigUint::from(5000u32), &BigUint::from(3u32), &n) < n);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(&BigUint::from(48u32), &BigUint::from(18u32)), BigUint::from(6u32));
        assert_eq!(gcd(&BigUint::from(17u32), &BigUint::from(3120u32)), BigUint::one());
        assert_eq!(gcd(&BigUint::from(9u32), &BigUint::zero()), BigUint::from(9u32));
    }

    #[test]
    fn test_miller_rabin() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        // Mersenne primes
        assert!(is_probable_prime(&mut rng, &BigUint::from(2305843009213693951u64), 50));
        assert!(is_probable_prime(
            &mut rng,
            &BigUint::from(618970019642690137449562111u128),
            50
        ));

        // Carmichael numbers
        assert!(!is_probable_prime(&mut rng, &BigUint::from(25326001u32), 50));
        assert!(!is_probable_prime(&mut rng, &BigUint::from(8481906873u64), 50));

        // strong pseudoprime
        assert!(!is_probable_prime(&mut rng, &BigUint::from(2152302898747u64), 50));

        for small in [2u32, 3, 5, 7, 97, 101, 65537] {
            assert!(is_probable_prime(&mut rng, &BigUint::from(small), 50));
        }
        for composite in [0u32, 1, 4, 9, 91, 561, 65535] {
            assert!(!is_probable_prime(&mut rng, &BigUint::from(composite), 50));
        }
    }

    #[test]
    fn test_random_prime_bit_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for bits in [5u64, 16, 24, 128] {
            let p = random_prime(&mut rng, bits, 50).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probable_prime(&mut rng, &p, 50));
        }
    }

    #[test]
    fn test_random_prime_too_few_bits() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for bits in [0u64, 1] {
            assert!(matches!(
                random_prime(&mut rng, bits, 50),
                Err(Error::InvalidConfig(_))
            ));
        }
        // 2 bits: both bits forced on, so the only candidate is 3
        assert_eq!(random_prime(&mut rng, 2, 50).unwrap(), BigUint::from(3u32));
    }

    #[test]
    fn test_next_probable_prime() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            next_probable_prime(&mut rng, &BigUint::from(13u32), 50),
            BigUint::from(17u32)
        );
        assert_eq!(
            next_probable_prime(&mut rng, &BigUint::from(14u32), 50),
            BigUint::from(17u32)
        );
        assert_eq!(
            next_probable_prime(&mut rng, &BigUint::from(65521u32), 50),
            BigUint::from(65537u32)
        );
        assert_eq!(
            next_probable_prime(&mut rng, &BigUint::one(), 50),
            BigUint::from(2u32)
        );
    }
}
