//! SHA-256 (FIPS 180-4)
//!
//! message -> padding -> 512-bit blocks -> schedule -> 64 compression rounds -> digest
//!
//! The whole message is hashed in one call; there is no incremental interface.

/// The size of a SHA-256 digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// The size of one message block in bytes (512 bits).
pub const BLOCK_SIZE: usize = 64;

pub type Digest = [u8; DIGEST_SIZE];

/// Initial hash value: first 32 bits of the fractional parts of the square roots
/// of the first 8 primes.
const H0: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Round constants: first 32 bits of the fractional parts of the cube roots
/// of the first 64 primes.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Computes the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Digest {
    let mut state = H0;

    for block in pad(data).chunks_exact(BLOCK_SIZE) {
        compress(&mut state, block);
    }

    let mut digest = [0u8; DIGEST_SIZE];
    for (out, word) in digest.chunks_exact_mut(4).zip(state.iter()) {
        out.copy_from_slice(&word.to_be_bytes());
    }
    digest
}

/// Appends a single `1` bit, the minimum number of `0` bits to reach 448 mod 512,
/// then the message length in bits as a 64-bit big-endian integer.
///
/// The result is always a non-empty multiple of [`BLOCK_SIZE`].
pub fn pad(data: &[u8]) -> Vec<u8> {
    // length mod 2^64, as FIPS 180-4 allows
    let bit_len = (data.len() as u64).wrapping_mul(8);

    let zeros = (BLOCK_SIZE + 56 - (data.len() + 1) % BLOCK_SIZE) % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(data.len() + 1 + zeros + 8);
    padded.extend_from_slice(data);
    padded.push(0x80);
    padded.resize(padded.len() + zeros, 0);
    padded.extend_from_slice(&bit_len.to_be_bytes());

    debug_assert_eq!(padded.len() % BLOCK_SIZE, 0);
    padded
}

/// Expands one block into the 64-word message schedule.
fn schedule(block: &[u8]) -> [u32; 64] {
    debug_assert_eq!(block.len(), BLOCK_SIZE);

    let mut w = [0u32; 64];
    for (i, word) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    }
    for i in 16..64 {
        w[i] = small_sigma1(w[i - 2])
            .wrapping_add(w[i - 7])
            .wrapping_add(small_sigma0(w[i - 15]))
            .wrapping_add(w[i - 16]);
    }
    w
}

/// Runs the 64 rounds over one block and folds the result into `state`.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    let w = schedule(block);

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for i in 0..64 {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K[i])
            .wrapping_add(w[i]);
        let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s = s.wrapping_add(v);
    }
}

#[inline]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use sha2::Digest as _;

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_abc() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_two_blocks() {
        // 56 bytes: the length field no longer fits in the first block
        assert_eq!(
            hex::encode(sha256(
                b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"
            )),
            "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
        );
        assert_eq!(
            hex::encode(sha256(
                b"abcdefghbcdefghicdefghijdefghijkefghijklfghijklmghijklmnhijklmnoijklmnopjklmnopqklmnopqrlmnopqrsmnopqrstnopqrstu"
            )),
            "cf5b16a778af8380036ce59e7b0492370b249b11e8f07a51afac45037afee9d1"
        );
    }

    #[test]
    fn test_sha256_million_a() {
        let data = vec![b'a'; 1_000_000];
        assert_eq!(
            hex::encode(sha256(&data)),
            "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0"
        );
    }

    #[test]
    fn test_pad_lengths() {
        for (len, blocks) in [
            (0, 1),
            (1, 1),
            (55, 1),
            (56, 2),
            (63, 2),
            (64, 2),
            (119, 2),
            (120, 3),
        ] {
            let data = vec![0xffu8; len];
            let padded = pad(&data);
            assert_eq!(padded.len(), blocks * BLOCK_SIZE, "len {}", len);
            assert_eq!(padded[len], 0x80);
            assert!(padded[len + 1..padded.len() - 8].iter().all(|&b| b == 0));
            assert_eq!(
                u64::from_be_bytes(padded[padded.len() - 8..].try_into().unwrap()),
                len as u64 * 8
            );
        }
    }

    #[test]
    fn test_sha256_matches_sha2() {
        let mut rng = ChaCha8Rng::seed_from_u64(256);
        for len in (0..200).chain([511, 512, 1000, 4096, 10_007]) {
            let mut data = vec![0u8; len];
            rng.fill_bytes(&mut data);
            let expected = sha2::Sha256::digest(&data);
            assert_eq!(sha256(&data)[..], expected[..], "len {}", len);
        }
    }
}
