//! Single-block SHA-1 digest (FIPS 180-4)
//!
//! The Global ID derivation only ever hashes a 16-byte buffer, so this
//! implementation handles messages of at most 55 bytes: one 512-bit block
//! after padding. Longer input is rejected.

use crate::error::{Error, Result};

/// Largest message that fits one padded block
pub const MAX_MESSAGE_LENGTH: usize = 55;

/// Digest length in bytes
pub const DIGEST_LENGTH: usize = 20;

const BLOCK_LENGTH: usize = 64;

/// Initial hash value, FIPS 180-4 section 5.3.1
const H0: [u32; 5] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476, 0xc3d2_e1f0];

/// Round constants, FIPS 180-4 section 4.2.1
const K: [u32; 4] = [0x5a82_7999, 0x6ed9_eba1, 0x8f1b_bcdc, 0xca62_c1d6];

fn pad(message: &[u8]) -> Result<[u8; BLOCK_LENGTH]> {
    if message.len() > MAX_MESSAGE_LENGTH {
        return Err(Error::length(
            "SHA-1 message",
            MAX_MESSAGE_LENGTH,
            message.len(),
        ));
    }

    let mut block = [0u8; BLOCK_LENGTH];
    block[..message.len()].copy_from_slice(message);
    block[message.len()] = 0x80;

    let bit_length = (message.len() as u64) * 8;
    block[BLOCK_LENGTH - 8..].copy_from_slice(&bit_length.to_be_bytes());

    Ok(block)
}

fn compress(block: &[u8; BLOCK_LENGTH]) -> [u32; 5] {
    let mut w = [0u32; 80];
    for (word, chunk) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = H0;

    for (i, &wi) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => ((b & c) | (!b & d), K[0]),
            20..=39 => (b ^ c ^ d, K[1]),
            40..=59 => ((b & c) | (b & d) | (c & d), K[2]),
            _ => (b ^ c ^ d, K[3]),
        };

        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(wi);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    [
        H0[0].wrapping_add(a),
        H0[1].wrapping_add(b),
        H0[2].wrapping_add(c),
        H0[3].wrapping_add(d),
        H0[4].wrapping_add(e),
    ]
}

/// Returns the five 32-bit words of the digest
pub fn digest_words(message: &[u8]) -> Result<[u32; 5]> {
    Ok(compress(&pad(message)?))
}

/// Returns the 20-byte digest of a message of at most 55 bytes
///
/// # Examples
///
/// ```
/// use netcalc_core::sha1::digest;
///
/// let md = digest(b"abc").unwrap();
/// assert_eq!(&md[..4], &[0xa9, 0x99, 0x3e, 0x36]);
/// assert!(digest(&[0u8; 56]).is_err());
/// ```
pub fn digest(message: &[u8]) -> Result<[u8; DIGEST_LENGTH]> {
    let words = digest_words(message)?;

    let mut out = [0u8; DIGEST_LENGTH];
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }

    Ok(out)
}

/// Returns the least significant 40 bits of the digest (bytes 15..20)
pub fn low_40_bits(message: &[u8]) -> Result<[u8; 5]> {
    let md = digest(message)?;
    let mut out = [0u8; 5];
    out.copy_from_slice(&md[DIGEST_LENGTH - 5..]);
    Ok(out)
}
