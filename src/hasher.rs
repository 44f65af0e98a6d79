use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

pub const DIGEST_LEN: usize = 64;

/// SHA-512 of `buffer`. Zeroing the input stays with the caller.
pub fn digest(buffer: &[u8]) -> Zeroizing<[u8; DIGEST_LEN]> {
    let mut out = Zeroizing::new([0u8; DIGEST_LEN]);
    digest_into(buffer, &mut out[..]);
    out
}

/// Writes the digest straight into caller-owned storage of exactly
/// `DIGEST_LEN` bytes.
pub(crate) fn digest_into(buffer: &[u8], out: &mut [u8]) {
    debug_assert_eq!(out.len(), DIGEST_LEN);
    let mut hasher = Sha512::new();
    hasher.update(buffer);
    hasher.finalize_into(GenericArray::from_mut_slice(out));
}
