use crate::salt::SALT_LEN;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

pub const KEY_LEN: usize = 48;

/// Versioned stretching parameters.
///
/// Any change here changes every previously derived password, so new values
/// get a new constant rather than replacing an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheme {
    pub version: u8,
    pub iterations: u32,
}

impl Scheme {
    pub const V1: Self = Self {
        version: 1,
        iterations: 500_000,
    };

    #[cfg(test)]
    pub(crate) const FAST: Self = Self {
        version: 0,
        iterations: 1,
    };
}

/// PBKDF2-HMAC-SHA512 over the scrambled secret.
pub fn stretch(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    scheme: Scheme,
) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    stretch_into(password, salt, scheme, &mut key);
    key
}

pub(crate) fn stretch_into(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    scheme: Scheme,
    out: &mut [u8; KEY_LEN],
) {
    pbkdf2_hmac::<Sha512>(password, salt, scheme.iterations, out);
}
