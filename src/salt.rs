use crate::alphabet::Alphabet;
use crate::hasher::{digest_into, DIGEST_LEN};
use zeroize::Zeroizing;

pub const SALT_LEN: usize = 2 * DIGEST_LEN;

/// Builds the 128-byte salt `H(scramble(site)) || H(scramble(account))`.
///
/// The site host is lowercased first; the account is taken as is.
pub fn build_salt(
    site_host: &str,
    account: &str,
    personal: &Alphabet,
) -> Zeroizing<[u8; SALT_LEN]> {
    let mut salt = Zeroizing::new([0u8; SALT_LEN]);
    build_salt_into(site_host, account, personal, &mut salt);
    salt
}

pub(crate) fn build_salt_into(
    site_host: &str,
    account: &str,
    personal: &Alphabet,
    salt: &mut [u8; SALT_LEN],
) {
    let site = Zeroizing::new(site_host.to_lowercase());
    let (site_half, account_half) = salt.split_at_mut(DIGEST_LEN);

    let scrambled_site = personal.scramble(site.as_bytes());
    digest_into(scrambled_site.as_bytes(), site_half);

    let scrambled_account = personal.scramble(account.as_bytes());
    digest_into(scrambled_account.as_bytes(), account_half);
}
