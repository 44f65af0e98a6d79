use crate::alphabet::Alphabet;
use crate::error::Result;
use crate::hasher::{digest_into, DIGEST_LEN};
use crate::request::Request;
use crate::salt::{build_salt_into, SALT_LEN};
use crate::secret::MasterSecret;
use crate::stretch::{stretch_into, Scheme, KEY_LEN};
use std::time::Instant;
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Scratch storage for every intermediate of one derivation run.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Workspace {
    digest: [u8; DIGEST_LEN],
    personal: Option<Alphabet>,
    salt: [u8; SALT_LEN],
    scrambled_secret: Zeroizing<String>,
    key: [u8; KEY_LEN],
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            digest: [0u8; DIGEST_LEN],
            personal: None,
            salt: [0u8; SALT_LEN],
            scrambled_secret: Zeroizing::new(String::new()),
            key: [0u8; KEY_LEN],
        }
    }
}

/// Wipes the borrowed workspace when dropped, whether the run returned,
/// failed or unwound.
struct WipeGuard<'a>(&'a mut Workspace);

impl Drop for WipeGuard<'_> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

fn scoped<T>(
    workspace: &mut Workspace,
    f: impl FnOnce(&mut Workspace) -> Result<T>,
) -> Result<T> {
    let guard = WipeGuard(workspace);
    f(&mut *guard.0)
}

/// Derives the site password for `request` under the current scheme.
pub fn derive_password(secret: &MasterSecret, request: &Request) -> Result<Zeroizing<String>> {
    derive_with_scheme(secret, request, Scheme::V1)
}

pub(crate) fn derive_with_scheme(
    secret: &MasterSecret,
    request: &Request,
    scheme: Scheme,
) -> Result<Zeroizing<String>> {
    let mut workspace = Workspace::default();
    scoped(&mut workspace, |ws| run(ws, secret, request, scheme))
}

#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        site = %request.site_host(),
        account_len = request.account().len(),
        scheme = scheme.version,
    )
)]
fn run(
    ws: &mut Workspace,
    secret: &MasterSecret,
    request: &Request,
    scheme: Scheme,
) -> Result<Zeroizing<String>> {
    digest_into(secret.expose(), &mut ws.digest);

    let personal = ws.personal.insert(Alphabet::personal(&ws.digest)?);
    trace!("Derived personal alphabet");

    build_salt_into(request.site_host(), request.account(), personal, &mut ws.salt);
    trace!("Built salt");

    ws.scrambled_secret = personal.scramble(&ws.digest);

    debug!(iterations = scheme.iterations, "Stretching key");
    let start = Instant::now();
    stretch_into(ws.scrambled_secret.as_bytes(), &ws.salt, scheme, &mut ws.key);
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Key stretched");

    Ok(personal.scramble(&ws.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeriveError;
    use crate::secret::{FixedPassphrase, SecretEntry};

    const PASSPHRASE: &str = "correct horse battery staple";

    impl Workspace {
        fn is_wiped(&self) -> bool {
            self.digest.iter().all(|&b| b == 0)
                && self.personal.is_none()
                && self.salt.iter().all(|&b| b == 0)
                && self.scrambled_secret.is_empty()
                && self.key.iter().all(|&b| b == 0)
        }
    }

    fn secret(passphrase: &str) -> MasterSecret {
        FixedPassphrase::new(passphrase).acquire().unwrap()
    }

    fn fast(passphrase: &str, site: &str, account: &str) -> Zeroizing<String> {
        let request = Request::new(site, account).unwrap();
        derive_with_scheme(&secret(passphrase), &request, Scheme::FAST).unwrap()
    }

    #[test]
    fn test_regression_v1() {
        let request = Request::new("https://Example.com/path", "alice").unwrap();
        let password = derive_password(&secret(PASSPHRASE), &request).unwrap();

        assert_eq!(
            *password,
            "!AgSPgDDgbCcmx^d2t7PSbKbwLbHwVpHcVV2tKdYzD1^=d^E5C21dEdtEgTP"
        );
    }

    #[test]
    fn test_regression_fast_scheme() {
        let password = fast(PASSPHRASE, "https://example.com", "alice");
        assert_eq!(
            *password,
            "L$N^SP1Y2Y=bESbb1qNudDwbzu$$2mNNDbTbTB5b8VDzuVudHP5FNPuYyuDb"
        );
    }

    #[test]
    fn test_regression_personal_alphabet() {
        let mut digest = [0u8; DIGEST_LEN];
        digest_into(secret(PASSPHRASE).expose(), &mut digest);

        let personal = Alphabet::personal(&digest).unwrap();
        assert_eq!(personal.radix(), 85);
        assert_eq!(
            *Alphabet::lookup().scramble(&digest),
            "H5^=c$sgF92SPp7!=$TLiD5V$pA6SBPDt81CRNNVudduYbuEbDHYyH!cV72PYs3f3zTm^gbxfqEwKbb^tAVz1"
        );
    }

    #[test]
    fn test_deterministic() {
        let first = fast(PASSPHRASE, "https://example.com", "alice");
        let second = fast(PASSPHRASE, "https://example.com", "alice");
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_every_input_matters() {
        let base = fast(PASSPHRASE, "https://example.com", "alice");

        let secret_changed = fast(
            "correct horse battery stapler",
            "https://example.com",
            "alice",
        );
        let site_changed = fast(PASSPHRASE, "https://example.org", "alice");
        let account_changed = fast(PASSPHRASE, "https://example.com", "alicf");

        assert_ne!(*base, *secret_changed);
        assert_ne!(*base, *site_changed);
        assert_ne!(*base, *account_changed);
    }

    #[test]
    fn test_site_case_insensitive() {
        let lower = fast(PASSPHRASE, "https://example.com", "alice");
        let mixed = fast(PASSPHRASE, "https://Example.COM", "alice");
        assert_eq!(*lower, *mixed);
    }

    #[test]
    fn test_path_does_not_matter() {
        let root = fast(PASSPHRASE, "https://example.com/", "alice");
        let login = fast(PASSPHRASE, "https://example.com/login?next=1", "alice");
        assert_eq!(*root, *login);
    }

    #[test]
    fn test_account_case_sensitive() {
        let lower = fast(PASSPHRASE, "https://example.com", "bob");
        let upper = fast(PASSPHRASE, "https://example.com", "Bob");
        assert_ne!(*lower, *upper);
    }

    #[test]
    fn test_swapping_site_and_account() {
        let normal = fast(PASSPHRASE, "https://alice", "bob");
        let swapped = fast(PASSPHRASE, "https://bob", "alice");
        assert_ne!(*normal, *swapped);
    }

    #[test]
    fn test_scheme_changes_output() {
        let request = Request::new("https://example.com", "alice").unwrap();
        let one = derive_with_scheme(&secret(PASSPHRASE), &request, Scheme::FAST).unwrap();
        let two = derive_with_scheme(
            &secret(PASSPHRASE),
            &request,
            Scheme {
                version: 0,
                iterations: 2,
            },
        )
        .unwrap();
        assert_ne!(*one, *two);
    }

    #[test]
    fn test_output_uses_personal_alphabet() {
        let mut digest = [0u8; DIGEST_LEN];
        digest_into(secret(PASSPHRASE).expose(), &mut digest);
        let personal = Alphabet::personal(&digest).unwrap();

        let password = fast(PASSPHRASE, "https://example.com", "alice");
        assert!(password.chars().all(|c| personal.contains(c)));
    }

    #[test]
    fn test_workspace_wiped_after_success() {
        let request = Request::new("https://example.com", "alice").unwrap();
        let secret = secret(PASSPHRASE);

        let mut workspace = Workspace::default();
        let password = scoped(&mut workspace, |ws| {
            let password = run(ws, &secret, &request, Scheme::FAST)?;
            assert!(!ws.is_wiped());
            Ok(password)
        })
        .unwrap();

        assert!(!password.is_empty());
        assert!(workspace.is_wiped());
    }

    #[test]
    fn test_workspace_wiped_after_error() {
        let mut workspace = Workspace::default();
        let result: Result<()> = scoped(&mut workspace, |ws| {
            ws.digest = [0xaa; DIGEST_LEN];
            ws.personal = Some(Alphabet::lookup());
            ws.salt = [0x55; SALT_LEN];
            ws.scrambled_secret = Zeroizing::new("scrambled".to_string());
            ws.key = [0x11; KEY_LEN];
            Err(DeriveError::EmptySecret)
        });

        assert_eq!(result.unwrap_err(), DeriveError::EmptySecret);
        assert!(workspace.is_wiped());
    }

    #[test]
    fn test_workspace_wiped_after_panic() {
        let mut workspace = Workspace::default();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<()> = scoped(&mut workspace, |ws| {
                ws.digest = [0xaa; DIGEST_LEN];
                ws.key = [0x11; KEY_LEN];
                panic!("stage failed");
            });
        }));

        assert!(outcome.is_err());
        assert!(workspace.is_wiped());
    }

    #[test]
    fn test_unicode_inputs() {
        let cyrillic = fast("мастер🔑", "https://пример.рф", "жизнь");
        let again = fast("мастер🔑", "https://ПРИМЕР.рф", "жизнь");
        assert_eq!(*cyrillic, *again);
    }
}
