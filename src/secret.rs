use crate::error::{DeriveError, Result};
use std::fmt;
use zeroize::Zeroizing;

/// The master secret, owned in a buffer that is wiped on drop.
///
/// Deliberately neither `Clone` nor printable.
pub struct MasterSecret {
    bytes: Zeroizing<Vec<u8>>,
}

impl MasterSecret {
    /// Takes ownership of raw secret bytes.
    pub fn from_bytes(bytes: Zeroizing<Vec<u8>>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(DeriveError::EmptySecret);
        }
        Ok(Self { bytes })
    }

    /// Encodes a typed passphrase as UTF-16LE code units.
    ///
    /// Passwords generated by earlier releases hashed the passphrase in this
    /// form, so it stays fixed.
    pub fn from_passphrase(passphrase: &str) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(DeriveError::EmptySecret);
        }

        let units = passphrase.encode_utf16().count();
        let mut bytes = Zeroizing::new(Vec::with_capacity(units * 2));
        for unit in passphrase.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        Ok(Self { bytes })
    }

    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterSecret({} bytes)", self.bytes.len())
    }
}

/// A source of master secrets, such as a masked terminal prompt.
pub trait SecretEntry {
    fn acquire(&mut self) -> anyhow::Result<MasterSecret>;
}

/// Hands out the same passphrase on every call.
pub struct FixedPassphrase(Zeroizing<String>);

impl FixedPassphrase {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }
}

impl SecretEntry for FixedPassphrase {
    fn acquire(&mut self) -> anyhow::Result<MasterSecret> {
        Ok(MasterSecret::from_passphrase(&self.0)?)
    }
}
