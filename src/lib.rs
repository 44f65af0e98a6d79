pub mod alphabet;
#[cfg(test)]
mod alloc_spy;
pub mod error;
pub mod hasher;
pub mod pipeline;
pub mod request;
pub mod salt;
pub mod secret;
pub mod stretch;

pub use alphabet::{Alphabet, LOOKUP_TABLE};
pub use error::{DeriveError, Result};
pub use pipeline::derive_password;
pub use request::Request;
pub use secret::{FixedPassphrase, MasterSecret, SecretEntry};
pub use stretch::{Scheme, KEY_LEN};
