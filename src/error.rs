use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeriveError>;

/// Failures of a derivation run.
///
/// Every variant is raised before any key material is stretched, and none of
/// them is transient: the caller retries only by supplying corrected input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    #[error("Invalid site identifier: {0}")]
    InvalidSiteIdentifier(String),

    #[error("Account name must not be empty")]
    EmptyAccount,

    #[error("Master secret must not be empty")]
    EmptySecret,

    #[error("{0} is not valid UTF-8")]
    EncodingFailure(&'static str),

    #[error("Alphabet needs at least 2 symbols, found {0}")]
    InvalidAlphabet(usize),
}
