use crate::error::{DeriveError, Result};
use url::{Host, Url};

/// A validated site/account pair, ready for derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    site_host: String,
    account: String,
}

impl Request {
    /// Parses `site` as an absolute URL and keeps its lowercased host.
    ///
    /// IPv6 literals are kept without brackets and internationalized names in
    /// their ASCII form. The account is kept verbatim and must be non-empty.
    pub fn new(site: &str, account: &str) -> Result<Self> {
        let site_host = normalize_site(site)?;
        if account.is_empty() {
            return Err(DeriveError::EmptyAccount);
        }
        Ok(Self {
            site_host,
            account: account.to_owned(),
        })
    }

    pub fn from_utf8(site: &[u8], account: &[u8]) -> Result<Self> {
        let site =
            std::str::from_utf8(site).map_err(|_| DeriveError::EncodingFailure("Site"))?;
        let account =
            std::str::from_utf8(account).map_err(|_| DeriveError::EncodingFailure("Account"))?;
        Self::new(site, account)
    }

    pub fn site_host(&self) -> &str {
        &self.site_host
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

/// Extracts the DNS-safe host of an absolute URL, lowercased.
pub fn normalize_site(site: &str) -> Result<String> {
    let url = Url::parse(site)
        .map_err(|e| DeriveError::InvalidSiteIdentifier(format!("{site:?}: {e}")))?;

    let host = match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_owned(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        _ => {
            return Err(DeriveError::InvalidSiteIdentifier(format!(
                "{site:?}: URL has no host"
            )));
        }
    };

    Ok(host.to_lowercase())
}
