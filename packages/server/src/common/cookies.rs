//! Session cookie attributes.
//!
//! The cookie names and payloads are dictated by the auth provider; the only
//! thing decided here is which `Domain`, `SameSite` and `Secure` attributes
//! they carry. Production shares the cookies across subdomains (admin host
//! and API host live under the same parent domain), everything else uses
//! host-only lax cookies.

use cookie::SameSite;
use url::Url;

/// Attributes applied to every session cookie this server writes.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    /// Parent domain for subdomain sharing, e.g. `.example.org`. `None`
    /// leaves the cookie host-only.
    pub domain: Option<String>,
    pub same_site: SameSite,
    pub secure: bool,
}

impl CookiePolicy {
    /// Decide cookie attributes from the environment tag and the admin host.
    pub fn from_environment(environment: &str, admin_base_url: &str) -> Self {
        if environment == "production" {
            Self {
                domain: cookie_domain_from_url(admin_base_url),
                same_site: SameSite::None,
                secure: true,
            }
        } else {
            Self {
                domain: None,
                same_site: SameSite::Lax,
                secure: false,
            }
        }
    }
}

/// Extract the root domain from a URL for cookie sharing across subdomains,
/// prefixed with a dot: `https://admin.example.org` -> `.example.org`.
/// Localhost never gets a domain attribute.
pub fn cookie_domain_from_url(url: &str) -> Option<String> {
    let hostname = Url::parse(url).ok()?.host_str()?.to_string();

    if hostname == "localhost" || hostname == "127.0.0.1" {
        return None;
    }

    let parts: Vec<&str> = hostname.split('.').collect();
    if parts.len() >= 2 {
        Some(format!(".{}", parts[parts.len() - 2..].join(".")))
    } else {
        Some(hostname)
    }
}
