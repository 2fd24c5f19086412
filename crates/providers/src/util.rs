//! Shared utility functions for HTTP adapters.

use crate::traits::ApiKey;
use vc_domain::error::Error;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Read an API key from the named environment variable.
///
/// A missing or empty variable is not an error: the key is only needed by
/// the first inference call, which reports the auth failure itself.
pub(crate) fn resolve_api_key(env_var: &str) -> Option<ApiKey> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Some(ApiKey::new(v.trim())),
        _ => {
            tracing::warn!(env_var = %env_var, "inference API key not set");
            None
        }
    }
}
