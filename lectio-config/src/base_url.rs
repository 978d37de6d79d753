//! Normalization of the course API base URL.
//!
//! Users often write `localhost:5000/api` or `learn.example.com/api`. Both
//! the guard rails and the HTTP client read the value through
//! [`normalize_base_url`] so they accept and reject the same inputs.

use thiserror::Error;
use url::Url;

/// Why a base URL was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BaseUrlError {
    /// The normalized value does not parse.
    #[error(transparent)]
    Parse(#[from] url::ParseError),
    /// The value parses but names no host.
    #[error("URL has no host")]
    MissingHost,
}

/// Add `http://` when no http(s) scheme is present, drop trailing slashes
/// after the authority, then parse.
pub fn normalize_base_url(raw: &str) -> Result<Url, BaseUrlError> {
    let raw = raw.trim();
    let (scheme, rest) = match raw.split_once("://") {
        Some((scheme, rest))
            if scheme.eq_ignore_ascii_case("http")
                || scheme.eq_ignore_ascii_case("https") =>
        {
            (scheme, rest)
        }
        _ => ("http", raw),
    };

    let url = Url::parse(&format!("{scheme}://{}", rest.trim_end_matches('/')))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(BaseUrlError::MissingHost);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_added_when_missing() {
        let url = normalize_base_url("localhost:5000/api/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api");
        assert_eq!(url.host_str(), Some("localhost"));

        let url = normalize_base_url(" learn.example.com/api ").unwrap();
        assert_eq!(url.as_str(), "http://learn.example.com/api");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = normalize_base_url("https://learn.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://learn.example.com/api");
    }

    #[test]
    fn bare_scheme_is_rejected() {
        assert!(normalize_base_url("http://").is_err());
        assert!(normalize_base_url("https:///").is_err());
        assert!(normalize_base_url("").is_err());
    }

    #[test]
    fn unparseable_host_is_rejected() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(BaseUrlError::Parse(_))
        ));
    }
}
