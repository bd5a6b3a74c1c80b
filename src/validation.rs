//! Input validation and URL normalization

use url::Url;

use crate::error::ApiError;
use crate::model::{Website, WebsiteRequest};

/// A create/update payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidWebsite {
    pub name: String,
    pub url: String,
}

/// Prefixes `https://` unless the input already starts with an http(s) scheme
///
/// The scheme check is case-insensitive and surrounding whitespace is trimmed.
/// No other canonicalization happens: `example.com` becomes
/// `https://example.com`, not `https://example.com/`.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Returns true when `url` parses as an http(s) URL with a host
pub fn is_well_formed(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Validates a create/update payload
///
/// Both fields must be non-empty after trimming, and the normalized URL must
/// be well formed.
pub fn validate(request: &WebsiteRequest) -> Result<ValidWebsite, ApiError> {
    let name = request.name.trim();
    let raw_url = request.url.trim();

    if name.is_empty() || raw_url.is_empty() {
        return Err(ApiError::Validation("Name and URL are required".to_string()));
    }

    let url = normalize_url(raw_url);
    if !is_well_formed(&url) {
        return Err(ApiError::Validation(format!("Invalid URL: {}", raw_url)));
    }

    Ok(ValidWebsite {
        name: name.to_string(),
        url,
    })
}

/// Fails with [`ApiError::Duplicate`] if a record other than `exclude_id` uses `url`
///
/// Comparison is an exact, case-sensitive string match on the stored URL.
pub fn ensure_unique(
    websites: &[Website],
    url: &str,
    exclude_id: Option<&str>,
) -> Result<(), ApiError> {
    let taken = websites
        .iter()
        .any(|site| site.url == url && Some(site.id.as_str()) != exclude_id);

    if taken {
        Err(ApiError::Duplicate)
    } else {
        Ok(())
    }
}

/// Derives a display name from a URL's host
///
/// `https://www.github.com/rust-lang` gives `Github`. Returns `None` when no
/// host can be extracted.
pub fn suggest_name(raw: &str) -> Option<String> {
    let parsed = Url::parse(&normalize_url(raw)).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().filter(|label| !label.is_empty())?;

    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, url: &str) -> WebsiteRequest {
        WebsiteRequest {
            name: name.to_string(),
            url: url.to_string(),
            force: false,
        }
    }

    #[test]
    fn test_normalize_adds_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("  example.com/path "), "https://example.com/path");
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("HTTPS://Example.com"), "HTTPS://Example.com");
    }

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("https://example.com"));
        assert!(is_well_formed("http://localhost:3000/a?b=c"));
        assert!(!is_well_formed("https://"));
        assert!(!is_well_formed("https://exa mple.com"));
        assert!(!is_well_formed("mailto:someone@example.com"));
    }

    #[test]
    fn test_validate_requires_fields() {
        assert!(matches!(validate(&request("", "example.com")), Err(ApiError::Validation(_))));
        assert!(matches!(validate(&request("Example", "   ")), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_validate_normalizes() {
        let valid = validate(&request(" Example ", "example.com")).unwrap();
        assert_eq!(valid.name, "Example");
        assert_eq!(valid.url, "https://example.com");
    }

    #[test]
    fn test_validate_rejects_malformed_url() {
        assert!(matches!(
            validate(&request("Broken", "not a url")),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_ensure_unique_excludes_self() {
        let site = Website::new("Example".into(), "https://example.com".into());
        let sites = vec![site.clone()];

        assert!(matches!(
            ensure_unique(&sites, "https://example.com", None),
            Err(ApiError::Duplicate)
        ));
        assert!(ensure_unique(&sites, "https://example.com", Some(&site.id)).is_ok());
        assert!(ensure_unique(&sites, "https://EXAMPLE.com", None).is_ok());
    }

    #[test]
    fn test_suggest_name() {
        assert_eq!(suggest_name("www.github.com").as_deref(), Some("Github"));
        assert_eq!(suggest_name("https://docs.rs/axum").as_deref(), Some("Docs"));
        assert_eq!(suggest_name(""), None);
    }
}
