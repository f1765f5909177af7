use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("not a valid url: {0}")]
    Malformed(String),
    #[error("unsupported scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),
    #[error("url must have a domain host such as example.com")]
    MissingDomain,
}

/// Checks a submitted URL and returns the trimmed text to enqueue.
///
/// Blank input yields `Ok(None)`. The returned string is the user's text, not
/// the parsed form, so duplicate detection stays an exact string comparison.
pub fn validate_submission(raw: &str) -> Result<Option<String>, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parsed = Url::parse(trimmed).map_err(|err| InputError::Malformed(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(InputError::UnsupportedScheme(other.to_string())),
    }

    let domain = parsed.domain().ok_or(InputError::MissingDomain)?;
    if !is_public_domain(domain) {
        return Err(InputError::MissingDomain);
    }

    Ok(Some(trimmed.to_string()))
}

// At least two labels, alphabetic top-level label of length >= 2.
fn is_public_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let mut labels = domain.rsplit('.');
    let Some(tld) = labels.next() else {
        return false;
    };
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let rest: Vec<&str> = labels.collect();
    !rest.is_empty()
        && rest.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_domains() {
        assert_eq!(
            validate_submission("  https://a.com  ").unwrap(),
            Some("https://a.com".to_string())
        );
        assert_eq!(
            validate_submission("http://sub.example.org/path?q=1").unwrap(),
            Some("http://sub.example.org/path?q=1".to_string())
        );
    }

    #[test]
    fn blank_input_is_ignored() {
        assert_eq!(validate_submission("   ").unwrap(), None);
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            validate_submission("ftp://a.com").unwrap_err(),
            InputError::UnsupportedScheme("ftp".into())
        );
    }

    #[test]
    fn rejects_ip_and_single_label_hosts() {
        assert_eq!(
            validate_submission("http://127.0.0.1/").unwrap_err(),
            InputError::MissingDomain
        );
        assert_eq!(
            validate_submission("http://localhost/").unwrap_err(),
            InputError::MissingDomain
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            validate_submission("not a url").unwrap_err(),
            InputError::Malformed(_)
        ));
    }
}
