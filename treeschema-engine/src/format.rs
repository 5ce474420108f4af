//! Named `format` validators (§4.G). Unknown format names are ignored,
//! matching JSON-Schema tradition, so callers should treat `None` as "no
//! opinion" rather than "invalid".

/// Validates `value` against the named format, returning `None` if the
/// format name isn't recognized (in which case the caller should not
/// report a violation).
pub fn validate_format(name: &str, value: &str) -> Option<bool> {
    Some(match name {
        "date-time" => chrono::DateTime::parse_from_rfc3339(value).is_ok(),
        "date" => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        "time" => {
            chrono::NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok()
                || chrono::NaiveTime::parse_from_str(value, "%H:%M:%S%.f").is_ok()
        }
        "email" => is_valid_email(value),
        "hostname" => is_valid_hostname(value),
        "ipv4" => value.parse::<std::net::Ipv4Addr>().is_ok(),
        "ipv6" => value.parse::<std::net::Ipv6Addr>().is_ok(),
        "uri" => url::Url::parse(value).is_ok(),
        "uuid" => uuid::Uuid::parse_str(value).is_ok(),
        "regex" => regex::Regex::new(value).is_ok(),
        _ => return None,
    })
}

/// A small hand-checked grammar rather than a full RFC 5321 parser: one
/// `@`, non-empty local and domain parts, domain contains a `.`.
fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.') && !value.contains(' ') && value.matches('@').count() == 1
}

/// RFC 1123-ish: dot-separated labels, each 1-63 chars of alphanumerics and
/// hyphens, not starting or ending with a hyphen.
fn is_valid_hostname(value: &str) -> bool {
    if value.is_empty() || value.len() > 253 {
        return false;
    }
    value.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_is_ignored() {
        assert_eq!(validate_format("not-a-real-format", "anything"), None);
    }

    #[test]
    fn date_time_accepts_rfc3339() {
        assert_eq!(validate_format("date-time", "2024-01-02T03:04:05Z"), Some(true));
        assert_eq!(validate_format("date-time", "not a date"), Some(false));
    }

    #[test]
    fn uuid_validates() {
        assert_eq!(
            validate_format("uuid", "550e8400-e29b-41d4-a716-446655440000"),
            Some(true)
        );
        assert_eq!(validate_format("uuid", "not-a-uuid"), Some(false));
    }

    #[test]
    fn hostname_rejects_leading_hyphen() {
        assert_eq!(validate_format("hostname", "-bad.example.com"), Some(false));
        assert_eq!(validate_format("hostname", "good.example.com"), Some(true));
    }

    #[test]
    fn email_requires_single_at_and_dotted_domain() {
        assert_eq!(validate_format("email", "a@b.com"), Some(true));
        assert_eq!(validate_format("email", "a@@b.com"), Some(false));
        assert_eq!(validate_format("email", "a@b"), Some(false));
    }
}
