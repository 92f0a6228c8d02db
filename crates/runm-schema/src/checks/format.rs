use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveTime};
use runm_types::{PropertySchema, SchemaFormat};

use crate::check::{CheckOutcome, ValueCheck};
use crate::error::SchemaError;

/// Checks string values against the schema's `format`.
pub struct FormatCheck;

impl ValueCheck for FormatCheck {
    fn name(&self) -> &str {
        "format"
    }

    fn check(&self, value: &str, schema: &PropertySchema) -> Result<CheckOutcome, SchemaError> {
        let Some(format) = schema.format else {
            return Ok(CheckOutcome::Pass);
        };
        if conforms(value, format) {
            Ok(CheckOutcome::Pass)
        } else {
            Ok(CheckOutcome::fail(format!(
                "value '{value}' is not a valid {format}"
            )))
        }
    }
}

/// Returns `true` if `value` conforms to `format`.
pub fn conforms(value: &str, format: SchemaFormat) -> bool {
    match format {
        SchemaFormat::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
        SchemaFormat::Date => {
            value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        }
        SchemaFormat::Time => is_time(value),
        SchemaFormat::Email => is_email(value, false),
        SchemaFormat::IdnEmail => is_email(value, true),
        SchemaFormat::Hostname => is_hostname(value, false),
        SchemaFormat::IdnHostname => is_hostname(value, true),
        SchemaFormat::Ipv4 => value.parse::<Ipv4Addr>().is_ok(),
        SchemaFormat::Ipv6 => value.parse::<Ipv6Addr>().is_ok(),
        SchemaFormat::Uri => value.is_ascii() && is_iri(value),
        SchemaFormat::UriReference => value.is_ascii() && is_reference(value),
        SchemaFormat::Iri => is_iri(value),
        SchemaFormat::IriReference => is_reference(value),
        SchemaFormat::UriTemplate => is_uri_template(value),
    }
}

/// `HH:MM:SS[.frac]` followed by an optional `Z` or `+HH:MM` offset.
fn is_time(value: &str) -> bool {
    let (clock, zone) = match value.find(['Z', 'z', '+', '-']) {
        Some(i) => value.split_at(i),
        None => (value, ""),
    };
    if clock.len() < 8 || NaiveTime::parse_from_str(clock, "%H:%M:%S%.f").is_err() {
        return false;
    }
    match zone {
        "" | "Z" | "z" => true,
        z => {
            let offset = &z[1..];
            offset.len() == 5 && NaiveTime::parse_from_str(&format!("{offset}:00"), "%H:%M:%S").is_ok()
        }
    }
}

fn is_email(value: &str, international: bool) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(|c| c.is_whitespace() || c == '@') {
        return false;
    }
    if !international && !local.is_ascii() {
        return false;
    }
    is_hostname(domain, international)
}

/// RFC 1123 host names: dot-separated labels of 1-63 alphanumerics and
/// hyphens, not starting or ending with a hyphen, 253 characters total.
fn is_hostname(value: &str, international: bool) -> bool {
    let host = value.strip_suffix('.').unwrap_or(value);
    if host.is_empty() || host.chars().count() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        let len = label.chars().count();
        (1..=63).contains(&len)
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| {
                c == '-'
                    || c.is_ascii_alphanumeric()
                    || (international && !c.is_ascii() && c.is_alphanumeric())
            })
    })
}

fn is_reference(value: &str) -> bool {
    !value.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Absolute IRI: a scheme (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`)
/// followed by `:` and a whitespace-free remainder.
fn is_iri(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok && is_reference(value)
}

/// Expressions are brace-delimited and may not nest.
fn is_uri_template(value: &str) -> bool {
    let mut open = false;
    for c in value.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            c if c.is_whitespace() => return false,
            _ => {}
        }
    }
    !open
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time() {
        assert!(conforms("2024-05-01T12:30:00Z", SchemaFormat::DateTime));
        assert!(conforms("2024-05-01T12:30:00.25+02:00", SchemaFormat::DateTime));
        assert!(!conforms("2024-05-01 12:30", SchemaFormat::DateTime));
    }

    #[test]
    fn date() {
        assert!(conforms("2024-02-29", SchemaFormat::Date));
        assert!(!conforms("2023-02-29", SchemaFormat::Date));
        assert!(!conforms("2024-2-9", SchemaFormat::Date));
    }

    #[test]
    fn time() {
        assert!(conforms("23:59:59", SchemaFormat::Time));
        assert!(conforms("08:00:00.5Z", SchemaFormat::Time));
        assert!(conforms("08:00:00-05:00", SchemaFormat::Time));
        assert!(!conforms("24:00:00", SchemaFormat::Time));
        assert!(!conforms("08:00", SchemaFormat::Time));
        assert!(!conforms("08:00:00+5", SchemaFormat::Time));
    }

    #[test]
    fn email() {
        assert!(conforms("ops@example.com", SchemaFormat::Email));
        assert!(!conforms("ops@", SchemaFormat::Email));
        assert!(!conforms("ops example.com", SchemaFormat::Email));
        assert!(!conforms("jürgen@example.com", SchemaFormat::Email));
        assert!(conforms("jürgen@exämple.com", SchemaFormat::IdnEmail));
    }

    #[test]
    fn hostname() {
        assert!(conforms("compute-01.dc1.example.com", SchemaFormat::Hostname));
        assert!(conforms("localhost", SchemaFormat::Hostname));
        assert!(!conforms("-bad.example.com", SchemaFormat::Hostname));
        assert!(!conforms("a..b", SchemaFormat::Hostname));
        assert!(!conforms(&"a".repeat(64), SchemaFormat::Hostname));
        assert!(!conforms("bücher.de", SchemaFormat::Hostname));
        assert!(conforms("bücher.de", SchemaFormat::IdnHostname));
    }

    #[test]
    fn ip_addresses() {
        assert!(conforms("10.0.0.1", SchemaFormat::Ipv4));
        assert!(!conforms("10.0.0.256", SchemaFormat::Ipv4));
        assert!(conforms("fe80::1", SchemaFormat::Ipv6));
        assert!(!conforms("10.0.0.1", SchemaFormat::Ipv6));
    }

    #[test]
    fn uris() {
        assert!(conforms("https://example.com/a?b=c", SchemaFormat::Uri));
        assert!(!conforms("/relative/path", SchemaFormat::Uri));
        assert!(conforms("/relative/path", SchemaFormat::UriReference));
        assert!(!conforms("https://exämple.com", SchemaFormat::Uri));
        assert!(conforms("https://exämple.com", SchemaFormat::Iri));
        assert!(conforms("../ä", SchemaFormat::IriReference));
        assert!(!conforms("has space", SchemaFormat::IriReference));
    }

    #[test]
    fn uri_template() {
        assert!(conforms("/machines/{uuid}/props{?key}", SchemaFormat::UriTemplate));
        assert!(!conforms("/machines/{uuid", SchemaFormat::UriTemplate));
        assert!(!conforms("/{a{b}}", SchemaFormat::UriTemplate));
        assert!(!conforms("/a}", SchemaFormat::UriTemplate));
    }

    #[test]
    fn no_format_passes() {
        let s = PropertySchema::default();
        assert!(FormatCheck.check("anything", &s).unwrap().is_pass());
    }
}
