use chrono::NaiveDate;

/// Minimal shape check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

pub fn require_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), String> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(format!("end date {e} is before start date {s}")),
        _ => Ok(()),
    }
}

pub fn require_url(field: &str, value: Option<&str>) -> Result<(), String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() && !(v.starts_with("http://") || v.starts_with("https://")) => {
            Err(format!("{field} must be an http(s) URL"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("jo@example.com"));
        assert!(is_valid_email(" jo.smith+hr@mail.example.org "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("jo"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jo@example"));
        assert!(!is_valid_email("jo@@example.com"));
        assert!(!is_valid_email("jo smith@example.com"));
        assert!(!is_valid_email("jo@.com"));
    }

    #[test]
    fn test_date_order() {
        let a = NaiveDate::from_ymd_opt(2020, 1, 1);
        let b = NaiveDate::from_ymd_opt(2021, 1, 1);
        assert!(require_date_order(a, b).is_ok());
        assert!(require_date_order(b, a).is_err());
        assert!(require_date_order(None, a).is_ok());
    }

    #[test]
    fn test_url() {
        assert!(require_url("website", Some("https://x.org")).is_ok());
        assert!(require_url("website", Some("x.org")).is_err());
        assert!(require_url("website", Some("")).is_ok());
        assert!(require_url("website", None).is_ok());
    }
}
