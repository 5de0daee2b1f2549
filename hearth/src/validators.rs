use url::Url;

use crate::errors::{ValidationIssue, ValidationResult, ValidationError};

/// Returns `true` if the string is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Pushes an issue when a required text field is blank.
pub fn check_required_text(field: &str, value: &str, issues: &mut Vec<ValidationIssue>) {
    if is_blank(value) {
        issues.push(ValidationIssue::new(field, "validation.required", "must not be blank"));
    }
}

/// Pushes an issue when an optional media reference is present but not a URL.
pub fn check_media(field: &str, value: Option<&str>, issues: &mut Vec<ValidationIssue>) {
    if let Some(media) = value
        && !is_valid_url(media)
    {
        issues.push(ValidationIssue::new(field, "validation.url", "must be a url"));
    }
}

/// Turns collected issues into a result.
pub fn finish(issues: Vec<ValidationIssue>) -> ValidationResult<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(issues))
    }
}
