//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs are plain serde structs; each handler runs these checks before
//! building domain drafts. Failures become `invalid_request` errors whose
//! details name the offending field and a stable code.

use std::ops::RangeInclusive;
use std::sync::OnceLock;

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, PathError};
use regex::Regex;
use serde_json::json;
use url::Url;

use crate::domain::{Error, Money};

pub(crate) const USERNAME_LENGTH: RangeInclusive<usize> = 2..=30;
pub(crate) const PASSWORD_LENGTH: RangeInclusive<usize> = 6..=100;
pub(crate) const ABOUT_LENGTH: RangeInclusive<usize> = 2..=200;
pub(crate) const WISH_NAME_LENGTH: RangeInclusive<usize> = 1..=250;
pub(crate) const WISH_DESCRIPTION_LENGTH: RangeInclusive<usize> = 1..=1024;
pub(crate) const WISHLIST_NAME_LENGTH: RangeInclusive<usize> = 1..=250;
pub(crate) const WISHLIST_DESCRIPTION_LENGTH: RangeInclusive<usize> = 0..=1500;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidLength,
    InvalidEmail,
    InvalidUrl,
    NonPositiveAmount,
    MalformedBody,
    InvalidPath,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidLength => "invalid_length",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidUrl => "invalid_url",
            ErrorCode::NonPositiveAmount => "non_positive_amount",
            ErrorCode::MalformedBody => "malformed_body",
            ErrorCode::InvalidPath => "invalid_path",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_bounds(self, bounds: &RangeInclusive<usize>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": ErrorCode::InvalidLength.as_str(),
            "min": bounds.start(),
            "max": bounds.end(),
        }))
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Reject text whose character count falls outside `bounds`.
pub(crate) fn check_length(
    value: &str,
    field: FieldName,
    bounds: &RangeInclusive<usize>,
) -> Result<(), Error> {
    let length = value.chars().count();
    if bounds.contains(&length) {
        return Ok(());
    }
    let name = field.as_str();
    Err(ValidationError::new(
        field,
        format!(
            "{name} must be between {} and {} characters",
            bounds.start(),
            bounds.end()
        ),
    )
    .with_bounds(bounds))
}

pub(crate) fn check_email(value: &str, field: FieldName) -> Result<(), Error> {
    if email_regex().is_match(value) {
        return Ok(());
    }
    let name = field.as_str();
    Err(ValidationError::new(field, format!("{name} must be a valid e-mail address"))
        .with_code(ErrorCode::InvalidEmail))
}

/// Accept absolute `http`/`https` URLs only.
pub(crate) fn check_url(value: &str, field: FieldName) -> Result<(), Error> {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if valid {
        return Ok(());
    }
    let name = field.as_str();
    Err(ValidationError::new(field, format!("{name} must be an http(s) URL"))
        .with_code(ErrorCode::InvalidUrl))
}

pub(crate) fn check_positive(amount: Money, field: FieldName) -> Result<(), Error> {
    if !amount.is_zero() {
        return Ok(());
    }
    let name = field.as_str();
    Err(ValidationError::new(field, format!("{name} must be greater than zero"))
        .with_code(ErrorCode::NonPositiveAmount))
}

pub(crate) fn check_optional<T: ?Sized>(
    value: Option<&T>,
    check: impl FnOnce(&T) -> Result<(), Error>,
) -> Result<(), Error> {
    value.map_or(Ok(()), check)
}

/// Report unreadable JSON bodies in the API error format.
pub(crate) fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Malformed request body: {err}"))
        .with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
        .into()
}

/// Report unparsable path segments (non-numeric ids) in the API error format.
pub(crate) fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid path parameter: {err}"))
        .with_details(json!({ "code": ErrorCode::InvalidPath.as_str() }))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("username");

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a serde_json::Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    #[case("a", false)]
    #[case("ab", true)]
    #[case("ü ü", true)]
    #[case(&"x".repeat(30), true)]
    #[case(&"x".repeat(31), false)]
    fn length_counts_characters(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(check_length(value, FIELD, &USERNAME_LENGTH).is_ok(), ok);
    }

    #[rstest]
    fn length_error_names_field_and_bounds() {
        let err = check_length("a", FIELD, &USERNAME_LENGTH).expect_err("too short");

        assert_eq!(detail(&err, "field"), Some(&json!("username")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_length")));
        assert_eq!(detail(&err, "min"), Some(&json!(2)));
        assert_eq!(detail(&err, "max"), Some(&json!(30)));
    }

    #[rstest]
    #[case("alice@example.com", true)]
    #[case("alice@example", false)]
    #[case("alice example.com", false)]
    #[case("", false)]
    fn email_shape(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(check_email(value, FieldName::new("email")).is_ok(), ok);
    }

    #[rstest]
    #[case("https://shop.example/bike", true)]
    #[case("http://localhost:8080/a.png", true)]
    #[case("ftp://shop.example/bike", false)]
    #[case("shop.example/bike", false)]
    #[case("", false)]
    fn url_shape(#[case] value: &str, #[case] ok: bool) {
        let result = check_url(value, FieldName::new("link"));
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(detail(&err, "code"), Some(&json!("invalid_url")));
        }
    }

    #[rstest]
    fn zero_amount_is_rejected() {
        let err = check_positive(Money::ZERO, FieldName::new("amount")).expect_err("zero");

        assert_eq!(detail(&err, "field"), Some(&json!("amount")));
        assert!(check_positive(Money::from_cents(1), FieldName::new("amount")).is_ok());
    }

    #[rstest]
    fn optional_checks_skip_absent_values() {
        assert!(check_optional(None::<&str>, |v| check_url(v, FieldName::new("avatar"))).is_ok());
        assert!(
            check_optional(Some("nope"), |v| check_url(v, FieldName::new("avatar"))).is_err()
        );
    }
}
