//! Field validation.
//!
//! Shape checks for request fields: lengths, patterns, closed sets. Each
//! failure names the offending field and a fixed kind, so the boundary can
//! render the matching message. Reference-existence checks live with the
//! services, next to the lookups they need.

use quotebook_common::{AppError, AppResult, ValidationKind};
use quotebook_db::entities::person::PersonType;
use quotebook_db::entities::quote::QuoteState;
use regex::Regex;

static USERNAME_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^\w+$").unwrap());

static EMAIL_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r#"^(([^\s"(),.:;<>@\[\\\]]+(\.[^\s"(),.:;<>@\[\\\]]+)*)|(".+"))@((\[(?:\d{1,3}\.){3}\d{1,3}\])|(([\dA-Za-z-]+\.)+[A-Za-z]{2,}))$"#,
    )
    .unwrap()
});

/// Validate a username: word characters only, 3 to 20 of them.
pub fn username(value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation("username", ValidationKind::Required));
    }
    let length = value.chars().count();
    if length < 3 {
        return Err(AppError::validation("username", ValidationKind::MinLength));
    }
    if length > 20 {
        return Err(AppError::validation("username", ValidationKind::MaxLength));
    }
    if !USERNAME_RE.is_match(value) {
        return Err(AppError::validation("username", ValidationKind::Match));
    }
    Ok(())
}

/// Validate an email address.
pub fn email(value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation("email", ValidationKind::Required));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(AppError::validation("email", ValidationKind::Match));
    }
    Ok(())
}

/// Validate a password before it is hashed: at least 6 characters.
pub fn password(value: &str) -> AppResult<()> {
    if value.chars().count() < 6 {
        return Err(AppError::validation("password", ValidationKind::MinLength));
    }
    Ok(())
}

/// Validate a class name: required, at most 8 characters.
pub fn class_name(value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation("name", ValidationKind::Required));
    }
    if value.chars().count() > 8 {
        return Err(AppError::validation("name", ValidationKind::MaxLength));
    }
    Ok(())
}

/// Validate a person name: required, at most 32 characters.
pub fn person_name(value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation("name", ValidationKind::Required));
    }
    if value.chars().count() > 32 {
        return Err(AppError::validation("name", ValidationKind::MaxLength));
    }
    Ok(())
}

/// Parse a person type out of its closed set.
pub fn person_type(value: &str) -> AppResult<PersonType> {
    match value {
        "teacher" => Ok(PersonType::Teacher),
        "student" => Ok(PersonType::Student),
        "other" => Ok(PersonType::Other),
        _ => Err(AppError::validation("type", ValidationKind::Enum)),
    }
}

/// Parse a quote state out of its closed set.
pub fn quote_state(value: &str) -> AppResult<QuoteState> {
    match value {
        "pending" => Ok(QuoteState::Pending),
        "public" => Ok(QuoteState::Public),
        "archived" => Ok(QuoteState::Archived),
        _ => Err(AppError::validation("state", ValidationKind::Enum)),
    }
}

/// Validate quote text: required, at most 500 characters.
pub fn quote_text(value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation("text", ValidationKind::Required));
    }
    if value.chars().count() > 500 {
        return Err(AppError::validation("text", ValidationKind::MaxLength));
    }
    Ok(())
}

/// Validate an optional quote annotation (`context` or `note`): at most 70
/// characters. Emptiness means "unset" and is the callers' business.
pub fn quote_annotation(path: &str, value: &str) -> AppResult<()> {
    if value.chars().count() > 70 {
        return Err(AppError::validation(path, ValidationKind::MaxLength));
    }
    Ok(())
}
