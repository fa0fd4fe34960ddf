//! Field format checks for identity input.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MONIKER_MIN_LEN: usize = 2;
pub const MONIKER_MAX_LEN: usize = 10;

static MONIKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("Invalid moniker regex"));

static REGION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2}(-gov|-iso[a-z]?)?-[a-z]+-\d+$").expect("Invalid region regex")
});

static ACCOUNT_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{12}$").expect("Invalid account id regex"));

static SEMVER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("Invalid semver regex")
});

/// A single identity field that failed its format constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} '{value}': {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, value: &str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }
}

pub fn validate_moniker(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !(MONIKER_MIN_LEN..=MONIKER_MAX_LEN).contains(&len) {
        return Err(ValidationError::new(
            field,
            value,
            format!(
                "must be {}-{} characters long",
                MONIKER_MIN_LEN, MONIKER_MAX_LEN
            ),
        ));
    }
    if !MONIKER_REGEX.is_match(value) {
        return Err(ValidationError::new(
            field,
            value,
            "must be lowercase alphanumeric with single hyphens, start with a letter and end alphanumeric",
        ));
    }
    Ok(())
}

pub fn validate_region(value: &str) -> Result<(), ValidationError> {
    if REGION_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "aws_region",
            value,
            "must look like an AWS region code, e.g. eu-central-2",
        ))
    }
}

pub fn validate_account_id(value: &str) -> Result<(), ValidationError> {
    if ACCOUNT_ID_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "aws_account_id",
            value,
            "must be exactly 12 digits",
        ))
    }
}

pub fn validate_semver(value: &str) -> Result<(), ValidationError> {
    if SEMVER_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "semantic_version",
            value,
            "must be MAJOR.MINOR.PATCH with optional pre-release and build metadata",
        ))
    }
}

pub fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, value, "must not be empty"))
    } else {
        Ok(())
    }
}
