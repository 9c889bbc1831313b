//! Closed catalogs of subjects and teaching levels.

use crate::common::ValidationError;

pub const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Further Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "English",
    "French",
    "Computer Science",
    "Economics",
    "Accounting",
    "History",
    "Geography",
    "Literature",
    "Business Studies",
];

pub const LEVELS: &[&str] = &[
    "Primary",
    "Form 1-2",
    "Form 3-5",
    "Lower Sixth",
    "Upper Sixth",
    "University",
    "Professional",
];

/// Trims `value` and fails with `MissingField` when nothing is left.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed)
}

pub fn ensure_subject(subject: &str) -> Result<(), ValidationError> {
    ensure_listed("subject", SUBJECTS, subject)
}

pub fn ensure_level(level: &str) -> Result<(), ValidationError> {
    ensure_listed("level", LEVELS, level)
}

fn ensure_listed(
    field: &'static str,
    catalog: &[&str],
    value: &str,
) -> Result<(), ValidationError> {
    if catalog.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::NotInCatalog {
            field,
            value: value.to_string(),
        })
    }
}
