//! Common validation utilities for campus identifiers.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Student codes: two uppercase letters followed by six digits (e.g. SV001234).
    static ref STUDENT_CODE_RE: Regex = Regex::new(r"^[A-Z]{2}\d{6}$").unwrap();
    /// School years: two consecutive four-digit years joined by a dash (e.g. 2024-2025).
    static ref SCHOOL_YEAR_RE: Regex = Regex::new(r"^(\d{4})-(\d{4})$").unwrap();
    /// Offering codes: course identifier, dash, section number (e.g. CS101-01).
    static ref OFFERING_CODE_RE: Regex = Regex::new(r"^[A-Z]{2,4}\d{3}-\d{2}$").unwrap();
}

/// Validates a student code (e.g. "SV001234").
pub fn validate_student_code(code: &str) -> Result<(), ValidationError> {
    if STUDENT_CODE_RE.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("student_code_format");
        err.message = Some("Student code must be two letters followed by six digits".into());
        Err(err)
    }
}

/// Validates a school year string (e.g. "2024-2025"); the two years must be consecutive.
pub fn validate_school_year(year: &str) -> Result<(), ValidationError> {
    let caps = match SCHOOL_YEAR_RE.captures(year) {
        Some(caps) => caps,
        None => {
            let mut err = ValidationError::new("school_year_format");
            err.message = Some("School year must look like 2024-2025".into());
            return Err(err);
        }
    };

    let first: i32 = caps[1].parse().unwrap_or(0);
    let second: i32 = caps[2].parse().unwrap_or(0);
    if second != first + 1 {
        let mut err = ValidationError::new("school_year_span");
        err.message = Some("School year must span two consecutive years".into());
        return Err(err);
    }

    Ok(())
}

/// Validates an offering code (e.g. "CS101-01").
pub fn validate_offering_code(code: &str) -> Result<(), ValidationError> {
    if OFFERING_CODE_RE.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("offering_code_format");
        err.message = Some("Offering code must look like CS101-01".into());
        Err(err)
    }
}

/// Validates that a date range is ordered (start strictly before end).
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start < end {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range");
        err.message = Some("Start date must be before end date".into());
        Err(err)
    }
}
