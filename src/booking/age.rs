//! Child age checks.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use super::models::CampType;
use super::validation::FieldError;

/// Whole years between `date_of_birth` and `as_of`.
///
/// One less than the year difference while this year's birthday is still
/// ahead. Negative for birth dates in the future.
pub fn age_on(date_of_birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut age = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Inclusive age range accepted for a camp type
pub fn allowed_ages(camp_type: CampType) -> RangeInclusive<i32> {
    match camp_type {
        CampType::FootballClinic => 4..=19,
        CampType::KidsCamp => 4..=14,
    }
}

/// Check a child's date of birth against the camp type's age range.
///
/// Returns the age on success.
pub fn validate_age(
    date_of_birth: Option<NaiveDate>,
    camp_type: CampType,
    as_of: NaiveDate,
) -> Result<i32, FieldError> {
    let dob = date_of_birth.ok_or(FieldError::Required("Date of birth"))?;
    let age = age_on(dob, as_of);
    let range = allowed_ages(camp_type);

    if age < *range.start() {
        return Err(FieldError::TooYoung(*range.start()));
    }
    if age > *range.end() {
        return Err(FieldError::TooOld(*range.end()));
    }
    Ok(age)
}
