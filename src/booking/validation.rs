//! Booking form validation.
//!
//! Two tiers share the same per-field rules:
//! - real-time: [`ValidationErrors::revalidate`] rechecks the one field that
//!   just changed, for the fields that are checked while typing
//! - full: [`validate_all`] derives every field's error from the draft again
//!   on submit, without looking at earlier real-time results

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::age::validate_age;
use super::models::BookingDraft;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 20;

/// Shown when a submit attempt fails validation.
pub const FIX_ERRORS_MESSAGE: &str = "Please fix the errors in the form before submitting. Make sure all required fields are filled and dates are valid.";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

// optional +971 / 971 / 0 prefix, then a 9-digit subscriber number starting 2-9
static UAE_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+971|971|0)?[2-9][0-9]{8}$").expect("valid phone regex"));

/// A form field, with the child position for per-child fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    StartDate,
    Plan,
    NumberOfChildren,
    ChildName(usize),
    ChildDateOfBirth(usize),
    ChildGender(usize),
}

impl FieldId {
    /// Name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::FirstName => "First name",
            FieldId::LastName => "Last name",
            FieldId::Email => "Email",
            FieldId::Phone => "Phone",
            FieldId::Address => "Address",
            FieldId::StartDate => "Start date",
            FieldId::Plan => "Plan",
            FieldId::NumberOfChildren => "Number of children",
            FieldId::ChildName(_) => "Child name",
            FieldId::ChildDateOfBirth(_) => "Date of birth",
            FieldId::ChildGender(_) => "Gender",
        }
    }

    /// Key the booking form uses for this field's error
    pub fn key(&self) -> String {
        match self {
            FieldId::FirstName => "firstName".to_string(),
            FieldId::LastName => "lastName".to_string(),
            FieldId::Email => "parentEmail".to_string(),
            FieldId::Phone => "parentPhone".to_string(),
            FieldId::Address => "parentAddress".to_string(),
            FieldId::StartDate => "startDate".to_string(),
            FieldId::Plan => "plan".to_string(),
            FieldId::NumberOfChildren => "numberOfChildren".to_string(),
            FieldId::ChildName(i) => format!("childName_{}", i),
            FieldId::ChildDateOfBirth(i) => format!("childDateOfBirth_{}", i),
            FieldId::ChildGender(i) => format!("childGender_{}", i),
        }
    }

    pub fn child_index(&self) -> Option<usize> {
        match self {
            FieldId::ChildName(i) | FieldId::ChildDateOfBirth(i) | FieldId::ChildGender(i) => Some(*i),
            _ => None,
        }
    }

    /// Whether the field is rechecked on every change
    pub fn is_realtime(&self) -> bool {
        matches!(
            self,
            FieldId::FirstName
                | FieldId::LastName
                | FieldId::Email
                | FieldId::Phone
                | FieldId::ChildName(_)
                | FieldId::ChildDateOfBirth(_)
        )
    }
}

/// Why a field is invalid. `Display` is the message shown under the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be at least {1} characters")]
    TooShort(&'static str, usize),

    #[error("{0} must be maximum {1} characters")]
    TooLong(&'static str, usize),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid UAE phone number (e.g., 0501234567, +971501234567)")]
    InvalidPhone,

    #[error("Please select a plan")]
    PlanMissing,

    #[error("At least one child is required")]
    NoChildren,

    #[error("Child must be at least {0} years old")]
    TooYoung(i32),

    #[error("Child must be {0} years old or younger")]
    TooOld(i32),
}

/// Field errors of a form. A field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<FieldId, FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldId) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &FieldError)> {
        self.errors.iter()
    }

    /// Record the outcome of checking `field`
    pub fn set(&mut self, field: FieldId, outcome: Result<(), FieldError>) {
        match outcome {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(e) => {
                self.errors.insert(field, e);
            }
        }
    }

    /// Real-time tier: recheck `field` if it is checked while typing.
    ///
    /// Returns whether the field was checked.
    pub fn revalidate(&mut self, draft: &BookingDraft, field: FieldId, today: NaiveDate) -> bool {
        if !field.is_realtime() {
            return false;
        }
        self.set(field, validate_field(draft, field, today));
        true
    }

    /// Drop entries of children past `count`
    pub fn retain_children(&mut self, count: usize) {
        self.errors
            .retain(|field, _| field.child_index().map_or(true, |i| i < count));
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, error) in &self.errors {
            map.serialize_entry(&field.key(), &error.to_string())?;
        }
        map.end()
    }
}

/// Required, 3 to 20 characters after trimming. Length is counted in UTF-16
/// units, as the booking form counts it.
pub fn validate_name(label: &'static str, value: &str) -> Result<(), FieldError> {
    let length = value.trim().encode_utf16().count();
    if length == 0 {
        return Err(FieldError::Required(label));
    }
    if length < NAME_MIN_LEN {
        return Err(FieldError::TooShort(label, NAME_MIN_LEN));
    }
    if length > NAME_MAX_LEN {
        return Err(FieldError::TooLong(label, NAME_MAX_LEN));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Required("Email"));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

/// UAE mobile or landline number; whitespace anywhere is ignored.
pub fn validate_phone(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required("Phone"));
    }
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if !UAE_PHONE_RE.is_match(&compact) {
        return Err(FieldError::InvalidPhone);
    }
    Ok(())
}

fn required(label: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required(label));
    }
    Ok(())
}

/// Check one field of `draft`.
///
/// Per-child fields of a child that does not exist are valid.
pub fn validate_field(draft: &BookingDraft, field: FieldId, today: NaiveDate) -> Result<(), FieldError> {
    let guardian = &draft.guardian;
    match field {
        FieldId::FirstName => validate_name(field.label(), &guardian.first_name),
        FieldId::LastName => validate_name(field.label(), &guardian.last_name),
        FieldId::Email => validate_email(&guardian.email),
        FieldId::Phone => validate_phone(&guardian.phone),
        FieldId::Address => required(field.label(), &guardian.address),
        FieldId::StartDate => match draft.start_date {
            Some(_) => Ok(()),
            None => Err(FieldError::Required(field.label())),
        },
        FieldId::Plan => match draft.plan {
            Some(_) => Ok(()),
            None => Err(FieldError::PlanMissing),
        },
        FieldId::NumberOfChildren => {
            if draft.number_of_children() == 0 {
                Err(FieldError::NoChildren)
            } else {
                Ok(())
            }
        }
        FieldId::ChildName(i) => match draft.children().get(i) {
            Some(child) => validate_name(field.label(), &child.name),
            None => Ok(()),
        },
        FieldId::ChildDateOfBirth(i) => match draft.children().get(i) {
            Some(child) => validate_age(child.date_of_birth, draft.camp_type, today).map(|_| ()),
            None => Ok(()),
        },
        FieldId::ChildGender(i) => match draft.children().get(i).map(|c| c.gender) {
            Some(None) => Err(FieldError::Required(field.label())),
            _ => Ok(()),
        },
    }
}

/// Every field of `draft`, per-child fields included
pub fn all_fields(draft: &BookingDraft) -> Vec<FieldId> {
    let mut fields = vec![
        FieldId::FirstName,
        FieldId::LastName,
        FieldId::Email,
        FieldId::Phone,
        FieldId::Address,
        FieldId::StartDate,
        FieldId::Plan,
        FieldId::NumberOfChildren,
    ];
    for i in 0..draft.number_of_children() {
        fields.push(FieldId::ChildName(i));
        fields.push(FieldId::ChildDateOfBirth(i));
        fields.push(FieldId::ChildGender(i));
    }
    fields
}

/// Full tier: validate the whole draft from scratch.
pub fn validate_all(draft: &BookingDraft, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in all_fields(draft) {
        errors.set(field, validate_field(draft, field, today));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::models::{CampType, FieldUpdate, Gender, Location, Plan};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn plan() -> Plan {
        Plan {
            name: "1 Day Access".to_string(),
            description: "Perfect for trying out our football clinic".to_string(),
            price: "150".to_string(),
        }
    }

    fn valid_draft() -> BookingDraft {
        let mut draft = BookingDraft::new(Some(plan()), Location::AbuDhabi, CampType::FootballClinic);
        draft.guardian.first_name = "Fatima".to_string();
        draft.guardian.last_name = "Al Mansoori".to_string();
        draft.guardian.email = "fatima@example.ae".to_string();
        draft.guardian.phone = "050 123 4567".to_string();
        draft.guardian.address = "Khalifa City, Abu Dhabi".to_string();
        draft.start_date = NaiveDate::from_ymd_opt(2025, 7, 7);
        draft
            .apply(FieldUpdate::ChildName {
                index: 0,
                value: "Zayed".to_string(),
            })
            .unwrap();
        draft
            .apply(FieldUpdate::ChildDateOfBirth {
                index: 0,
                value: NaiveDate::from_ymd_opt(2016, 4, 2),
            })
            .unwrap();
        draft
            .apply(FieldUpdate::ChildGender {
                index: 0,
                value: Some(Gender::Boy),
            })
            .unwrap();
        draft
    }

    #[test]
    fn test_validate_name_rules() {
        assert_eq!(validate_name("First name", "   "), Err(FieldError::Required("First name")));
        assert_eq!(
            validate_name("First name", " Al ").unwrap_err().to_string(),
            "First name must be at least 3 characters"
        );
        assert_eq!(
            validate_name("Child name", "Abcdefghijklmnopqrstu").unwrap_err().to_string(),
            "Child name must be maximum 20 characters"
        );
        assert!(validate_name("Last name", "Ali").is_ok());
        assert!(validate_name("Last name", "Abcdefghijklmnopqrst").is_ok());
    }

    #[test]
    fn test_validate_name_counts_utf16_units() {
        // each emoji is two UTF-16 units
        assert!(validate_name("Child name", "\u{1F600}\u{1F600}").is_ok());
        assert_eq!(
            validate_name("Child name", &"\u{1F600}".repeat(11)),
            Err(FieldError::TooLong("Child name", 20))
        );
        assert!(validate_name("Child name", "Zoë").is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(""), Err(FieldError::Required("Email")));
        assert_eq!(validate_email("parent@email"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("par ent@email.com"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("a@@b.com"), Err(FieldError::InvalidEmail));
        assert!(validate_email("parent@email.com").is_ok());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(" "), Err(FieldError::Required("Phone")));
        assert!(validate_phone("0501234567").is_ok());
        assert!(validate_phone("+971501234567").is_ok());
        assert!(validate_phone("971 50 123 4567").is_ok());
        assert!(validate_phone("501234567").is_ok());
        assert_eq!(validate_phone("0101234567"), Err(FieldError::InvalidPhone));
        assert_eq!(validate_phone("05012345"), Err(FieldError::InvalidPhone));
        assert_eq!(validate_phone("+44501234567"), Err(FieldError::InvalidPhone));
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(FieldId::Email.key(), "parentEmail");
        assert_eq!(FieldId::ChildName(2).key(), "childName_2");
        assert_eq!(FieldId::ChildDateOfBirth(0).key(), "childDateOfBirth_0");
        assert_eq!(FieldId::ChildGender(1).child_index(), Some(1));
        assert_eq!(FieldId::Phone.child_index(), None);
    }

    #[test]
    fn test_validate_all_passes_for_complete_draft() {
        assert!(validate_all(&valid_draft(), today()).is_empty());
    }

    #[test]
    fn test_validate_all_reports_every_field() {
        let draft = BookingDraft::new(None, Location::AlAin, CampType::KidsCamp);
        let errors = validate_all(&draft, today());

        assert_eq!(errors.get(FieldId::FirstName), Some(&FieldError::Required("First name")));
        assert_eq!(errors.get(FieldId::Email), Some(&FieldError::Required("Email")));
        assert_eq!(errors.get(FieldId::Address), Some(&FieldError::Required("Address")));
        assert_eq!(errors.get(FieldId::StartDate), Some(&FieldError::Required("Start date")));
        assert_eq!(errors.get(FieldId::Plan), Some(&FieldError::PlanMissing));
        assert_eq!(
            errors.get(FieldId::ChildDateOfBirth(0)).unwrap().to_string(),
            "Date of birth is required"
        );
        assert_eq!(errors.get(FieldId::ChildGender(0)).unwrap().to_string(), "Gender is required");
        assert!(errors.get(FieldId::NumberOfChildren).is_none());
    }

    #[test]
    fn test_validate_all_covers_padded_children() {
        let mut draft = valid_draft();
        draft.set_number_of_children(3).unwrap();

        let errors = validate_all(&draft, today());
        for i in 1..3 {
            assert!(errors.get(FieldId::ChildName(i)).is_some());
            assert!(errors.get(FieldId::ChildDateOfBirth(i)).is_some());
            assert!(errors.get(FieldId::ChildGender(i)).is_some());
        }
        assert!(errors.get(FieldId::ChildName(0)).is_none());
    }

    #[test]
    fn test_validate_all_uses_camp_type_age_range() {
        let mut draft = valid_draft();
        draft
            .apply(FieldUpdate::ChildDateOfBirth {
                index: 0,
                value: NaiveDate::from_ymd_opt(2009, 1, 1),
            })
            .unwrap();
        assert!(validate_all(&draft, today()).is_empty());

        draft.camp_type = CampType::KidsCamp;
        let errors = validate_all(&draft, today());
        assert_eq!(errors.get(FieldId::ChildDateOfBirth(0)), Some(&FieldError::TooOld(14)));
    }

    #[test]
    fn test_revalidate_only_touches_realtime_fields() {
        let mut draft = valid_draft();
        let mut errors = ValidationErrors::new();

        draft.guardian.address.clear();
        assert!(!errors.revalidate(&draft, FieldId::Address, today()));
        assert!(errors.is_empty());

        draft.guardian.first_name = "Jo".to_string();
        assert!(errors.revalidate(&draft, FieldId::FirstName, today()));
        assert_eq!(errors.get(FieldId::FirstName), Some(&FieldError::TooShort("First name", 3)));

        draft.guardian.first_name = "Joanna".to_string();
        errors.revalidate(&draft, FieldId::FirstName, today());
        assert!(errors.get(FieldId::FirstName).is_none());
    }

    #[test]
    fn test_validate_all_ignores_stale_realtime_state() {
        let mut draft = valid_draft();
        let mut errors = ValidationErrors::new();

        // real-time state says the name is fine, then the value changes
        // through a path that skips real-time checks
        errors.revalidate(&draft, FieldId::ChildName(0), today());
        draft.set_number_of_children(1).unwrap();
        draft.guardian.last_name = "X".to_string();

        assert!(errors.is_empty());
        let full = validate_all(&draft, today());
        assert_eq!(full.get(FieldId::LastName), Some(&FieldError::TooShort("Last name", 3)));
    }

    #[test]
    fn test_retain_children() {
        let mut errors = ValidationErrors::new();
        errors.set(FieldId::ChildName(0), Err(FieldError::Required("Child name")));
        errors.set(FieldId::ChildName(3), Err(FieldError::Required("Child name")));
        errors.set(FieldId::Email, Err(FieldError::InvalidEmail));

        errors.retain_children(2);
        assert_eq!(errors.len(), 2);
        assert!(errors.get(FieldId::ChildName(3)).is_none());
        assert!(errors.get(FieldId::Email).is_some());
    }

    #[test]
    fn test_errors_serialize_with_form_keys() {
        let mut errors = ValidationErrors::new();
        errors.set(FieldId::ChildGender(1), Err(FieldError::Required("Gender")));
        errors.set(FieldId::Phone, Err(FieldError::InvalidPhone));

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["childGender_1"], "Gender is required");
        assert_eq!(
            json["parentPhone"],
            "Please enter a valid UAE phone number (e.g., 0501234567, +971501234567)"
        );
    }
}
