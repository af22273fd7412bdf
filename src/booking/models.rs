//! Booking draft data model.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::validation::FieldId;

/// Largest number of children on one booking.
pub const MAX_CHILDREN: usize = 5;

/// Which programme the booking is for; drives the allowed age range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CampType {
    KidsCamp,
    FootballClinic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    AbuDhabi,
    AlAin,
}

impl Location {
    pub fn label(&self) -> &'static str {
        match self {
            Location::AbuDhabi => "Abu Dhabi",
            Location::AlAin => "Al Ain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boy,
    Girl,
}

/// Offering selected on the camp or clinic page. Opaque to pricing apart
/// from its price string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
}

impl Plan {
    fn mentions(&self, word: &str) -> bool {
        self.name.to_lowercase().contains(word) || self.description.to_lowercase().contains(word)
    }

    pub fn is_football(&self) -> bool {
        self.mentions("football")
    }

    pub fn is_camp(&self) -> bool {
        self.description.to_lowercase().contains("camp")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl GuardianInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// Errors from structural edits to a draft
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("At least one child is required")]
    NoChildren,

    #[error("At most {max} children can be booked at once")]
    TooManyChildren { max: usize },

    #[error("No child at position {0}")]
    NoSuchChild(usize),
}

/// A single form edit
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum FieldUpdate {
    FirstName {
        value: String,
    },
    LastName {
        value: String,
    },
    Email {
        value: String,
    },
    Phone {
        value: String,
    },
    Address {
        value: String,
    },
    StartDate {
        #[serde(default, deserialize_with = "optional_date")]
        value: Option<NaiveDate>,
    },
    ChildName {
        index: usize,
        value: String,
    },
    ChildDateOfBirth {
        index: usize,
        #[serde(default, deserialize_with = "optional_date")]
        value: Option<NaiveDate>,
    },
    ChildGender {
        index: usize,
        #[serde(default)]
        value: Option<Gender>,
    },
}

/// Date inputs send `""` when cleared.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// The booking form contents.
///
/// The child count is always `children.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub guardian: GuardianInfo,
    children: Vec<Child>,
    pub start_date: Option<NaiveDate>,
    pub plan: Option<Plan>,
    pub location: Location,
    pub camp_type: CampType,
}

impl BookingDraft {
    /// Empty draft with one child slot
    pub fn new(plan: Option<Plan>, location: Location, camp_type: CampType) -> Self {
        Self {
            guardian: GuardianInfo::default(),
            children: vec![Child::default()],
            start_date: None,
            plan,
            location,
            camp_type,
        }
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn number_of_children(&self) -> usize {
        self.children.len()
    }

    /// Truncate or pad the child list. New slots start empty and are not
    /// validated until they are edited or the form is submitted.
    pub fn set_number_of_children(&mut self, count: usize) -> Result<(), DraftError> {
        if count == 0 {
            return Err(DraftError::NoChildren);
        }
        if count > MAX_CHILDREN {
            return Err(DraftError::TooManyChildren { max: MAX_CHILDREN });
        }
        self.children.resize_with(count, Child::default);
        Ok(())
    }

    /// Plan price string, empty when no plan is selected
    pub fn plan_price(&self) -> &str {
        self.plan.as_ref().map(|p| p.price.as_str()).unwrap_or("")
    }

    fn child_mut(&mut self, index: usize) -> Result<&mut Child, DraftError> {
        self.children.get_mut(index).ok_or(DraftError::NoSuchChild(index))
    }

    /// Write one field and report which field changed.
    pub fn apply(&mut self, update: FieldUpdate) -> Result<FieldId, DraftError> {
        let field = match update {
            FieldUpdate::FirstName { value } => {
                self.guardian.first_name = value;
                FieldId::FirstName
            }
            FieldUpdate::LastName { value } => {
                self.guardian.last_name = value;
                FieldId::LastName
            }
            FieldUpdate::Email { value } => {
                self.guardian.email = value;
                FieldId::Email
            }
            FieldUpdate::Phone { value } => {
                self.guardian.phone = value;
                FieldId::Phone
            }
            FieldUpdate::Address { value } => {
                self.guardian.address = value;
                FieldId::Address
            }
            FieldUpdate::StartDate { value } => {
                self.start_date = value;
                FieldId::StartDate
            }
            FieldUpdate::ChildName { index, value } => {
                self.child_mut(index)?.name = value;
                FieldId::ChildName(index)
            }
            FieldUpdate::ChildDateOfBirth { index, value } => {
                self.child_mut(index)?.date_of_birth = value;
                FieldId::ChildDateOfBirth(index)
            }
            FieldUpdate::ChildGender { index, value } => {
                self.child_mut(index)?.gender = value;
                FieldId::ChildGender(index)
            }
        };
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BookingDraft {
        BookingDraft::new(
            Some(Plan {
                name: "5-Days Access".to_string(),
                description: "Complete winter camp experience".to_string(),
                price: "850".to_string(),
            }),
            Location::AbuDhabi,
            CampType::KidsCamp,
        )
    }

    #[test]
    fn test_new_draft_has_one_child() {
        let d = draft();
        assert_eq!(d.number_of_children(), 1);
        assert_eq!(d.children()[0], Child::default());
        assert_eq!(d.plan_price(), "850");
    }

    #[test]
    fn test_set_number_of_children_pads_and_truncates() {
        let mut d = draft();
        d.apply(FieldUpdate::ChildName {
            index: 0,
            value: "Omar".to_string(),
        })
        .unwrap();

        d.set_number_of_children(4).unwrap();
        assert_eq!(d.number_of_children(), 4);
        assert_eq!(d.children()[0].name, "Omar");
        assert_eq!(d.children()[3], Child::default());

        d.set_number_of_children(2).unwrap();
        assert_eq!(d.number_of_children(), 2);
        assert_eq!(d.children()[0].name, "Omar");
    }

    #[test]
    fn test_set_number_of_children_bounds() {
        let mut d = draft();
        assert_eq!(d.set_number_of_children(0), Err(DraftError::NoChildren));
        assert_eq!(
            d.set_number_of_children(6),
            Err(DraftError::TooManyChildren { max: MAX_CHILDREN })
        );
        assert_eq!(d.number_of_children(), 1);
    }

    #[test]
    fn test_apply_child_out_of_range() {
        let mut d = draft();
        let err = d
            .apply(FieldUpdate::ChildGender {
                index: 3,
                value: Some(Gender::Girl),
            })
            .unwrap_err();
        assert_eq!(err, DraftError::NoSuchChild(3));
    }

    #[test]
    fn test_field_update_deserialize() {
        let update: FieldUpdate =
            serde_json::from_str(r#"{"field":"childDateOfBirth","index":1,"value":"2018-03-09"}"#).unwrap();
        match update {
            FieldUpdate::ChildDateOfBirth { index, value } => {
                assert_eq!(index, 1);
                assert_eq!(value, NaiveDate::from_ymd_opt(2018, 3, 9));
            }
            other => panic!("unexpected {:?}", other),
        }

        let cleared: FieldUpdate = serde_json::from_str(r#"{"field":"startDate","value":""}"#).unwrap();
        assert!(matches!(cleared, FieldUpdate::StartDate { value: None }));

        let gender: FieldUpdate =
            serde_json::from_str(r#"{"field":"childGender","index":0,"value":"girl"}"#).unwrap();
        assert!(matches!(
            gender,
            FieldUpdate::ChildGender {
                index: 0,
                value: Some(Gender::Girl)
            }
        ));
    }

    #[test]
    fn test_plan_classification() {
        let clinic = Plan {
            name: "1 Week (3 sessions)".to_string(),
            description: "Comprehensive football training program".to_string(),
            price: "390".to_string(),
        };
        assert!(clinic.is_football());
        assert!(!clinic.is_camp());
        assert!(draft().plan.unwrap().is_camp());
    }
}
