//! Booking form, validation and the payment session.

pub mod age;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod schedule;
pub mod session;
pub mod validation;

pub use models::{BookingDraft, CampType, Child, FieldUpdate, Gender, GuardianInfo, Location, Plan};
pub use routes::router;
pub use schedule::SeasonCalendar;
pub use session::{BookingSession, SessionError, SessionState};
pub use validation::{validate_all, validate_field, FieldError, FieldId, ValidationErrors};
