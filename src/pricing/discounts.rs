//! Discount codes.
//!
//! The code table is fixed. A matched code gives the same percentage off to
//! every child and replaces the sibling discount.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::pricing::services::PricingError;

/// Category reported to the booking API for an applied code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiscountKind {
    #[serde(rename = "adq employees")]
    AdqEmployees,
    #[serde(rename = "adnec employees")]
    AdnecEmployees,
    #[serde(rename = "adnec staff")]
    AdnecStaff,
    #[serde(rename = "normal")]
    Normal,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::AdqEmployees => "adq employees",
            DiscountKind::AdnecEmployees => "adnec employees",
            DiscountKind::AdnecStaff => "adnec staff",
            DiscountKind::Normal => "normal",
        }
    }
}

/// A known discount code
#[derive(Debug)]
pub struct DiscountCode {
    pub code: &'static str,
    pub percent: Decimal,
    pub kind: DiscountKind,
}

pub static DISCOUNT_CODES: [DiscountCode; 10] = [
    DiscountCode { code: "1dis0", percent: dec!(10), kind: DiscountKind::Normal },
    DiscountCode { code: "15dis", percent: dec!(15), kind: DiscountKind::Normal },
    DiscountCode { code: "0dis2", percent: dec!(20), kind: DiscountKind::Normal },
    DiscountCode { code: "ADQ20@ADSS2025", percent: dec!(32.73), kind: DiscountKind::AdqEmployees },
    DiscountCode { code: "ad20nec", percent: dec!(20), kind: DiscountKind::AdnecEmployees },
    DiscountCode { code: "1ADNOC5", percent: dec!(15), kind: DiscountKind::Normal },
    DiscountCode { code: "Adnecstaff20@adss2025", percent: dec!(32.73), kind: DiscountKind::AdnecStaff },
    DiscountCode { code: "20Kuwaiti", percent: dec!(22.08), kind: DiscountKind::Normal },
    DiscountCode { code: "POD50@ADSS2025", percent: dec!(50), kind: DiscountKind::Normal },
    DiscountCode { code: "vipdis15", percent: dec!(15), kind: DiscountKind::Normal },
];

/// Look up a code. Surrounding whitespace is ignored; matching is case-sensitive.
pub fn lookup(code: &str) -> Option<&'static DiscountCode> {
    let code = code.trim();
    DISCOUNT_CODES.iter().find(|entry| entry.code == code)
}

/// Discount metadata attached to a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub code: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub percent: Decimal,
    pub kind: DiscountKind,
}

/// Discount code input of a booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountState {
    entered_code: String,
    applied: Option<AppliedDiscount>,
    error: Option<PricingError>,
}

impl DiscountState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a code. An unknown code drops any previously applied discount,
    /// so pricing falls back to sibling discounts.
    pub fn apply(&mut self, code: &str) -> Result<&AppliedDiscount, PricingError> {
        self.entered_code = code.to_string();

        match lookup(code) {
            Some(entry) => {
                self.error = None;
                Ok(&*self.applied.insert(AppliedDiscount {
                    code: entry.code.to_string(),
                    percent: entry.percent,
                    kind: entry.kind,
                }))
            }
            None => {
                self.applied = None;
                self.error = Some(PricingError::InvalidDiscountCode);
                Err(PricingError::InvalidDiscountCode)
            }
        }
    }

    pub fn clear(&mut self) {
        self.entered_code.clear();
        self.applied = None;
        self.error = None;
    }

    /// Percentage applied to every child, zero when no code is active.
    pub fn percent(&self) -> Decimal {
        self.applied
            .as_ref()
            .map(|applied| applied.percent)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn applied(&self) -> Option<&AppliedDiscount> {
        self.applied.as_ref()
    }

    pub fn entered_code(&self) -> &str {
        &self.entered_code
    }

    pub fn error(&self) -> Option<&PricingError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::calculators::calculate_snapshot;

    #[test]
    fn test_lookup_exact_values() {
        assert_eq!(lookup("ADQ20@ADSS2025").unwrap().percent, dec!(32.73));
        assert_eq!(lookup("Adnecstaff20@adss2025").unwrap().percent, dec!(32.73));
        assert_eq!(lookup("20Kuwaiti").unwrap().percent, dec!(22.08));
        assert_eq!(lookup("POD50@ADSS2025").unwrap().percent, dec!(50));
        assert_eq!(lookup("1dis0").unwrap().percent, dec!(10));
    }

    #[test]
    fn test_lookup_trims_but_is_case_sensitive() {
        assert!(lookup("  0dis2 ").is_some());
        assert!(lookup("0DIS2").is_none());
        assert!(lookup("vipDis15").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_table_has_ten_unique_codes() {
        for (i, a) in DISCOUNT_CODES.iter().enumerate() {
            assert!(a.percent >= dec!(10) && a.percent <= dec!(50));
            for b in DISCOUNT_CODES.iter().skip(i + 1) {
                assert_ne!(a.code, b.code);
            }
        }
    }

    #[test]
    fn test_discount_kind_classification() {
        assert_eq!(lookup("ADQ20@ADSS2025").unwrap().kind, DiscountKind::AdqEmployees);
        assert_eq!(lookup("ad20nec").unwrap().kind, DiscountKind::AdnecEmployees);
        assert_eq!(lookup("Adnecstaff20@adss2025").unwrap().kind, DiscountKind::AdnecStaff);
        assert_eq!(lookup("20Kuwaiti").unwrap().kind, DiscountKind::Normal);
        assert_eq!(DiscountKind::AdnecStaff.as_str(), "adnec staff");
    }

    #[test]
    fn test_apply_valid_code() {
        let mut state = DiscountState::new();
        let applied = state.apply(" 0dis2").unwrap();
        assert_eq!(applied.code, "0dis2");
        assert_eq!(state.percent(), dec!(20));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_apply_invalid_code_resets_discount() {
        let mut state = DiscountState::new();
        state.apply("0dis2").unwrap();

        let err = state.apply("BOGUS").unwrap_err();
        assert_eq!(err.to_string(), "Invalid discount code");
        assert_eq!(state.percent(), Decimal::ZERO);
        assert!(state.applied().is_none());
        assert_eq!(state.error(), Some(&PricingError::InvalidDiscountCode));
        assert_eq!(state.entered_code(), "BOGUS");

        let snapshot = calculate_snapshot(dec!(850), 3, state.percent());
        assert_eq!(snapshot, calculate_snapshot(dec!(850), 3, Decimal::ZERO));
    }

    #[test]
    fn test_clear_restores_sibling_pricing() {
        let never_applied = calculate_snapshot(dec!(850), 4, DiscountState::new().percent());

        let mut state = DiscountState::new();
        state.apply("POD50@ADSS2025").unwrap();
        assert_ne!(calculate_snapshot(dec!(850), 4, state.percent()), never_applied);

        state.clear();
        assert_eq!(calculate_snapshot(dec!(850), 4, state.percent()), never_applied);
        assert_eq!(state, DiscountState::new());
    }

    #[test]
    fn test_clear_removes_error() {
        let mut state = DiscountState::new();
        let _ = state.apply("nope");
        state.clear();
        assert!(state.error().is_none());
        assert_eq!(state.entered_code(), "");
    }
}
