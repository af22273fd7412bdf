//! Season dates, default start dates and access periods.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::models::{Location, Plan};

/// Key dates of the current season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCalendar {
    pub camp_start: NaiveDate,
    pub clinic_start: NaiveDate,
    pub season_end: NaiveDate,
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self {
            camp_start: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
            clinic_start: NaiveDate::from_ymd_opt(2025, 7, 7).unwrap_or_default(),
            season_end: NaiveDate::from_ymd_opt(2025, 8, 21).unwrap_or_default(),
        }
    }
}

/// Dates a booking gives access to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

impl SeasonCalendar {
    /// Start date preselected when a plan is chosen.
    ///
    /// Al Ain only runs the clinic schedule; elsewhere camp plans start with
    /// the camp.
    pub fn default_start_date(&self, plan: &Plan, location: Location) -> NaiveDate {
        if location == Location::AlAin {
            return self.clinic_start;
        }
        if plan.is_camp() {
            self.camp_start
        } else {
            self.clinic_start
        }
    }

    /// Access period implied by the plan name
    pub fn access_period(&self, start: NaiveDate, plan: &Plan) -> AccessPeriod {
        let name = plan.name.to_lowercase();
        let end = if name.contains("1 day") {
            start + Days::new(1)
        } else if name.contains("1 week") {
            start + Days::new(7)
        } else if name.contains("full month") {
            start + Days::new(30)
        } else if name.contains("full camp") {
            self.season_end
        } else {
            start + Days::new(1)
        };

        AccessPeriod {
            start,
            end,
            days: (end - start).num_days(),
        }
    }
}

/// Summary line such as "Full day access to Kids Camp - Al Ain"
pub fn offering_label(plan: &Plan, location: Location) -> String {
    let programme = if plan.is_football() {
        "Football Clinic"
    } else {
        "Kids Camp"
    };
    format!("Full day access to {} - {}", programme, location.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, description: &str) -> Plan {
        Plan {
            name: name.to_string(),
            description: description.to_string(),
            price: "0".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_start_date() {
        let season = SeasonCalendar::default();
        let camp = plan("5-Days Access", "Complete winter camp experience");
        let clinic = plan("1 Day Access", "Perfect for trying out our football clinic");

        assert_eq!(season.default_start_date(&camp, Location::AbuDhabi), date(2025, 7, 1));
        assert_eq!(season.default_start_date(&clinic, Location::AbuDhabi), date(2025, 7, 7));
        assert_eq!(season.default_start_date(&camp, Location::AlAin), date(2025, 7, 7));
    }

    #[test]
    fn test_access_period() {
        let season = SeasonCalendar::default();
        let start = date(2025, 7, 7);

        let one_day = season.access_period(start, &plan("1 Day Access", ""));
        assert_eq!(one_day.end, date(2025, 7, 8));
        assert_eq!(one_day.days, 1);

        let week = season.access_period(start, &plan("1 Week (3 sessions)", ""));
        assert_eq!(week.days, 7);

        let month = season.access_period(start, &plan("Full Month (12 sessions)", ""));
        assert_eq!(month.end, date(2025, 8, 6));

        let full = season.access_period(date(2025, 7, 1), &plan("Full Camp Access", ""));
        assert_eq!(full.end, date(2025, 8, 21));
        assert_eq!(full.days, 51);

        let other = season.access_period(start, &plan("3-Days Access", ""));
        assert_eq!(other.days, 1);
    }

    #[test]
    fn test_offering_label() {
        let clinic = plan("1 Day Access", "Perfect for trying out our football clinic");
        assert_eq!(
            offering_label(&clinic, Location::AlAin),
            "Full day access to Football Clinic - Al Ain"
        );
        let camp = plan("10-Days Access", "Extended camp experience");
        assert_eq!(
            offering_label(&camp, Location::AbuDhabi),
            "Full day access to Kids Camp - Abu Dhabi"
        );
    }
}
