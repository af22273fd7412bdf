//! Service configuration from the environment

use std::net::SocketAddr;

use chrono::NaiveDate;

use crate::booking::SeasonCalendar;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Base URL of the booking API (`/api/bookings`)
    pub booking_api_url: String,
    /// Server that creates payment intents (`/create-payment-intent`)
    pub payment_server_url: String,
    pub stripe_api_url: String,
    pub stripe_publishable_key: String,
    pub season: SeasonCalendar,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let booking_api_url = var("BOOKING_API_URL").unwrap_or_else(|| "http://localhost:5000".into());
        let payment_server_url = var("PAYMENT_SERVER_URL").unwrap_or_else(|| booking_api_url.clone());
        let stripe_api_url = var("STRIPE_API_URL").unwrap_or_else(|| "https://api.stripe.com".into());
        let stripe_publishable_key =
            var("STRIPE_PUBLISHABLE_KEY").ok_or(ConfigError::Missing("STRIPE_PUBLISHABLE_KEY"))?;

        let defaults = SeasonCalendar::default();
        let season = SeasonCalendar {
            camp_start: date_var(&var, "SEASON_CAMP_START", defaults.camp_start)?,
            clinic_start: date_var(&var, "SEASON_CLINIC_START", defaults.clinic_start)?,
            season_end: date_var(&var, "SEASON_END", defaults.season_end)?,
        };

        Ok(Self {
            bind_addr,
            booking_api_url,
            payment_server_url,
            stripe_api_url,
            stripe_publishable_key,
            season,
        })
    }
}

fn date_var(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: NaiveDate,
) -> Result<NaiveDate, ConfigError> {
    match var(name) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
