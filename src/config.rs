use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use dotenvy::EnvLoader;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:upkeep.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Global timezone setting for the application
static APP_TIMEZONE: OnceLock<Tz> = OnceLock::new();

/// Initialize the timezone from the given string
pub fn init_timezone(tz_str: &str) {
    let timezone: Tz = tz_str.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone = tz_str, "invalid timezone, falling back to UTC");
        chrono_tz::UTC
    });

    if APP_TIMEZONE.set(timezone).is_err() {
        tracing::warn!("timezone already initialized");
    }
}

/// Get the configured timezone
pub fn get_timezone() -> Tz {
    *APP_TIMEZONE.get().unwrap_or(&chrono_tz::UTC)
}

/// The calendar date right now in the configured timezone.
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&get_timezone()).date_naive()
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub timezone: String,
}

impl Settings {
    /// .env first, then the process environment, then defaults.
    pub fn load() -> Self {
        let dotenv = EnvLoader::new().load().unwrap_or_default();
        let lookup = |key: &str| {
            dotenv
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
                .filter(|v| !v.trim().is_empty())
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            timezone: lookup("APP_TIMEZONE").unwrap_or_else(|| "UTC".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_matches_configured_zone() {
        // Nothing initialised in tests, so the zone is UTC.
        assert_eq!(get_timezone(), chrono_tz::UTC);
        let before = Utc::now().date_naive();
        let today = today();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }
}
