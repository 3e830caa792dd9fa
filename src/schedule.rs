use chrono::{Datelike, Days, NaiveDate};

use crate::error::ValidationError;

/// Longest accepted `custom_days` interval, roughly a century.
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// How often a maintenance task repeats.
///
/// The interval only exists on `CustomDays`, so a rule can never carry an
/// interval that its kind ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    BiMonthly,
    Yearly,
    CustomDays(u32),
}

impl Recurrence {
    /// Parse a rule from user input. Strict: `custom_days` needs a positive interval.
    pub fn parse(kind: &str, interval: Option<i64>) -> Result<Self, ValidationError> {
        let recurrence = match kind.trim() {
            "none" => Recurrence::None,
            "daily" => Recurrence::Daily,
            "weekly" => Recurrence::Weekly,
            "bi_weekly" => Recurrence::BiWeekly,
            "monthly" => Recurrence::Monthly,
            "bi_monthly" => Recurrence::BiMonthly,
            "yearly" => Recurrence::Yearly,
            "custom_days" => match interval {
                None => return Err(ValidationError::MissingInterval),
                Some(n) if n <= 0 => return Err(ValidationError::NonPositiveInterval(n)),
                Some(n) if n > MAX_INTERVAL_DAYS => return Err(ValidationError::IntervalTooLarge(n)),
                Some(n) => Recurrence::CustomDays(n as u32),
            },
            other => return Err(ValidationError::UnknownRecurrence(other.to_string())),
        };
        Ok(recurrence)
    }

    /// Rebuild a rule from a stored row. A missing or non-positive
    /// `custom_days` interval reads back as 1; an oversized one is capped.
    pub fn from_stored(kind: &str, interval: Option<i64>) -> Option<Self> {
        match kind {
            "custom_days" => {
                let days = interval
                    .filter(|n| *n > 0)
                    .map_or(1, |n| n.min(MAX_INTERVAL_DAYS));
                Some(Recurrence::CustomDays(days as u32))
            }
            _ => Recurrence::parse(kind, None).ok(),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::BiWeekly => "bi_weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::BiMonthly => "bi_monthly",
            Recurrence::Yearly => "yearly",
            Recurrence::CustomDays(_) => "custom_days",
        }
    }

    pub fn interval(&self) -> Option<i64> {
        match self {
            Recurrence::CustomDays(days) => Some(i64::from(*days)),
            _ => None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

/// Next due date after `from` for the given rule, or `None` for one-off tasks.
///
/// Pure calendar arithmetic: no clock, no timezone. Month and year steps clamp
/// to the last day of the target month instead of spilling into the next one.
pub fn next_due_date(from: NaiveDate, recurrence: Recurrence) -> Option<NaiveDate> {
    match recurrence {
        Recurrence::None => None,
        Recurrence::Daily => from.checked_add_days(Days::new(1)),
        Recurrence::Weekly => from.checked_add_days(Days::new(7)),
        Recurrence::BiWeekly => from.checked_add_days(Days::new(14)),
        Recurrence::Monthly => add_months_clamped(from, 1),
        Recurrence::BiMonthly => add_months_clamped(from, 2),
        Recurrence::Yearly => add_year(from),
        Recurrence::CustomDays(days) => from.checked_add_days(Days::new(u64::from(days.max(1)))),
    }
}

fn add_months_clamped(from: NaiveDate, months: u32) -> Option<NaiveDate> {
    // Zero-based month index so December + 1 rolls into January of the next year.
    let total = from.month0() + months;
    let year = from.year().checked_add(i32::try_from(total / 12).ok()?)?;
    let month = total % 12 + 1;
    let day = from.day().min(last_day_of_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn add_year(from: NaiveDate) -> Option<NaiveDate> {
    let year = from.year().checked_add(1)?;
    if from.month() == 2 && from.day() == 29 {
        // Feb 29 only survives into another leap year, never the next one.
        return NaiveDate::from_ymd_opt(year, 2, 28);
    }
    NaiveDate::from_ymd_opt(year, from.month(), from.day())
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt().map(|d| d.day())
}
