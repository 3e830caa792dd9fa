use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schedule::Recurrence;

pub type TaskId = i64;
pub type ItemId = i64;

/// One upkeep activity belonging to exactly one inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceTask {
    pub id: TaskId,
    pub item_id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub next_due: Option<NaiveDate>,
    pub last_completed: Option<NaiveDate>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Unscheduled,
    Overdue,
    DueToday,
    Upcoming,
}

impl MaintenanceTask {
    pub fn status(&self, today: NaiveDate) -> TaskStatus {
        match self.next_due {
            None => TaskStatus::Unscheduled,
            Some(due) if due < today => TaskStatus::Overdue,
            Some(due) if due == today => TaskStatus::DueToday,
            Some(_) => TaskStatus::Upcoming,
        }
    }

    /// The mutable fields of this task, as an edit form would replay them.
    pub fn fields(&self) -> ValidTaskFields {
        ValidTaskFields {
            name: self.name.clone(),
            description: self.description.clone(),
            recurrence: self.recurrence,
            next_due: self.next_due,
            last_completed: self.last_completed,
            color: self.color.clone(),
        }
    }

    pub fn to_record(&self, today: NaiveDate) -> TaskRecord {
        TaskRecord {
            id: self.id,
            item_id: self.item_id,
            name: self.name.clone(),
            description: self.description.clone(),
            recurrence_type: self.recurrence.kind_str(),
            recurrence_interval: self.recurrence.interval(),
            next_due_date: self.next_due,
            last_completed: self.last_completed,
            color: self.color.clone(),
            status: self.status(today),
        }
    }
}

/// Task fields as submitted by a form or JSON body, not yet validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_recurrence_type")]
    pub recurrence_type: String,
    #[serde(default)]
    pub recurrence_interval: Option<i64>,
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_completed: Option<NaiveDate>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_recurrence_type() -> String {
    "none".to_string()
}

/// Fields that passed validation and may be handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTaskFields {
    pub name: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub next_due: Option<NaiveDate>,
    pub last_completed: Option<NaiveDate>,
    pub color: Option<String>,
}

impl TaskFields {
    pub fn validate(self) -> Result<ValidTaskFields, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let recurrence = Recurrence::parse(&self.recurrence_type, self.recurrence_interval)?;

        Ok(ValidTaskFields {
            name: name.to_string(),
            description: non_blank(self.description),
            recurrence,
            next_due: self.next_due_date,
            last_completed: self.last_completed,
            color: non_blank(self.color),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// JSON shape of a task returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub item_id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub recurrence_type: &'static str,
    pub recurrence_interval: Option<i64>,
    pub next_due_date: Option<NaiveDate>,
    pub last_completed: Option<NaiveDate>,
    pub color: Option<String>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    #[default]
    Due,
    Name,
}

pub fn sort_tasks(tasks: &mut [MaintenanceTask], sort: TaskSort) {
    match sort {
        // Undated tasks sort after every dated one.
        TaskSort::Due => tasks.sort_by(|a, b| {
            (a.next_due.is_none(), a.next_due, a.name.to_lowercase())
                .cmp(&(b.next_due.is_none(), b.next_due, b.name.to_lowercase()))
        }),
        TaskSort::Name => tasks.sort_by_key(|t| t.name.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fields(name: &str, kind: &str, interval: Option<i64>) -> TaskFields {
        TaskFields {
            name: name.to_string(),
            recurrence_type: kind.to_string(),
            recurrence_interval: interval,
            ..Default::default()
        }
    }

    fn task(name: &str, next_due: Option<NaiveDate>) -> MaintenanceTask {
        MaintenanceTask {
            id: 1,
            item_id: 1,
            name: name.to_string(),
            description: None,
            recurrence: Recurrence::Monthly,
            next_due,
            last_completed: None,
            color: None,
        }
    }

    #[test]
    fn test_validate_trims_name() {
        let valid = fields("  Replace furnace filter ", "monthly", None).validate().unwrap();
        assert_eq!(valid.name, "Replace furnace filter");
        assert_eq!(valid.recurrence, Recurrence::Monthly);
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        for name in ["", "   ", "\t\n"] {
            assert_eq!(fields(name, "daily", None).validate(), Err(ValidationError::EmptyName));
        }
    }

    #[test]
    fn test_validate_custom_days_interval() {
        assert_eq!(
            fields("Water", "custom_days", Some(3)).validate().unwrap().recurrence,
            Recurrence::CustomDays(3)
        );
        assert_eq!(
            fields("Water", "custom_days", None).validate(),
            Err(ValidationError::MissingInterval)
        );
        assert_eq!(
            fields("Water", "custom_days", Some(-1)).validate(),
            Err(ValidationError::NonPositiveInterval(-1))
        );
    }

    #[test]
    fn test_validate_drops_interval_for_other_kinds() {
        let valid = fields("Clean gutters", "yearly", Some(30)).validate().unwrap();
        assert_eq!(valid.recurrence, Recurrence::Yearly);
        assert_eq!(valid.recurrence.interval(), None);
    }

    #[test]
    fn test_validate_blank_optional_text_becomes_none() {
        let mut input = fields("Oil hinges", "none", None);
        input.description = Some("   ".to_string());
        input.color = Some("#aabbcc".to_string());
        let valid = input.validate().unwrap();
        assert_eq!(valid.description, None);
        assert_eq!(valid.color.as_deref(), Some("#aabbcc"));
    }

    #[test]
    fn test_missing_recurrence_type_defaults_to_none() {
        let input: TaskFields = serde_json::from_str(r#"{"name": "Descale kettle"}"#).unwrap();
        assert_eq!(input.validate().unwrap().recurrence, Recurrence::None);
    }

    #[test]
    fn test_status() {
        let today = date(2024, 6, 10);
        assert_eq!(task("a", None).status(today), TaskStatus::Unscheduled);
        assert_eq!(task("a", Some(date(2024, 6, 9))).status(today), TaskStatus::Overdue);
        assert_eq!(task("a", Some(today)).status(today), TaskStatus::DueToday);
        assert_eq!(task("a", Some(date(2024, 6, 11))).status(today), TaskStatus::Upcoming);
    }

    #[test]
    fn test_sort_by_due_puts_undated_last() {
        let mut tasks = vec![
            task("undated", None),
            task("later", Some(date(2024, 7, 1))),
            task("Beta", Some(date(2024, 6, 1))),
            task("alpha", Some(date(2024, 6, 1))),
        ];
        sort_tasks(&mut tasks, TaskSort::Due);
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "later", "undated"]);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut tasks = vec![task("b", None), task("C", None), task("A", None)];
        sort_tasks(&mut tasks, TaskSort::Name);
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "b", "C"]);
    }

    #[test]
    fn test_record_serializes_wire_names() {
        let mut t = task("Flush water heater", Some(date(2025, 3, 1)));
        t.recurrence = Recurrence::CustomDays(90);
        let json = serde_json::to_value(t.to_record(date(2025, 3, 1))).unwrap();
        assert_eq!(json["recurrence_type"], "custom_days");
        assert_eq!(json["recurrence_interval"], 90);
        assert_eq!(json["next_due_date"], "2025-03-01");
        assert_eq!(json["status"], "due_today");
    }
}
