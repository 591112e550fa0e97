// Data models for the task list

use crate::error::{Result, TodoError};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum task text length, counted in characters after trimming
pub const MAX_TEXT_LEN: usize = 200;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank: high first
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" | "med" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build an active task; `text` must already be validated
    pub fn new(
        text: impl Into<String>,
        priority: Priority,
        due_date: Option<NaiveDate>,
        category: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Task {
            id: new_id(),
            text: text.into(),
            priority,
            due_date,
            category: normalize_category(category),
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to the given completion state. Returns false when already there.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) -> bool {
        if self.completed == completed {
            return false;
        }
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
        self.touch(now);
        true
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        let target = !self.completed;
        self.set_completed(target, now);
    }

    /// Replace the text; `text` must already be validated
    pub fn set_text(&mut self, text: String, now: DateTime<Utc>) {
        self.text = text;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Incomplete with a due date strictly before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_due_today(&self, today: NaiveDate) -> bool {
        self.due_date == Some(today)
    }

    /// Due after today and no later than `days` days from now
    pub fn is_due_within(&self, today: NaiveDate, days: u32) -> bool {
        let horizon = today + Duration::days(i64::from(days));
        self.due_date.is_some_and(|due| due > today && due <= horizon)
    }

    /// Whole days from creation to completion, rounded up
    pub fn days_to_complete(&self) -> Option<i64> {
        if !self.completed {
            return None;
        }
        let completed_at = self.completed_at?;
        let elapsed_ms = (completed_at - self.created_at).num_milliseconds();
        Some(elapsed_ms.div_euclid(MS_PER_DAY) + i64::from(elapsed_ms.rem_euclid(MS_PER_DAY) != 0))
    }
}

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// UI colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme: {}", s)),
        }
    }
}

/// Trim and bound-check task text, returning the committed form
pub fn validate_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TodoError::Validation("task description cannot be empty".to_string()));
    }
    let len = trimmed.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(TodoError::Validation(format!(
            "task description is too long: {} chars (max {})",
            len, MAX_TEXT_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Empty or whitespace-only categories mean "uncategorized"
pub fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Fresh opaque task id
pub fn new_id() -> String {
    format!("task_{}", Uuid::now_v7().simple())
}

/// Current calendar date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        let p: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(p, Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("med".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_task_serializes_camel_case_with_nulls() {
        let task = Task::new("Write report", Priority::Low, None, None, at(9));
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["text"], "Write report");
        assert_eq!(json["priority"], "low");
        assert!(json["dueDate"].is_null());
        assert!(json["category"].is_null());
        assert!(json["completedAt"].is_null());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_toggle_sets_and_clears_completed_at() {
        let mut task = Task::new("A", Priority::Medium, None, None, at(9));

        task.toggle(at(10));
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(at(10)));
        assert_eq!(task.updated_at, at(10));

        task.toggle(at(11));
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.updated_at, at(11));
    }

    #[test]
    fn test_set_completed_reports_no_change() {
        let mut task = Task::new("A", Priority::Medium, None, None, at(9));
        assert!(!task.set_completed(false, at(10)));
        assert_eq!(task.updated_at, at(9));
        assert!(task.set_completed(true, at(10)));
        assert!(!task.set_completed(true, at(11)));
        assert_eq!(task.completed_at, Some(at(10)));
    }

    #[test]
    fn test_is_overdue() {
        let today = date(2024, 3, 10);
        let mut task = Task::new("A", Priority::Medium, Some(date(2024, 3, 9)), None, at(9));
        assert!(task.is_overdue(today));

        task.due_date = Some(today);
        assert!(!task.is_overdue(today));

        task.due_date = None;
        assert!(!task.is_overdue(today));

        task.due_date = Some(date(2020, 1, 1));
        task.set_completed(true, at(10));
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn test_due_today_and_within() {
        let today = date(2024, 3, 10);
        let mut task = Task::new("A", Priority::Medium, Some(today), None, at(9));
        assert!(task.is_due_today(today));
        assert!(!task.is_due_within(today, 7));

        task.due_date = Some(date(2024, 3, 17));
        assert!(task.is_due_within(today, 7));
        task.due_date = Some(date(2024, 3, 18));
        assert!(!task.is_due_within(today, 7));
    }

    #[test]
    fn test_days_to_complete_rounds_up() {
        let mut task = Task::new("A", Priority::Medium, None, None, at(9));
        assert_eq!(task.days_to_complete(), None);

        task.set_completed(true, at(9) + Duration::hours(25));
        assert_eq!(task.days_to_complete(), Some(2));

        task.completed_at = Some(at(9) + Duration::days(3));
        assert_eq!(task.days_to_complete(), Some(3));

        task.completed_at = Some(at(9));
        assert_eq!(task.days_to_complete(), Some(0));
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("  buy milk ").unwrap(), "buy milk");
        assert!(matches!(validate_text("   "), Err(TodoError::Validation(_))));
        assert!(validate_text(&"x".repeat(200)).is_ok());
        assert!(matches!(validate_text(&"x".repeat(201)), Err(TodoError::Validation(_))));
        // Surrounding whitespace does not count toward the limit
        assert!(validate_text(&format!("  {}  ", "x".repeat(200))).is_ok());
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some(" Work ".to_string())), Some("Work".to_string()));
        assert_eq!(normalize_category(Some("  ".to_string())), None);
        assert_eq!(normalize_category(None), None);
    }

    #[test]
    fn test_new_id_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(a.starts_with("task_"));
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(Theme::default(), Theme::Light);
        assert!("blue".parse::<Theme>().is_err());
    }
}
