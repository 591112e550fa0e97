// Lenient decoding of persisted and imported task records
//
// Stored data may come from older app versions, hand edits or other tools, so
// records are read from raw JSON rather than through the strict serde derive.
// Only `text` and `completed` (and `id` for stored records) are mandatory;
// everything else falls back to a default.

use crate::models::{Priority, Task, new_id, normalize_category, validate_text};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// How a record's `id` field is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Records without a string id are rejected (persisted collection)
    Required,
    /// Records without a string id get a fresh one (import files)
    Generate,
}

/// Decode a single record, returning the reason it was rejected
pub fn decode_task(value: &Value, policy: IdPolicy, now: DateTime<Utc>) -> Result<Task, String> {
    let obj = value.as_object().ok_or("record is not an object")?;

    let id = match (string_field(obj, "id"), policy) {
        (Some(id), _) => id.to_string(),
        (None, IdPolicy::Generate) => new_id(),
        (None, IdPolicy::Required) => return Err("missing or non-string id".to_string()),
    };

    let text = obj
        .get("text")
        .and_then(Value::as_str)
        .ok_or("missing or non-string text")?;
    let text = validate_text(text).map_err(|e| e.to_string())?;

    let completed = obj
        .get("completed")
        .and_then(Value::as_bool)
        .ok_or("missing or non-boolean completed")?;

    let priority = string_field(obj, "priority")
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    let due_date = obj.get("dueDate").and_then(parse_date);
    let category = normalize_category(string_field(obj, "category").map(str::to_string));

    let created_at = obj.get("createdAt").and_then(parse_timestamp).unwrap_or(now);
    let updated_at = obj
        .get("updatedAt")
        .and_then(parse_timestamp)
        .unwrap_or(now)
        .max(created_at);

    // completedAt must track `completed`; fill from updatedAt when absent
    let completed_at = if completed {
        Some(obj.get("completedAt").and_then(parse_timestamp).unwrap_or(updated_at))
    } else {
        None
    };

    Ok(Task {
        id,
        text,
        priority,
        due_date,
        category,
        completed,
        completed_at,
        created_at,
        updated_at,
    })
}

/// Decode every well-formed record, dropping invalid ones and duplicate ids.
/// The first occurrence of an id wins.
pub fn decode_tasks(values: &[Value], policy: IdPolicy, now: DateTime<Utc>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(values.len());

    for (index, value) in values.iter().enumerate() {
        let task = match decode_task(value, policy, now) {
            Ok(t) => t,
            Err(reason) => {
                warn!(index, reason = %reason, "Skipping malformed task record");
                continue;
            }
        };

        if !seen.insert(task.id.clone()) {
            warn!(index, id = %task.id, "Skipping task record with duplicate id");
            continue;
        }

        tasks.push(task);
    }

    debug!(total = values.len(), kept = tasks.len(), "Decoded task records");
    tasks
}

fn string_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Accepts an RFC 3339 string or epoch milliseconds
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_decode_full_record() {
        let value = json!({
            "id": "task_1",
            "text": "Write report",
            "priority": "high",
            "dueDate": "2024-03-12",
            "category": "Work",
            "completed": true,
            "completedAt": "2024-03-09T10:00:00.000Z",
            "createdAt": "2024-03-08T10:00:00.000Z",
            "updatedAt": "2024-03-09T10:00:00.000Z"
        });

        let task = decode_task(&value, IdPolicy::Required, now()).unwrap();
        assert_eq!(task.id, "task_1");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 12));
        assert_eq!(task.category.as_deref(), Some("Work"));
        assert_eq!(task.completed_at, Some(Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap()));
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 3, 8, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_minimal_record_gets_defaults() {
        let value = json!({ "id": "a", "text": "Milk", "completed": false });
        let task = decode_task(&value, IdPolicy::Required, now()).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert_eq!(task.category, None);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.created_at, now());
        assert_eq!(task.updated_at, now());
    }

    #[test]
    fn test_decode_rejects_missing_required_fields() {
        let policy = IdPolicy::Required;
        assert!(decode_task(&json!("text"), policy, now()).is_err());
        assert!(decode_task(&json!({ "text": "A", "completed": false }), policy, now()).is_err());
        assert!(decode_task(&json!({ "id": 7, "text": "A", "completed": false }), policy, now()).is_err());
        assert!(decode_task(&json!({ "id": "a", "completed": false }), policy, now()).is_err());
        assert!(decode_task(&json!({ "id": "a", "text": "A", "completed": "yes" }), policy, now()).is_err());
        assert!(decode_task(&json!({ "id": "a", "text": "   ", "completed": false }), policy, now()).is_err());
    }

    #[test]
    fn test_generate_policy_fills_missing_id() {
        let value = json!({ "text": "A", "completed": false });
        let task = decode_task(&value, IdPolicy::Generate, now()).unwrap();
        assert!(task.id.starts_with("task_"));
    }

    #[test]
    fn test_completed_at_follows_completed() {
        let done = json!({
            "id": "a", "text": "A", "completed": true,
            "updatedAt": "2024-03-09T08:00:00Z"
        });
        let task = decode_task(&done, IdPolicy::Required, now()).unwrap();
        assert_eq!(task.completed_at, Some(Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap()));

        let active = json!({
            "id": "b", "text": "B", "completed": false,
            "completedAt": "2024-03-09T08:00:00Z"
        });
        let task = decode_task(&active, IdPolicy::Required, now()).unwrap();
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_loose_fields_are_normalized() {
        let value = json!({
            "id": "a", "text": "A", "completed": false,
            "priority": "urgent",
            "dueDate": "not a date",
            "category": "",
            "createdAt": 1_700_000_000_000_i64,
            "updatedAt": "1999-01-01T00:00:00Z"
        });
        let task = decode_task(&value, IdPolicy::Required, now()).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert_eq!(task.category, None);
        assert_eq!(task.created_at, DateTime::from_timestamp_millis(1_700_000_000_000).unwrap());
        assert_eq!(task.updated_at, task.created_at);
    }

    #[test]
    fn test_decode_tasks_skips_invalid_and_duplicates() {
        let values = vec![
            json!({ "id": "a", "text": "First", "completed": false }),
            json!({ "malformed": true }),
            json!({ "id": "a", "text": "Duplicate", "completed": true }),
            json!({ "id": "b", "text": "Second", "completed": true }),
        ];

        let tasks = decode_tasks(&values, IdPolicy::Required, now());
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text, "First");
        assert_eq!(tasks[1].id, "b");
    }
}
