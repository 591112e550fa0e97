// Export snapshot and import payload formats

use crate::error::{Result, TodoError};
use crate::models::Task;
use crate::stats::Statistics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Export format version tag
pub const FORMAT_VERSION: &str = "2.0";

/// Default `appVersion` written into exports
pub const DEFAULT_APP_VERSION: &str = "Enhanced To-Do List v2.0";

/// Summary block embedded in an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStatistics {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Rendered percentage, e.g. "75%"
    pub completion_rate: String,
}

impl From<&Statistics> for SnapshotStatistics {
    fn from(stats: &Statistics) -> Self {
        SnapshotStatistics {
            total: stats.total,
            completed: stats.completed,
            active: stats.active,
            completion_rate: stats.completion_rate_label(),
        }
    }
}

/// Full point-in-time export of the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub statistics: SnapshotStatistics,
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub app_version: String,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TodoError::Persistence(format!("Failed to serialize snapshot: {}", e)))
    }

    /// Suggested download name, dated by the export day
    pub fn file_name(&self) -> String {
        format!("todo-tasks-enhanced-{}.json", self.export_date.format("%Y-%m-%d"))
    }
}

/// Parse an import document and return its raw task records.
///
/// Any JSON object with a `tasks` array is accepted; other fields are ignored.
pub fn parse_import(raw: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| TodoError::Format(format!("not valid JSON: {}", e)))?;
    import_records(value)
}

pub fn import_records(value: Value) -> Result<Vec<Value>> {
    let Value::Object(mut obj) = value else {
        return Err(TodoError::Format("expected a JSON object".to_string()));
    };
    match obj.remove("tasks") {
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(TodoError::Format("`tasks` is not an array".to_string())),
        None => Err(TodoError::Format("missing `tasks` array".to_string())),
    }
}
