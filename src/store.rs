// Task collection store with injected storage and notification collaborators

use crate::error::{Result, TodoError};
use crate::export::{DEFAULT_APP_VERSION, FORMAT_VERSION, Snapshot, SnapshotStatistics, import_records, parse_import};
use crate::models::{Priority, Task, Theme, new_id, today, validate_text};
use crate::notify::{Level, Notifier};
use crate::record::{IdPolicy, decode_tasks};
use crate::stats::compute_stats;
use crate::storage::{Storage, TASKS_KEY, THEME_KEY};
use crate::templates::find_template;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Mutation applied to every selected task by `bulk_apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Complete,
    Incomplete,
    Delete,
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkAction::Complete => write!(f, "complete"),
            BulkAction::Incomplete => write!(f, "incomplete"),
            BulkAction::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for BulkAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" | "done" => Ok(BulkAction::Complete),
            "incomplete" | "undone" => Ok(BulkAction::Incomplete),
            "delete" | "rm" => Ok(BulkAction::Delete),
            _ => Err(format!("Unknown bulk action: {}", s)),
        }
    }
}

/// Sole owner of the ordered task collection.
///
/// Every mutation runs to completion, including its storage write, before
/// returning. A failed write is reported through the notifier and
/// `last_persist_error` but never rolls back the in-memory change; the next
/// successful write catches storage up.
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn Storage>,
    notifier: Box<dyn Notifier>,
    seed_samples: bool,
    app_version: String,
    last_persist_error: Option<TodoError>,
}

impl TaskStore {
    /// Create an empty store; call `load` to read persisted state
    pub fn new(storage: Box<dyn Storage>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            tasks: Vec::new(),
            storage,
            notifier,
            seed_samples: true,
            app_version: DEFAULT_APP_VERSION.to_string(),
            last_persist_error: None,
        }
    }

    /// Create a store and load persisted state
    pub fn open(storage: Box<dyn Storage>, notifier: Box<dyn Notifier>) -> Self {
        let mut store = Self::new(storage, notifier);
        store.load();
        store
    }

    /// Whether a first run (or unrecoverable data) seeds sample tasks
    pub fn with_seed_samples(mut self, seed: bool) -> Self {
        self.seed_samples = seed;
        self
    }

    pub fn with_app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = app_version.into();
        self
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Tasks in manual order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Error from the most recent failed write, cleared by a successful one
    pub fn last_persist_error(&self) -> Option<&TodoError> {
        self.last_persist_error.as_ref()
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = new_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Read the persisted collection. Never fails: unreadable or corrupt state
    /// falls back to sample tasks (or an empty collection when seeding is off).
    pub fn load(&mut self) {
        let now = Utc::now();

        let raw = match self.storage.get(TASKS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                // The stored copy may be intact; leave it for a later load
                warn!(error = ?e, "Failed to read persisted tasks");
                self.seed_fallback(now);
                self.notifier
                    .notify(Level::Error, "Failed to load saved tasks, showing sample tasks");
                return;
            }
        };

        let Some(raw) = raw else {
            info!("No persisted tasks found");
            self.tasks.clear();
            if self.seed_samples {
                self.tasks = sample_tasks(now, today());
                self.persist();
            }
            return;
        };

        let values = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(values)) => values,
            Ok(_) => {
                warn!("Persisted tasks are not a JSON array");
                self.fall_back(now, "Saved tasks were corrupt, added sample tasks");
                return;
            }
            Err(e) => {
                warn!(error = ?e, "Failed to parse persisted tasks");
                self.fall_back(now, "Saved tasks were corrupt, added sample tasks");
                return;
            }
        };

        let tasks = decode_tasks(&values, IdPolicy::Required, now);
        if tasks.is_empty() && !values.is_empty() {
            warn!(records = values.len(), "No persisted task survived validation");
            self.fall_back(now, "Saved tasks were corrupt, added sample tasks");
            return;
        }

        info!(count = tasks.len(), dropped = values.len() - tasks.len(), "Loaded tasks");
        self.tasks = tasks;
    }

    fn fall_back(&mut self, now: DateTime<Utc>, message: &str) {
        self.seed_fallback(now);
        self.notifier.notify(Level::Error, message);
        self.persist();
    }

    fn seed_fallback(&mut self, now: DateTime<Utc>) {
        self.tasks = if self.seed_samples {
            sample_tasks(now, today())
        } else {
            Vec::new()
        };
    }

    /// Write the collection to storage, returning any failure
    pub fn save(&mut self) -> Result<()> {
        let result = serde_json::to_string(&self.tasks)
            .map_err(|e| TodoError::Persistence(format!("Failed to serialize tasks: {}", e)))
            .and_then(|json| self.storage.set(TASKS_KEY, &json).map_err(TodoError::persistence));

        match result {
            Ok(()) => {
                debug!(count = self.tasks.len(), "Saved tasks");
                self.last_persist_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to save tasks");
                self.last_persist_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Save after a mutation; failures are reported, not returned
    fn persist(&mut self) {
        if self.save().is_err() {
            self.notifier
                .notify(Level::Error, "Failed to save tasks. Storage may be full.");
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert a new active task at the front
    pub fn add(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
        category: Option<String>,
    ) -> Result<Task> {
        let text = validate_text(text)?;
        let mut task = Task::new(text, priority, due_date, category, Utc::now());
        task.id = self.fresh_id();

        info!(id = %task.id, %priority, "Adding task");
        self.tasks.insert(0, task.clone());
        self.persist();
        Ok(task)
    }

    /// Flip completion state
    pub fn toggle_complete(&mut self, id: &str) -> Result<Task> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.toggle(Utc::now());
        let task = task.clone();

        debug!(id, completed = task.completed, "Toggled task");
        self.persist();
        Ok(task)
    }

    pub fn edit(&mut self, id: &str, new_text: &str) -> Result<Task> {
        let text = validate_text(new_text)?;
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.set_text(text, Utc::now());
        let task = task.clone();

        debug!(id, "Edited task");
        self.persist();
        Ok(task)
    }

    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let index = self.position(id)?;
        let task = self.tasks.remove(index);

        info!(id, "Deleted task");
        self.persist();
        Ok(task)
    }

    /// Move `moved_id` so it sits immediately before `before_id`
    pub fn reorder(&mut self, moved_id: &str, before_id: &str) -> Result<()> {
        let from = self.position(moved_id)?;
        self.position(before_id)?;
        if moved_id == before_id {
            return Ok(());
        }

        let task = self.tasks.remove(from);
        let to = self.position(before_id)?;
        self.tasks.insert(to, task);

        debug!(moved_id, before_id, "Reordered task");
        self.persist();
        Ok(())
    }

    /// Apply `action` to each listed task that exists. Unknown ids are
    /// skipped. Returns how many tasks actually changed.
    pub fn bulk_apply<I, S>(&mut self, ids: I, action: BulkAction) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected: HashSet<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        let now = Utc::now();

        let affected = match action {
            BulkAction::Complete | BulkAction::Incomplete => {
                let target = action == BulkAction::Complete;
                let mut changed = 0;
                for task in self.tasks.iter_mut().filter(|t| selected.contains(&t.id)) {
                    if task.set_completed(target, now) {
                        changed += 1;
                    }
                }
                changed
            }
            BulkAction::Delete => {
                let before = self.tasks.len();
                self.tasks.retain(|t| !selected.contains(&t.id));
                before - self.tasks.len()
            }
        };

        info!(%action, selected = selected.len(), affected, "Applied bulk action");
        if affected > 0 {
            self.persist();
        }
        affected
    }

    /// Remove every completed task, returning how many were removed
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();

        info!(removed, "Cleared completed tasks");
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Prepend one task per template entry, categorized under the template name
    pub fn add_from_template(&mut self, name: &str) -> Result<Vec<Task>> {
        let template = find_template(name).ok_or_else(|| TodoError::UnknownTemplate(name.to_string()))?;
        let now = Utc::now();

        let mut created = Vec::with_capacity(template.tasks.len());
        for text in template.tasks {
            let mut task = Task::new(*text, Priority::Medium, None, Some(template.name.to_string()), now);
            task.id = self.fresh_id();
            while created.iter().any(|t: &Task| t.id == task.id) {
                task.id = self.fresh_id();
            }
            created.push(task);
        }

        info!(template = template.name, count = created.len(), "Added tasks from template");
        self.tasks.splice(0..0, created.iter().cloned());
        self.persist();
        Ok(created)
    }

    // ========================================================================
    // Export / import
    // ========================================================================

    pub fn export_snapshot(&self) -> Snapshot {
        let stats = compute_stats(&self.tasks, today());
        Snapshot {
            tasks: self.tasks.clone(),
            statistics: SnapshotStatistics::from(&stats),
            export_date: Utc::now(),
            version: FORMAT_VERSION.to_string(),
            app_version: self.app_version.clone(),
        }
    }

    /// Merge tasks from an import document, returning how many were added
    pub fn import_merge(&mut self, raw: &str) -> Result<usize> {
        let records = parse_import(raw)?;
        self.merge_records(&records)
    }

    /// Same as `import_merge` for an already-parsed document
    pub fn import_merge_value(&mut self, value: Value) -> Result<usize> {
        let records = import_records(value)?;
        self.merge_records(&records)
    }

    /// Valid records whose id is not already present are prepended in file
    /// order; on an id collision the existing task wins.
    fn merge_records(&mut self, records: &[Value]) -> Result<usize> {
        let incoming = decode_tasks(records, IdPolicy::Generate, Utc::now());
        if incoming.is_empty() {
            return Err(TodoError::EmptyImport);
        }

        let existing: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let new_tasks: Vec<Task> = incoming
            .into_iter()
            .filter(|t| !existing.contains(t.id.as_str()))
            .collect();

        let imported = new_tasks.len();
        info!(records = records.len(), imported, "Merged imported tasks");

        if imported > 0 {
            self.tasks.splice(0..0, new_tasks);
            self.persist();
        }
        Ok(imported)
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Stored theme, light when unset or unreadable
    pub fn theme(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = ?e, "Failed to read theme");
                Theme::default()
            }
        }
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.storage
            .set(THEME_KEY, &theme.to_string())
            .map_err(TodoError::persistence)
    }
}

/// First-run example tasks, with due dates relative to the local `today`
pub fn sample_tasks(now: DateTime<Utc>, today: NaiveDate) -> Vec<Task> {

    let presentation = Task::new(
        "Complete project presentation",
        Priority::High,
        Some(today + Duration::days(2)),
        Some("Work".to_string()),
        now,
    );

    let mut emails = Task::new(
        "Reply to important emails",
        Priority::Medium,
        None,
        Some("Work".to_string()),
        now - Duration::days(1),
    );
    emails.set_completed(true, now);

    let run = Task::new(
        "Go for a morning run",
        Priority::Low,
        Some(today),
        Some("Health".to_string()),
        now,
    );

    vec![presentation, emails, run]
}
