// Non-fatal notifications and the periodic due-date check

use crate::models::Task;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{info, warn};

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Success => write!(f, "success"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Receives conditions the user should see but that do not fail an operation
pub trait Notifier {
    fn notify(&self, level: Level, message: &str);
}

/// Routes notifications to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Info | Level::Success => info!(%level, "{}", message),
            Level::Warning | Level::Error => warn!(%level, "{}", message),
        }
    }
}

/// Keeps every notification; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    log: Rc<RefCell<Vec<(Level, String)>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.log.borrow().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.log.borrow().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: Level, message: &str) {
        self.log.borrow_mut().push((level, message.to_string()));
    }
}

/// Result of one due-date scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueReport {
    /// Incomplete tasks due today
    pub due_today: usize,
    pub overdue: usize,
    /// True the first time tasks are found due on a given day
    pub should_notify: bool,
}

/// Recurring read-only scan for due and overdue tasks.
///
/// Holds only the "already notified today" flag; the task collection is
/// never touched.
#[derive(Debug, Clone, Default)]
pub struct DueDateMonitor {
    notified_on: Option<NaiveDate>,
}

impl DueDateMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<'a>(&mut self, tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> DueReport {
        let mut due_today = 0;
        let mut overdue = 0;

        for task in tasks {
            if !task.completed && task.is_due_today(today) {
                due_today += 1;
            }
            if task.is_overdue(today) {
                overdue += 1;
            }
        }

        let should_notify = due_today > 0 && self.notified_on != Some(today);
        if should_notify {
            self.notified_on = Some(today);
        }

        DueReport {
            due_today,
            overdue,
            should_notify,
        }
    }

    /// Run `check` and emit the due-today reminder when it is due
    pub fn check_and_notify<'a>(
        &mut self,
        tasks: impl IntoIterator<Item = &'a Task>,
        today: NaiveDate,
        notifier: &dyn Notifier,
    ) -> DueReport {
        let report = self.check(tasks, today);
        if report.should_notify {
            notifier.notify(Level::Warning, &format!("{} task(s) due today!", report.due_today));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{TimeZone, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn task(due: Option<NaiveDate>, completed: bool) -> Task {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut t = Task::new("T", Priority::Medium, due, None, now);
        t.set_completed(completed, now);
        t
    }

    #[test]
    fn test_check_counts() {
        let tasks = vec![
            task(Some(date(10)), false),
            task(Some(date(10)), true),
            task(Some(date(9)), false),
            task(Some(date(9)), true),
            task(None, false),
        ];

        let mut monitor = DueDateMonitor::new();
        let report = monitor.check(&tasks, date(10));
        assert_eq!(report.due_today, 1);
        assert_eq!(report.overdue, 1);
        assert!(report.should_notify);
    }

    #[test]
    fn test_notifies_once_per_day() {
        let tasks = vec![task(Some(date(10)), false), task(Some(date(11)), false)];
        let notifier = MemoryNotifier::new();
        let mut monitor = DueDateMonitor::new();

        assert!(monitor.check_and_notify(&tasks, date(10), &notifier).should_notify);
        assert!(!monitor.check_and_notify(&tasks, date(10), &notifier).should_notify);
        assert_eq!(notifier.count(Level::Warning), 1);

        // Next day brings a new reminder
        assert!(monitor.check_and_notify(&tasks, date(11), &notifier).should_notify);
        assert_eq!(notifier.count(Level::Warning), 2);
        assert_eq!(notifier.messages()[0].1, "1 task(s) due today!");
    }

    #[test]
    fn test_nothing_due_does_not_set_flag() {
        let tasks = vec![task(Some(date(12)), false)];
        let mut monitor = DueDateMonitor::new();
        assert!(!monitor.check(&tasks, date(10)).should_notify);

        let later = vec![task(Some(date(10)), false)];
        assert!(monitor.check(&later, date(10)).should_notify);
    }

    #[test]
    fn test_memory_notifier_clear() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Level::Error, "boom");
        assert_eq!(notifier.count(Level::Error), 1);
        notifier.clear();
        assert!(notifier.messages().is_empty());
    }
}
