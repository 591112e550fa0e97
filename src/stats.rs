// Statistics aggregation over a task sequence

use crate::models::{Priority, Task};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket for tasks without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    fn bump(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
    }
}

/// Summary of a task collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
    /// Whole percent of tasks completed, 0 for an empty collection
    pub completion_rate: u32,
    /// Mean of per-task days from creation to completion, each rounded up.
    /// None when nothing has been completed.
    pub avg_completion_days: Option<i64>,
    pub priorities: PriorityCounts,
    pub categories: BTreeMap<String, usize>,
}

impl Statistics {
    /// Completion rate as shown to users, e.g. "75%"
    pub fn completion_rate_label(&self) -> String {
        format!("{}%", self.completion_rate)
    }
}

pub fn compute_stats<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> Statistics {
    let mut total = 0;
    let mut completed = 0;
    let mut overdue = 0;
    let mut completion_days = Vec::new();
    let mut priorities = PriorityCounts::default();
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();

    for task in tasks {
        total += 1;
        if task.completed {
            completed += 1;
        }
        if task.is_overdue(today) {
            overdue += 1;
        }
        if let Some(days) = task.days_to_complete() {
            completion_days.push(days);
        }
        priorities.bump(task.priority);
        let bucket = task.category.as_deref().unwrap_or(UNCATEGORIZED);
        *categories.entry(bucket.to_string()).or_default() += 1;
    }

    let completion_rate = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    let avg_completion_days = if completion_days.is_empty() {
        None
    } else {
        let sum: i64 = completion_days.iter().sum();
        Some((sum as f64 / completion_days.len() as f64).round() as i64)
    };

    Statistics {
        total,
        completed,
        active: total - completed,
        overdue,
        completion_rate,
        avg_completion_days,
        priorities,
        categories,
    }
}
