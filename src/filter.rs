// Status, search and category filters over a task sequence

use crate::models::Task;
use chrono::NaiveDate;
use std::fmt;

/// Completion-state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    /// Incomplete with a due date before today
    Overdue,
}

impl StatusFilter {
    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::Overdue => task.is_overdue(today),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            "overdue" => Ok(StatusFilter::Overdue),
            _ => Err(format!("Unknown status filter: {}", s)),
        }
    }
}

/// Exact category match, or everything
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => task.category.as_deref() == Some(name.as_str()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Named(name) => write!(f, "{}", name),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Named(s.to_string()))
        }
    }
}

/// Case-insensitive substring match against text or category
pub fn matches_search(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    task.text.to_lowercase().contains(&needle)
        || task
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(&needle))
}

pub fn filter_by_status<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    filter: StatusFilter,
    today: NaiveDate,
) -> Vec<&'a Task> {
    tasks.into_iter().filter(|t| filter.matches(t, today)).collect()
}

pub fn filter_by_search<'a>(tasks: impl IntoIterator<Item = &'a Task>, query: &str) -> Vec<&'a Task> {
    tasks.into_iter().filter(|t| matches_search(t, query)).collect()
}

pub fn filter_by_category<'a>(tasks: impl IntoIterator<Item = &'a Task>, category: &CategoryFilter) -> Vec<&'a Task> {
    tasks.into_iter().filter(|t| category.matches(t)).collect()
}
