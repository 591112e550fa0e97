// Derived views: sorting and the display pipeline

use crate::filter::{CategoryFilter, StatusFilter, filter_by_category, filter_by_search, filter_by_status};
use crate::models::Task;
use chrono::NaiveDate;
use feruca::Collator;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Display sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first
    #[default]
    Created,
    /// Earliest due date first; undated tasks last
    Due,
    /// High, medium, low
    Priority,
    Alphabetical,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Created => write!(f, "created"),
            SortKey::Due => write!(f, "due"),
            SortKey::Priority => write!(f, "priority"),
            SortKey::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(SortKey::Created),
            "due" => Ok(SortKey::Due),
            "priority" => Ok(SortKey::Priority),
            "alphabetical" | "alpha" => Ok(SortKey::Alphabetical),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

/// Stable sort; ties keep their incoming order
pub fn sort<'a>(tasks: impl IntoIterator<Item = &'a Task>, key: SortKey) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    match key {
        SortKey::Created => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Due => sorted.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortKey::Priority => sorted.sort_by_key(|t| t.priority.rank()),
        SortKey::Alphabetical => {
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| collator.collate(a.text.as_str(), b.text.as_str()));
        }
    }
    sorted
}

/// Locale-aware text ordering under the Unicode Collation Algorithm with
/// root-locale (CLDR) tailoring. Accented letters sort next to their base
/// letter, and strings that differ only by case put lowercase first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

/// Distinct non-empty categories in first-seen order
pub fn categories<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter_map(|t| t.category.as_deref())
        .filter(|c| seen.insert(*c))
        .collect()
}

/// UI selections that turn the collection into the rendered list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub status: StatusFilter,
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

impl ViewQuery {
    /// Status, then search, then category, then sort
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> Vec<&'a Task> {
        let by_status = filter_by_status(tasks, self.status, today);
        let by_search = filter_by_search(by_status, &self.search);
        let by_category = filter_by_category(by_search, &self.category);
        sort(by_category, self.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn task(id: &str, text: &str, priority: Priority, created_offset_h: i64) -> Task {
        let mut t = Task::new(text, priority, None, None, t0() + Duration::hours(created_offset_h));
        t.id = id.to_string();
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_sort_scenario() {
        let tasks = vec![task("a", "A", Priority::Low, 0), task("b", "B", Priority::High, 1)];

        assert_eq!(ids(&sort(&tasks, SortKey::Priority)), ["b", "a"]);
        assert_eq!(ids(&sort(&tasks, SortKey::Created)), ["b", "a"]);
        assert_eq!(ids(&sort(&tasks, SortKey::Alphabetical)), ["a", "b"]);
    }

    #[test]
    fn test_sort_due_puts_undated_last() {
        let mut tasks = vec![
            task("none1", "x", Priority::Medium, 0),
            task("late", "x", Priority::Medium, 0),
            task("none2", "x", Priority::Medium, 0),
            task("early", "x", Priority::Medium, 0),
        ];
        tasks[1].due_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        tasks[3].due_date = NaiveDate::from_ymd_opt(2024, 4, 1);

        assert_eq!(ids(&sort(&tasks, SortKey::Due)), ["early", "late", "none1", "none2"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let tasks = vec![
            task("m1", "x", Priority::Medium, 0),
            task("h1", "x", Priority::High, 0),
            task("m2", "x", Priority::Medium, 0),
            task("h2", "x", Priority::High, 0),
        ];
        assert_eq!(ids(&sort(&tasks, SortKey::Priority)), ["h1", "h2", "m1", "m2"]);
        // Equal creation times keep manual order
        assert_eq!(ids(&sort(&tasks, SortKey::Created)), ["m1", "h1", "m2", "h2"]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let tasks = vec![task("a", "A", Priority::Low, 0), task("b", "B", Priority::High, 1)];
        let _ = sort(&tasks, SortKey::Priority);
        assert_eq!(tasks[0].id, "a");
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Banana", "apple"), Ordering::Greater);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("Zeta", "zeta"), Ordering::Greater);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
        assert_eq!(locale_cmp("ab", "abc"), Ordering::Less);
        assert_eq!(locale_cmp("éclair", "Zebra"), Ordering::Less);
        assert_eq!(locale_cmp("eclair", "éclair"), Ordering::Less);
        assert_eq!(locale_cmp("éclair", "ezra"), Ordering::Less);
    }

    #[test]
    fn test_alphabetical_sort_places_accents_with_base_letter() {
        let tasks = vec![
            task("z", "Zebra", Priority::Medium, 0),
            task("e", "éclair", Priority::Medium, 0),
            task("a", "Apple", Priority::Medium, 0),
            task("o", "Öl wechseln", Priority::Medium, 0),
            task("n", "nachos", Priority::Medium, 0),
        ];
        assert_eq!(ids(&sort(&tasks, SortKey::Alphabetical)), ["a", "e", "n", "o", "z"]);
    }

    #[test]
    fn test_alphabetical_sort_lowercase_before_uppercase() {
        let tasks = vec![task("upper", "Milk", Priority::Medium, 0), task("lower", "milk", Priority::Medium, 0)];
        assert_eq!(ids(&sort(&tasks, SortKey::Alphabetical)), ["lower", "upper"]);
    }

    #[test]
    fn test_categories_first_seen_order() {
        let mut tasks = vec![
            task("1", "x", Priority::Medium, 0),
            task("2", "x", Priority::Medium, 0),
            task("3", "x", Priority::Medium, 0),
            task("4", "x", Priority::Medium, 0),
        ];
        tasks[0].category = Some("Work".into());
        tasks[1].category = Some("Home".into());
        tasks[3].category = Some("Work".into());

        assert_eq!(categories(&tasks), ["Work", "Home"]);
    }

    #[test]
    fn test_view_query_pipeline() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut tasks = vec![
            task("w1", "Write docs", Priority::Low, 0),
            task("w2", "Write tests", Priority::High, 1),
            task("h1", "Wash car", Priority::High, 2),
            task("w3", "Write release notes", Priority::Medium, 3),
        ];
        tasks[0].category = Some("Work".into());
        tasks[1].category = Some("Work".into());
        tasks[2].category = Some("Home".into());
        tasks[3].category = Some("Work".into());
        tasks[3].set_completed(true, t0() + Duration::hours(4));

        let query = ViewQuery {
            status: StatusFilter::Active,
            search: "write".to_string(),
            category: CategoryFilter::Named("Work".to_string()),
            sort: SortKey::Priority,
        };
        assert_eq!(ids(&query.apply(&tasks, today)), ["w2", "w1"]);

        let everything = ViewQuery::default();
        assert_eq!(ids(&everything.apply(&tasks, today)), ["w3", "h1", "w2", "w1"]);
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("due".parse::<SortKey>().unwrap(), SortKey::Due);
        assert_eq!("alpha".parse::<SortKey>().unwrap(), SortKey::Alphabetical);
        assert!("random".parse::<SortKey>().is_err());
    }
}
