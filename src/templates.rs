// Built-in task templates

/// Named bundle of task texts used to bulk-create tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub icon: &'static str,
    pub tasks: &'static [&'static str],
}

const TEMPLATES: &[Template] = &[
    Template {
        name: "Daily Tasks",
        icon: "🌅",
        tasks: &["Check emails", "Review calendar", "Plan day priorities"],
    },
    Template {
        name: "Work Project",
        icon: "💼",
        tasks: &["Project planning", "Team meeting", "Code review", "Documentation"],
    },
    Template {
        name: "Health & Fitness",
        icon: "🏃‍♂️",
        tasks: &["Morning workout", "Drink 8 glasses of water", "Take vitamins"],
    },
    Template {
        name: "Home & Family",
        icon: "🏠",
        tasks: &["Grocery shopping", "Clean house", "Family time"],
    },
    Template {
        name: "Learning",
        icon: "📚",
        tasks: &["Read for 30 minutes", "Practice new skill", "Take online course"],
    },
    Template {
        name: "Shopping List",
        icon: "🛒",
        tasks: &["Milk", "Bread", "Eggs", "Fruits"],
    },
];

pub fn templates() -> &'static [Template] {
    TEMPLATES
}

/// Look up a template by exact name
pub fn find_template(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}
