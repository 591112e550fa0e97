use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use std::fs;
use std::path::PathBuf;
use tasklist::query::categories;
use tasklist::{
    BulkAction, CategoryFilter, Config, DueDateMonitor, Notifier, Priority, SortKey, StatusFilter, Task,
    TaskStore, Theme, ViewQuery, compute_stats, templates, today,
};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist - task list manager with priorities, due dates and categories")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/tasklist/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task to the top of the list
    Add {
        text: String,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<NaiveDate>,
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show tasks
    List {
        /// all, active, completed or overdue
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        /// created, due, priority or alphabetical
        #[arg(long, default_value = "created")]
        sort: SortKey,
    },

    /// Toggle a task between active and completed
    Done { id: String },

    /// Replace a task's text
    Edit { id: String, text: String },

    /// Delete a task
    Rm { id: String },

    /// Move a task so it sits before another one
    Mv {
        id: String,
        #[arg(long)]
        before: String,
    },

    /// Apply complete, incomplete or delete to several tasks
    Bulk {
        action: BulkAction,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete every completed task
    ClearCompleted,

    /// Show statistics
    Stats,

    /// Write tasks and statistics to a JSON file
    Export { file: Option<PathBuf> },

    /// Merge tasks from an exported JSON file
    Import { file: PathBuf },

    /// List built-in templates
    Templates,

    /// Add every task from a template
    Template { name: String },

    /// Report tasks that are due or overdue
    Check,

    /// Show or set the theme preference
    Theme { theme: Option<Theme> },
}

/// Prints notifications to stderr
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: tasklist::Level, message: &str) {
        let tag = match level {
            tasklist::Level::Info => "info:".cyan(),
            tasklist::Level::Success => "ok:".green(),
            tasklist::Level::Warning => "warning:".yellow(),
            tasklist::Level::Error => "error:".red(),
        };
        eprintln!("{} {}", tag.bold(), message);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let storage = config.open_storage()?;
    let mut store = TaskStore::new(storage, Box::new(ConsoleNotifier))
        .with_seed_samples(config.seed_samples)
        .with_app_version(config.app_version.clone());
    store.load();

    run(&mut store, &config, cli.command)
}

fn run(store: &mut TaskStore, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            text,
            priority,
            due,
            category,
        } => {
            let task = store.add(&text, priority, due, category)?;
            println!("Added {}", format_task(&task));
        }
        Commands::List {
            status,
            search,
            category,
            sort,
        } => {
            let query = ViewQuery {
                status,
                search: search.unwrap_or_default(),
                category,
                sort,
            };
            print_list(store, &query);
        }
        Commands::Done { id } => {
            let id = resolve_id(store, &id);
            let task = store.toggle_complete(&id)?;
            let state = if task.completed { "completed" } else { "active" };
            println!("Marked {} as {}", format_task(&task), state);
        }
        Commands::Edit { id, text } => {
            let id = resolve_id(store, &id);
            let task = store.edit(&id, &text)?;
            println!("Updated {}", format_task(&task));
        }
        Commands::Rm { id } => {
            let id = resolve_id(store, &id);
            let task = store.delete(&id)?;
            println!("Deleted \"{}\"", task.text);
        }
        Commands::Mv { id, before } => {
            let id = resolve_id(store, &id);
            let before = resolve_id(store, &before);
            store.reorder(&id, &before)?;
            println!("Task reordered");
        }
        Commands::Bulk { action, ids } => {
            let ids: Vec<String> = ids.iter().map(|id| resolve_id(store, id)).collect();
            let count = store.bulk_apply(&ids, action);
            println!("{} task(s) affected by {}", count, action);
        }
        Commands::ClearCompleted => {
            let count = store.clear_completed();
            if count == 0 {
                println!("No completed tasks to clear");
            } else {
                println!("{} completed task(s) cleared", count);
            }
        }
        Commands::Stats => print_stats(store),
        Commands::Export { file } => {
            let snapshot = store.export_snapshot();
            let path = file.unwrap_or_else(|| PathBuf::from(snapshot.file_name()));
            fs::write(&path, snapshot.to_json_pretty()?).with_context(|| format!("Failed to write {:?}", path))?;
            println!("Exported {} task(s) to {}", snapshot.tasks.len(), path.display());
        }
        Commands::Import { file } => {
            let raw = fs::read_to_string(&file).with_context(|| format!("Failed to read {:?}", file))?;
            let count = store.import_merge(&raw)?;
            println!("Imported {} task(s)", count);
        }
        Commands::Templates => {
            for template in templates() {
                println!(
                    "{} {} ({} tasks)",
                    template.icon,
                    template.name.bold(),
                    template.tasks.len()
                );
            }
        }
        Commands::Template { name } => {
            let created = store.add_from_template(&name)?;
            println!("Added {} task(s) from {}", created.len(), name);
        }
        Commands::Check => print_due(store, config),
        Commands::Theme { theme } => match theme {
            Some(theme) => {
                store.set_theme(theme)?;
                println!("Switched to {} mode", theme);
            }
            None => println!("{}", store.theme()),
        },
    }

    if let Some(err) = store.last_persist_error() {
        return Err(eyre!("Changes were applied but not saved: {}", err));
    }
    Ok(())
}

/// Exact id, else the unique id ending with `input`
fn resolve_id(store: &TaskStore, input: &str) -> String {
    if store.get(input).is_some() {
        return input.to_string();
    }
    let mut matches = store.tasks().iter().filter(|t| t.id.ends_with(input));
    match (matches.next(), matches.next()) {
        (Some(task), None) => task.id.clone(),
        _ => input.to_string(),
    }
}

fn short_id(id: &str) -> &str {
    let start = id.len().saturating_sub(8);
    id.get(start..).unwrap_or(id)
}

fn format_priority(priority: Priority) -> colored::ColoredString {
    let label = priority.to_string().to_uppercase();
    match priority {
        Priority::High => label.red(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.green(),
    }
}

fn format_task(task: &Task) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let text = if task.completed {
        task.text.dimmed().strikethrough().to_string()
    } else {
        task.text.clone()
    };

    let mut line = format!(
        "{} {} {} {}",
        check,
        short_id(&task.id).dimmed(),
        text,
        format_priority(task.priority)
    );

    if let Some(due) = task.due_date {
        let label = format!("due {}", due);
        if task.is_overdue(today()) {
            line.push_str(&format!(" {}", label.red().bold()));
        } else {
            line.push_str(&format!(" {}", label));
        }
    }
    if let Some(category) = &task.category {
        line.push_str(&format!(" #{}", category.cyan()));
    }
    line
}

fn print_list(store: &TaskStore, query: &ViewQuery) {
    let today = today();
    let stats = compute_stats(store.tasks(), today);
    println!(
        "all {}  active {}  completed {}  overdue {}",
        stats.total, stats.active, stats.completed, stats.overdue
    );

    let view = query.apply(store.tasks(), today);
    if view.is_empty() {
        println!("{}", "No tasks to show".dimmed());
        return;
    }
    for task in view {
        println!("{}", format_task(task));
    }
}

fn print_stats(store: &TaskStore) {
    let stats = compute_stats(store.tasks(), today());

    println!("{}", "Statistics".bold());
    println!("  Total:            {}", stats.total);
    println!("  Completed:        {}", stats.completed);
    println!("  Active:           {}", stats.active);
    println!("  Overdue:          {}", stats.overdue);
    println!("  Completion rate:  {}", stats.completion_rate_label());
    match stats.avg_completion_days {
        Some(days) => println!("  Avg. completion:  {} day(s)", days),
        None => println!("  Avg. completion:  -"),
    }

    println!("{}", "By priority".bold());
    for priority in Priority::ALL {
        println!("  {:<8} {}", format_priority(priority), stats.priorities.get(priority));
    }

    println!("{}", "By category".bold());
    for (category, count) in &stats.categories {
        println!("  {:<16} {}", category, count);
    }

    let names = categories(store.tasks());
    if !names.is_empty() {
        println!("Categories: {}", names.join(", "));
    }
}

fn print_due(store: &TaskStore, config: &Config) {
    let today = today();
    let mut monitor = DueDateMonitor::new();
    let report = monitor.check_and_notify(store.tasks(), today, &ConsoleNotifier);

    println!("Due today: {}  Overdue: {}", report.due_today, report.overdue);

    let upcoming: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| !t.completed && t.is_due_within(today, config.due_soon_days))
        .collect();
    if !upcoming.is_empty() {
        println!("{}", format!("Due in the next {} day(s):", config.due_soon_days).bold());
        for task in upcoming {
            println!("  {}", format_task(task));
        }
    }
}
