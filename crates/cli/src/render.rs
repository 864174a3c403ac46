//! Terminal rendering for gateway results

use colored::{ColoredString, Colorize};
use tabled::{Table, Tabled};
use taskhub_sdk::{Profile, Task};

#[derive(Tabled)]
struct TaskRow {
    id: String,
    title: String,
    status: String,
    priority: i32,
    due: String,
}

pub fn status(status: &str) -> ColoredString {
    match status {
        "TODO" => status.yellow(),
        "IN_PROGRESS" => status.cyan(),
        "DONE" => status.green(),
        "ARCHIVED" => status.dimmed(),
        other => other.normal(),
    }
}

/// Epoch millis as local date-time
pub fn timestamp(millis: Option<i64>) -> String {
    millis
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

pub fn task_table(tasks: &[Task]) -> String {
    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|t| TaskRow {
            id: t.id.clone(),
            title: t.title.clone(),
            status: status(&t.status).to_string(),
            priority: t.priority,
            due: timestamp(t.due_at),
        })
        .collect();
    Table::new(rows).to_string()
}

pub fn task_detail(task: &Task) {
    println!("  {} {}", "ID:".bold(), task.id);
    println!("  {} {}", "Title:".bold(), task.title);
    println!("  {} {}", "Status:".bold(), status(&task.status));
    println!("  {} {}", "Priority:".bold(), task.priority);
    if !task.description.is_empty() {
        println!("  {} {}", "Description:".bold(), task.description);
    }
    println!("  {} {}", "Due:".bold(), timestamp(task.due_at));
    println!("  {} {}", "Created:".bold(), timestamp(Some(task.created_at)));
    println!("  {} {}", "Completed:".bold(), timestamp(task.completed_at));
}

pub fn profile_detail(profile: &Profile) {
    println!("  {} {}", "User:".bold(), profile.user_id);
    println!("  {} {}", "Name:".bold(), profile.display_name);
    println!("  {} {}", "Email:".bold(), profile.email);
    println!(
        "  {} {}",
        "Bio:".bold(),
        profile.bio.as_deref().unwrap_or("-")
    );
    println!("  {} {}", "Updated:".bold(), timestamp(Some(profile.updated_at)));
}

pub fn megabytes(bytes: i64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_timestamp() {
        assert_eq!(timestamp(None), "-");
    }

    #[test]
    fn test_megabytes() {
        assert_eq!(megabytes(2 * 1024 * 1024), 2.0);
    }
}
