//! Read-only projections for the dashboard and task list.
//!
//! # Invariants
//! - Nothing here mutates or reorders the stored collections.

use crate::model::task::{Task, TaskPriority, TaskStatus};
use crate::model::Timestamp;

/// Number of tasks shown in the recent-activity list.
pub const RECENT_ACTIVITY_LIMIT: usize = 8;

/// Status totals and completion ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Rounded to the nearest integer; 0 when there are no tasks.
    pub completion_pct: u8,
}

impl DashboardStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|task| task.status == status).count();
        let total = tasks.len();
        let completed = count(TaskStatus::Completed);
        let completion_pct = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            total,
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            completed,
            completion_pct,
        }
    }

    /// Caption under the progress ring.
    pub fn completion_label(&self) -> String {
        if self.total == 0 {
            "No tasks yet".to_string()
        } else {
            format!("{} of {} tasks completed", self.completed, self.total)
        }
    }
}

/// Most recently touched tasks, newest first.
pub fn recent_activity(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut recent: Vec<&Task> = tasks.iter().collect();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent.truncate(limit);
    recent
}

/// Optional status/priority filter for the task table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }

    /// Matching tasks in store order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Coarse relative age: `just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn time_ago(then: Timestamp, now: Timestamp) -> String {
    let seconds = (now - then).num_seconds().max(0);
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", seconds / 60),
        3600..=86_399 => format!("{}h ago", seconds / 3600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::{recent_activity, time_ago, DashboardStats, TaskFilter};
    use crate::model::task::{Task, TaskDraft, TaskPriority, TaskStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn task(id: &str, status: TaskStatus, priority: TaskPriority, minutes: i64) -> Task {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut draft = TaskDraft::new(id);
        draft.status = status;
        draft.priority = priority;
        let mut task = Task::from_draft(id.to_string(), draft, base).unwrap();
        task.updated_at = base + Duration::minutes(minutes);
        task
    }

    #[test]
    fn stats_round_completion() {
        let tasks = vec![
            task("a", TaskStatus::Completed, TaskPriority::Low, 0),
            task("b", TaskStatus::Pending, TaskPriority::Low, 0),
            task("c", TaskStatus::InProgress, TaskPriority::Low, 0),
        ];
        let stats = DashboardStats::from_tasks(&tasks);
        assert_eq!(stats.completion_pct, 33);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completion_label(), "1 of 3 tasks completed");
        assert_eq!(DashboardStats::from_tasks(&[]).completion_label(), "No tasks yet");
    }

    #[test]
    fn recent_activity_sorts_without_touching_source() {
        let tasks = vec![
            task("old", TaskStatus::Pending, TaskPriority::Low, 1),
            task("new", TaskStatus::Pending, TaskPriority::Low, 5),
        ];
        let recent = recent_activity(&tasks, 1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, "new");
        assert_eq!(tasks[0].id, "old");
    }

    #[test]
    fn filter_combines_status_and_priority() {
        let tasks = vec![
            task("a", TaskStatus::Pending, TaskPriority::High, 0),
            task("b", TaskStatus::Pending, TaskPriority::Low, 0),
            task("c", TaskStatus::Completed, TaskPriority::High, 0),
        ];
        let filter = TaskFilter {
            status: Some(TaskStatus::Pending),
            priority: Some(TaskPriority::High),
        };
        let ids: Vec<_> = filter.apply(&tasks).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(TaskFilter::default().apply(&tasks).len(), 3);
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(30), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
    }
}
