//! Per-task outcomes of a publish run.

use super::TaskError;
use crate::manifest::AssetTask;

/// What happened to one task.
#[derive(Debug)]
pub enum Outcome {
    /// Destination did not exist and was written.
    Created,
    /// Destination was older than its source and was rewritten.
    Updated,
    /// Destination was up to date; nothing was touched.
    Skipped,
    /// Source file does not exist; nothing was touched.
    MissingSource,
    /// The task failed; the destination keeps its previous content.
    Failed(TaskError),
}

impl Outcome {
    /// Short label, also used as the log module.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::MissingSource => "missing",
            Self::Failed(_) => "failed",
        }
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug)]
pub struct TaskReport {
    pub task: AssetTask,
    pub outcome: Outcome,
}

/// Reports for every task that ran, in manifest order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub tasks: Vec<TaskReport>,
}

/// Number of tasks per outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
}

impl BuildReport {
    pub fn push(&mut self, task: AssetTask, outcome: Outcome) {
        self.tasks.push(TaskReport { task, outcome });
    }

    pub fn summary(&self) -> Summary {
        self.tasks
            .iter()
            .fold(Summary::default(), |mut summary, report| {
                match report.outcome {
                    Outcome::Created => summary.created += 1,
                    Outcome::Updated => summary.updated += 1,
                    Outcome::Skipped => summary.skipped += 1,
                    Outcome::MissingSource => summary.missing += 1,
                    Outcome::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }

    pub fn has_failures(&self) -> bool {
        self.tasks.iter().any(|r| r.outcome.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskReport> {
        self.tasks.iter().filter(|r| r.outcome.is_failure())
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} skipped, {} missing, {} failed",
            self.created, self.updated, self.skipped, self.missing, self.failed
        )
    }
}
