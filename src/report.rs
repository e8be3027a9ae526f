//! Per-category outcomes and the sweep report.

use crate::categories::MatchKind;
use crate::error::RemovalError;
use humansize::{format_size, BINARY};
use std::fmt;
use std::path::PathBuf;

/// Exit status when every category completed
pub const EXIT_OK: u8 = 0;
/// Exit status when at least one matched entry could not be removed
pub const EXIT_FAILED: u8 = 1;
/// Exit status used when a sweep is interrupted (128 + SIGINT)
pub const EXIT_INTERRUPTED: u8 = 130;

/// What happened when one category was applied
#[derive(Debug, Default)]
pub struct RemovalOutcome {
    /// Entries that matched the category
    pub matched: usize,
    /// Entries actually deleted
    pub removed: usize,
    /// Bytes reclaimed (or that would be reclaimed in a dry run)
    pub bytes: u64,
    pub failures: Vec<RemovalError>,
    /// Entries traversal could not read; anything beneath them was not swept
    pub unreadable: usize,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    NotFound,
    NothingMatched,
    Removed,
    WouldRemove,
    Failed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OutcomeStatus::NotFound => "not found",
            OutcomeStatus::NothingMatched => "nothing matched",
            OutcomeStatus::Removed => "removed",
            OutcomeStatus::WouldRemove => "would remove",
            OutcomeStatus::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// One entry of the ordered sweep report
#[derive(Debug)]
pub struct CategoryReport {
    pub label: String,
    pub kind: MatchKind,
    pub outcome: RemovalOutcome,
}

impl CategoryReport {
    pub fn status(&self) -> OutcomeStatus {
        let outcome = &self.outcome;
        if !outcome.failures.is_empty() {
            OutcomeStatus::Failed
        } else if outcome.matched == 0 {
            match self.kind {
                MatchKind::FixedRelativePath => OutcomeStatus::NotFound,
                _ => OutcomeStatus::NothingMatched,
            }
        } else if outcome.dry_run {
            OutcomeStatus::WouldRemove
        } else {
            OutcomeStatus::Removed
        }
    }
}

/// Result of one full sweep
#[derive(Debug)]
pub struct SweepReport {
    pub root: PathBuf,
    pub categories: Vec<CategoryReport>,
    /// Set when an interrupt stopped the sweep early
    pub interrupted: bool,
}

impl SweepReport {
    pub fn new(root: PathBuf) -> Self {
        SweepReport {
            root,
            categories: Vec::new(),
            interrupted: false,
        }
    }

    /// True unless a deletion failed or the sweep was interrupted
    pub fn success(&self) -> bool {
        !self.interrupted && self.failure_count() == 0
    }

    pub fn failure_count(&self) -> usize {
        self.categories.iter().map(|c| c.outcome.failures.len()).sum()
    }

    pub fn unreadable_count(&self) -> usize {
        self.categories.iter().map(|c| c.outcome.unreadable).sum()
    }

    pub fn total_matched(&self) -> usize {
        self.categories.iter().map(|c| c.outcome.matched).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.categories.iter().map(|c| c.outcome.removed).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.categories.iter().map(|c| c.outcome.bytes).sum()
    }

    /// One-line summary of what was reclaimed
    pub fn summary(&self, dry_run: bool) -> String {
        let size = format_size(self.total_bytes(), BINARY);
        let mut line = if dry_run {
            format!(
                "Dry run: {} entries ({}) would be removed",
                self.total_matched(),
                size
            )
        } else {
            format!("Removed {} entries, reclaimed {}", self.total_removed(), size)
        };

        let unreadable = self.unreadable_count();
        if unreadable > 0 {
            line.push_str(&format!(" ({} unreadable entries skipped)", unreadable));
        }
        line
    }

    /// Process exit status for this sweep
    pub fn exit_code(&self) -> u8 {
        if self.interrupted {
            EXIT_INTERRUPTED
        } else if self.failure_count() > 0 {
            EXIT_FAILED
        } else {
            EXIT_OK
        }
    }

    /// Closing status line printed after the sweep
    pub fn final_line(&self) -> String {
        match self.exit_code() {
            EXIT_INTERRUPTED => "[ABORT] Cache cleanup interrupted".to_string(),
            EXIT_FAILED => format!(
                "[FAIL] Cache cleanup finished with {} error(s)",
                self.failure_count()
            ),
            _ => "[OK] Cache cleanup complete!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    fn report(kind: MatchKind, outcome: RemovalOutcome) -> CategoryReport {
        CategoryReport {
            label: "test".to_string(),
            kind,
            outcome,
        }
    }

    #[test]
    fn test_absent_fixed_path_is_not_found() {
        let category = report(MatchKind::FixedRelativePath, RemovalOutcome::default());
        assert_eq!(category.status(), OutcomeStatus::NotFound);
        assert_eq!(category.status().to_string(), "not found");
    }

    #[test]
    fn test_empty_traversal_is_nothing_matched() {
        let category = report(MatchKind::DirectoryName, RemovalOutcome::default());
        assert_eq!(category.status(), OutcomeStatus::NothingMatched);
    }

    #[test]
    fn test_failure_wins_over_removals() {
        let outcome = RemovalOutcome {
            matched: 3,
            removed: 2,
            failures: vec![RemovalError::from_io(
                Path::new("locked/mod.pyc"),
                io::Error::from(io::ErrorKind::PermissionDenied),
            )],
            ..Default::default()
        };
        let category = report(MatchKind::FileGlob, outcome);
        assert_eq!(category.status(), OutcomeStatus::Failed);
    }

    #[test]
    fn test_dry_run_reports_would_remove() {
        let outcome = RemovalOutcome {
            matched: 1,
            dry_run: true,
            ..Default::default()
        };
        assert_eq!(
            report(MatchKind::FileGlob, outcome).status(),
            OutcomeStatus::WouldRemove
        );
    }

    #[test]
    fn test_success_and_totals() {
        let mut sweep = SweepReport::new(PathBuf::from("."));
        sweep.categories.push(report(
            MatchKind::DirectoryName,
            RemovalOutcome {
                matched: 2,
                removed: 2,
                bytes: 2048,
                ..Default::default()
            },
        ));
        sweep
            .categories
            .push(report(MatchKind::FixedRelativePath, RemovalOutcome::default()));

        assert!(sweep.success());
        assert_eq!(sweep.total_removed(), 2);
        assert_eq!(sweep.total_bytes(), 2048);
        assert!(sweep
            .summary(false)
            .starts_with("Removed 2 entries, reclaimed 2"));

        assert_eq!(sweep.exit_code(), EXIT_OK);
        assert_eq!(sweep.final_line(), "[OK] Cache cleanup complete!");

        sweep.interrupted = true;
        assert!(!sweep.success());
        assert_eq!(sweep.exit_code(), EXIT_INTERRUPTED);
        assert_eq!(sweep.final_line(), "[ABORT] Cache cleanup interrupted");
    }

    #[test]
    fn test_failures_give_fail_line_and_exit_one() {
        let mut sweep = SweepReport::new(PathBuf::from("."));
        sweep.categories.push(report(
            MatchKind::FileGlob,
            RemovalOutcome {
                matched: 2,
                removed: 1,
                failures: vec![RemovalError::from_io(
                    Path::new("held.pyc"),
                    io::Error::from(io::ErrorKind::ResourceBusy),
                )],
                ..Default::default()
            },
        ));

        assert!(!sweep.success());
        assert_eq!(sweep.exit_code(), EXIT_FAILED);
        assert_eq!(
            sweep.final_line(),
            "[FAIL] Cache cleanup finished with 1 error(s)"
        );
    }

    #[test]
    fn test_unreadable_entries_show_in_summary() {
        let mut sweep = SweepReport::new(PathBuf::from("."));
        sweep.categories.push(report(
            MatchKind::DirectoryName,
            RemovalOutcome {
                unreadable: 2,
                ..Default::default()
            },
        ));

        assert_eq!(sweep.unreadable_count(), 2);
        assert!(sweep
            .summary(false)
            .ends_with("(2 unreadable entries skipped)"));
        assert!(sweep.success());
    }
}
