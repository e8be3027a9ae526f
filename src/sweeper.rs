//! Locating and removing artifact category matches under a sweep root.

use crate::categories::{builtin_categories, ArtifactCategory, MatchKind};
use crate::error::{RemovalError, SweepError};
use crate::report::{CategoryReport, RemovalOutcome, SweepReport};

use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// VCS internal directories that are never traversed
pub const VCS_INTERNALS: &[&str] = &[
    ".git", ".jj", ".svn", ".hg", ".bzr", "_darcs", ".pijul", "CVS", ".fossil",
];

/// Options controlling sweep behavior (runtime flags)
#[derive(Clone, Default)]
pub struct SweepOptions {
    /// Report matches without deleting anything
    pub dry_run: bool,
    /// Print per-category progress lines to stdout
    pub progress: bool,
    /// Directory names never descended into by traversal categories
    pub exclude: Vec<String>,
    /// Raised by an interrupt handler; checked between traversal steps and deletions
    pub abort: Arc<AtomicBool>,
}

impl SweepOptions {
    fn aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
}

/// A matched filesystem entry, removed as a unit
struct Match {
    path: PathBuf,
    is_dir: bool,
}

/// Sweep `root` with the built-in categories and default options
pub fn sweep(root: &Path) -> Result<SweepReport, SweepError> {
    let categories = builtin_categories()?;
    sweep_with(root, &categories, &SweepOptions::default())
}

/// Apply each category to `root` in order and report what happened.
///
/// Only an invalid root is fatal; per-entry deletion failures are recorded in
/// the report and never stop later entries or categories.
pub fn sweep_with(
    root: &Path,
    categories: &[ArtifactCategory],
    options: &SweepOptions,
) -> Result<SweepReport, SweepError> {
    check_root(root)?;

    let mut report = SweepReport::new(root.to_path_buf());

    for category in categories {
        if options.aborted() {
            warn!("Interrupted, skipping remaining categories");
            report.interrupted = true;
            break;
        }

        if options.progress {
            println!("> Removing {}...", category.label);
        }
        debug!(
            "Applying {} category '{}' ({})",
            category.kind, category.label, category.pattern
        );

        let mut outcome = RemovalOutcome {
            dry_run: options.dry_run,
            ..Default::default()
        };

        let matches = match category.kind {
            MatchKind::DirectoryName => find_directories(root, category, &mut outcome, options),
            MatchKind::FileGlob => find_files(root, category, &mut outcome, options),
            MatchKind::FixedRelativePath => find_fixed(root, category, &mut outcome, options),
        };

        let completed = remove_matches(&matches, &mut outcome, options);

        report.categories.push(CategoryReport {
            label: category.label.clone(),
            kind: category.kind,
            outcome,
        });

        if !completed {
            warn!("Interrupted, stopped after the last completed deletion");
            report.interrupted = true;
            break;
        }
    }

    Ok(report)
}

fn check_root(root: &Path) -> Result<(), SweepError> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(SweepError::NotADirectory(root.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(SweepError::InvalidRoot(root.to_path_buf()))
        }
        Err(source) => Err(SweepError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        }),
    }
}

/// Check if a directory should be excluded based on its name
pub fn should_exclude_dir(name: &str, excludes: &[String]) -> bool {
    VCS_INTERNALS.contains(&name) || excludes.iter().any(|exclude| exclude == name)
}

/// Walk below `root` without following symlinks, never entering VCS internals
/// or excluded directories. The root itself is not yielded.
fn walk<'a>(
    root: &Path,
    exclude: &'a [String],
) -> FilterEntry<walkdir::IntoIter, impl FnMut(&DirEntry) -> bool + 'a> {
    WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(move |entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match entry.file_name().to_str() {
                Some(name) => !should_exclude_dir(name, exclude),
                None => true,
            }
        })
}

/// Note an entry traversal could not read. Whatever is beneath it is left alone.
fn record_unreadable(err: walkdir::Error, outcome: &mut RemovalOutcome, options: &SweepOptions) {
    let path = err
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    if options.progress {
        println!("{}", format!("  ? skipped unreadable {}", path).yellow());
    }
    warn!("Failed to access entry {}: {}", path, err);
    outcome.unreadable += 1;
}

/// Directories whose name matches, pruned on match so nothing beneath a match
/// is visited or matched a second time
fn find_directories(
    root: &Path,
    category: &ArtifactCategory,
    outcome: &mut RemovalOutcome,
    options: &SweepOptions,
) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut walker = walk(root, &options.exclude);

    while let Some(result) = walker.next() {
        if options.aborted() {
            break;
        }

        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                record_unreadable(err, outcome, options);
                continue;
            }
        };

        if entry.file_type().is_dir() && category.matches_name(entry.file_name()) {
            matches.push(Match {
                path: entry.into_path(),
                is_dir: true,
            });
            walker.skip_current_dir();
        }
    }

    matches
}

/// Regular files whose name matches, at any depth
fn find_files(
    root: &Path,
    category: &ArtifactCategory,
    outcome: &mut RemovalOutcome,
    options: &SweepOptions,
) -> Vec<Match> {
    let mut matches = Vec::new();

    for result in walk(root, &options.exclude) {
        if options.aborted() {
            break;
        }

        match result {
            Ok(entry) if entry.file_type().is_file() && category.matches_name(entry.file_name()) => {
                matches.push(Match {
                    path: entry.into_path(),
                    is_dir: false,
                });
            }
            Ok(_) => {}
            Err(err) => record_unreadable(err, outcome, options),
        }
    }

    matches
}

/// The single fixed path, if it exists. A symlink is matched as a link, never as its target.
/// Intermediate directories must be real directories inside the root: a symlinked
/// parent is refused rather than followed.
fn find_fixed(
    root: &Path,
    category: &ArtifactCategory,
    outcome: &mut RemovalOutcome,
    options: &SweepOptions,
) -> Vec<Match> {
    let Some(target) = category.fixed_target(root) else {
        return Vec::new();
    };

    let mut parent = root.to_path_buf();
    let components: Vec<_> = Path::new(&category.pattern).components().collect();
    for component in &components[..components.len().saturating_sub(1)] {
        parent.push(component);
        match fs::symlink_metadata(&parent) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                let failure = RemovalError::SymlinkedParent {
                    path: target,
                    link: parent,
                };
                record_failure(failure, outcome, options);
                return Vec::new();
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("Not found: {}", parent.display());
                return Vec::new();
            }
            Err(err) => {
                record_failure(RemovalError::from_io(&parent, err), outcome, options);
                return Vec::new();
            }
        }
    }

    match fs::symlink_metadata(&target) {
        Ok(metadata) => vec![Match {
            path: target,
            is_dir: metadata.is_dir(),
        }],
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("Not found: {}", target.display());
            Vec::new()
        }
        Err(err) => {
            record_failure(RemovalError::from_io(&target, err), outcome, options);
            Vec::new()
        }
    }
}

/// Delete every match. Returns false if an interrupt stopped the loop early.
fn remove_matches(matches: &[Match], outcome: &mut RemovalOutcome, options: &SweepOptions) -> bool {
    // An interrupt during enumeration leaves a partial match list
    if options.aborted() {
        return false;
    }
    outcome.matched += matches.len();

    for entry in matches {
        if options.aborted() {
            return false;
        }

        let size = entry_size(entry);

        if options.dry_run {
            if options.progress {
                println!("  would remove {}", entry.path.display());
            }
            outcome.bytes += size;
            continue;
        }

        let result = if entry.is_dir {
            fs::remove_dir_all(&entry.path)
        } else {
            fs::remove_file(&entry.path)
        };

        match result {
            Ok(()) => {
                debug!("Removed: {}", entry.path.display());
                outcome.removed += 1;
                outcome.bytes += size;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("Already gone: {}", entry.path.display());
            }
            Err(err) => record_failure(RemovalError::from_io(&entry.path, err), outcome, options),
        }
    }

    true
}

fn record_failure(failure: RemovalError, outcome: &mut RemovalOutcome, options: &SweepOptions) {
    if options.progress {
        println!("{}", format!("  ! {}", failure).red());
    }
    debug!("{:?}", failure);
    outcome.failures.push(failure);
}

/// Bytes held by a match: the file itself, or every regular file beneath a directory.
/// Symlinks are never followed.
fn entry_size(entry: &Match) -> u64 {
    if !entry.is_dir {
        return fs::symlink_metadata(&entry.path)
            .map(|m| m.len())
            .unwrap_or(0);
    }

    WalkDir::new(&entry.path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_internals_always_excluded() {
        assert!(should_exclude_dir(".git", &[]));
        assert!(should_exclude_dir(".jj", &[]));
        assert!(!should_exclude_dir("src", &[]));
    }

    #[test]
    fn test_user_excludes_match_whole_names() {
        let excludes = vec![".venv".to_string()];
        assert!(should_exclude_dir(".venv", &excludes));
        assert!(!should_exclude_dir("venv", &excludes));
        assert!(!should_exclude_dir(".venv-old", &excludes));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            check_root(&missing),
            Err(SweepError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "keep").unwrap();
        assert!(matches!(
            check_root(&file),
            Err(SweepError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_interrupt_stops_enumeration() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/__pycache__")).unwrap();
        fs::write(dir.path().join("a/mod.pyc"), "x").unwrap();
        let categories = builtin_categories().unwrap();

        let options = SweepOptions::default();
        options.abort.store(true, Ordering::SeqCst);
        let mut outcome = RemovalOutcome::default();

        assert!(find_directories(dir.path(), &categories[0], &mut outcome, &options).is_empty());
        assert!(find_files(dir.path(), &categories[1], &mut outcome, &options).is_empty());
        assert!(!remove_matches(&[], &mut outcome, &options));
        assert_eq!(outcome.matched, 0);
    }

    #[test]
    fn test_enumeration_without_interrupt_finds_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/__pycache__")).unwrap();
        fs::write(dir.path().join("a/mod.pyc"), "x").unwrap();
        let categories = builtin_categories().unwrap();
        let options = SweepOptions::default();
        let mut outcome = RemovalOutcome::default();

        assert_eq!(
            find_directories(dir.path(), &categories[0], &mut outcome, &options).len(),
            1
        );
        assert_eq!(
            find_files(dir.path(), &categories[1], &mut outcome, &options).len(),
            1
        );
        assert_eq!(outcome.unreadable, 0);
    }

    #[test]
    fn test_directory_size_counts_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("__pycache__");
        fs::create_dir_all(cache.join("deep")).unwrap();
        fs::write(cache.join("a.bin"), [0u8; 10]).unwrap();
        fs::write(cache.join("deep/b.bin"), [0u8; 5]).unwrap();

        let size = entry_size(&Match {
            path: cache,
            is_dir: true,
        });
        assert_eq!(size, 15);
    }
}
