//! cachesweep - Regenerable Cache Sweeper
//!
//! cachesweep walks a project tree and deletes transient artifacts that tools
//! recreate on demand: bytecode caches, test-runner caches, coverage data and
//! static-analysis caches. It never looks inside files and never asks for
//! confirmation; every category it knows about is assumed safe to regenerate.
//!
//! ## Categories
//!
//! The category table is compiled in from `categories.toml` and applied in
//! declaration order. Each category has one of three match kinds:
//! - `directory-name`: directories with a given name at any depth, removed
//!   whole. Traversal does not descend into a match.
//! - `file-glob`: regular files whose name matches a glob, at any depth.
//! - `fixed-relative-path`: one known file or directory under the sweep root.
//!
//! ## Failures
//!
//! Only an invalid sweep root is fatal. A matched entry that cannot be removed
//! is recorded in the [`SweepReport`] and the sweep carries on.

pub mod categories;
pub mod error;
pub mod report;
pub mod signal;
pub mod sweeper;

// Re-export commonly used items
pub use categories::{builtin_categories, parse_categories, ArtifactCategory, MatchKind};
pub use error::{CategoryError, RemovalError, SweepError};
pub use report::{
    CategoryReport, OutcomeStatus, RemovalOutcome, SweepReport, EXIT_FAILED, EXIT_INTERRUPTED,
    EXIT_OK,
};
pub use signal::install_interrupt_handler;
pub use sweeper::{sweep, sweep_with, SweepOptions, VCS_INTERNALS};
