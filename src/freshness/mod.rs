//! Staleness detection by modification time.
//!
//! A target is rebuilt when forced, when any enabled output is missing, or
//! when the newest local source is strictly newer than the oldest output.
//! Remote sources have no timestamp and never trigger a rebuild on their own.

pub mod mtime;

pub use mtime::get_mtime;

use std::path::PathBuf;
use std::time::SystemTime;

use mtime::{newest, oldest};

/// Decide whether a target must be rebuilt.
///
/// `sources` holds one entry per source file (`None` for remote or
/// unreadable), `outputs` one per enabled artifact (`None` when absent).
pub fn requires_rebuild(
    force: bool,
    sources: &[Option<SystemTime>],
    outputs: &[Option<SystemTime>],
) -> bool {
    if force {
        return true;
    }
    let Some(oldest_output) = oldest(outputs.iter().copied()) else {
        return true;
    };
    newest(sources.iter().copied()).is_some_and(|source| source > oldest_output)
}

/// Modification times of the given output files.
pub fn output_mtimes(outputs: &[PathBuf]) -> Vec<Option<SystemTime>> {
    outputs.iter().map(|p| get_mtime(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_force_always_rebuilds() {
        assert!(requires_rebuild(true, &[at(1)], &[at(100)]));
        assert!(requires_rebuild(true, &[], &[at(100)]));
    }

    #[test]
    fn test_missing_output_rebuilds() {
        assert!(requires_rebuild(false, &[at(1)], &[at(100), None]));
        assert!(requires_rebuild(false, &[at(1)], &[]));
    }

    #[test]
    fn test_source_newer_than_output() {
        assert!(requires_rebuild(false, &[at(1), at(50)], &[at(40)]));
    }

    #[test]
    fn test_output_newer_than_sources() {
        assert!(!requires_rebuild(false, &[at(1), at(30)], &[at(40), at(35)]));
    }

    #[test]
    fn test_compares_against_oldest_output() {
        // minified output is current, combined output is old
        assert!(requires_rebuild(false, &[at(30)], &[at(20), at(40)]));
    }

    #[test]
    fn test_equal_times_are_fresh() {
        assert!(!requires_rebuild(false, &[at(40)], &[at(40)]));
    }

    #[test]
    fn test_remote_sources_never_trigger() {
        assert!(!requires_rebuild(false, &[None, None], &[at(40)]));
        assert!(!requires_rebuild(false, &[], &[at(40)]));
    }

    fn touch(path: &std::path::Path, secs: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_on_disk_files() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.js");
        let output = dir.path().join("a.min.js");
        let outputs = [output.clone()];

        fs::write(&source, "var a;").unwrap();
        touch(&source, 1_000);
        assert!(requires_rebuild(false, &[get_mtime(&source)], &output_mtimes(&outputs)));

        fs::write(&output, "var a;").unwrap();
        touch(&output, 2_000);
        assert!(!requires_rebuild(false, &[get_mtime(&source)], &output_mtimes(&outputs)));

        fs::write(&source, "var b;").unwrap();
        touch(&source, 3_000);
        assert!(requires_rebuild(false, &[get_mtime(&source)], &output_mtimes(&outputs)));
    }
}
