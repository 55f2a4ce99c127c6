//! Modification time helpers.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Latest of the known times, ignoring `None`.
pub fn newest<I>(times: I) -> Option<SystemTime>
where
    I: IntoIterator<Item = Option<SystemTime>>,
{
    times.into_iter().flatten().max()
}

/// Earliest of the times, `None` if any is missing.
///
/// An empty input also yields `None`.
pub fn oldest<I>(times: I) -> Option<SystemTime>
where
    I: IntoIterator<Item = Option<SystemTime>>,
{
    let mut oldest = None;
    for time in times {
        let time = time?;
        oldest = Some(oldest.map_or(time, |o: SystemTime| o.min(time)));
    }
    oldest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_newest_skips_unknown() {
        assert_eq!(newest([at(1), None, at(3), at(2)]), at(3));
        assert_eq!(newest([None, None]), None);
        assert_eq!(newest(std::iter::empty()), None);
    }

    #[test]
    fn test_oldest_requires_all() {
        assert_eq!(oldest([at(5), at(2), at(9)]), at(2));
        assert_eq!(oldest([at(5), None]), None);
        assert_eq!(oldest(std::iter::empty()), None);
    }

    #[test]
    fn test_get_mtime_missing() {
        assert!(get_mtime(Path::new("/definitely/not/here.js")).is_none());
    }
}
