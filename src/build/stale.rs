//! Staleness decision for one source/destination pair.

use super::TaskError;
use std::{io::ErrorKind, path::Path, time::SystemTime};

/// What the timestamps say about a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Source file does not exist.
    MissingSource,
    /// Destination does not exist yet.
    Missing,
    /// Source is strictly newer than destination.
    Outdated,
    /// Destination is as new as or newer than source.
    UpToDate,
}

/// Compare modification times of `src` and `dst`.
///
/// Equal timestamps count as up to date. A source that is not a regular file
/// (e.g. a directory entry whose directory is gone) is treated as missing.
pub fn check(src: &Path, dst: &Path) -> Result<Staleness, TaskError> {
    let Some(src_time) = modified(src)? else {
        return Ok(Staleness::MissingSource);
    };
    if !src.is_file() {
        return Ok(Staleness::MissingSource);
    }
    let Some(dst_time) = modified(dst)? else {
        return Ok(Staleness::Missing);
    };

    if src_time > dst_time {
        Ok(Staleness::Outdated)
    } else {
        Ok(Staleness::UpToDate)
    }
}

/// Modification time, `None` if the path does not exist.
fn modified(path: &Path) -> Result<Option<SystemTime>, TaskError> {
    match path.metadata().and_then(|m| m.modified()) {
        Ok(time) => Ok(Some(time)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(TaskError::StaleCheck {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs::{self, File},
        time::Duration,
    };
    use tempfile::TempDir;

    fn write_at(path: &Path, content: &str, time: SystemTime) {
        fs::write(path, content).unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("out.js");
        write_at(&dst, "x", at(1_000));

        let result = check(&dir.path().join("main.js"), &dst).unwrap();
        assert_eq!(result, Staleness::MissingSource);
    }

    #[test]
    fn test_directory_source_is_missing() {
        let dir = TempDir::new().unwrap();
        let result = check(dir.path(), &dir.path().join("out")).unwrap();
        assert_eq!(result, Staleness::MissingSource);
    }

    #[test]
    fn test_missing_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("main.js");
        write_at(&src, "x", at(1_000));

        let result = check(&src, &dir.path().join("www/main.js")).unwrap();
        assert_eq!(result, Staleness::Missing);
    }

    #[test]
    fn test_source_newer() {
        let dir = TempDir::new().unwrap();
        let (src, dst) = (dir.path().join("a"), dir.path().join("b"));
        write_at(&src, "x", at(2_000));
        write_at(&dst, "x", at(1_000));

        assert_eq!(check(&src, &dst).unwrap(), Staleness::Outdated);
    }

    #[test]
    fn test_equal_timestamps_up_to_date() {
        let dir = TempDir::new().unwrap();
        let (src, dst) = (dir.path().join("a"), dir.path().join("b"));
        write_at(&src, "x", at(1_000));
        write_at(&dst, "x", at(1_000));

        assert_eq!(check(&src, &dst).unwrap(), Staleness::UpToDate);
    }

    #[test]
    fn test_destination_newer() {
        let dir = TempDir::new().unwrap();
        let (src, dst) = (dir.path().join("a"), dir.path().join("b"));
        write_at(&src, "x", at(1_000));
        write_at(&dst, "x", at(2_000));

        assert_eq!(check(&src, &dst).unwrap(), Staleness::UpToDate);
    }
}
