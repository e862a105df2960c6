//! Size-rotated log file.
//!
//! Rotation and compression are done by `file-rotate`: once the active file
//! passes the size limit it becomes `<path>.1.gz` and older backups shift up
//! one slot, at most `max_backups` of them kept. This module adds age pruning
//! on top and shares one writer between threads as a `MakeWriter`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use tracing_subscriber::fmt::MakeWriter;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// When to rotate and what to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    /// 0 keeps every backup.
    pub max_backups: usize,
    /// `None` disables age pruning.
    pub max_age: Option<Duration>,
    pub compress: bool,
}

impl RotationPolicy {
    pub fn new(max_bytes: u64, max_backups: usize, max_age_days: u64) -> Self {
        Self {
            max_bytes,
            max_backups,
            max_age: (max_age_days > 0)
                .then(|| Duration::from_secs(max_age_days.saturating_mul(SECS_PER_DAY))),
            compress: true,
        }
    }
}

/// Cloneable handle to a size-rotated file. Writes are serialized through a
/// mutex, so one handle can back any number of threads.
#[derive(Clone)]
pub struct RotatingFile {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    path: PathBuf,
    policy: RotationPolicy,
    writer: FileRotate<AppendCount>,
    since_prune: u64,
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("RotatingFile")
            .field("path", &inner.path)
            .field("policy", &inner.policy)
            .finish()
    }
}

impl RotatingFile {
    /// Opens (or creates) `path` for appending.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> io::Result<Self> {
        let path = path.into();
        OpenOptions::new().create(true).append(true).open(&path)?;

        let mut inner = Inner {
            writer: open_writer(&path, &policy),
            path,
            policy,
            since_prune: 0,
        };
        inner.prune();
        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    /// Force a rotation regardless of size.
    pub fn rotate(&self) -> io::Result<()> {
        let mut inner = self.lock();
        inner.writer.rotate()?;
        inner.prune();
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.lock();
        let n = inner.writer.write(buf)?;
        inner.since_prune += n as u64;
        // Age pruning runs once per `max_bytes` written.
        if inner.since_prune >= inner.policy.max_bytes {
            inner.prune();
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().writer.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = RotatingFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn open_writer(path: &Path, policy: &RotationPolicy) -> FileRotate<AppendCount> {
    let max_files = match policy.max_backups {
        0 => usize::MAX,
        n => n,
    };
    let max_bytes = usize::try_from(policy.max_bytes)
        .unwrap_or(usize::MAX)
        .max(1);
    let compression = if policy.compress {
        Compression::OnRotate(0)
    } else {
        Compression::None
    };
    FileRotate::new(
        path,
        AppendCount::new(max_files),
        ContentLimit::BytesSurpassed(max_bytes),
        compression,
        #[cfg(unix)]
        None,
    )
}

impl Inner {
    /// Remove backups older than `max_age`, then reopen so the writer
    /// forgets them.
    fn prune(&mut self) {
        self.since_prune = 0;
        let Some(max_age) = self.policy.max_age else {
            return;
        };

        let now = SystemTime::now();
        let mut removed = false;
        for backup in self.writer.log_paths() {
            let stale = fs::metadata(&backup)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if !stale {
                continue;
            }
            match fs::remove_file(&backup) {
                Ok(()) => removed = true,
                Err(e) => eprintln!("zlog: failed to remove backup {}: {}", backup.display(), e),
            }
        }

        if removed {
            if let Err(e) = self.writer.flush() {
                eprintln!("zlog: failed to flush {}: {}", self.path.display(), e);
            }
            self.writer = open_writer(&self.path, &self.policy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs::File;
    use std::io::Read;

    fn policy(max_bytes: u64, max_backups: usize) -> RotationPolicy {
        RotationPolicy {
            max_bytes,
            max_backups,
            max_age: None,
            compress: true,
        }
    }

    fn backup(path: &Path, index: usize) -> PathBuf {
        PathBuf::from(format!("{}.{index}.gz", path.display()))
    }

    fn gunzip(path: &Path) -> String {
        let mut out = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();

        let mut file = RotatingFile::open(&path, policy(1024, 0)).unwrap();
        file.write_all(b"new\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_rotates_and_compresses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(4, 0)).unwrap();

        file.write_all(b"aaaa\n").unwrap();
        file.write_all(b"bbbb\n").unwrap();
        file.flush().unwrap();

        assert_eq!(gunzip(&backup(&path, 1)), "aaaa\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "bbbb\n");
    }

    #[test]
    fn test_backups_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(4, 2)).unwrap();

        for line in ["aaaa\n", "bbbb\n", "cccc\n", "dddd\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "dddd\n");
        assert_eq!(gunzip(&backup(&path, 1)), "cccc\n");
        assert_eq!(gunzip(&backup(&path, 2)), "bbbb\n");
        assert!(!backup(&path, 3).exists());
    }

    #[test]
    fn test_stale_backups_pruned_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let stale = backup(&path, 1);
        fs::write(&stale, b"stale").unwrap();
        let three_days_ago = SystemTime::now() - Duration::from_secs(3 * SECS_PER_DAY);
        File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(three_days_ago)
            .unwrap();

        let mut file = RotatingFile::open(&path, RotationPolicy::new(4, 0, 1)).unwrap();
        assert!(!stale.exists());

        // The writer still rotates normally after pruning.
        file.write_all(b"aaaa\n").unwrap();
        file.write_all(b"bbbb\n").unwrap();
        assert_eq!(gunzip(&backup(&path, 1)), "aaaa\n");
    }

    #[test]
    fn test_fresh_backups_survive_pruning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let file = RotatingFile::open(&path, RotationPolicy::new(1024, 0, 1)).unwrap();

        fs::write(&path, "recent\n").unwrap();
        file.rotate().unwrap();
        assert!(backup(&path, 1).exists());
    }

    #[test]
    fn test_huge_age_saturates() {
        let policy = RotationPolicy::new(1, 0, u64::MAX);
        assert_eq!(policy.max_age, Some(Duration::from_secs(u64::MAX)));
    }
}
