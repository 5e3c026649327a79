//! Duplicate detection over a directory tree.
//!
//! Two files are considered duplicates when they share both file name and
//! size; contents are not compared. The scan fans out over a
//! [`WorkerPool`], one job per top-level subdirectory.

use std::{
    collections::HashMap,
    ffi::OsString,
    fs::{self, DirEntry},
    io,
    path::{Path, PathBuf},
};
use syncwork::{Job, WorkerPool};

/// The attributes a file is compared by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDescr {
    pub name: OsString,
    pub size: u64,
}

/// One group of files sharing name and size.
///
/// `origin` is the path that sorts first; every other member of the group is
/// listed in `duplicates`, also sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatesDescr {
    pub origin: PathBuf,
    pub size: u64,
    pub duplicates: Vec<PathBuf>,
}

/// Walks one subtree and keeps what it found, including its first error.
struct ScanJob {
    root: PathBuf,
    files: HashMap<PathBuf, FileDescr>,
    error: Option<io::Error>,
}

impl ScanJob {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            files: HashMap::new(),
            error: None,
        }
    }

    fn walk(&mut self) -> io::Result<()> {
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    record(&mut self.files, &entry)?;
                }
            }
        }
        Ok(())
    }
}

impl Job for ScanJob {
    fn run(&mut self) {
        if let Err(e) = self.walk() {
            tracing::warn!("Scan of {} failed: {e}", self.root.display());
            self.error = Some(e);
        }
    }
}

fn record(files: &mut HashMap<PathBuf, FileDescr>, entry: &DirEntry) -> io::Result<()> {
    let metadata = entry.metadata()?;
    files.insert(
        entry.path(),
        FileDescr {
            name: entry.file_name(),
            size: metadata.len(),
        },
    );
    Ok(())
}

/// Lists every regular file below `root`, keyed by path.
///
/// Symbolic links are neither followed nor listed.
///
/// # Errors
///
/// Fails with the `read_dir` error when `root` cannot be read, or with the
/// first error met while walking a subtree.
pub fn scan_dir(root: &Path, pool: &WorkerPool) -> io::Result<HashMap<PathBuf, FileDescr>> {
    let mut files = HashMap::new();
    let mut jobs = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            jobs.push(ScanJob::new(entry.path()));
        } else if file_type.is_file() {
            record(&mut files, &entry)?;
        }
    }

    tracing::debug!(
        "Scanning {} subdirectories of {} on {} workers",
        jobs.len(),
        root.display(),
        pool.size()
    );

    let done = pool.run_batch(jobs).map_err(io::Error::other)?;
    for job in done {
        if let Some(e) = job.error {
            return Err(e);
        }
        files.extend(job.files);
    }

    Ok(files)
}

/// Groups `files` by name and size and returns every group with more than one
/// member, ordered by origin path.
pub fn check_duplicates(files: &HashMap<PathBuf, FileDescr>) -> Vec<DuplicatesDescr> {
    let mut groups: HashMap<&FileDescr, Vec<&PathBuf>> = HashMap::new();
    for (path, descr) in files {
        groups.entry(descr).or_default().push(path);
    }

    let mut duplicates: Vec<_> = groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(descr, mut paths)| {
            paths.sort();
            let mut paths = paths.into_iter().cloned();
            // Filtered to groups of two or more above.
            let origin = paths.next().unwrap_or_default();
            DuplicatesDescr {
                origin,
                size: descr.size,
                duplicates: paths.collect(),
            }
        })
        .collect();
    duplicates.sort_by(|a, b| a.origin.cmp(&b.origin));
    duplicates
}

/// Removes every copy listed in `duplicates`, keeping each origin.
///
/// # Errors
///
/// Stops at and returns the first removal error. Calling this twice with the
/// same groups therefore fails with [`io::ErrorKind::NotFound`].
pub fn delete_duplicates(duplicates: &[DuplicatesDescr]) -> io::Result<()> {
    for group in duplicates {
        for path in &group.duplicates {
            fs::remove_file(path)?;
            tracing::info!("Removed {} (copy of {})", path.display(), group.origin.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTENT: [u8; 7] = [1, 0, 0, 0, 0, 0, 0];

    /// Three nested levels of five directories each with one file per leaf,
    /// plus two files named `duplicate` in different subtrees.
    fn populate() -> io::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        for i in 0..5 {
            for j in 0..5 {
                for k in 0..5 {
                    let leaf = dir
                        .path()
                        .join(format!("dir-1-{i}"))
                        .join(format!("dir-2-{j}"))
                        .join(format!("dir-3-{k}"));
                    fs::create_dir_all(&leaf)?;
                    fs::write(leaf.join(format!("file-{i}-{j}-{k}")), CONTENT)?;
                }
            }
        }
        fs::write(dir.path().join("dir-1-0/dir-2-0/dir-3-0/duplicate"), CONTENT)?;
        fs::write(dir.path().join("dir-1-4/dir-2-0/duplicate"), CONTENT)?;
        Ok(dir)
    }

    fn descr(name: &str, size: u64) -> FileDescr {
        FileDescr {
            name: name.into(),
            size,
        }
    }

    #[test]
    fn scan_finds_every_file() {
        let dir = populate().unwrap();
        for workers in [1, 4] {
            let pool = WorkerPool::new(workers).unwrap();
            let files = scan_dir(dir.path(), &pool).unwrap();
            assert_eq!(files.len(), 127, "workers={workers}");
        }
    }

    #[test]
    fn scan_records_top_level_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top"), b"abc").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/inner"), b"").unwrap();

        let pool = WorkerPool::new(2).unwrap();
        let files = scan_dir(dir.path(), &pool).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[&dir.path().join("top")], descr("top", 3));
        assert_eq!(files[&dir.path().join("nested/inner")], descr("inner", 0));
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/file"), CONTENT).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real/file"), dir.path().join("file-link"))
            .unwrap();

        let pool = WorkerPool::new(1).unwrap();
        let files = scan_dir(dir.path(), &pool).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files.contains_key(&dir.path().join("real/file")));
    }

    #[test]
    fn scan_of_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let pool = WorkerPool::new(1).unwrap();

        let err = scan_dir(&dir.path().join("somebadpath"), &pool).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn scan_on_closed_pool_fails() {
        let dir = populate().unwrap();
        let pool = WorkerPool::new(1).unwrap();
        pool.close();

        assert!(scan_dir(dir.path(), &pool).is_err());
    }

    #[test]
    fn groups_by_name_and_size() {
        let files = HashMap::from([
            (PathBuf::from("/tmp/d2/file1"), descr("file1", 5)),
            (PathBuf::from("/tmp/d1/file1"), descr("file1", 5)),
            (PathBuf::from("/tmp/d3/file1"), descr("file1", 6)),
            (PathBuf::from("/tmp/d4/file2"), descr("file2", 5)),
        ]);

        let duplicates = check_duplicates(&files);

        assert_eq!(
            duplicates,
            [DuplicatesDescr {
                origin: PathBuf::from("/tmp/d1/file1"),
                size: 5,
                duplicates: vec![PathBuf::from("/tmp/d2/file1")],
            }]
        );
    }

    #[test]
    fn no_duplicates_among_distinct_names() {
        let files = HashMap::from([
            (PathBuf::from("/tmp/d1/file1"), descr("file1", 5)),
            (PathBuf::from("/tmp/d2/file2"), descr("file2", 5)),
            (PathBuf::from("/tmp/d3/file3"), descr("file3", 5)),
            (PathBuf::from("/tmp/d4/file4"), descr("file4", 5)),
        ]);
        assert!(check_duplicates(&files).is_empty());
        assert!(check_duplicates(&HashMap::new()).is_empty());
    }

    #[test]
    fn delete_keeps_origin_and_fails_when_repeated() {
        let dir = populate().unwrap();
        let pool = WorkerPool::new(3).unwrap();

        let files = scan_dir(dir.path(), &pool).unwrap();
        let duplicates = check_duplicates(&files);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(
            duplicates[0].origin,
            dir.path().join("dir-1-0/dir-2-0/dir-3-0/duplicate")
        );

        delete_duplicates(&duplicates).unwrap();
        assert!(duplicates[0].origin.exists());

        let err = delete_duplicates(&duplicates).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let files = scan_dir(dir.path(), &pool).unwrap();
        assert_eq!(files.len(), 126);
        assert!(check_duplicates(&files).is_empty());
    }
}
