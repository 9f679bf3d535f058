//! File sync engine: mirrors a source tree into the run's destination
//! directory, honoring ignore rules and logging every decision.
//!
//! The built-in walker is an additive mirror (it never deletes destination
//! files). Remote-deletion mode is delegated to an external `rsync --delete`
//! invocation instead.

use std::fs;
use std::io;
use std::path::Path;

use sea_orm::DbErr;
use thiserror::Error;
use tokio::process::Command;
use walkdir::WalkDir;

use super::RunLogger;
use super::ignore::IgnoreSet;
use crate::db::enums::LogKind;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to copy {path}: {source}")]
    Copy {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to run rsync: {0}")]
    MirrorSpawn(#[source] io::Error),
    #[error("rsync exited with {status}: {stderr}")]
    Mirror { status: String, stderr: String },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub files_copied: u64,
    pub files_ignored: u64,
    pub dirs_ignored: u64,
}

/// Recursively mirrors `source` under `destination`, skipping ignored paths.
/// Copies are overwrite-based, so re-running after a partial failure is safe.
/// The first failing copy aborts the run naming the offending path.
pub async fn mirror_tree(
    source: &Path,
    destination: &Path,
    ignore: &IgnoreSet,
    log: &dyn RunLogger,
) -> Result<SyncStats, SyncError> {
    let mut stats = SyncStats::default();
    let mut walker = WalkDir::new(source).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };

        if rel.as_os_str().is_empty() {
            create_dir(destination)?;
            continue;
        }

        let rel_str = rel.to_string_lossy().into_owned();

        if entry.file_type().is_dir() {
            if ignore.matches(&rel_str) {
                log.append(LogKind::Ignored, &format!("Directory ignored: {rel_str}"))
                    .await?;
                stats.dirs_ignored += 1;
                walker.skip_current_dir();
                continue;
            }
            create_dir(&destination.join(rel))?;
        } else if entry.file_type().is_file() {
            if ignore.matches(&rel_str) {
                log.append(LogKind::Ignored, &format!("File ignored: {rel_str}"))
                    .await?;
                stats.files_ignored += 1;
                continue;
            }
            copy_file(entry.path(), &destination.join(rel), &rel_str)?;
            log.append(LogKind::Copy, &format!("Copied: {rel_str}")).await?;
            stats.files_copied += 1;
        }
        // Symlinks and other special files are left alone, as rsync-less
        // mirroring of them is not defined for this pipeline.
    }

    Ok(stats)
}

/// Walks the source like [`mirror_tree`] but performs no writes; used by the
/// dry-run entry point to report what a real run would do.
pub fn preview_tree(source: &Path, ignore: &IgnoreSet) -> Result<SyncStats, SyncError> {
    let mut stats = SyncStats::default();
    let mut walker = WalkDir::new(source).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let rel_str = rel.to_string_lossy();

        if entry.file_type().is_dir() {
            if ignore.matches(&rel_str) {
                stats.dirs_ignored += 1;
                walker.skip_current_dir();
            }
        } else if entry.file_type().is_file() {
            if ignore.matches(&rel_str) {
                stats.files_ignored += 1;
            } else {
                stats.files_copied += 1;
            }
        }
    }

    Ok(stats)
}

/// Archive-style mirror via an external rsync process, used when the
/// configuration asks for deletion of extraneous destination files.
pub async fn mirror_with_rsync(
    source: &Path,
    destination: &Path,
    ignore_paths: &[String],
    keep_permissions: bool,
    log: &dyn RunLogger,
) -> Result<(), SyncError> {
    // rsync semantics: a trailing slash on the source copies its contents.
    let mut source_arg = source.to_string_lossy().into_owned();
    if !source_arg.ends_with('/') {
        source_arg.push('/');
    }

    let mut command = Command::new("rsync");
    command.arg(if keep_permissions { "-a" } else { "-rlt" });
    command.arg("--delete");
    for path in ignore_paths {
        command.arg("--exclude").arg(path);
    }
    command.arg(&source_arg).arg(destination);

    let output = command.output().await.map_err(SyncError::MirrorSpawn)?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        if !line.trim().is_empty() {
            log.append(LogKind::Stdout, line).await?;
        }
    }
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    for line in stderr.lines() {
        if !line.trim().is_empty() {
            log.append(LogKind::Stderr, line).await?;
        }
    }

    if !output.status.success() {
        return Err(SyncError::Mirror {
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(())
}

fn create_dir(path: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(path).map_err(|source| SyncError::Io {
        path: path.to_string_lossy().into_owned(),
        source,
    })
}

/// Copies file content and metadata (permissions via `fs::copy`, mtime set
/// explicitly afterwards).
fn copy_file(source: &Path, destination: &Path, rel: &str) -> Result<(), SyncError> {
    let copy = || {
        let metadata = fs::metadata(source)?;
        fs::copy(source, destination)?;
        if let Ok(modified) = metadata.modified() {
            let file = fs::File::options().write(true).open(destination)?;
            file.set_times(fs::FileTimes::new().set_modified(modified))?;
        }
        Ok::<_, io::Error>(())
    };

    copy().map_err(|source| SyncError::Copy {
        path: rel.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::test_log::MemoryLogger;
    use crate::db::enums::IgnoreMatchMode;
    use std::fs;

    fn ignore(rules: &[&str]) -> IgnoreSet {
        IgnoreSet::new(
            rules.iter().map(|s| s.to_string()).collect(),
            IgnoreMatchMode::Prefix,
        )
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn mirrors_tree_and_honors_ignore_rules() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write(&source.path().join("a.txt"), "alpha");
        write(&source.path().join("logs/b.txt"), "beta");

        let log = MemoryLogger::default();
        let stats = mirror_tree(source.path(), dest.path(), &ignore(&["logs"]), &log)
            .await
            .unwrap();

        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.dirs_ignored, 1);
        assert!(dest.path().join("a.txt").exists());
        assert!(!dest.path().join("logs").exists());
        assert_eq!(log.entries_of(LogKind::Copy), vec!["Copied: a.txt"]);
        assert_eq!(
            log.entries_of(LogKind::Ignored),
            vec!["Directory ignored: logs"]
        );
    }

    #[tokio::test]
    async fn ignored_file_gets_its_own_entry() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write(&source.path().join("data/keep.txt"), "x");
        write(&source.path().join("data/skip.tmp"), "y");

        let log = MemoryLogger::default();
        let stats = mirror_tree(source.path(), dest.path(), &ignore(&["data/skip.tmp"]), &log)
            .await
            .unwrap();

        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.files_ignored, 1);
        assert!(dest.path().join("data/keep.txt").exists());
        assert!(!dest.path().join("data/skip.tmp").exists());
    }

    #[tokio::test]
    async fn mirroring_is_additive_and_idempotent() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write(&source.path().join("a.txt"), "alpha");
        write(&source.path().join("nested/b.txt"), "beta");
        // A destination-only file must survive: the walker never deletes.
        write(&dest.path().join("extraneous.txt"), "old");

        let log = MemoryLogger::default();
        mirror_tree(source.path(), dest.path(), &ignore(&[]), &log)
            .await
            .unwrap();
        let second = mirror_tree(source.path(), dest.path(), &ignore(&[]), &log)
            .await
            .unwrap();

        assert_eq!(second.files_copied, 2);
        assert_eq!(
            fs::read_to_string(dest.path().join("a.txt")).unwrap(),
            "alpha"
        );
        assert_eq!(
            fs::read_to_string(dest.path().join("nested/b.txt")).unwrap(),
            "beta"
        );
        assert_eq!(
            fs::read_to_string(dest.path().join("extraneous.txt")).unwrap(),
            "old"
        );
    }

    #[test]
    fn preview_counts_without_writing() {
        let source = tempfile::tempdir().unwrap();
        write(&source.path().join("a.txt"), "alpha");
        write(&source.path().join("logs/b.txt"), "beta");

        let stats = preview_tree(source.path(), &ignore(&["logs"])).unwrap();

        assert_eq!(
            stats,
            SyncStats {
                files_copied: 1,
                files_ignored: 0,
                dirs_ignored: 1
            }
        );
    }
}
