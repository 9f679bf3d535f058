//! Retention sweeper: removes backup output directories older than each
//! configuration's retention window. Runs on its own timer, independent of
//! the orchestrator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tokio::time::{Duration as TokioDuration, interval};
use tracing::{error, info, warn};

use crate::db::services::configuration_service;

/// Extracts the `_YYYYMMDD_HHMMSS` suffix from a backup directory name.
/// Names without the suffix are not backup output and yield `None`.
pub fn extract_backup_timestamp(name: &str) -> Option<NaiveDateTime> {
    let (rest, hms) = name.rsplit_once('_')?;
    let (_, ymd) = rest.rsplit_once('_')?;

    if ymd.len() != 8 || hms.len() != 6 {
        return None;
    }
    if !ymd.bytes().all(|b| b.is_ascii_digit()) || !hms.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    NaiveDateTime::parse_from_str(&format!("{ymd}_{hms}"), "%Y%m%d_%H%M%S").ok()
}

/// Deletes the immediate children of `root` whose encoded timestamp is older
/// than `cutoff`; returns the removed paths. Entries without a parseable
/// timestamp suffix are left untouched.
pub fn sweep_destination(root: &Path, cutoff: DateTime<Utc>) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name();
        let Some(timestamp) = extract_backup_timestamp(&name.to_string_lossy()) else {
            continue;
        };

        if Utc.from_utc_datetime(&timestamp) < cutoff {
            fs::remove_dir_all(entry.path())?;
            removed.push(entry.path());
        }
    }

    Ok(removed)
}

/// One sweep over every configuration with a destination root. Failures for
/// one configuration are logged and do not abort the sweep for the others.
pub async fn sweep_all(db: &DatabaseConnection) {
    let configs = match configuration_service::list_configurations_with_destination(db).await {
        Ok(configs) => configs,
        Err(e) => {
            error!("retention sweep: failed to list configurations: {e}");
            return;
        }
    };

    let now = Utc::now();
    for config in configs {
        let root = PathBuf::from(&config.destination_root);
        if !root.exists() {
            continue;
        }

        let retention_days = config.retention_days.max(0) as i64;
        let cutoff = now - Duration::days(retention_days);

        match sweep_destination(&root, cutoff) {
            Ok(removed) => {
                for path in removed {
                    info!(
                        configuration_id = config.id,
                        "removed expired backup: {}",
                        path.display()
                    );
                }
            }
            Err(e) => {
                warn!(
                    configuration_id = config.id,
                    "retention sweep failed for {}: {e}",
                    root.display()
                );
            }
        }
    }
}

/// Periodic sweep loop, spawned by the server binary.
pub async fn start_retention_sweeper(db: DatabaseConnection, interval_secs: u64) {
    info!("Retention sweeper started. Interval: {interval_secs} seconds.");
    let mut ticker = interval(TokioDuration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        sweep_all(&db).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(name: &str) -> Option<NaiveDateTime> {
        extract_backup_timestamp(name)
    }

    #[test]
    fn extracts_valid_suffix() {
        let expected = NaiveDate::from_ymd_opt(2026, 8, 1)
            .unwrap()
            .and_hms_opt(3, 15, 0)
            .unwrap();
        assert_eq!(ts("app_20260801_031500"), Some(expected));
        assert_eq!(ts("my_proj_20260801_031500"), Some(expected));
    }

    #[test]
    fn rejects_non_matching_names() {
        assert_eq!(ts("app"), None);
        assert_eq!(ts("app_backup"), None);
        assert_eq!(ts("app_2026081_031500"), None);
        assert_eq!(ts("app_20260801_0315"), None);
        assert_eq!(ts("app_20260801_03150x"), None);
        // Calendar-impossible dates must not parse.
        assert_eq!(ts("app_20261301_031500"), None);
    }

    #[test]
    fn sweeps_only_expired_timestamped_dirs() {
        let root = tempfile::tempdir().unwrap();
        let old = root.path().join("app_20200101_000000");
        let fresh = root.path().join("app_29990101_000000");
        let unrelated = root.path().join("keep-me");
        for dir in [&old, &fresh, &unrelated] {
            std::fs::create_dir(dir).unwrap();
        }
        std::fs::write(old.join("f.txt"), "x").unwrap();

        let cutoff = Utc::now() - Duration::days(7);
        let removed = sweep_destination(root.path(), cutoff).unwrap();

        assert_eq!(removed, vec![old.clone()]);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn plain_files_are_never_removed() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("app_20200101_000000");
        std::fs::write(&file, "not a directory").unwrap();

        let removed = sweep_destination(root.path(), Utc::now()).unwrap();

        assert!(removed.is_empty());
        assert!(file.exists());
    }
}
