//! Database dump adapter: drives the external dump tool for the project's
//! engine, writing one artifact file into the run's output directory.

use std::io;
use std::path::{Path, PathBuf};

use sea_orm::DbErr;
use thiserror::Error;
use tokio::process::Command;

use super::RunLogger;
use crate::db::entities::prelude::{BackupConfigurationModel, ProjectModel};
use crate::db::enums::{DatabaseEngine, LogKind};

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("missing database connection fields: {0}")]
    MissingCredentials(String),
    #[error("failed to read compose file {path}: {reason}")]
    ComposeRead { path: String, reason: String },
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: &'static str,
        status: String,
        stderr: String,
    },
    #[error("failed to write dump artifact {path}: {source}")]
    Artifact {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Resolved connection fields for the dump tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpCredentials {
    pub host: String,
    pub port: i32,
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Deterministic artifact file name for a run: `<project>_dump.sql`.
pub fn artifact_name(project_name: &str) -> String {
    format!("{project_name}_dump.sql")
}

/// Resolves dump credentials: explicit configuration fields win; when they
/// are blank and the project carries a compose file, the `db` service's
/// environment supplies them instead.
pub fn resolve_credentials(
    config: &BackupConfigurationModel,
    project: &ProjectModel,
) -> Result<DumpCredentials, DumpError> {
    let host = config.db_host.as_deref().unwrap_or("").trim();
    let name = config.db_name.as_deref().unwrap_or("").trim();
    let user = config.db_user.as_deref().unwrap_or("").trim();

    if !host.is_empty() && !name.is_empty() && !user.is_empty() {
        return Ok(DumpCredentials {
            host: host.to_string(),
            port: config.db_port.unwrap_or(5432),
            name: name.to_string(),
            user: user.to_string(),
            password: config.db_password.clone().unwrap_or_default(),
        });
    }

    if let Some(compose_path) = project.compose_path.as_deref() {
        return compose_database_credentials(Path::new(compose_path));
    }

    let mut missing = Vec::new();
    if host.is_empty() {
        missing.push("host");
    }
    if name.is_empty() {
        missing.push("name");
    }
    if user.is_empty() {
        missing.push("user");
    }
    Err(DumpError::MissingCredentials(missing.join(", ")))
}

/// Reads POSTGRES_USER / POSTGRES_PASSWORD / POSTGRES_DB from the `db`
/// service environment of a docker-compose file. The environment section may
/// be either a mapping or a list of `KEY=VALUE` strings.
pub fn compose_database_credentials(path: &Path) -> Result<DumpCredentials, DumpError> {
    let read_err = |reason: String| DumpError::ComposeRead {
        path: path.to_string_lossy().into_owned(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| read_err(e.to_string()))?;

    let environment = doc
        .get("services")
        .and_then(|s| s.get("db"))
        .and_then(|db| db.get("environment"))
        .ok_or_else(|| read_err("no services.db.environment section".to_string()))?;

    let lookup = |key: &str| -> Option<String> {
        match environment {
            serde_yaml::Value::Mapping(map) => {
                map.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
            }
            serde_yaml::Value::Sequence(items) => items.iter().find_map(|item| {
                let entry = item.as_str()?;
                let (k, v) = entry.split_once('=')?;
                (k == key).then(|| v.to_string())
            }),
            _ => None,
        }
    };

    let user = lookup("POSTGRES_USER").unwrap_or_default();
    let password = lookup("POSTGRES_PASSWORD").unwrap_or_default();
    let name = lookup("POSTGRES_DB").unwrap_or_default();

    if user.is_empty() || name.is_empty() {
        return Err(read_err(
            "POSTGRES_USER / POSTGRES_DB not present in db environment".to_string(),
        ));
    }

    Ok(DumpCredentials {
        host: "localhost".to_string(),
        port: 5432,
        name,
        user,
        password,
    })
}

/// Runs the engine-appropriate dump tool, writing `<project>_dump.sql` under
/// `destination`. A non-zero exit is fatal for the run; the tool's error
/// stream is surfaced as the failure reason.
pub async fn run_dump(
    config: &BackupConfigurationModel,
    project: &ProjectModel,
    destination: &Path,
    log: &dyn RunLogger,
) -> Result<PathBuf, DumpError> {
    let artifact = destination.join(artifact_name(&project.name));

    match project.database_engine {
        DatabaseEngine::PostgreSql => {
            let credentials = resolve_credentials(config, project)?;
            run_pg_dump(&credentials, &artifact, log).await?;
        }
        DatabaseEngine::Sqlite => {
            // For SQLite the configured database name is the file path.
            let db_file = config.db_name.as_deref().unwrap_or("").trim().to_string();
            if db_file.is_empty() {
                return Err(DumpError::MissingCredentials("name (sqlite file path)".into()));
            }
            run_sqlite_dump(&db_file, &artifact, log).await?;
        }
    }

    Ok(artifact)
}

async fn run_pg_dump(
    credentials: &DumpCredentials,
    artifact: &Path,
    log: &dyn RunLogger,
) -> Result<(), DumpError> {
    let output = Command::new("pg_dump")
        .arg("-U")
        .arg(&credentials.user)
        .arg("-h")
        .arg(&credentials.host)
        .arg("-p")
        .arg(credentials.port.to_string())
        .arg("-d")
        .arg(&credentials.name)
        .arg("-F")
        .arg("c")
        .arg("-f")
        .arg(artifact)
        // Password via environment, never argv.
        .env("PGPASSWORD", &credentials.password)
        .output()
        .await
        .map_err(|source| DumpError::Spawn {
            tool: "pg_dump",
            source,
        })?;

    log_process_streams(log, &output.stdout, &output.stderr).await?;

    if !output.status.success() {
        return Err(DumpError::Failed {
            tool: "pg_dump",
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

async fn run_sqlite_dump(
    db_file: &str,
    artifact: &Path,
    log: &dyn RunLogger,
) -> Result<(), DumpError> {
    let output = Command::new("sqlite3")
        .arg(db_file)
        .arg(".dump")
        .output()
        .await
        .map_err(|source| DumpError::Spawn {
            tool: "sqlite3",
            source,
        })?;

    log_process_streams(log, &[], &output.stderr).await?;

    if !output.status.success() {
        return Err(DumpError::Failed {
            tool: "sqlite3",
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    tokio::fs::write(artifact, &output.stdout)
        .await
        .map_err(|source| DumpError::Artifact {
            path: artifact.to_string_lossy().into_owned(),
            source,
        })
}

async fn log_process_streams(
    log: &dyn RunLogger,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<(), DbErr> {
    for line in String::from_utf8_lossy(stdout).lines() {
        if !line.trim().is_empty() {
            log.append(LogKind::Stdout, line).await?;
        }
    }
    for line in String::from_utf8_lossy(stderr).lines() {
        if !line.trim().is_empty() {
            log.append(LogKind::Stderr, line).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{BackupKind, BackupMode, IgnoreMatchMode};
    use chrono::Utc;
    use std::io::Write;

    fn project(compose_path: Option<&str>) -> ProjectModel {
        ProjectModel {
            id: 1,
            name: "app".into(),
            backup_mode: BackupMode::WithDump,
            media_path: "/data/app".into(),
            compose_path: compose_path.map(|s| s.to_string()),
            database_engine: DatabaseEngine::PostgreSql,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn config(host: &str, name: &str, user: &str) -> BackupConfigurationModel {
        BackupConfigurationModel {
            id: 1,
            project_id: 1,
            backup_kind: BackupKind::DumpAndSync,
            source_path: "/data/app".into(),
            destination_root: "/backups".into(),
            db_host: Some(host.to_string()),
            db_port: None,
            db_name: Some(name.to_string()),
            db_user: Some(user.to_string()),
            db_password: Some("secret".into()),
            retention_days: 7,
            keep_permissions: true,
            delete_remote_extraneous: false,
            ignore_match_mode: IgnoreMatchMode::Prefix,
            legacy_schedule: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn artifact_name_is_deterministic() {
        assert_eq!(artifact_name("app"), "app_dump.sql");
    }

    #[test]
    fn explicit_fields_win_with_default_port() {
        let creds = resolve_credentials(&config("db.internal", "appdb", "app"), &project(None))
            .unwrap();
        assert_eq!(
            creds,
            DumpCredentials {
                host: "db.internal".into(),
                port: 5432,
                name: "appdb".into(),
                user: "app".into(),
                password: "secret".into(),
            }
        );
    }

    #[test]
    fn missing_fields_are_named() {
        let err = resolve_credentials(&config("", "appdb", ""), &project(None)).unwrap_err();
        match err {
            DumpError::MissingCredentials(fields) => assert_eq!(fields, "host, user"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn compose_fallback_reads_list_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "services:\n  db:\n    environment:\n      - POSTGRES_USER=app\n      - POSTGRES_PASSWORD=pw\n      - POSTGRES_DB=appdb"
        )
        .unwrap();

        let creds = resolve_credentials(
            &config("", "", ""),
            &project(Some(file.path().to_str().unwrap())),
        )
        .unwrap();

        assert_eq!(creds.host, "localhost");
        assert_eq!(creds.user, "app");
        assert_eq!(creds.password, "pw");
        assert_eq!(creds.name, "appdb");
    }

    #[test]
    fn compose_fallback_reads_map_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "services:\n  db:\n    environment:\n      POSTGRES_USER: app\n      POSTGRES_PASSWORD: pw\n      POSTGRES_DB: appdb"
        )
        .unwrap();

        let creds = compose_database_credentials(file.path()).unwrap();
        assert_eq!(creds.user, "app");
        assert_eq!(creds.name, "appdb");
    }

    #[test]
    fn compose_without_db_section_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "services:\n  web:\n    image: nginx").unwrap();

        assert!(compose_database_credentials(file.path()).is_err());
    }
}
