//! Beat loop: polls the periodic-trigger store once a minute and spawns the
//! orchestrator for every due, enabled trigger.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use sea_orm::DatabaseConnection;
use tokio::time::{Duration as TokioDuration, interval};
use tracing::{error, info, warn};

use super::synchronizer::BACKUP_TASK;
use crate::backup::orchestrator::Orchestrator;
use crate::db::entities::prelude::PeriodicTriggerModel;
use crate::db::services::trigger_service;

/// Matches one cron field against a value. Supports `*`, exact numbers,
/// `*/step`, ranges and comma lists.
pub fn cron_field_matches(field: &str, value: u32) -> bool {
    let field = field.trim();
    if field == "*" {
        return true;
    }

    field.split(',').any(|part| {
        let part = part.trim();
        if let Some(step) = part.strip_prefix("*/") {
            step.parse::<u32>()
                .map(|s| s > 0 && value % s == 0)
                .unwrap_or(false)
        } else if let Some((start, end)) = part.split_once('-') {
            match (start.parse::<u32>(), end.parse::<u32>()) {
                (Ok(start), Ok(end)) => value >= start && value <= end,
                _ => false,
            }
        } else {
            part.parse::<u32>().map(|v| v == value).unwrap_or(false)
        }
    })
}

/// True iff the trigger's cron fields match the given instant (minute
/// granularity).
pub fn trigger_is_due(trigger: &PeriodicTriggerModel, now: DateTime<Utc>) -> bool {
    let day_of_week = now.weekday().num_days_from_sunday();

    cron_field_matches(&trigger.cron_minute, now.minute())
        && cron_field_matches(&trigger.cron_hour, now.hour())
        && cron_field_matches(&trigger.cron_day_of_month, now.day())
        && cron_field_matches(&trigger.cron_month, now.month())
        // Both 0 and 7 mean Sunday in cron.
        && (cron_field_matches(&trigger.cron_day_of_week, day_of_week)
            || (day_of_week == 0 && cron_field_matches(&trigger.cron_day_of_week, 7)))
}

fn configuration_id_from_args(args: &serde_json::Value) -> Option<i32> {
    args.as_array()?
        .first()?
        .as_i64()
        .and_then(|id| i32::try_from(id).ok())
}

/// The minute tick. Each due trigger spawns its own orchestrator task, so
/// long-running backups never block unrelated configurations.
pub async fn start_beat(db: DatabaseConnection, orchestrator: Arc<Orchestrator>) {
    info!("Schedule beat started.");
    let mut ticker = interval(TokioDuration::from_secs(60));
    let mut last_minute: Option<i64> = None;

    loop {
        ticker.tick().await;
        let now = Utc::now();

        // Fire at most once per wall-clock minute even if ticks drift.
        let minute_key = now.timestamp() / 60;
        if last_minute == Some(minute_key) {
            continue;
        }
        last_minute = Some(minute_key);

        let triggers = match trigger_service::list_enabled_triggers(&db).await {
            Ok(triggers) => triggers,
            Err(e) => {
                error!("beat: could not load triggers: {e}");
                continue;
            }
        };

        for trigger in triggers.into_iter().filter(|t| trigger_is_due(t, now)) {
            if trigger.task != BACKUP_TASK {
                warn!(trigger = %trigger.name, task = %trigger.task, "unknown task, skipping");
                continue;
            }
            let Some(configuration_id) = configuration_id_from_args(&trigger.args) else {
                warn!(trigger = %trigger.name, "malformed trigger args, skipping");
                continue;
            };

            info!(trigger = %trigger.name, configuration_id, "firing scheduled backup");
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                let outcome = orchestrator.run_backup(configuration_id).await;
                info!(configuration_id, "scheduled backup finished: {outcome}");
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn trigger(minute: &str, hour: &str, dow: &str) -> PeriodicTriggerModel {
        PeriodicTriggerModel {
            id: 1,
            name: "backup | app | 1 | 03:00".into(),
            cron_minute: minute.into(),
            cron_hour: hour.into(),
            cron_day_of_month: "*".into(),
            cron_month: "*".into(),
            cron_day_of_week: dow.into(),
            task: BACKUP_TASK.into(),
            args: json!([1]),
            enabled: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn field_matching_supports_common_forms() {
        assert!(cron_field_matches("*", 17));
        assert!(cron_field_matches("5", 5));
        assert!(!cron_field_matches("5", 6));
        assert!(cron_field_matches("*/15", 30));
        assert!(!cron_field_matches("*/15", 31));
        assert!(cron_field_matches("1-5", 3));
        assert!(!cron_field_matches("1-5", 6));
        assert!(cron_field_matches("0,30", 30));
        assert!(!cron_field_matches("0,30", 15));
        assert!(!cron_field_matches("garbage", 3));
    }

    #[test]
    fn daily_trigger_fires_only_at_its_minute() {
        let t = trigger("0", "3", "*");
        // 2026-08-26 is a Wednesday.
        let at_3am = Utc.with_ymd_and_hms(2026, 8, 26, 3, 0, 0).unwrap();
        let at_301 = Utc.with_ymd_and_hms(2026, 8, 26, 3, 1, 0).unwrap();
        let at_4am = Utc.with_ymd_and_hms(2026, 8, 26, 4, 0, 0).unwrap();

        assert!(trigger_is_due(&t, at_3am));
        assert!(!trigger_is_due(&t, at_301));
        assert!(!trigger_is_due(&t, at_4am));
    }

    #[test]
    fn sunday_matches_both_zero_and_seven() {
        let sunday = Utc.with_ymd_and_hms(2026, 8, 23, 3, 0, 0).unwrap();

        assert!(trigger_is_due(&trigger("0", "3", "0"), sunday));
        assert!(trigger_is_due(&trigger("0", "3", "7"), sunday));
        assert!(!trigger_is_due(&trigger("0", "3", "1"), sunday));
    }

    #[test]
    fn args_must_carry_a_configuration_id() {
        assert_eq!(configuration_id_from_args(&json!([42])), Some(42));
        assert_eq!(configuration_id_from_args(&json!([])), None);
        assert_eq!(configuration_id_from_args(&json!("42")), None);
    }
}
