use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleParseError {
    #[error("empty schedule spec")]
    Empty,
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("invalid schedule spec '{0}', expected five cron fields or HH:MM")]
    InvalidSpec(String),
}

/// The five fields of a cron expression, kept as strings the way the
/// trigger store records them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronFields {
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
}

/// A user-entered schedule: either a five-field cron expression
/// (`0 3 * * *`) or a fixed daily time (`03:00`). Parsed at entry-save time,
/// not at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSpec {
    Cron(CronFields),
    FixedDaily { hour: u8, minute: u8 },
}

impl ScheduleSpec {
    pub fn parse(input: &str) -> Result<Self, ScheduleParseError> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.as_slice() {
            [] => Err(ScheduleParseError::Empty),
            [single] if single.contains(':') => {
                let (hour, minute) = single
                    .split_once(':')
                    .ok_or_else(|| ScheduleParseError::InvalidTime(input.to_string()))?;
                let hour: u8 = hour
                    .parse()
                    .map_err(|_| ScheduleParseError::InvalidTime(input.to_string()))?;
                let minute: u8 = minute
                    .parse()
                    .map_err(|_| ScheduleParseError::InvalidTime(input.to_string()))?;
                if hour > 23 || minute > 59 {
                    return Err(ScheduleParseError::InvalidTime(input.to_string()));
                }
                Ok(ScheduleSpec::FixedDaily { hour, minute })
            }
            [minute, hour, day_of_month, month, day_of_week] => Ok(ScheduleSpec::Cron(CronFields {
                minute: minute.to_string(),
                hour: hour.to_string(),
                day_of_month: day_of_month.to_string(),
                month: month.to_string(),
                day_of_week: day_of_week.to_string(),
            })),
            _ => Err(ScheduleParseError::InvalidSpec(input.to_string())),
        }
    }

    /// The trigger-store shape: fixed daily times become a cron row with
    /// wildcard date fields.
    pub fn to_cron_fields(&self) -> CronFields {
        match self {
            ScheduleSpec::Cron(fields) => fields.clone(),
            ScheduleSpec::FixedDaily { hour, minute } => CronFields {
                minute: minute.to_string(),
                hour: hour.to_string(),
                day_of_month: "*".to_string(),
                month: "*".to_string(),
                day_of_week: "*".to_string(),
            },
        }
    }

    /// Canonical text form, used in deterministic trigger names.
    pub fn canonical(&self) -> String {
        match self {
            ScheduleSpec::Cron(f) => format!(
                "{} {} {} {} {}",
                f.minute, f.hour, f.day_of_month, f.month, f.day_of_week
            ),
            ScheduleSpec::FixedDaily { hour, minute } => format!("{hour:02}:{minute:02}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_daily_time() {
        assert_eq!(
            ScheduleSpec::parse("03:00").unwrap(),
            ScheduleSpec::FixedDaily { hour: 3, minute: 0 }
        );
        assert_eq!(
            ScheduleSpec::parse("  23:59 ").unwrap(),
            ScheduleSpec::FixedDaily {
                hour: 23,
                minute: 59
            }
        );
    }

    #[test]
    fn parses_five_field_cron() {
        let spec = ScheduleSpec::parse("0 3 * * 1").unwrap();
        assert_eq!(
            spec,
            ScheduleSpec::Cron(CronFields {
                minute: "0".into(),
                hour: "3".into(),
                day_of_month: "*".into(),
                month: "*".into(),
                day_of_week: "1".into(),
            })
        );
        assert_eq!(spec.canonical(), "0 3 * * 1");
    }

    #[test]
    fn rejects_malformed_specs() {
        assert!(matches!(
            ScheduleSpec::parse(""),
            Err(ScheduleParseError::Empty)
        ));
        assert!(matches!(
            ScheduleSpec::parse("25:00"),
            Err(ScheduleParseError::InvalidTime(_))
        ));
        assert!(matches!(
            ScheduleSpec::parse("03:61"),
            Err(ScheduleParseError::InvalidTime(_))
        ));
        assert!(matches!(
            ScheduleSpec::parse("0 3 * *"),
            Err(ScheduleParseError::InvalidSpec(_))
        ));
        assert!(matches!(
            ScheduleSpec::parse("daily"),
            Err(ScheduleParseError::InvalidSpec(_))
        ));
    }

    #[test]
    fn fixed_daily_becomes_wildcard_cron() {
        let spec = ScheduleSpec::parse("03:30").unwrap();
        assert_eq!(
            spec.to_cron_fields(),
            CronFields {
                minute: "30".into(),
                hour: "3".into(),
                day_of_month: "*".into(),
                month: "*".into(),
                day_of_week: "*".into(),
            }
        );
        assert_eq!(spec.canonical(), "03:30");
    }
}
