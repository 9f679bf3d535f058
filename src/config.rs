use std::env;

/// Runtime configuration for the backup service, loaded from environment
/// variables (a `.env` file is honored by the server binary).
#[derive(Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub email_api_url: String,
    pub email_api_token: String,
    pub email_from_address: String,
    pub email_from_name: String,
    pub telegram_bot_token: String,
    /// How often the retention sweeper wakes up, in seconds.
    pub retention_sweep_interval_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let email_api_url =
            env::var("EMAIL_API_URL").map_err(|_| "EMAIL_API_URL must be set".to_string())?;

        let email_api_token =
            env::var("EMAIL_API_TOKEN").map_err(|_| "EMAIL_API_TOKEN must be set".to_string())?;

        let email_from_address = env::var("EMAIL_FROM_ADDRESS")
            .map_err(|_| "EMAIL_FROM_ADDRESS must be set".to_string())?;

        let email_from_name =
            env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| email_from_address.clone());

        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| "TELEGRAM_BOT_TOKEN must be set".to_string())?;

        let retention_sweep_interval_secs = env::var("RETENTION_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        Ok(ServerConfig {
            database_url,
            email_api_url,
            email_api_token,
            email_from_address,
            email_from_name,
            telegram_bot_token,
            retention_sweep_interval_secs,
        })
    }
}
