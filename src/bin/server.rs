use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use backup_keeper::backup::orchestrator::Orchestrator;
use backup_keeper::backup::retention;
use backup_keeper::config::ServerConfig;
use backup_keeper::db;
use backup_keeper::notifications::service::NotificationService;
use backup_keeper::scheduler::{beat, synchronizer};

#[derive(Parser)]
#[command(name = "backupd", about = "Scheduled backup service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the beat loop and retention sweeper until interrupted.
    Serve,
    /// Run a backup for one configuration and print the outcome.
    Run { configuration_id: i32 },
    /// Log what a run would do, without side effects.
    DryRun { configuration_id: i32 },
    /// Send a test message through the configuration's notification rules.
    TestNotifications { configuration_id: i32 },
    /// Rebuild the periodic-trigger store from the active schedule entries.
    ReconcileSchedules,
    /// Remove expired backup output directories once.
    Sweep,
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "backupd.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;
    let db = db::connect(&config.database_url).await?;

    let notifier = Arc::new(NotificationService::new(db.clone(), &config));
    let orchestrator = Arc::new(Orchestrator::new(db.clone(), notifier.clone()));

    match cli.command {
        Command::Serve => {
            let report = synchronizer::reconcile_all(&db).await?;
            info!(
                synced = report.synced,
                skipped = report.skipped,
                "startup schedule reconciliation done"
            );

            tokio::spawn(retention::start_retention_sweeper(
                db.clone(),
                config.retention_sweep_interval_secs,
            ));
            tokio::spawn(beat::start_beat(db.clone(), orchestrator.clone()));

            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received.");
        }
        Command::Run { configuration_id } => {
            println!("{}", orchestrator.run_backup(configuration_id).await);
        }
        Command::DryRun { configuration_id } => {
            println!("{}", orchestrator.run_backup_dry(configuration_id).await);
        }
        Command::TestNotifications { configuration_id } => {
            for line in notifier.send_test_notifications(configuration_id).await {
                println!("{line}");
            }
        }
        Command::ReconcileSchedules => {
            let report = synchronizer::reconcile_all(&db).await?;
            println!(
                "Synced {} schedule entries, skipped {}.",
                report.synced, report.skipped
            );
        }
        Command::Sweep => {
            retention::sweep_all(&db).await;
        }
    }

    Ok(())
}
