//! chanstats - channel activity tracker for IRC.
//!
//! Reads IRC protocol lines on stdin and writes replies to stdout.

use chanstats::config::{Config, validation};
use chanstats::db::Database;
use chanstats::shell::{IrcHost, Shell};
use chanstats::tracker::Tracker;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries protocol lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "configuration has {} error(s), see above",
            errors.len()
        ));
    }

    let db_path = config.db_path();
    let db = Arc::new(Database::new(&db_path).await?);

    let tracker = Tracker::from_config(&config, db.clone());
    let eligible = tracker.gate().eligible_channels().await?;
    let enabled = tracker.gate().enabled_channels().await?;
    info!(
        nick = %config.bot.nick,
        db = %db_path,
        eligible = eligible.len(),
        enabled = enabled.len(),
        allow_admin_add = config.channelstats.allow_admin_add,
        "Starting chanstats"
    );

    let host = Arc::new(IrcHost::from_config(&config));
    let shell = Shell::new(tracker, host);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = shell.run(stdin, stdout) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    db.pool().close().await;
    info!("chanstats shutting down");
    Ok(())
}
