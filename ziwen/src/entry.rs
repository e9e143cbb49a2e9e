use std::sync::Arc;

use crate::{
    config::Config, database::Database, platform::SpoolPlatform, polling::polling_spinloop,
    streamer::streamer_spinloop,
};

async fn setup() -> (Arc<SpoolPlatform>, Arc<Database>, Arc<Config>) {
    let config = Arc::new(Config::load().expect("Failed to load the config!"));
    let database = Database::new(&config)
        .await
        .expect("Failed to open the database!");
    let platform = SpoolPlatform::new(&config.spool_dir, &config.username)
        .await
        .expect("Failed to open the spool directory!");
    (Arc::new(platform), database, config)
}

/// Run the main bot.
///
/// # Panics
///
/// Panics if the config, the database or the spool directory can't be opened.
pub async fn entry() {
    let (platform, database, config) = setup().await;
    log::info!(
        "Watching r/{} as u/{} every {}s.",
        config.subreddit,
        config.username,
        config.poll_interval_secs
    );

    tokio::select! {
        () = polling_spinloop(platform, Arc::downgrade(&database), config) => (),
        _ = tokio::signal::ctrl_c() => log::info!("Interrupted."),
    }
    log::info!("Stopped.");
}

/// Run the streamer.
///
/// # Panics
///
/// Panics if the config, the database or the spool directory can't be opened.
pub async fn streamer_entry() {
    let (platform, database, config) = setup().await;
    log::info!(
        "Streaming for r/{} every {}s.",
        config.subreddit,
        config.streamer.poll_interval_secs
    );

    tokio::select! {
        () = streamer_spinloop(platform, Arc::downgrade(&database), config) => (),
        _ = tokio::signal::ctrl_c() => log::info!("Interrupted."),
    }
    log::info!("Stopped.");
}
