//! Track one order until it is done, canceled or the deadline passes
//!
//! ```text
//! ORDER_TRACKER_ACCESS_TOKEN=... track_order <order_id> [--poll-first] [--deadline <secs>]
//! ```
//!
//! Exits with an error when the order is canceled, polling expires or the
//! status request fails. Ctrl+C stops tracking.

use anyhow::{bail, Context, Result};
use order_status_tracker::bin_common::{
    load_config_from_env, parse_args, ConfigType, TrackArgs, ACCESS_TOKEN_ENV,
};
use ordertrack::{init_tracing, ShutdownManager, TrackingConfig, TrackingContext};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = TrackArgs::parse(&parse_args())?;

    let config_path = load_config_from_env(ConfigType::Tracker);
    let config = TrackingConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    init_tracing(&config.log_level);
    config.log();

    let access_token = std::env::var(ACCESS_TOKEN_ENV)
        .with_context(|| format!("{} is not set", ACCESS_TOKEN_ENV))?;

    let context = TrackingContext::from_config(&config)?;
    let deadline_secs = args
        .deadline_secs
        .unwrap_or(config.polling.default_deadline_secs);

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    info!("");
    info!("========================================");
    info!("Tracking order {}", args.order_id);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");

    let tracking = context.track_until_terminal(
        args.order_id,
        access_token,
        !args.poll_first,
        deadline_secs,
    );

    tokio::select! {
        result = tracking => match result {
            Ok(order_id) => {
                info!("Order {} is done", order_id);
                Ok(())
            }
            Err(e) => bail!("Order {} did not complete: {}", args.order_id, e),
        },
        _ = shutdown.wait() => {
            // Dropping the tracking future destroys the tracker
            warn!("Tracking of order {} interrupted", args.order_id);
            Ok(())
        }
    }
}
