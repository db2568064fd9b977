//! # FT300 Stream
//!
//! Print calibrated force/torque samples from a Robotiq FT300 sensor.
//!
//! Opens the configured serial port, switches the sensor into streaming
//! mode, zeroes it, then prints samples until Ctrl+C. Recoverable read
//! errors (checksum mismatch, timeout) are logged and retried; anything
//! else terminates the run. The stop sentinel is written on every exit
//! path so the sensor does not keep streaming at a dead port.

use anyhow::Result;
use tracing::{debug, info, warn};

use ft300_stream::config::Config;
use ft300_stream::error::Ft300Error;
use ft300_stream::session::SensorSession;

/// Number of samples between status log messages
const LOG_INTERVAL_SAMPLES: u64 = 100;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("FT300 Stream v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut session = SensorSession::open(&config).await?;
    info!("Connection established on {}", config.serial.port);
    info!("Press Ctrl+C to exit");

    let started = std::time::Instant::now();
    let mut sample_count: u64 = 0;

    let run_result = loop {
        tokio::select! {
            result = session.read_sample() => {
                match result {
                    Ok(sample) => {
                        sample_count += 1;
                        debug!("FT vals: {:?}", sample);

                        if sample_count % LOG_INTERVAL_SAMPLES == 0 {
                            let rate = sample_count as f64 / started.elapsed().as_secs_f64();
                            info!("Sample rate: {:.0} Hz, FT vals: {:?}", rate, sample);
                        }
                    }
                    Err(err @ Ft300Error::ChecksumMismatch { .. }) => {
                        warn!("{}", err);
                    }
                    Err(Ft300Error::TransportTimeout) => {
                        warn!("Read timed out, retrying");
                    }
                    Err(err) => break Err(err),
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break Ok(());
            }
        }
    };

    session.close().await?;
    info!("Total samples received: {}", sample_count);

    run_result.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_interval_constant() {
        // At the sensor's ~100Hz stream this logs about once a second
        assert_eq!(LOG_INTERVAL_SAMPLES, 100);
    }
}
