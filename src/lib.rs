pub mod alert;
pub mod audio;
pub mod config;
pub mod delivery;
pub mod error;
pub mod paths;
pub mod session;
pub mod signal;
pub mod sound;

pub use alert::{AlertAction, CancelFlag, CancellableRepeater, Vibration};
pub use audio::{AudioAsset, AudioLooper};
pub use config::ServiceConfig;
pub use delivery::{deliver, Delivery, DeliveryOutcome, DeliveryTiming};
pub use error::{RingError, Result};
pub use session::{NotificationSession, Payload};
pub use signal::{global_channel, MarkerFileSignal, StopChannel, StopSignalBridge};
pub use sound::{SoundCache, SoundName};

/// Full debug log to `<data_dir>/logs/callring.log`; stdout only carries this
/// crate's records, at debug when `verbose`, else info. Returns the log file path.
pub fn init_logger(verbose: bool) -> std::result::Result<std::path::PathBuf, fern::InitError> {
    let log_file = paths::log_file_path().unwrap_or_else(|_| std::path::PathBuf::from("callring.log"));

    let format = |out: fern::FormatCallback<'_>, message: &std::fmt::Arguments<'_>, record: &log::Record| {
        out.finish(format_args!(
            "[{}][{}][{}][{:?}] {}",
            chrono::Local::now().format("%Y-%m-%d"),
            chrono::Local::now().format("%H:%M:%S"),
            record.target(),
            record.level(),
            message
        ))
    };

    fern::Dispatch::new()
        .format(format)
        .level(log::LevelFilter::Debug)
        .chain(
            fern::Dispatch::new()
                .level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
                .filter(|m| is_own_target(m.target()))
                .chain(std::io::stdout()),
        )
        .chain(fern::log_file(&log_file)?)
        .apply()?;

    Ok(log_file)
}

/// Records from this crate: the library and the `callring` binary.
fn is_own_target(target: &str) -> bool {
    target.starts_with("callring")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_keeps_only_own_targets() {
        assert!(is_own_target("callring_lib::sound::cache"));
        assert!(is_own_target("callring"));
        assert!(!is_own_target("hound"));
        assert!(!is_own_target("tokio::runtime"));
    }
}
