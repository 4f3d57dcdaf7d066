use callring_lib::{
    deliver, global_channel, init_logger, AudioLooper, DeliveryTiming, MarkerFileSignal, Payload,
    ServiceConfig, SoundCache, Vibration,
};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "callring", about = "Long ringtones and repeating vibration for call notifications")]
struct Cli {
    /// Config file (default: <data_dir>/callring/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print debug logs to stdout
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Loop a WAV clip out to a fixed duration
    Extend {
        source: PathBuf,
        dest: PathBuf,
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,
    },
    /// Deliver a notification payload (JSON file) and vibrate until stopped or expired
    Deliver {
        payload: PathBuf,
        #[arg(long, default_value_t = 30)]
        deadline_secs: u64,
    },
    /// Ask every live session to stop vibrating
    Stop,
    /// Delete generated long-form ringtones
    Purge,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _log_path = init_logger(cli.verbose).ok();

    let config = match ServiceConfig::resolve(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: ServiceConfig) -> callring_lib::Result<()> {
    match command {
        Command::Extend { source, dest, seconds } => {
            let out = AudioLooper::new(seconds).extend(&source, &dest)?;
            println!("{}", out.display());
        }
        Command::Deliver { payload, deadline_secs } => {
            let json = std::fs::read_to_string(&payload)?;
            let payload: Payload = serde_json::from_str(&json)?;
            let timing = DeliveryTiming {
                deadline: Duration::from_secs(deadline_secs),
                ..DeliveryTiming::default()
            };
            let delivery = deliver(payload, &config, global_channel(), Arc::new(Vibration::new()), timing, |content| {
                match serde_json::to_string_pretty(content) {
                    Ok(json) => println!("{}", json),
                    Err(e) => warn!("[callring] could not render payload: {}", e),
                }
            })
            .await;
            info!("[callring] delivery finished: {:?}", delivery.outcome);
        }
        Command::Stop => {
            let token = MarkerFileSignal::new(&config.shared_dir, &config.stop_channel).post()?;
            info!("[callring] posted stop {} on {}", token, config.stop_channel);
        }
        Command::Purge => {
            let removed = SoundCache::new(&config).purge()?;
            println!("removed {} generated ringtones", removed);
        }
    }
    Ok(())
}
