// Fleet carrier cargo tracker - Main Entry Point
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use carrier_tracker::{
    AuthMode, CarrierPoller, CompanionClient, ConsoleReport, MaterialRequirements, TokenManager,
    TrackerConfig, DEFAULT_CONFIG_FILE, verbosity,
};

#[derive(Parser)]
#[command(name = "carrier_tracker")]
#[command(about = "Track fleet carrier cargo against a list of required materials")]
struct Cli {
    /// Configuration file (created with defaults if missing)
    #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Increase verbosity (-v basic, -vv full)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Ignore saved tokens and run the authorization flow
    #[arg(long)]
    reauth: bool,

    /// Poll once, print the report and exit
    #[arg(long)]
    once: bool,

    /// Seconds between polls
    #[arg(long)]
    interval: Option<u64>,

    /// Requirements file
    #[arg(long)]
    materials: Option<String>,

    /// Token store file
    #[arg(long)]
    token_file: Option<String>,

    /// How to capture the authorization code
    #[arg(long, value_enum)]
    mode: Option<AuthMode>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut TrackerConfig) {
        if let Some(interval) = self.interval {
            config.timing.poll_interval_seconds = interval;
        }
        if let Some(materials) = &self.materials {
            config.files.materials_file = materials.clone();
        }
        if let Some(token_file) = &self.token_file {
            config.files.token_file = token_file.clone();
        }
        if let Some(mode) = self.mode {
            config.oauth.mode = mode;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    verbosity::init_logging(cli.verbose);

    let mut config = TrackerConfig::load_or_create(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    config.print_summary();

    // Load requirements before authorizing
    let requirements = MaterialRequirements::load(
        &config.files.materials_file,
        config.files.delimiter_char(),
        &config.files.material_column,
        &config.files.quantity_column,
    )?;
    info!("📄 Tracking {} materials from {}", requirements.len(), config.files.materials_file);
    if requirements.is_empty() {
        warn!("⚠️ {} lists no materials", config.files.materials_file);
    }

    let token_manager = TokenManager::new(&config.oauth, &config.files.token_file)?;
    let credentials = match token_manager.obtain_credentials(cli.reauth).await {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("❌ Authorization failed: {}", e);
            return Err(e.into());
        }
    };

    let client = CompanionClient::new(&config.api)?;
    let mut poller = CarrierPoller::new(client, token_manager, ConsoleReport, requirements, credentials)
        .with_policy(config.matching.policy)
        .with_intervals(config.timing.poll_interval(), config.timing.error_retry_delay());

    if cli.once {
        return match poller.run_cycle().await {
            Ok(true) => Ok(()),
            Ok(false) => Err("poll failed".into()),
            Err(e) => {
                eprintln!("❌ Token refresh failed, please re-authorize (--reauth): {}", e);
                Err(e.into())
            }
        };
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n🛑 Shutdown requested, finishing current cycle...");
            let _ = shutdown_tx.send(true);
        }
    });

    println!("🛰️ Tracking fleet carrier cargo - Press Ctrl+C to stop");
    match poller.run(shutdown_rx).await {
        Ok(()) => {
            println!("👋 Tracker stopped");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Token refresh failed, please re-authorize (--reauth): {}", e);
            Err(e.into())
        }
    }
}
