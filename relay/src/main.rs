//! web-push-relay CLI - serves the relay and offers operator utilities.
//!
//! This is the main binary entry point. See the `web_push_relay` library
//! for the core functionality.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use web_push_relay::delivery::{self, RelayError, SendPushRequest};
use web_push_relay::{server, Config, PushSubscription, VapidKeys, WebPushSender};

/// Global allocator configured per M-MIMALLOC-APPS guideline.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Exit code for a subscription the push service reported gone.
const EXIT_GONE: u8 = 2;

// CLI
#[derive(Parser)]
#[command(name = "web-push-relay")]
#[command(version)]
#[command(about = "Relay Web Push notifications signed with VAPID credentials")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve POST /send-push
    Serve {
        /// Bind address (overrides config file and PUSH_RELAY_LISTEN)
        #[arg(long)]
        listen: Option<std::net::SocketAddr>,
        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a fresh VAPID keypair as environment assignments
    GenerateVapidKeys,
    /// Deliver a single notification without starting the server
    Send {
        /// Path to a subscription JSON file (as produced by PushSubscription.toJSON())
        #[arg(long)]
        subscription: PathBuf,
        /// Notification payload as inline JSON
        #[arg(long)]
        payload: Option<String>,
        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { listen, config } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            log::info!("web-push-relay v{} starting", env!("CARGO_PKG_VERSION"));
            server::serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::GenerateVapidKeys => {
            let keys = VapidKeys::generate();
            println!("VAPID_PUBLIC_KEY={}", keys.public_key_base64url());
            println!("VAPID_PRIVATE_KEY={}", keys.private_key_base64url());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Send {
            subscription,
            payload,
            config,
        } => send_once(&subscription, payload.as_deref(), config.as_deref()).await,
    }
}

/// One-shot delivery through the same validation path as the HTTP handler.
async fn send_once(
    subscription_path: &Path,
    payload: Option<&str>,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let credentials = config
        .vapid
        .credentials()
        .context("Missing VAPID keys: set VAPID_PUBLIC_KEY and VAPID_PRIVATE_KEY")?;

    let content = std::fs::read_to_string(subscription_path)
        .with_context(|| format!("Failed to read {}", subscription_path.display()))?;
    let subscription: PushSubscription =
        serde_json::from_str(&content).context("Subscription file is not valid JSON")?;
    let payload = payload
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--payload is not valid JSON")?;

    let sender = WebPushSender::from_config(&config)?;
    let request = SendPushRequest {
        subscription: Some(subscription),
        payload,
    };

    match delivery::deliver(&sender, &credentials, request).await {
        Ok(()) => {
            println!("Notification sent successfully.");
            Ok(ExitCode::SUCCESS)
        }
        Err(RelayError::SubscriptionGone) => {
            eprintln!("{}", RelayError::SubscriptionGone);
            Ok(ExitCode::from(EXIT_GONE))
        }
        Err(err) => match err.details() {
            Some(details) => Err(anyhow::anyhow!("{err} {details}")),
            None => Err(err.into()),
        },
    }
}
