//! helpdesk-server - serves the helpdesk RPC endpoint

use anyhow::Result;
use clap::Parser;
use helpdesk_service::{Config, HelpdeskModule};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "helpdesk-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `bind_addr`
    #[arg(short, long)]
    bind: Option<String>,

    /// Emit JSON log lines, overrides `log_json`
    #[arg(long)]
    log_json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.log_json |= args.log_json;

    if args.print_config {
        let mut shown = config.clone();
        if !shown.jwt_secret.is_empty() {
            shown.jwt_secret = "***".to_string();
        }
        println!("{:#?}", shown);
        return Ok(());
    }

    init_tracing(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting helpdesk-server");

    let module = Arc::new(HelpdeskModule::init(config).await?);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown requested");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    module.serve(cancel).await
}
