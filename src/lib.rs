mod commands;
pub mod config;
pub mod pipeline;

use anyhow::Result;
use clap::Parser;

pub use commands::parse_enemy;
pub use config::{AppConfig, EndpointConfig};
pub use pipeline::{AppContext, VisionServices};

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "draft_advisor_lib=debug,lol_vision=debug,lol_capture=debug,lol_model=info,lol_advisor=debug"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = commands::Cli::parse();
    let config = AppConfig::from_env()?;
    commands::dispatch(cli, config)
}
