use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use winit::event_loop::EventLoop;

use markweave::cli::CliArgs;
use markweave::config::AppConfig;
use markweave::runtime::App;
use markweave::services::{UnconfiguredGenerationService, UnconfiguredRewriteService};

fn main() -> Result<()> {
    markweave::tracing::init();

    let startup = CliArgs::parse()
        .into_config()
        .map_err(|e| anyhow::anyhow!(e))?;
    let config = AppConfig::load();

    let event_loop = EventLoop::new()?;
    let mut app = App::new(
        config,
        startup,
        Arc::new(UnconfiguredGenerationService),
        Arc::new(UnconfiguredRewriteService),
    );
    event_loop.run_app(&mut app)?;

    Ok(())
}
