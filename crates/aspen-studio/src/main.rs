mod cli;
mod scene;
mod studio;

use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;

use aspen_engine::device::GpuInit;
use aspen_engine::logging::{init_logging, LoggingConfig};
use aspen_engine::window::{Runtime, RuntimeConfig};

use crate::cli::Args;
use crate::studio::Studio;

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log_level.clone(),
        ..LoggingConfig::default()
    });

    let studio = Studio::new(args.variant, args.objects)?;
    log::info!(
        "aspen studio: {} variant, {} objects (keys 1-3 switch, Esc quits)",
        studio.variant(),
        args.objects
    );

    Runtime::run(
        RuntimeConfig {
            title: "aspen studio".to_string(),
            initial_size: LogicalSize::new(1024.0, 768.0),
        },
        GpuInit::default(),
        studio,
    )
}
