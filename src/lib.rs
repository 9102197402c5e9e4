//! # InkBot
//!
//! Turns a raster image into pen strokes and streams them to a drawing robot
//! over TCP.
//!
//! ## Architecture
//!
//! InkBot is organized as a workspace with multiple crates:
//!
//! 1. **inkbot-core** - Shared types, errors, cancellation
//! 2. **inkbot-camtools** - Rasterizer, scanline vectorizer, motion script writer
//! 3. **inkbot-gcode** - Motion script decoding, deduplication, coordinate files
//! 4. **inkbot-communication** - TCP transport and acknowledgment protocol
//! 5. **inkbot-settings** - Configuration files
//! 6. **inkbot** - Pipeline, background jobs and the command line binary

pub mod error;
pub mod job;
pub mod pipeline;

pub use error::{PipelineError, PipelineResult};
pub use job::{spawn_job, JobHandle};
pub use pipeline::{
    parse_scale, Pipeline, PipelineEvent, PipelineOutcome, PipelineRequest, PipelineStage,
    PreparedJob,
};

pub use inkbot_communication::{probe_device, ProbeReport, TransferEvent};
pub use inkbot_core::{CancelToken, CoordinateRecord, MotionSegment, PenHeights};
pub use inkbot_gcode::CoordinateTable;
pub use inkbot_settings::{default_config_path, Config};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so stdout stays free for results
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
