use anyhow::Context;
use clap::Parser;
use inkbot::{
    init_logging, parse_scale, probe_device, CancelToken, Config, Pipeline, PipelineEvent,
    PipelineRequest, PipelineStage, TransferEvent,
};
use std::path::PathBuf;
use std::time::Duration;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Draw an image with the pen robot
#[derive(Parser, Debug)]
#[command(name = "inkbot", version = LONG_VERSION, about)]
struct Args {
    /// Image to draw
    #[arg(required_unless_present = "probe")]
    image: Option<PathBuf>,

    /// Millimetres per grid cell (default from configuration)
    #[arg(long)]
    scale: Option<String>,

    /// Configuration file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Device host
    #[arg(long)]
    host: Option<String>,

    /// Device port
    #[arg(long)]
    port: Option<u16>,

    /// Acknowledgment timeout in milliseconds
    #[arg(long)]
    ack_timeout_ms: Option<u64>,

    /// Wait for acknowledgments without a time limit
    #[arg(long, conflicts_with = "ack_timeout_ms")]
    no_ack_timeout: bool,

    /// Write the motion script and coordinate files here
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Stop before contacting the device
    #[arg(long)]
    prepare_only: bool,

    /// Only check that the device accepts connections
    #[arg(long)]
    probe: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(host) = &args.host {
        config.device.host = host.clone();
    }
    if let Some(port) = args.port {
        config.device.port = port;
    }
    if args.ack_timeout_ms.is_some() {
        config.device.ack_timeout_ms = args.ack_timeout_ms;
    }
    if args.no_ack_timeout {
        config.device.ack_timeout_ms = None;
    }

    if args.probe {
        let timeout = config
            .device
            .connect_timeout()
            .unwrap_or(Duration::from_secs(5));
        let report = probe_device(&config.device.host, config.device.port, timeout)
            .with_context(|| format!("{}:{} is not reachable", config.device.host, config.device.port))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{} is connected ({:?})", report.address, report.latency);
        }
        return Ok(());
    }

    let image = args.image.context("An image path is required")?;
    let mut request = PipelineRequest::new(image);
    if let Some(text) = &args.scale {
        request.scale = Some(parse_scale(text)?);
    }
    if let Some(dir) = args.export_dir {
        request = request.with_export_dir(dir);
    }

    let pipeline = Pipeline::new(config)?;
    let result = if args.prepare_only {
        pipeline.dry_run(&request)
    } else {
        pipeline.run(&request, &CancelToken::new(), report_progress)
    };

    match result {
        Ok(outcome) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.status);
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                let body = serde_json::json!({ "error": e.kind(), "message": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Err(e.into())
        }
    }
}

fn report_progress(event: PipelineEvent) {
    match event {
        PipelineEvent::Stage(PipelineStage::Transferring) => {
            tracing::info!("Sending data...");
        }
        PipelineEvent::Stage(stage) => tracing::debug!("Stage: {:?}", stage),
        PipelineEvent::Transfer(TransferEvent::Checkpoint {
            records_sent,
            elapsed,
        }) => {
            tracing::info!("{} records sent in {:.1}s", records_sent, elapsed.as_secs_f64());
        }
        _ => {}
    }
}
