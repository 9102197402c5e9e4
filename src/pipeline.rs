//! Image-to-robot pipeline
//!
//! Stages: rasterize, vectorize, write the motion script, decode it into
//! coordinate records, deduplicate, optionally export artifacts, transfer.
//! The motion script stays in memory; its text is only rendered for export.

use crate::error::{PipelineError, PipelineResult};
use inkbot_camtools::{
    MotionScript, MotionScriptWriter, RasterParameters, Rasterizer, ScanlineParameters,
    ScanlineVectorizer,
};
use inkbot_communication::{RobotTransport, SentinelRemap, TransferEvent, TransportConfig};
use inkbot_core::{CancelToken, MotionSegment};
use inkbot_gcode::{round_coordinate, CommandParser, CoordinateDeduplicator, CoordinateTable};
use inkbot_settings::Config;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Parse a user-entered scale; it must be a finite number above zero
pub fn parse_scale(text: &str) -> PipelineResult<f64> {
    let invalid = || PipelineError::InvalidScaleValue(text.to_string());
    let value: f64 = text.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

/// Input of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    pub image: PathBuf,
    /// Overrides the configured scale
    pub scale: Option<f64>,
    /// Overrides the configured export directory
    pub export_dir: Option<PathBuf>,
}

impl PipelineRequest {
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            scale: None,
            export_dir: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }
}

/// Pipeline stage, reported as progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Rasterizing,
    Vectorizing,
    WritingScript,
    Decoding,
    Deduplicating,
    Exporting,
    Transferring,
}

/// Progress notification from a running pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Stage(PipelineStage),
    /// Vectorization progress in `0.0..=1.0`
    Vectorizing(f32),
    Transfer(TransferEvent),
}

/// Everything produced before transmission
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub segments: Vec<MotionSegment>,
    pub script: MotionScript,
    pub raw: CoordinateTable,
    pub deduplicated: CoordinateTable,
    /// Files written during export
    pub exported: Vec<PathBuf>,
}

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub segments: usize,
    pub raw_records: usize,
    pub records: usize,
    /// Records acknowledged by the device; zero when nothing was sent
    pub records_sent: usize,
    pub peer: Option<String>,
    pub elapsed_ms: u64,
    pub exported: Vec<PathBuf>,
    pub status: String,
}

/// Shared entry point for the CLI and background jobs
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline, validating the configuration
    pub fn new(config: Config) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Transport settings derived from the device section; the remap
    /// source is the pen-up height as decoded records carry it
    pub fn transport_config(&self) -> TransportConfig {
        let device = &self.config.device;
        let pen_up = round_coordinate(self.config.drawing.pen_up);
        TransportConfig {
            host: device.host.clone(),
            port: device.port,
            connect_timeout: device.connect_timeout(),
            write_timeout: device.write_timeout(),
            ack_timeout: device.ack_timeout(),
            checkpoint_interval: device.checkpoint_interval,
            remap: SentinelRemap::new(pen_up, device.remap_to),
            ..TransportConfig::default()
        }
    }

    /// Run every stage up to (not including) transmission
    pub fn prepare(&self, request: &PipelineRequest) -> PipelineResult<PreparedJob> {
        self.prepare_with_progress(request, &mut |_| {})
    }

    /// [`Pipeline::prepare`] with progress notifications
    pub fn prepare_with_progress<F>(
        &self,
        request: &PipelineRequest,
        observer: &mut F,
    ) -> PipelineResult<PreparedJob>
    where
        F: FnMut(PipelineEvent),
    {
        let drawing = &self.config.drawing;
        let scale = request.scale.unwrap_or(drawing.scale);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PipelineError::InvalidScaleValue(scale.to_string()));
        }

        observer(PipelineEvent::Stage(PipelineStage::Rasterizing));
        let rasterizer = Rasterizer::new(RasterParameters {
            resolution: drawing.resolution,
            threshold: drawing.threshold,
            ..RasterParameters::default()
        })?;
        let mask = rasterizer.rasterize_file(&request.image)?;
        debug!("Mask has {} ink cells", mask.ink_count());

        observer(PipelineEvent::Stage(PipelineStage::Vectorizing));
        let pen = drawing.pen_heights();
        let vectorizer = ScanlineVectorizer::new(ScanlineParameters {
            scale,
            pen,
            row_step: drawing.row_step,
        })?;
        let segments =
            vectorizer.vectorize_with_progress(&mask, |p| observer(PipelineEvent::Vectorizing(p)));

        observer(PipelineEvent::Stage(PipelineStage::WritingScript));
        let script = MotionScriptWriter::new(pen).write(&segments);

        observer(PipelineEvent::Stage(PipelineStage::Decoding));
        let raw = CommandParser::new().resolve_commands(script.commands());

        observer(PipelineEvent::Stage(PipelineStage::Deduplicating));
        let deduplicated = CoordinateDeduplicator::dedup(&raw);
        info!(
            "Prepared {}: {} segments, {} records ({} after deduplication)",
            request.image.display(),
            segments.len(),
            raw.len(),
            deduplicated.len()
        );

        let mut job = PreparedJob {
            segments,
            script,
            raw,
            deduplicated,
            exported: Vec::new(),
        };

        let export_dir = request
            .export_dir
            .as_deref()
            .or(self.config.output.export_dir.as_deref());
        if let Some(dir) = export_dir {
            observer(PipelineEvent::Stage(PipelineStage::Exporting));
            job.exported = self.export(&job, dir)?;
        }

        Ok(job)
    }

    /// Write the script, the raw and the deduplicated coordinate files
    pub fn export(&self, job: &PreparedJob, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let output = &self.config.output;

        let script_path = dir.join(&output.script_file);
        job.script.save(&script_path)?;
        let raw_path = dir.join(&output.coordinates_file);
        job.raw.save(&raw_path)?;
        let dedup_path = dir.join(&output.deduplicated_file);
        job.deduplicated.save(&dedup_path)?;

        Ok(vec![script_path, raw_path, dedup_path])
    }

    /// Prepare and transfer to the configured device
    pub fn run<F>(
        &self,
        request: &PipelineRequest,
        cancel: &CancelToken,
        mut observer: F,
    ) -> PipelineResult<PipelineOutcome>
    where
        F: FnMut(PipelineEvent),
    {
        let started = Instant::now();
        let job = self.prepare_with_progress(request, &mut observer)?;
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        observer(PipelineEvent::Stage(PipelineStage::Transferring));
        let mut transport = RobotTransport::new(self.transport_config());
        let report = transport.transfer(&job.deduplicated.records, cancel, |event| {
            observer(PipelineEvent::Transfer(event))
        })?;

        Ok(PipelineOutcome {
            segments: job.segments.len(),
            raw_records: job.raw.len(),
            records: job.deduplicated.len(),
            records_sent: report.records_sent,
            peer: Some(report.peer),
            elapsed_ms: started.elapsed().as_millis() as u64,
            exported: job.exported,
            status: format!(
                "Data sent successfully! ({} records)",
                report.records_sent
            ),
        })
    }

    /// Prepare only, summarised as an outcome
    pub fn dry_run(&self, request: &PipelineRequest) -> PipelineResult<PipelineOutcome> {
        let started = Instant::now();
        let job = self.prepare(request)?;
        Ok(PipelineOutcome {
            segments: job.segments.len(),
            raw_records: job.raw.len(),
            records: job.deduplicated.len(),
            records_sent: 0,
            peer: None,
            elapsed_ms: started.elapsed().as_millis() as u64,
            status: format!("Total Lines: {}", job.deduplicated.len()),
            exported: job.exported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scale() {
        assert_eq!(parse_scale("0.3").unwrap(), 0.3);
        assert_eq!(parse_scale(" 2 ").unwrap(), 2.0);
        for bad in ["", "abc", "0", "-1", "NaN", "inf"] {
            assert!(matches!(
                parse_scale(bad),
                Err(PipelineError::InvalidScaleValue(_))
            ));
        }
    }

    #[test]
    fn test_transport_config_follows_device_settings() {
        let mut config = Config::default();
        config.device.host = "10.1.1.1".to_string();
        config.device.ack_timeout_ms = Some(750);
        config.drawing.pen_up = 12.4;
        let pipeline = Pipeline::new(config).unwrap();

        let transport = pipeline.transport_config();
        assert_eq!(transport.address(), "10.1.1.1:1025");
        assert_eq!(transport.ack_timeout, Some(std::time::Duration::from_millis(750)));
        assert_eq!(transport.remap, SentinelRemap::new(12, 3));
    }

    #[test]
    fn test_default_transport_bounds_every_wait() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let transport = pipeline.transport_config();
        assert!(transport.connect_timeout.is_some());
        assert!(transport.write_timeout.is_some());
        assert!(transport.ack_timeout.is_some());
        assert_eq!(transport.remap, SentinelRemap::new(5, 3));
    }

    #[test]
    fn test_rejects_bad_scale_before_reading_image() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let request = PipelineRequest::new("does-not-exist.png").with_scale(scale);
            assert!(matches!(
                pipeline.prepare(&request),
                Err(PipelineError::InvalidScaleValue(_))
            ));
        }
    }

    #[test]
    fn test_invalid_config_scale() {
        let mut config = Config::default();
        config.drawing.scale = -0.5;
        assert!(matches!(
            Pipeline::new(config),
            Err(PipelineError::InvalidScaleValue(_))
        ));
    }
}
