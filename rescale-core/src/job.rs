use crate::error::{RescaleError, Result};
use crate::format::{ModelFormat, split_model_suffix, transformer_for};
use crate::progress::{Progress, ProgressCounter};
use crate::stats::Stats;
use crate::util::deferred::DeferredFile;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tracing::{info, instrument};

pub const SCALED_SUFFIX: &str = "_scaled";

#[derive(Clone, Debug)]
pub struct RescaleOptions {
    /// Factor applied to every coordinate. 1.0 when the caller leaves it unset.
    pub scale: f64,
    /// Cadence of the consumer-side progress poll.
    pub poll_interval: Duration,
}

impl Default for RescaleOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// `dir/name.ext` -> `dir/name_scaled.ext`, next to the source.
///
/// Model suffixes are cut from the raw file name, so `dir/.obj` becomes
/// `dir/_scaled.obj`.
pub fn output_path_for(source: &Path) -> PathBuf {
    if let Some((head, suffix)) = source
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(split_model_suffix)
    {
        return source.with_file_name(format!("{head}{SCALED_SUFFIX}{suffix}"));
    }
    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(SCALED_SUFFIX);
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    source.with_file_name(name)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Completed,
    /// `.ply` or an unrecognized extension: nothing was transformed.
    Skipped,
}

#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub format: ModelFormat,
    pub scale: f64,
    pub status: JobStatus,
    pub stats: Stats,
    pub elapsed_ms: u64,
    /// Unix seconds.
    pub finished_at: i64,
}

/// One user-initiated rescale of one file.
#[derive(Clone, Debug)]
pub struct RescaleJob {
    pub source: PathBuf,
    pub scale: f64,
    pub format: ModelFormat,
    pub output: PathBuf,
}

impl RescaleJob {
    pub fn new(source: impl Into<PathBuf>, scale: f64) -> Self {
        let source = source.into();
        Self {
            format: ModelFormat::from_path(&source),
            output: output_path_for(&source),
            source,
            scale,
        }
    }

    /// Validates the job and returns the source length in bytes.
    fn source_len(&self) -> Result<u64> {
        if !self.scale.is_finite() {
            return Err(RescaleError::InvalidScale(self.scale));
        }
        match fs::metadata(&self.source) {
            Ok(md) if md.is_file() => Ok(md.len()),
            Ok(_) => Err(RescaleError::InputNotFound(self.source.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RescaleError::InputNotFound(self.source.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Runs the job on the calling thread.
    #[instrument(skip_all, fields(source = %self.source.display(), scale = self.scale))]
    pub fn run(&self, progress: &ProgressCounter) -> Result<JobReport> {
        let len = self.source_len()?;
        progress.reset(len);
        self.execute(progress)
    }

    /// Resets `progress` and dispatches the job to a background worker.
    ///
    /// Unsupported formats get no worker; the returned handle is already
    /// finished with a `Skipped` report and progress stays at zero.
    #[instrument(skip_all, fields(source = %self.source.display(), scale = self.scale))]
    pub fn start(&self, progress: Arc<ProgressCounter>) -> Result<JobHandle> {
        let len = self.source_len()?;
        progress.reset(len);

        if !self.format.is_supported() {
            info!(format = ?self.format, "no transformer for format; skipping");
            let report = self.report(JobStatus::Skipped, Stats::default(), Instant::now());
            return Ok(JobHandle {
                progress,
                worker: Worker::Skipped(report),
            });
        }

        let job = self.clone();
        let shared = Arc::clone(&progress);
        let handle = thread::Builder::new()
            .name("rescale-worker".to_string())
            .spawn(move || job.execute(&shared))?;
        Ok(JobHandle {
            progress,
            worker: Worker::Thread(handle),
        })
    }

    fn execute(&self, progress: &ProgressCounter) -> Result<JobReport> {
        let started = Instant::now();
        let transformer = match transformer_for(self.format, &self.source) {
            Ok(t) => t,
            Err(RescaleError::UnsupportedFormat(_)) => {
                info!(format = ?self.format, "no transformer for format; skipping");
                return Ok(self.report(JobStatus::Skipped, Stats::default(), started));
            }
            Err(e) => return Err(e),
        };

        info!(output = %self.output.display(), format = ?self.format, "rescale started");
        let mut src = BufReader::new(File::open(&self.source)?);
        let mut dst = BufWriter::new(DeferredFile::new(&self.output));
        let stats = transformer.rescale(&mut src, &mut dst, self.scale, progress)?;
        let file = dst.into_inner().map_err(|e| e.into_error())?;
        file.finish()?;

        let report = self.report(JobStatus::Completed, stats, started);
        info!(
            elapsed_ms = report.elapsed_ms,
            bytes_written = report.stats.bytes_written,
            "rescale finished"
        );
        Ok(report)
    }

    fn report(&self, status: JobStatus, stats: Stats, started: Instant) -> JobReport {
        JobReport {
            source: self.source.clone(),
            output: (status == JobStatus::Completed).then(|| self.output.clone()),
            format: self.format,
            scale: self.scale,
            status,
            stats,
            elapsed_ms: started.elapsed().as_millis() as u64,
            finished_at: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

enum Worker {
    Thread(JoinHandle<Result<JobReport>>),
    Skipped(JobReport),
}

/// Completion handle for a started job. There is no cancellation.
pub struct JobHandle {
    progress: Arc<ProgressCounter>,
    worker: Worker,
}

impl JobHandle {
    pub fn is_finished(&self) -> bool {
        match &self.worker {
            Worker::Thread(h) => h.is_finished(),
            Worker::Skipped(_) => true,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress.progress()
    }

    /// Blocks until the worker is done.
    pub fn join(self) -> Result<JobReport> {
        match self.worker {
            Worker::Thread(h) => h.join().map_err(|_| RescaleError::WorkerPanicked)?,
            Worker::Skipped(report) => Ok(report),
        }
    }

    /// Polls progress every `interval` until the worker is done, then reports
    /// the final value once more and returns the job result.
    pub fn wait_with_progress(
        self,
        interval: Duration,
        mut on_tick: impl FnMut(Progress),
    ) -> Result<JobReport> {
        while !self.is_finished() {
            on_tick(self.progress());
            thread::sleep(interval);
        }
        let progress = Arc::clone(&self.progress);
        let result = self.join();
        on_tick(progress.progress());
        result
    }
}
