use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rescale_core::batch::rescale_all_with;
use rescale_core::container::stl_header::StlHeader;
use rescale_core::error::{RescaleError, Result};
use rescale_core::format::{obj, stl};
use rescale_core::{
    JobReport, JobStatus, ModelFormat, ProgressCounter, RescaleJob, RescaleOptions,
    collect_inputs, output_path_for,
};
use serde_json::json;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| std::io::Error::other(e).into())
}

fn byte_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40}] {percent:>3}% {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

fn count_bar(quiet: bool, len: u64) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

fn print_report(report: &JobReport, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(report)?);
        return Ok(());
    }
    match (report.status, &report.output) {
        (JobStatus::Completed, Some(out)) => {
            let s = &report.stats;
            let units = match report.format {
                ModelFormat::StlBinary => format!("triangles={}", s.triangles),
                _ => format!("lines={} vertices={}", s.lines, s.vertices),
            };
            println!(
                "{} -> {}  x{} {} bytes={} {}ms",
                report.source.display(),
                out.display(),
                report.scale,
                units,
                s.bytes_written,
                report.elapsed_ms
            );
        }
        _ => println!(
            "{}: skipped ({:?} is not rescaled)",
            report.source.display(),
            report.format
        ),
    }
    Ok(())
}

fn rescale_one(src: PathBuf, options: &RescaleOptions, quiet: bool) -> Result<JobReport> {
    let progress = Arc::new(ProgressCounter::new());
    let job = RescaleJob::new(src, options.scale);
    let handle = job.start(Arc::clone(&progress))?;

    let pb = byte_bar(quiet);
    pb.set_length(progress.total());
    pb.set_message(job.output.display().to_string());
    let result = handle.wait_with_progress(options.poll_interval, |p| {
        pb.set_length(p.total);
        pb.set_position(p.processed);
    });
    // on failure the bar is left where the worker stopped
    match result {
        Ok(_) => pb.finish_and_clear(),
        Err(_) => pb.abandon(),
    }
    result
}

pub fn handle_rescale(
    inputs: Vec<PathBuf>,
    scale: f64,
    poll_ms: u64,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let options = RescaleOptions {
        scale,
        poll_interval: Duration::from_millis(poll_ms),
    };

    if let [single] = inputs.as_slice() {
        if !single.is_dir() {
            let report = rescale_one(single.clone(), &options, quiet)?;
            return print_report(&report, json);
        }
    }

    let files = collect_inputs(&inputs)?;
    let pb = count_bar(quiet, files.len() as u64);
    let results = rescale_all_with(&files, &options, |path, res| {
        if let Err(e) = res {
            pb.println(format!("{}: {e}", path.display()));
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    let mut first_err = None;
    for result in results {
        match result {
            Ok(report) => print_report(&report, json)?,
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub fn handle_inspect(path: PathBuf, json: bool) -> Result<()> {
    let md = std::fs::metadata(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RescaleError::InputNotFound(path.clone()),
        _ => e.into(),
    })?;
    let format = ModelFormat::from_path(&path);
    let output = output_path_for(&path);
    let size = md.len();

    let mut details = json!({});
    match format {
        ModelFormat::StlBinary => {
            let declared = match StlHeader::read_from(File::open(&path)?) {
                Ok(h) => Some(h.triangle_count),
                Err(RescaleError::TruncatedStlHeader { .. }) => None,
                Err(e) => return Err(e),
            };
            details = json!({
                "declared_triangles": declared,
                "records_present": stl::records_for_len(size),
            });
        }
        ModelFormat::ObjText => {
            let (vertices, decimal) = obj::survey(&mut BufReader::new(File::open(&path)?))?;
            details = json!({
                "vertices": vertices,
                "decimal_separator": decimal.map(|d| d.separator().to_string()),
            });
        }
        ModelFormat::PlyUnsupported | ModelFormat::Unknown => {}
    }

    if json {
        let doc = json!({
            "source": path,
            "format": format,
            "output": output,
            "size": size,
            "details": details,
        });
        println!("{}", to_json(&doc)?);
        return Ok(());
    }

    print_inspection(&path, format, &output, size, &details);
    Ok(())
}

fn print_inspection(
    path: &Path,
    format: ModelFormat,
    output: &Path,
    size: u64,
    details: &serde_json::Value,
) {
    println!("source:  {}", path.display());
    println!("format:  {format:?}");
    println!("size:    {size} bytes");
    if format.is_supported() {
        println!("output:  {}", output.display());
    } else {
        println!("output:  (none, format is not rescaled)");
    }
    if let Some(map) = details.as_object() {
        for (k, v) in map {
            println!("{k}: {v}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn rescale_single_file_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tri.obj");
        fs::write(&src, "v 0,5 1 1,5\n").unwrap();
        handle_rescale(vec![src], 4.0, 1, true, true).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("tri_scaled.obj")).unwrap(),
            "v 2 4 6\n"
        );
    }

    #[test]
    fn batch_surfaces_first_failure_after_running_all() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.obj"), "v 1 2 3\n").unwrap();
        fs::write(dir.path().join("bad.stl"), [0u8; 3]).unwrap();
        let err = handle_rescale(vec![dir.path().to_path_buf()], 2.0, 1, false, true).unwrap_err();
        assert!(matches!(err, RescaleError::TruncatedStlHeader { got: 3 }));
        assert!(dir.path().join("ok_scaled.obj").exists());
    }

    #[test]
    fn inspect_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = handle_inspect(dir.path().join("nope.stl"), false).unwrap_err();
        assert!(matches!(err, RescaleError::InputNotFound(_)));
    }

    #[test]
    fn inspect_keeps_io_errors_distinct_from_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("flat.stl");
        fs::write(&file, [0u8; 84]).unwrap();
        // a path through a regular file fails with NotADirectory, not NotFound
        let err = handle_inspect(file.join("inner.stl"), false).unwrap_err();
        assert!(matches!(err, RescaleError::Io(_)), "{err:?}");
    }

    #[test]
    fn inspect_accepts_truncated_stl() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("stub.stl");
        fs::write(&p, [0u8; 12]).unwrap();
        handle_inspect(p, true).unwrap();
    }
}
