use crate::error::Result;
use crate::format::{ModelFormat, split_model_suffix};
use crate::job::{JobReport, RescaleJob, RescaleOptions, SCALED_SUFFIX};
use crate::progress::ProgressCounter;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A file found while walking a directory is worth rescaling.
fn is_candidate(path: &Path) -> bool {
    let already_scaled = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(split_model_suffix)
        .is_some_and(|(head, _)| head.ends_with(SCALED_SUFFIX));
    ModelFormat::from_path(path).is_supported() && !already_scaled
}

/// Expands directories recursively; explicit file arguments are kept as given.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in paths {
        if !root.is_dir() {
            files.push(root.clone());
            continue;
        }
        for e in WalkDir::new(root).follow_links(false) {
            let e = e.map_err(std::io::Error::from)?;
            if e.file_type().is_file() && is_candidate(e.path()) {
                files.push(e.path().to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    debug!(count = files.len(), "batch inputs collected");
    Ok(files)
}

/// Rescales every input in parallel, one foreground job each, with results in
/// input order. A failing input does not stop the others.
pub fn rescale_all(inputs: &[PathBuf], options: &RescaleOptions) -> Vec<Result<JobReport>> {
    rescale_all_with(inputs, options, |_, _| {})
}

/// Like [`rescale_all`], calling `on_done` as each job finishes.
pub fn rescale_all_with<F>(
    inputs: &[PathBuf],
    options: &RescaleOptions,
    on_done: F,
) -> Vec<Result<JobReport>>
where
    F: Fn(&Path, &Result<JobReport>) + Sync,
{
    inputs
        .par_iter()
        .map(|src| {
            let job = RescaleJob::new(src.clone(), options.scale);
            let result = job.run(&ProgressCounter::new());
            on_done(src, &result);
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_directories_for_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        for name in [
            "a.obj",
            "a_scaled.obj",
            ".obj",
            "_scaled.obj",
            "b.stl",
            "c.ply",
            "d.OBJ",
            "notes.txt",
            "sub/e.obj",
            "sub/deeper/f.stl",
        ] {
            fs::write(root.join(name), b"").unwrap();
        }

        let explicit = root.join("c.ply");
        let got = collect_inputs(&[root.to_path_buf(), explicit.clone()]).unwrap();
        let mut want = vec![
            root.join(".obj"),
            root.join("a.obj"),
            root.join("b.stl"),
            root.join("sub/deeper/f.stl"),
            root.join("sub/e.obj"),
            explicit,
        ];
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn duplicates_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("x.obj");
        fs::write(&f, b"v 1 2 3\n").unwrap();
        let got = collect_inputs(&[f.clone(), dir.path().to_path_buf()]).unwrap();
        assert_eq!(got, vec![f]);
    }
}
