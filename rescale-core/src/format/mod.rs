use crate::error::{RescaleError, Result};
use crate::progress::ProgressCounter;
use crate::stats::Stats;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ModelFormat {
    ObjText,
    StlBinary,
    /// Accepted as input, never transformed.
    PlyUnsupported,
    Unknown,
}

const SUFFIXES: [(&str, ModelFormat); 3] = [
    (".obj", ModelFormat::ObjText),
    (".stl", ModelFormat::StlBinary),
    (".ply", ModelFormat::PlyUnsupported),
];

/// Splits a file name into the part before a recognized model suffix and
/// the suffix itself. A bare `.obj` splits into `("", ".obj")`.
pub(crate) fn split_model_suffix(name: &str) -> Option<(&str, &str)> {
    SUFFIXES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(suffix, _)| name.split_at(name.len() - suffix.len()))
}

impl ModelFormat {
    /// Case-sensitive match on the end of the file name: `model.OBJ` is
    /// `Unknown`, a file named `.obj` is `ObjText`.
    pub fn from_path(path: &Path) -> Self {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return ModelFormat::Unknown;
        };
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map_or(ModelFormat::Unknown, |&(_, format)| format)
    }

    pub fn is_supported(self) -> bool {
        matches!(self, ModelFormat::ObjText | ModelFormat::StlBinary)
    }
}

/// A format-specific rewriter that multiplies every coordinate by `scale`.
///
/// Implementations add to `progress` as they consume input and finish by
/// calling `progress.complete()`.
pub trait Transformer: Send + Sync {
    fn format(&self) -> ModelFormat;
    fn rescale(
        &self,
        src: &mut dyn BufRead,
        dst: &mut dyn Write,
        scale: f64,
        progress: &ProgressCounter,
    ) -> Result<Stats>;
}

pub fn transformer_for(format: ModelFormat, path: &Path) -> Result<Box<dyn Transformer>> {
    match format {
        ModelFormat::ObjText => Ok(Box::new(obj::ObjTransformer)),
        ModelFormat::StlBinary => Ok(Box::new(stl::StlTransformer)),
        ModelFormat::PlyUnsupported | ModelFormat::Unknown => {
            Err(RescaleError::UnsupportedFormat(path.to_path_buf()))
        }
    }
}

pub mod obj;
pub mod stl;
