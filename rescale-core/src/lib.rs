#![forbid(unsafe_code)]

pub mod error;
pub mod numeric;
pub mod progress;
pub mod stats;

pub mod util {
    pub mod counting;
    pub mod deferred;
    pub mod fill;
}

pub mod container {
    pub mod stl_header;
    pub mod triangle;
}

pub mod format;

pub mod batch;
pub mod job;

// Re-exports: stable API surface
pub use batch::{collect_inputs, rescale_all};
pub use format::ModelFormat;
pub use job::{JobHandle, JobReport, JobStatus, RescaleJob, RescaleOptions, output_path_for};
pub use progress::{Progress, ProgressCounter};
