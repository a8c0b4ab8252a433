//! Binary STL rewriting.
//!
//! ```text
//! UINT8[80]    header text, copied
//! UINT32       declared triangle count, copied and not trusted
//! foreach record until the stream runs short
//!     REAL32[12]  normal + 3 vertices, each multiplied by the scale
//!     UINT16      attribute bytes, copied
//! ```

use super::{ModelFormat, Transformer};
use crate::container::stl_header::{HEADER_LEN, StlHeader};
use crate::container::triangle::{RECORD_LEN, TriangleRecord};
use crate::error::Result;
use crate::progress::ProgressCounter;
use crate::stats::Stats;
use crate::util::counting::CountingWriter;
use crate::util::fill::read_full;
use std::io::{BufRead, Write};
use tracing::{debug, instrument, warn};

pub struct StlTransformer;

impl Transformer for StlTransformer {
    fn format(&self) -> ModelFormat {
        ModelFormat::StlBinary
    }

    #[instrument(level = "debug", skip_all, fields(scale = scale))]
    fn rescale(
        &self,
        src: &mut dyn BufRead,
        dst: &mut dyn Write,
        scale: f64,
        progress: &ProgressCounter,
    ) -> Result<Stats> {
        let header = StlHeader::read_from(&mut *src)?;
        let mut w = CountingWriter::new(dst);
        header.write_to(&mut w)?;
        progress.add(HEADER_LEN as u64);

        let mut stats = Stats {
            declared_triangles: Some(header.triangle_count),
            ..Stats::default()
        };
        let factor = scale as f32;
        let mut buf = [0u8; RECORD_LEN];

        loop {
            let n = read_full(src, &mut buf)?;
            if n < RECORD_LEN {
                stats.trailing_bytes = n as u64;
                break;
            }
            let rec = TriangleRecord::from_bytes(&buf).scaled(factor);
            w.write_all(&rec.to_bytes())?;
            stats.triangles += 1;
            progress.add(RECORD_LEN as u64);
        }
        w.flush()?;
        stats.bytes_written = w.counted;

        if stats.triangles != u64::from(header.triangle_count) {
            warn!(
                declared = header.triangle_count,
                found = stats.triangles,
                "STL triangle count disagrees with file length; using records present"
            );
        }
        if stats.trailing_bytes > 0 {
            warn!(
                bytes = stats.trailing_bytes,
                "ignoring trailing bytes shorter than one record"
            );
        }

        progress.complete();
        debug!(triangles = stats.triangles, "stl rescaled");
        Ok(stats)
    }
}

/// Whole records that fit after the header of a file `len` bytes long.
pub fn records_for_len(len: u64) -> u64 {
    len.saturating_sub(HEADER_LEN as u64) / RECORD_LEN as u64
}
