//! Wavefront OBJ rewriting.
//!
//! Only `v x y z` lines are touched. Every other line, including texture
//! coordinates, normals and comments, is copied byte for byte.

use super::{ModelFormat, Transformer};
use crate::error::{RescaleError, Result};
use crate::numeric::{self, DecimalFormat};
use crate::progress::ProgressCounter;
use crate::stats::Stats;
use crate::util::counting::CountingWriter;
use regex::bytes::Regex;
use std::io::{BufRead, Write};
use std::sync::LazyLock;
use tracing::{debug, instrument};

static VERTEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u)^(v\s)(-?[0-9]+([.,])?[0-9]*)(\s)(-?[0-9]+[.,]?[0-9]*)(\s)(-?[0-9]+[.,]?[0-9]*)($|(\s.*)$)",
    )
    .expect("vertex pattern compiles")
});

/// Line terminator assumed per line by the progress accounting.
const ASSUMED_TERMINATOR_LEN: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLine<'a> {
    Vertex {
        head: &'a [u8],
        x: &'a str,
        sep1: &'a [u8],
        y: &'a str,
        sep2: &'a [u8],
        z: &'a str,
        tail: &'a [u8],
        /// Decimal mark found in `x`, if it has a fractional part.
        decimal: Option<char>,
    },
    Passthrough(&'a [u8]),
}

impl<'a> VertexLine<'a> {
    /// `line` must not include its terminator.
    pub fn classify(line: &'a [u8]) -> Self {
        Self::match_vertex(line).unwrap_or(VertexLine::Passthrough(line))
    }

    fn match_vertex(line: &'a [u8]) -> Option<Self> {
        let caps = VERTEX.captures(line)?;
        let text = |i: usize| std::str::from_utf8(caps.get(i)?.as_bytes()).ok();
        let bytes = |i: usize| caps.get(i).map_or(&b""[..], |m| m.as_bytes());
        Some(VertexLine::Vertex {
            head: bytes(1),
            x: text(2)?,
            decimal: caps.get(3).and_then(|m| m.as_bytes().first()).map(|&b| b as char),
            sep1: bytes(4),
            y: text(5)?,
            sep2: bytes(6),
            z: text(7)?,
            tail: bytes(9),
        })
    }
}

/// Per-job line rewriter; owns the decimal format frozen on the first vertex.
#[derive(Debug, Clone)]
pub struct ObjRewriter {
    scale: f64,
    format: Option<DecimalFormat>,
}

impl ObjRewriter {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            format: None,
        }
    }

    pub fn decimal_format(&self) -> Option<DecimalFormat> {
        self.format
    }

    /// Appends the rewritten `line` to `out`. Returns whether it was a vertex.
    pub fn rewrite_line(&mut self, line: &[u8], out: &mut Vec<u8>) -> Result<bool> {
        let VertexLine::Vertex {
            head,
            x,
            sep1,
            y,
            sep2,
            z,
            tail,
            decimal,
        } = VertexLine::classify(line)
        else {
            out.extend_from_slice(line);
            return Ok(false);
        };

        let fmt = *self.format.get_or_insert_with(|| {
            let f = numeric::detect_separator(decimal);
            debug!(separator = %f, "decimal format frozen");
            f
        });
        let scale = self.scale;
        let render = |field: &str| -> Result<String> {
            let v = numeric::parse(field, fmt)? * scale;
            if !v.is_finite() {
                return Err(RescaleError::NumericParse(field.to_string()));
            }
            Ok(numeric::format(v, fmt))
        };

        out.extend_from_slice(head);
        out.extend_from_slice(render(x)?.as_bytes());
        out.extend_from_slice(sep1);
        out.extend_from_slice(render(y)?.as_bytes());
        out.extend_from_slice(sep2);
        out.extend_from_slice(render(z)?.as_bytes());
        out.extend_from_slice(tail);
        Ok(true)
    }
}

/// Splits a trailing `\n` or `\r\n` off a raw line.
fn split_terminator(raw: &[u8]) -> (&[u8], &[u8]) {
    if raw.ends_with(b"\r\n") {
        raw.split_at(raw.len() - 2)
    } else if raw.ends_with(b"\n") {
        raw.split_at(raw.len() - 1)
    } else {
        raw.split_at(raw.len())
    }
}

pub struct ObjTransformer;

impl Transformer for ObjTransformer {
    fn format(&self) -> ModelFormat {
        ModelFormat::ObjText
    }

    #[instrument(level = "debug", skip_all, fields(scale = scale))]
    fn rescale(
        &self,
        src: &mut dyn BufRead,
        dst: &mut dyn Write,
        scale: f64,
        progress: &ProgressCounter,
    ) -> Result<Stats> {
        let mut rewriter = ObjRewriter::new(scale);
        let mut stats = Stats::default();
        // Whole output is held in memory and written once at the end.
        let mut out = Vec::new();
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if src.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let (line, terminator) = split_terminator(&raw);
            if rewriter.rewrite_line(line, &mut out)? {
                stats.vertices += 1;
            }
            out.extend_from_slice(terminator);
            stats.lines += 1;
            progress.add(line.len() as u64 + ASSUMED_TERMINATOR_LEN);
        }

        let mut w = CountingWriter::new(dst);
        w.write_all(&out)?;
        w.flush()?;
        stats.bytes_written = w.counted;

        progress.complete();
        debug!(
            lines = stats.lines,
            vertices = stats.vertices,
            separator = ?rewriter.decimal_format().map(|f| f.separator()),
            "obj rescaled"
        );
        Ok(stats)
    }
}

/// Vertex count and the decimal format a job would freeze, without writing.
pub fn survey(src: &mut dyn BufRead) -> Result<(u64, Option<DecimalFormat>)> {
    let mut vertices = 0u64;
    let mut format = None;
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if src.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let (line, _) = split_terminator(&raw);
        if let VertexLine::Vertex { decimal, .. } = VertexLine::classify(line) {
            vertices += 1;
            format.get_or_insert_with(|| numeric::detect_separator(decimal));
        }
    }
    Ok((vertices, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(lines: &[&str], scale: f64) -> Vec<String> {
        let mut rw = ObjRewriter::new(scale);
        lines
            .iter()
            .map(|l| {
                let mut out = Vec::new();
                rw.rewrite_line(l.as_bytes(), &mut out).unwrap();
                String::from_utf8(out).unwrap()
            })
            .collect()
    }

    fn run(input: &[u8], scale: f64) -> (Vec<u8>, Stats, ProgressCounter) {
        let progress = ProgressCounter::new();
        progress.reset(input.len() as u64);
        let mut out = Vec::new();
        let stats = ObjTransformer
            .rescale(&mut &input[..], &mut out, scale, &progress)
            .unwrap();
        (out, stats, progress)
    }

    #[test]
    fn classifies_vertex_fields() {
        match VertexLine::classify(b"v 1,5\t2,5 -3,25 # note") {
            VertexLine::Vertex {
                head,
                x,
                sep1,
                y,
                sep2,
                z,
                tail,
                decimal,
            } => {
                assert_eq!(head, b"v ");
                assert_eq!((x, y, z), ("1,5", "2,5", "-3,25"));
                assert_eq!((sep1, sep2), (&b"\t"[..], &b" "[..]));
                assert_eq!(tail, b" # note");
                assert_eq!(decimal, Some(','));
            }
            other => panic!("expected vertex, got {other:?}"),
        }
    }

    #[test]
    fn non_vertex_shapes_pass_through() {
        for line in [
            "vt 0.5 0.5",
            "vn 0 0 1",
            "f 1 2 3",
            "# v 1 2 3",
            "v 1 2",
            "v 1 2 3abc",
            "v 1.5e3 2 3",
            " v 1 2 3",
            "",
        ] {
            assert_eq!(
                VertexLine::classify(line.as_bytes()),
                VertexLine::Passthrough(line.as_bytes()),
                "{line:?}"
            );
        }
    }

    #[test]
    fn doubles_dot_vertex() {
        assert_eq!(rewrite(&["v 1.0 2.0 3.0"], 2.0), ["v 2 4 6"]);
    }

    #[test]
    fn comma_vertex_keeps_tail() {
        assert_eq!(
            rewrite(&["v 1,5 2,5 -3,25 # note"], 2.0),
            ["v 3 5 -6,5 # note"]
        );
    }

    #[test]
    fn separator_frozen_on_first_vertex() {
        let out = rewrite(&["v 0,25 1 2", "v 1.5 2.5 3.5", "v 1 2 3"], 2.0);
        assert_eq!(out, ["v 0,5 2 4", "v 3 5 7", "v 2 4 6"]);

        let out = rewrite(&["v 0.25 1 2", "v 1,75 2 3"], 2.0);
        assert_eq!(out, ["v 0.5 2 4", "v 3.5 4 6"]);
    }

    #[test]
    fn integer_first_vertex_freezes_dot() {
        let mut rw = ObjRewriter::new(1.0);
        let mut out = Vec::new();
        rw.rewrite_line(b"v 1 2,5 3", &mut out).unwrap();
        assert_eq!(rw.decimal_format(), Some(DecimalFormat::DOT));
        assert_eq!(out, b"v 1 2.5 3");
    }

    #[test]
    fn passthrough_is_byte_identical() {
        let input = b"# caf\xe9 \xff\r\nvt 0.1 0.2\nf 1 2 3\r\ns off";
        let (out, stats, _) = run(input, 3.0);
        assert_eq!(out, input);
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.vertices, 0);
        assert_eq!(stats.bytes_written, input.len() as u64);
    }

    #[test]
    fn keeps_terminators_and_completes_progress() {
        let input = b"o cube\r\nv 1 2 3\r\nv -1.5 0 2.25\n";
        let (out, stats, progress) = run(input, 2.0);
        assert_eq!(out, b"o cube\r\nv 2 4 6\r\nv -3 0 4.5\n");
        assert_eq!(stats.vertices, 2);
        assert_eq!(progress.snapshot(), input.len() as u64);
        assert_eq!(progress.total(), input.len() as u64);
    }

    #[test]
    fn unit_scale_preserves_values() {
        let lines = ["v 0.100 -2.50 3", "v 123456.789 0.000001 -0"];
        let out = rewrite(&lines, 1.0);
        for (a, b) in lines.iter().zip(&out) {
            let fields = |s: &str| -> Vec<f64> {
                s.split_whitespace()
                    .skip(1)
                    .map(|f| numeric::parse(f, DecimalFormat::DOT).unwrap())
                    .collect()
            };
            assert_eq!(fields(a), fields(b));
        }
    }

    #[test]
    fn scale_then_inverse_restores() {
        let input = "v 1.234567 -89.5 0.0042\n".as_bytes();
        let (scaled, _, _) = run(input, 7.3);
        let (restored, _, _) = run(&scaled, 1.0 / 7.3);
        let text = String::from_utf8(restored).unwrap();
        let got: Vec<f64> = text
            .split_whitespace()
            .skip(1)
            .map(|f| f.parse().unwrap())
            .collect();
        for (g, want) in got.iter().zip([1.234567, -89.5, 0.0042]) {
            assert!(((g - want) / want).abs() < 1e-5, "{g} vs {want}");
        }
    }

    #[test]
    fn scaling_past_f64_range_fails() {
        let big = format!("1{}", "0".repeat(300));
        let mut rw = ObjRewriter::new(1e10);
        let mut out = Vec::new();
        let line = format!("v {big} 1 1");
        let err = rw.rewrite_line(line.as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, RescaleError::NumericParse(f) if f == big));

        let line = format!("v 1 {} 1", "9".repeat(400));
        let mut rw = ObjRewriter::new(2.0);
        assert!(rw.rewrite_line(line.as_bytes(), &mut Vec::new()).is_err());
    }

    #[test]
    fn survey_counts_vertices() {
        let input = b"# hdr\nv 1,0 2 3\nv 4 5 6\nf 1 2 3\n";
        let (n, fmt) = survey(&mut &input[..]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(fmt, Some(DecimalFormat::COMMA));
    }
}
