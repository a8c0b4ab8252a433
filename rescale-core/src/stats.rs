use serde::Serialize;

/// Counters collected by a single transformer run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// OBJ: lines read (vertex and passthrough).
    pub lines: u64,
    /// OBJ: lines that matched the vertex shape and were rescaled.
    pub vertices: u64,
    /// STL: whole 50-byte records rescaled.
    pub triangles: u64,
    /// STL: the count stored in the header, which does not bound the read loop.
    pub declared_triangles: Option<u32>,
    /// STL: bytes after the last whole record, dropped from the output.
    pub trailing_bytes: u64,
    pub bytes_written: u64,
}
