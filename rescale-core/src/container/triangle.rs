pub const RECORD_LEN: usize = 50;
pub const FLOAT_COUNT: usize = 12;
const FLOAT_BYTES: usize = FLOAT_COUNT * 4;

/// One binary STL facet: normal, three vertices, then two attribute bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleRecord {
    /// Layout: [0..3]=normal, [3..6]=v1, [6..9]=v2, [9..12]=v3
    pub floats: [f32; FLOAT_COUNT],
    pub attribute: [u8; 2],
}

impl TriangleRecord {
    pub fn from_bytes(buf: &[u8; RECORD_LEN]) -> Self {
        let mut floats = [0f32; FLOAT_COUNT];
        for (i, chunk) in buf[..FLOAT_BYTES].chunks_exact(4).enumerate() {
            floats[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self {
            floats,
            attribute: [buf[FLOAT_BYTES], buf[FLOAT_BYTES + 1]],
        }
    }

    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        for (i, v) in self.floats.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        buf[FLOAT_BYTES..].copy_from_slice(&self.attribute);
        buf
    }

    /// Multiplies all twelve floats, normal included, in single precision.
    pub fn scaled(&self, scale: f32) -> Self {
        let mut floats = self.floats;
        for v in &mut floats {
            *v *= scale;
        }
        Self {
            floats,
            attribute: self.attribute,
        }
    }
}
