use std::fs::File;
use std::io::{Result, Write};
use std::path::PathBuf;

/// File writer that creates its destination on the first write.
///
/// A job that fails before producing any output leaves nothing on disk.
/// `finish` creates the file even if nothing was written.
pub struct DeferredFile {
    path: PathBuf,
    file: Option<File>,
}

impl DeferredFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    fn file(&mut self) -> Result<&mut File> {
        let file = match self.file.take() {
            Some(f) => f,
            None => File::create(&self.path)?,
        };
        Ok(self.file.insert(file))
    }

    pub fn finish(mut self) -> Result<()> {
        self.file()?.flush()
    }
}

impl Write for DeferredFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.file()?.write(buf)
    }
    fn flush(&mut self) -> Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}
