use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Where the bytes of an input file come from.
#[derive(Debug, Clone)]
pub enum InputSource {
    Path(PathBuf),
    /// Bytes already held in memory, e.g. an upload or a dropped file.
    Buffer(Vec<u8>),
}

impl InputSource {
    pub fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match self {
            InputSource::Path(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            InputSource::Buffer(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
        }
    }

    /// Reads the whole source into a fresh buffer owned by the caller.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        let mut reader = self.open()?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// A named input as handed over by the user.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub source: InputSource,
}

impl InputFile {
    pub fn new(name: impl Into<String>, source: InputSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Uses the final path component as the display name.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, InputSource::Path(path.to_path_buf()))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, InputSource::Buffer(bytes))
    }
}
