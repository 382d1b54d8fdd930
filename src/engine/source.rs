use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::PathBuf;

/// Where an ingestion task reads its CSV from.
#[derive(Debug, Clone)]
pub enum IngestionSource {
    /// An upload already saved to disk; opened by the worker, not the submitter.
    File(PathBuf),
    /// An upload still held in memory.
    Memory(Vec<u8>)
}

impl IngestionSource {
    pub(crate) fn open(self) -> io::Result<Box<dyn Read + Send>> {
        match self {
            IngestionSource::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            IngestionSource::Memory(bytes) => Ok(Box::new(Cursor::new(bytes)))
        }
    }
}

impl Display for IngestionSource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IngestionSource::File(path) => write!(formatter, "file [{}]", path.display()),
            IngestionSource::Memory(bytes) => write!(formatter, "in-memory upload of {} bytes", bytes.len())
        }
    }
}
