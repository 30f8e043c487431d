//! Streaming decoder for line-delimited measurement records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::MeasurementRecord;

/// Errors raised while reading measurement records
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read measurement input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed measurement record on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Lazily decodes one [`MeasurementRecord`] per input line.
///
/// Blank lines are skipped. The first line that fails to decode yields an
/// error; callers are expected to abort on it.
pub struct RecordReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl RecordReader<BufReader<File>> {
    /// Open a measurement file on disk
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::with_capacity(64 * 1024, file)))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<MeasurementRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(IngestError::Io(e))),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(&line).map_err(|source| IngestError::Decode {
                    line: self.line_no,
                    source,
                }),
            );
        }
    }
}

/// Decode records from an in-memory string
pub fn records_from_str(input: &str) -> RecordReader<&[u8]> {
    RecordReader::new(input.as_bytes())
}
