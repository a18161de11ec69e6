use std::fmt;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use linereader::LineReader;

use crate::schema::HEADER_MARKER;

/// Header names and rows of the last header block of an exported CSV.
#[derive(Debug)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug)]
pub enum ReadCsvError {
    IO(String, std::io::Error),
    NoHeader(String),
    Csv(String, csv::Error),
}

impl std::error::Error for ReadCsvError {}

impl fmt::Display for ReadCsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadCsvError::IO(src, err) => write!(f, "could not read \"{}\": {}", src, err),
            ReadCsvError::NoHeader(src) => write!(f, "no \"{}\" header row found in \"{}\"", HEADER_MARKER, src),
            ReadCsvError::Csv(src, err) => write!(f, "malformed CSV in \"{}\": {}", src, err),
        }
    }
}

fn contains_marker(line: &[u8]) -> bool {
    let marker = HEADER_MARKER.as_bytes();
    line.windows(marker.len()).any(|w| w == marker)
}

/// Find all header rows. Returns (line index, byte offset) pairs in file order.
pub fn header_positions(data: &[u8]) -> std::io::Result<Vec<(usize, usize)>> {
    let mut reader = LineReader::new(data);
    let mut positions = Vec::new();

    let mut offset: usize = 0;
    let mut line_idx: usize = 0;

    while let Some(line) = reader.next_line() {
        let line = line?;
        if contains_marker(line) {
            positions.push((line_idx, offset));
        }
        offset += line.len();
        line_idx += 1;
    }

    Ok(positions)
}

/// Parse CSV data that may contain several concatenated runs, each starting with its own header.
/// Only the last header and the rows after it are kept; earlier blocks are dropped.
pub fn parse_multi_header(data: &[u8], source: &str) -> Result<RawTable, ReadCsvError> {
    let positions = header_positions(data).map_err(|e| ReadCsvError::IO(source.to_string(), e))?;

    let &(line_idx, offset) = match positions.last() {
        Some(last) => last,
        None => return Err(ReadCsvError::NoHeader(source.to_string())),
    };

    if positions.len() > 1 {
        debug!("{}: {} header blocks, keeping the one at line {}", source, positions.len(), line_idx + 1);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(&data[offset..]);

    let headers = reader.headers()
        .map_err(|e| ReadCsvError::Csv(source.to_string(), e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let rows = reader.records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ReadCsvError::Csv(source.to_string(), e))?;

    Ok(RawTable { headers, rows })
}

pub fn read_multi_header_csv(path: &Path) -> Result<RawTable, ReadCsvError> {
    let source = path.display().to_string();
    let data = fs::read(path).map_err(|e| ReadCsvError::IO(source.clone(), e))?;

    parse_multi_header(&data, &source)
}
