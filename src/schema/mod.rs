use std::fmt;

pub const ID_COLUMN: &str = "Transaction ID";
pub const TX_TYPE_COLUMN: &str = "Tx Type";
pub const IS_MASTER_COLUMN: &str = "Is Master";
pub const START_TIME_COLUMN: &str = "Start Time";

/// Marker that identifies a header row (possibly one of many) in an exported CSV.
pub const HEADER_MARKER: &str = ID_COLUMN;

pub const FEATURE_FILE_NAME: &str = "transaction-features.csv";

pub const SCALAR_COLUMNS: [&str; 6] = [
    TX_TYPE_COLUMN,
    "Dependency - Max Depth",
    "Dependency - First Layer Tx Count",
    "Dependency - Total Tx Count",
    "Number of Insert Records",
    "Number of Overflows in Fusion Table",
];

pub const ARRAY_COLUMNS: [&str; 25] = [
    "Read Data Distribution",
    "Read Data in Cache Distribution",
    "Update Data Distribution",
    "System CPU Load",
    "Process CPU Load",
    "System Load Average",
    "Thread Active Count",
    "I/O Read Bytes",
    "I/O Write Bytes",
    "I/O Queue Length",
    "Number of Read Record in Last 100 us",
    "Number of Read Record Excluding Cache in Last 100 us",
    "Number of Update Record in Last 100 us",
    "Number of Insert Record in Last 100 us",
    "Number of Commit Tx in Last 100 us",
    "Number of Read Record in Last 500 us",
    "Number of Read Record Excluding Cache in Last 500 us",
    "Number of Update Record in Last 500 us",
    "Number of Insert Record in Last 500 us",
    "Number of Commit Tx in Last 500 us",
    "Number of Read Record in Last 1000 us",
    "Number of Read Record Excluding Cache in Last 1000 us",
    "Number of Update Record in Last 1000 us",
    "Number of Insert Record in Last 1000 us",
    "Number of Commit Tx in Last 1000 us",
];

/// Operation unit (OU) stage durations, used as training labels.
pub const OU_COLUMNS: [&str; 10] = [
    "OU0 - Broadcast",
    "OU0 - ROUTE",
    "OU1 - Generate Plan",
    "OU2 - Initialize Thread",
    "OU3 - Acquire Locks",
    "OU4 - Read from Local",
    "OU5M - Read from Remote",
    "OU6 - Execute Arithmetic Logic",
    "OU7 - Write to Local",
    "OU8 - Commit",
];

lazy_static! {
    /// Feature output columns: scalars first, then the separated arrays.
    pub static ref FEATURE_COLUMNS: Vec<&'static str> = SCALAR_COLUMNS.iter()
        .chain(ARRAY_COLUMNS.iter())
        .copied()
        .collect();
}

pub fn latency_file_name(server_id: usize) -> String {
    format!("transaction-latency-server-{}.csv", server_id)
}

pub fn features_output_name(server_id: usize) -> String {
    format!("server-{}-features.csv", server_id)
}

pub fn labels_output_name(server_id: usize) -> String {
    format!("server-{}-labels.csv", server_id)
}

/// Type a typed cell was expected to hold, reported when it does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Integer,
    Boolean,
    Number,
}

impl CellKind {
    pub fn describe(&self) -> &'static str {
        match self {
            CellKind::Integer => "64-bit integer",
            CellKind::Boolean => "boolean",
            CellKind::Number => "number",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum SchemaError {
    MissingColumn(String),
}

impl std::error::Error for SchemaError {}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingColumn(name) => write!(f, "missing column \"{}\"", name),
        }
    }
}

fn position_of(headers: &[String], column: &str) -> Result<usize, SchemaError> {
    headers.iter()
        .position(|h| h == column)
        .ok_or_else(|| SchemaError::MissingColumn(column.to_string()))
}

fn positions_of(headers: &[String], columns: &[&str]) -> Result<Vec<usize>, SchemaError> {
    columns.iter().map(|c| position_of(headers, c)).collect()
}

/// Field positions of the feature file columns, resolved against its header.
#[derive(Debug, PartialEq)]
pub struct FeatureLayout {
    pub id: usize,
    pub tx_type: usize,
    /// Scalar columns after `Tx Type`, in `SCALAR_COLUMNS` order.
    pub scalars: Vec<usize>,
    pub arrays: Vec<usize>,
}

impl FeatureLayout {
    pub fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        Ok(FeatureLayout {
            id: position_of(headers, ID_COLUMN)?,
            tx_type: position_of(headers, TX_TYPE_COLUMN)?,
            scalars: positions_of(headers, &SCALAR_COLUMNS[1..])?,
            arrays: positions_of(headers, &ARRAY_COLUMNS)?,
        })
    }
}

/// Field positions of a latency file's columns, resolved against its header.
#[derive(Debug, PartialEq)]
pub struct LatencyLayout {
    pub id: usize,
    pub is_master: usize,
    pub start_time: usize,
    pub ou: Vec<usize>,
}

impl LatencyLayout {
    pub fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        Ok(LatencyLayout {
            id: position_of(headers, ID_COLUMN)?,
            is_master: position_of(headers, IS_MASTER_COLUMN)?,
            start_time: position_of(headers, START_TIME_COLUMN)?,
            ou: positions_of(headers, &OU_COLUMNS)?,
        })
    }
}
