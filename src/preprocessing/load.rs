use std::collections::BTreeMap;
use std::path::Path;

use csv::StringRecord;

use crate::parse_array::parse_array;
use crate::parse_csv::read_multi_header_csv;
use crate::preprocessing::PreprocessError;
use crate::schema::{ARRAY_COLUMNS, CellKind, FeatureLayout, ID_COLUMN, IS_MASTER_COLUMN, LatencyLayout, START_TIME_COLUMN, TX_TYPE_COLUMN};
use crate::shared_interface::{FeatureRecord, LatencyRecord, TransactionId};

pub type FeatureTable = BTreeMap<TransactionId, FeatureRecord>;

/// Strict integer parse. Integral floats (`3.0`) are accepted, as long as they fit in an i64.
pub fn parse_integer(value: &str) -> Option<i64> {
    if let Ok(int) = value.parse::<i64>() { return Some(int); }

    match fast_float::parse::<f64, _>(value) {
        Ok(f) if f.is_finite() && f.fract() == 0. && f >= i64::MIN as f64 && f < i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// An empty start time reads as NaN, which the warmup filter always drops.
pub fn parse_start_time(value: &str) -> Option<f64> {
    if value.is_empty() { return Some(f64::NAN); }

    fast_float::parse::<f64, _>(value).ok()
}

fn field(record: &StringRecord, pos: usize) -> &str {
    record.get(pos).unwrap_or("")
}

struct RowContext<'a> {
    source: &'a str,
    row: usize,
}

impl RowContext<'_> {
    fn invalid(&self, column: &'static str, expected: CellKind, value: &str) -> PreprocessError {
        PreprocessError::InvalidCell {
            source: self.source.to_string(),
            row: self.row,
            column,
            expected,
            value: value.to_string(),
        }
    }

    fn integer(&self, record: &StringRecord, pos: usize, column: &'static str) -> Result<i64, PreprocessError> {
        let value = field(record, pos);
        parse_integer(value).ok_or_else(|| self.invalid(column, CellKind::Integer, value))
    }
}

fn parse_feature_record(record: &StringRecord, layout: &FeatureLayout, ctx: &RowContext) -> Result<FeatureRecord, PreprocessError> {
    let id = ctx.integer(record, layout.id, ID_COLUMN)?;
    let tx_type = ctx.integer(record, layout.tx_type, TX_TYPE_COLUMN)?;

    let scalars = layout.scalars.iter()
        .map(|&pos| field(record, pos).to_string())
        .collect();

    let arrays = layout.arrays.iter()
        .zip(ARRAY_COLUMNS.iter())
        .map(|(&pos, &column)| parse_array(field(record, pos))
            .map_err(|err| PreprocessError::InvalidArray { id, column, err }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureRecord { id, tx_type, scalars, arrays })
}

fn parse_latency_record(record: &StringRecord, layout: &LatencyLayout, ctx: &RowContext) -> Result<LatencyRecord, PreprocessError> {
    let id = ctx.integer(record, layout.id, ID_COLUMN)?;

    let is_master = field(record, layout.is_master);
    let is_master = parse_bool(is_master).ok_or_else(|| ctx.invalid(IS_MASTER_COLUMN, CellKind::Boolean, is_master))?;

    let start_time = field(record, layout.start_time);
    let start_time = parse_start_time(start_time).ok_or_else(|| ctx.invalid(START_TIME_COLUMN, CellKind::Number, start_time))?;

    let ou = layout.ou.iter()
        .map(|&pos| field(record, pos).to_string())
        .collect();

    Ok(LatencyRecord { id, is_master, start_time, ou })
}

/// Load the shared feature file, keyed by transaction id.
pub fn load_features(path: &Path) -> Result<FeatureTable, PreprocessError> {
    let source = path.display().to_string();
    let table = read_multi_header_csv(path).map_err(PreprocessError::Read)?;
    let layout = FeatureLayout::resolve(&table.headers).map_err(|e| PreprocessError::Schema(source.clone(), e))?;

    let mut features = FeatureTable::new();
    for (idx, record) in table.rows.iter().enumerate() {
        let ctx = RowContext { source: &source, row: idx + 1 };
        let feature = parse_feature_record(record, &layout, &ctx)?;

        if features.contains_key(&feature.id) {
            return Err(PreprocessError::DuplicateTransaction(source, feature.id));
        }
        features.insert(feature.id, feature);
    }

    debug!("{}: loaded {} feature rows", source, features.len());

    Ok(features)
}

/// Load one server's latency file, sorted by transaction id. Rows sharing an id keep their file order.
pub fn load_latencies(path: &Path) -> Result<Vec<LatencyRecord>, PreprocessError> {
    let source = path.display().to_string();
    let table = read_multi_header_csv(path).map_err(PreprocessError::Read)?;
    let layout = LatencyLayout::resolve(&table.headers).map_err(|e| PreprocessError::Schema(source.clone(), e))?;

    let mut latencies = table.rows.iter()
        .enumerate()
        .map(|(idx, record)| parse_latency_record(record, &layout, &RowContext { source: &source, row: idx + 1 }))
        .collect::<Result<Vec<_>, _>>()?;

    latencies.sort_by_key(|r| r.id);

    debug!("{}: loaded {} latency rows", source, latencies.len());

    Ok(latencies)
}
