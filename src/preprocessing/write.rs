use std::fs;
use std::path::{Path, PathBuf};

use crate::preprocessing::PreprocessError;
use crate::schema::{FEATURE_COLUMNS, features_output_name, ID_COLUMN, labels_output_name, OU_COLUMNS};
use crate::shared_interface::{JoinedRecord, TransactionId};

fn write_projection<I>(path: &Path, columns: &[&str], rows: I) -> Result<(), PreprocessError>
    where I: Iterator<Item=(TransactionId, Vec<String>)>
{
    let source = path.display().to_string();
    let mut writer = csv::Writer::from_path(path).map_err(|e| PreprocessError::Write(source.clone(), e))?;

    writer.write_record(std::iter::once(ID_COLUMN).chain(columns.iter().copied()))
        .map_err(|e| PreprocessError::Write(source.clone(), e))?;

    for (id, fields) in rows {
        writer.write_record(std::iter::once(id.to_string()).chain(fields))
            .map_err(|e| PreprocessError::Write(source.clone(), e))?;
    }

    writer.flush().map_err(|e| PreprocessError::IO(source, e))
}

/// Write `server-<N>-features.csv` and `server-<N>-labels.csv`, overwriting previous output.
pub fn save_joined(output_dir: &Path, joined: &[JoinedRecord], server_id: usize) -> Result<(PathBuf, PathBuf), PreprocessError> {
    fs::create_dir_all(output_dir).map_err(|e| PreprocessError::IO(output_dir.display().to_string(), e))?;

    let features_path = output_dir.join(features_output_name(server_id));
    write_projection(&features_path, &FEATURE_COLUMNS[..], joined.iter().map(|r| (r.id(), r.feature_fields())))?;

    let labels_path = output_dir.join(labels_output_name(server_id));
    write_projection(&labels_path, &OU_COLUMNS, joined.iter().map(|r| (r.id(), r.label_fields())))?;

    Ok((features_path, labels_path))
}
