use std::collections::BTreeMap;

use indicatif::ProgressBar;

use crate::parse_array::select_slot;
use crate::preprocessing::load::FeatureTable;
use crate::preprocessing::PreprocessError;
use crate::schema::ARRAY_COLUMNS;
use crate::shared_interface::{FeatureRecord, ServerFeatureRecord, TransactionId};

pub type ServerFeatureTable = BTreeMap<TransactionId, ServerFeatureRecord>;

pub fn separate_record(record: &FeatureRecord, server_id: usize) -> Result<ServerFeatureRecord, PreprocessError> {
    let values = record.arrays.iter()
        .zip(ARRAY_COLUMNS.iter())
        .map(|(cell, &column)| select_slot(cell, server_id)
            .map_err(|err| PreprocessError::MissingSlot { id: record.id, column, err }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ServerFeatureRecord {
        id: record.id,
        tx_type: record.tx_type,
        scalars: record.scalars.clone(),
        values,
    })
}

/// Build a server's own feature table. The shared table is left untouched.
pub fn separate_features(features: &FeatureTable, server_id: usize, pb: Option<&ProgressBar>) -> Result<ServerFeatureTable, PreprocessError> {
    let mut separated = ServerFeatureTable::new();

    for (&id, record) in features.iter() {
        separated.insert(id, separate_record(record, server_id)?);
        if let Some(pb) = pb { pb.inc(1); }
    }

    Ok(separated)
}
