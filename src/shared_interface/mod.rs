use std::fmt;

use crate::parse_array::format_value;

pub type TransactionId = i64;

/// One row of the shared feature file. Array cells hold one value per server.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub id: TransactionId,
    pub tx_type: i64,
    pub scalars: Vec<String>,
    pub arrays: Vec<Vec<f64>>,
}

/// A feature row with every array cell reduced to a single server's value.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerFeatureRecord {
    pub id: TransactionId,
    pub tx_type: i64,
    pub scalars: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatencyRecord {
    pub id: TransactionId,
    pub is_master: bool,
    pub start_time: f64,
    pub ou: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub features: ServerFeatureRecord,
    pub latency: LatencyRecord,
}

impl JoinedRecord {
    pub fn id(&self) -> TransactionId {
        self.latency.id
    }

    /// Row for the features file, without the key.
    pub fn feature_fields(&self) -> Vec<String> {
        let f = &self.features;
        let mut fields = Vec::with_capacity(1 + f.scalars.len() + f.values.len());

        fields.push(f.tx_type.to_string());
        fields.extend(f.scalars.iter().cloned());
        fields.extend(f.values.iter().map(|v| format_value(*v)));
        fields
    }

    /// Row for the labels file, without the key.
    pub fn label_fields(&self) -> Vec<String> {
        self.latency.ou.clone()
    }
}

impl fmt::Display for LatencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LatencyRecord<id={}, master={}, start={}>", self.id, self.is_master, self.start_time)
    }
}
