//! CSV fixtures in the layout of the benchmark exports.

use crate::schema::{ARRAY_COLUMNS, OU_COLUMNS, SCALAR_COLUMNS};

/// Feature file with one row per `(id, tx_type, slots)`.
/// Array column `c` holds `c + 1 + 10 * s` in slot `s`.
pub fn feature_csv(rows: &[(i64, i64, usize)]) -> String {
    let mut header = vec!["Transaction ID".to_string()];
    header.extend(SCALAR_COLUMNS.iter().map(|c| c.to_string()));
    header.extend(ARRAY_COLUMNS.iter().map(|c| c.to_string()));

    let mut out = header.join(",");
    out.push('\n');

    for &(id, tx_type, slots) in rows {
        let mut fields = vec![id.to_string(), tx_type.to_string()];
        fields.extend((1..=5).map(|v| v.to_string()));
        fields.extend((0..ARRAY_COLUMNS.len()).map(|c| {
            let cell = (0..slots)
                .map(|s| format!("[{:.1}]", (c + 1 + 10 * s) as f64))
                .collect::<Vec<_>>()
                .join(",");
            format!("\"{}\"", cell)
        }));
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Latency file with one row per `(id, is_master, start_time)`. OU `k` holds `100 * id + k`.
pub fn latency_csv(rows: &[(i64, bool, f64)]) -> String {
    let mut header = vec!["Transaction ID", "Is Master", "Is Distributed", "Start Time"];
    header.extend(OU_COLUMNS.iter());

    let mut out = header.join(",");
    out.push('\n');

    for &(id, is_master, start_time) in rows {
        let mut fields = vec![id.to_string(), is_master.to_string(), "false".to_string(), start_time.to_string()];
        fields.extend((0..OU_COLUMNS.len()).map(|k| (100 * id + k as i64).to_string()));
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Rewrite a CSV with its columns in the given order, by header name.
pub fn reorder_columns(data: &str, order: &[&str]) -> String {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let positions = order.iter()
        .map(|name| headers.iter().position(|h| h == *name).unwrap())
        .collect::<Vec<_>>();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(order).unwrap();
    for record in reader.records() {
        let record = record.unwrap();
        writer.write_record(positions.iter().map(|&p| &record[p])).unwrap();
    }

    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}
