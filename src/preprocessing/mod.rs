use std::fmt;
use std::path::{Path, PathBuf};

use counter::Counter;
use dialoguer::console::{Emoji, style};
use num_format::{Locale, ToFormattedString};

use crate::cli;
use crate::config::Config;
use crate::parse_array::{InsufficientSlots, ParseArrayError};
use crate::parse_csv::ReadCsvError;
use crate::schema::{CellKind, FEATURE_FILE_NAME, latency_file_name, SchemaError};
use crate::shared_interface::TransactionId;

pub use crate::preprocessing::join::JoinOutcome;
use crate::preprocessing::join::join_server;
use crate::preprocessing::load::{FeatureTable, load_features, load_latencies};
use crate::preprocessing::separate::separate_features;
use crate::preprocessing::write::save_joined;

pub mod load;
pub mod separate;
pub mod join;
pub mod write;

#[cfg(test)]
mod test_data;

#[derive(Debug)]
pub enum PreprocessError {
    Read(ReadCsvError),
    Schema(String, SchemaError),
    InvalidCell { source: String, row: usize, column: &'static str, expected: CellKind, value: String },
    InvalidArray { id: TransactionId, column: &'static str, err: ParseArrayError },
    MissingSlot { id: TransactionId, column: &'static str, err: InsufficientSlots },
    DuplicateTransaction(String, TransactionId),
    Write(String, csv::Error),
    IO(String, std::io::Error),
}

impl std::error::Error for PreprocessError {}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::Read(err) => write!(f, "{}", err),
            PreprocessError::Schema(src, err) => write!(f, "{} in \"{}\"", err, src),
            PreprocessError::InvalidCell { source, row, column, expected, value } =>
                write!(f, "\"{}\" data row {}: column \"{}\" expects a {}, got \"{}\"",
                       source, row, column, expected.describe(), value),
            PreprocessError::InvalidArray { id, column, err } =>
                write!(f, "transaction {}: column \"{}\": {}", id, column, err),
            PreprocessError::MissingSlot { id, column, err } =>
                write!(f, "transaction {}: column \"{}\": {}", id, column, err),
            PreprocessError::DuplicateTransaction(src, id) => write!(f, "transaction {} appears twice in \"{}\"", id, src),
            PreprocessError::Write(src, err) => write!(f, "could not write \"{}\": {}", src, err),
            PreprocessError::IO(src, err) => write!(f, "I/O error for \"{}\": {}", src, err),
        }
    }
}

/// Per-server result of a preprocessing run.
pub struct ServerSummary {
    pub server_id: usize,
    pub latency_rows: usize,
    pub tally: Counter<JoinOutcome>,
    pub features_path: PathBuf,
    pub labels_path: PathBuf,
}

impl ServerSummary {
    pub fn count(&self, outcome: JoinOutcome) -> usize {
        self.tally[&outcome]
    }
}

/// Joins the shared transaction features with each server's latency breakdown
/// and writes one feature/label CSV pair per server.
#[derive(Debug)]
pub struct Preprocessor {
    server_num: usize,
    warmup_time: f64,
    quiet: bool,
}

impl Preprocessor {
    pub fn new(config: &Config, quiet: bool) -> Self {
        Preprocessor {
            server_num: config.global.server_num,
            warmup_time: config.preprocessor.warmup_time,
            quiet,
        }
    }

    fn step(&self, step: usize, emoji: &Emoji<'_, '_>, msg: String) {
        let counter = format!("[{}/{}]", step, self.server_num + 1);
        cli::print_output(format!("\n{}   {}{}\n", style(counter).bold().dim(), emoji, msg), self.quiet);
    }

    fn status(&self, msg: String) {
        cli::print_output(format!("        {}\n", msg), self.quiet);
    }

    pub fn preprocess(&self, input_dir: &Path, output_dir: &Path) -> Result<Vec<ServerSummary>, PreprocessError> {
        self.step(1, &cli::LOADING, "Loading features...".to_string());
        let features = load_features(&input_dir.join(FEATURE_FILE_NAME))?;
        self.status(format!("{} transactions", features.len().to_formatted_string(&Locale::en)));

        if self.server_num == 0 {
            warn!("server_num is 0, nothing to write");
        }

        (0..self.server_num)
            .map(|server_id| self.preprocess_server(&features, input_dir, output_dir, server_id))
            .collect()
    }

    fn preprocess_server(&self, features: &FeatureTable, input_dir: &Path, output_dir: &Path, server_id: usize) -> Result<ServerSummary, PreprocessError> {
        self.step(server_id + 2, &cli::WORKING, format!("Server {}", server_id));

        self.status("Separating features...".to_string());
        let pb = cli::make_progress_bar(features.len() as u64, self.quiet);
        let server_features = separate_features(features, server_id, pb.as_ref())?;
        if let Some(pb) = &pb { pb.finish_and_clear(); }

        self.status("Loading latencies...".to_string());
        let latencies = load_latencies(&input_dir.join(latency_file_name(server_id)))?;
        let latency_rows = latencies.len();

        self.status("Joining features and latencies...".to_string());
        let (joined, tally) = join_server(&server_features, latencies, self.warmup_time);
        drop(server_features);

        debug!("server {}: {} latency rows, join outcomes {:?}", server_id, latency_rows, tally.most_common());

        self.status(format!("{}Saving {} records...", cli::SAVING, joined.len().to_formatted_string(&Locale::en)));
        let (features_path, labels_path) = save_joined(output_dir, &joined, server_id)?;

        Ok(ServerSummary { server_id, latency_rows, tally, features_path, labels_path })
    }
}


#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use crate::config::Config;
    use crate::preprocessing::{JoinOutcome, PreprocessError, Preprocessor};
    use crate::preprocessing::test_data::{feature_csv, latency_csv, reorder_columns};
    use crate::schema::{ARRAY_COLUMNS, FEATURE_COLUMNS, SCALAR_COLUMNS};

    fn preprocessor(server_num: usize, warmup_time: f64) -> Preprocessor {
        let doc = format!("[global]\nserver_num = {}\n[preprocessor]\nwarmup_time = {}\n", server_num, warmup_time);
        Preprocessor::new(&Config::from_toml(&doc, "test").unwrap(), true)
    }

    fn ids(path: &Path) -> Vec<String> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.records().map(|r| r.unwrap()[0].to_string()).collect()
    }

    fn two_server_inputs(input: &Path) {
        fs::write(input.join("transaction-features.csv"), feature_csv(&[(1, 0, 2), (2, 1, 2), (3, 2, 2)])).unwrap();
        fs::write(input.join("transaction-latency-server-0.csv"), latency_csv(&[(1, true, 150.), (2, true, 50.)])).unwrap();
        fs::write(input.join("transaction-latency-server-1.csv"), latency_csv(&[(3, true, 200.), (1, true, 200.)])).unwrap();
    }

    #[test]
    fn test_two_servers_end_to_end() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());

        let summaries = preprocessor(2, 100.).preprocess(input.path(), output.path()).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].count(JoinOutcome::Retained), 1);
        assert_eq!(summaries[0].count(JoinOutcome::Warmup), 1);
        assert_eq!(summaries[1].count(JoinOutcome::Retained), 2);

        let out = output.path();
        assert_eq!(ids(&out.join("server-0-features.csv")), vec!["1"]);
        assert_eq!(ids(&out.join("server-0-labels.csv")), vec!["1"]);
        assert_eq!(ids(&out.join("server-1-features.csv")), vec!["1", "3"]);
        assert_eq!(ids(&out.join("server-1-labels.csv")), vec!["1", "3"]);
    }

    #[test]
    fn test_array_values_per_server() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());

        preprocessor(2, 100.).preprocess(input.path(), output.path()).unwrap();

        // First array column sits after the id, Tx Type and five scalar columns
        let row = |server: usize| {
            let path = output.path().join(format!("server-{}-features.csv", server));
            let mut reader = csv::Reader::from_path(path).unwrap();
            reader.records().next().unwrap().unwrap()
        };
        assert_eq!(&row(0)[7], "1.0");
        assert_eq!(&row(1)[7], "11.0");
        assert_eq!(&row(1)[31], "35.0");
    }

    #[test]
    fn test_feature_column_order_does_not_matter() {
        let input = tempfile::tempdir().unwrap();
        let canonical_out = tempfile::tempdir().unwrap();
        let shuffled_out = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());

        let pp = preprocessor(2, 100.);
        pp.preprocess(input.path(), canonical_out.path()).unwrap();

        // Arrays first, then scalars, each reversed, with the key last
        let mut order = ARRAY_COLUMNS.iter().rev().copied().collect::<Vec<_>>();
        order.extend(SCALAR_COLUMNS.iter().rev());
        order.push("Transaction ID");
        let features_path = input.path().join("transaction-features.csv");
        let shuffled = reorder_columns(&fs::read_to_string(&features_path).unwrap(), &order);
        fs::write(&features_path, shuffled).unwrap();

        pp.preprocess(input.path(), shuffled_out.path()).unwrap();

        let path = shuffled_out.path().join("server-1-features.csv");
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "Transaction ID");
        assert_eq!(headers.iter().skip(1).collect::<Vec<_>>(), *FEATURE_COLUMNS);

        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "1");
        assert_eq!(&row[1], "0");
        assert_eq!(&row[2], "1");
        assert_eq!(&row[6], "5");
        assert_eq!(&row[7], "11.0");
        assert_eq!(&row[31], "35.0");

        for server in 0..2 {
            for name in &[format!("server-{}-features.csv", server), format!("server-{}-labels.csv", server)] {
                assert_eq!(fs::read(shuffled_out.path().join(name)).unwrap(),
                           fs::read(canonical_out.path().join(name)).unwrap());
            }
        }
    }

    #[test]
    fn test_nan_and_empty_start_times_dropped() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());

        let latencies = latency_csv(&[(1, true, 150.), (2, true, 77.), (3, true, 88.)])
            .replace(",77,", ",NaN,")
            .replace(",88,", ",,");
        fs::write(input.path().join("transaction-latency-server-0.csv"), latencies).unwrap();

        let summaries = preprocessor(1, 100.).preprocess(input.path(), output.path()).unwrap();
        assert_eq!(summaries[0].count(JoinOutcome::Warmup), 2);
        assert_eq!(ids(&output.path().join("server-0-labels.csv")), vec!["1"]);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());

        let pp = preprocessor(2, 100.);
        pp.preprocess(input.path(), output.path()).unwrap();
        let first = fs::read(output.path().join("server-1-features.csv")).unwrap();
        let first_labels = fs::read(output.path().join("server-1-labels.csv")).unwrap();

        pp.preprocess(input.path(), output.path()).unwrap();
        assert_eq!(fs::read(output.path().join("server-1-features.csv")).unwrap(), first);
        assert_eq!(fs::read(output.path().join("server-1-labels.csv")).unwrap(), first_labels);
    }

    #[test]
    fn test_stale_header_blocks_ignored() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());

        let stale = latency_csv(&[(2, true, 9999.)]);
        let current = latency_csv(&[(1, true, 150.)]);
        fs::write(input.path().join("transaction-latency-server-0.csv"), format!("{}{}", stale, current)).unwrap();

        preprocessor(1, 100.).preprocess(input.path(), output.path()).unwrap();
        assert_eq!(ids(&output.path().join("server-0-labels.csv")), vec!["1"]);
        assert!(!output.path().join("server-1-labels.csv").exists());
    }

    #[test]
    fn test_missing_latency_file_aborts() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());
        fs::remove_file(input.path().join("transaction-latency-server-1.csv")).unwrap();

        let result = preprocessor(2, 100.).preprocess(input.path(), output.path());
        assert!(matches!(result, Err(PreprocessError::Read(_))));
        assert!(output.path().join("server-0-labels.csv").is_file());
    }

    #[test]
    fn test_too_few_slots_aborts() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        two_server_inputs(input.path());

        let result = preprocessor(3, 100.).preprocess(input.path(), output.path());
        match result {
            Err(err @ PreprocessError::MissingSlot { .. }) => {
                assert!(err.to_string().contains("no slot for server 2"));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected an error"),
        }
    }
}
