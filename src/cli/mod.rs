use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use dialoguer::console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

pub static LOADING: Emoji<'_, '_> = Emoji("⏳ ", "");
pub static WORKING: Emoji<'_, '_> = Emoji("🛠️ ", "");
pub static SAVING: Emoji<'_, '_> = Emoji("💾 ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

#[derive(Debug)]
pub enum CliError {
    MissingInputArg(String),
    FileNotFound(String),
    FileIsDirectory(String),
    DirNotFound(String),
    NotADirectory(String),
}

impl std::error::Error for CliError {}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self {
            CliError::MissingInputArg(arg) => write!(f, "Missing input argument: {}.", arg),
            CliError::FileNotFound(arg) => write!(f, "Could not find file \"{}\".", arg),
            CliError::FileIsDirectory(arg) => write!(f, "Provided file \"{}\" is a directory.", arg),
            CliError::DirNotFound(arg) => write!(f, "Could not find directory \"{}\".", arg),
            CliError::NotADirectory(arg) => write!(f, "Provided path \"{}\" is not a directory.", arg),
        }
    }
}

pub fn parse_input_file(input: Option<&str>, name: &str) -> Result<PathBuf, CliError> {
    let input = input.ok_or_else(|| CliError::MissingInputArg(name.to_string()))?;
    let path = PathBuf::from(input);

    if !path.exists() {
        Err(CliError::FileNotFound(input.to_string()))
    } else if path.is_dir() {
        Err(CliError::FileIsDirectory(input.to_string()))
    } else {
        Ok(path)
    }
}

pub fn parse_input_dir(input: Option<&str>, name: &str) -> Result<PathBuf, CliError> {
    let input = input.ok_or_else(|| CliError::MissingInputArg(name.to_string()))?;
    let path = PathBuf::from(input);

    if !path.exists() {
        Err(CliError::DirNotFound(input.to_string()))
    } else if !path.is_dir() {
        Err(CliError::NotADirectory(input.to_string()))
    } else {
        Ok(path)
    }
}

/// Output directories may not exist yet; they are created when the first file is written.
pub fn parse_output_dir(input: Option<&str>, name: &str) -> Result<PathBuf, CliError> {
    let input = input.ok_or_else(|| CliError::MissingInputArg(name.to_string()))?;
    let path = PathBuf::from(input);

    if path.exists() && !path.is_dir() {
        Err(CliError::NotADirectory(input.to_string()))
    } else {
        Ok(path)
    }
}

pub fn print_output(msg: String, quiet: bool) {
    if quiet { return; }

    print!("{}", msg);
    let _ = std::io::stdout().flush();
}

pub fn make_progress_bar(len: u64, quiet: bool) -> Option<ProgressBar> {
    if quiet { return None; }

    let pb = ProgressBar::new(len);
    pb.set_style(ProgressStyle::default_bar()
        .template("        [{elapsed_precise}] {bar:40.cyan/blue} {pos:>9}/{len:9} {msg}")
        .progress_chars("##-"));
    Some(pb)
}

pub fn exit_with_error(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1)
}


#[cfg(test)]
mod tests {
    use crate::cli::{CliError, parse_input_dir, parse_input_file, parse_output_dir};

    #[test]
    fn test_missing_arg() {
        assert!(matches!(parse_input_dir(None, "input_dir"), Err(CliError::MissingInputArg(_))));
    }

    #[test]
    fn test_input_dir_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent");
        assert!(matches!(parse_input_dir(absent.to_str(), "input_dir"), Err(CliError::DirNotFound(_))));
        assert!(parse_input_dir(dir.path().to_str(), "input_dir").is_ok());
    }

    #[test]
    fn test_output_dir_may_be_absent() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("out");
        assert_eq!(parse_output_dir(absent.to_str(), "output_dir").unwrap(), absent);
    }

    #[test]
    fn test_file_where_dir_expected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(parse_output_dir(file.path().to_str(), "output_dir"), Err(CliError::NotADirectory(_))));
        assert!(matches!(parse_input_dir(file.path().to_str(), "input_dir"), Err(CliError::NotADirectory(_))));
    }

    #[test]
    fn test_config_file_is_not_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(parse_input_file(dir.path().to_str(), "config"), Err(CliError::FileIsDirectory(_))));
    }
}
