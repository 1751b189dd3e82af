// ⚙️ Configuration - command line, with environment fallbacks
// Defaults reproduce the fixed file names of a bare run.

use clap::Parser;
use std::path::PathBuf;

use crate::importer::ErrorPolicy;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "filing-importer",
    version,
    about = "Load nonprofit filing records (JSON) into the organisations database"
)]
pub struct Config {
    /// JSON array of filing records
    #[arg(short, long, env = "FILINGS_INPUT", default_value = "finished_records.json")]
    pub input: PathBuf,

    /// SQLite database file (created if missing)
    #[arg(short, long, env = "FILINGS_DATABASE", default_value = "filings.db")]
    pub database: PathBuf,

    /// Where failed records are listed, one per line
    #[arg(short, long, env = "FILINGS_ERROR_LOG", default_value = "errors.txt")]
    pub errors: PathBuf,

    /// Keep going after a failed record, or stop the run
    #[arg(long, env = "FILINGS_ON_ERROR", value_enum, default_value_t = ErrorPolicy::Continue)]
    pub on_error: ErrorPolicy,

    /// Hide the progress bar (status lines still go to the log)
    #[arg(long)]
    pub no_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let config = Config::try_parse_from([
            "filing-importer",
            "--input",
            "batch.json",
            "-d",
            "/tmp/out.db",
            "--errors",
            "failed.txt",
            "--on-error",
            "stop",
            "--no-progress",
        ])
        .unwrap();

        assert_eq!(config.input, PathBuf::from("batch.json"));
        assert_eq!(config.database, PathBuf::from("/tmp/out.db"));
        assert_eq!(config.errors, PathBuf::from("failed.txt"));
        assert_eq!(config.on_error, ErrorPolicy::Stop);
        assert!(config.no_progress);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = Config::try_parse_from(["filing-importer", "--on-error", "retry"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
