// Filing Importer - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod db;
pub mod error;
pub mod filing;
pub mod importer;
pub mod report;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    find_organisation, get_people, open_database, setup_database, table_counts,
    StoredOrganisation, StoredPerson, TableCounts,
};
pub use error::{ImportAborted, ImportError};
pub use filing::{
    load_records, non_empty, parse_records,
    Address, FilingRecord, Form990, Form990Ez, Person, RecordKey,
};
pub use importer::{import_record, import_records, ErrorPolicy, RecordWrite};
pub use report::{write_error_log, ImportReport, Outcome, RecordOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
