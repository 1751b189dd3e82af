// Import errors, tagged with the stage of the per-record sequence that failed

use crate::filing::RecordKey;
use crate::report::ImportReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{key}: missing EIN or DLN")]
    MissingKey { key: RecordKey },

    #[error("{key}: begin transaction failed")]
    Begin {
        key: RecordKey,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{key}: existence check failed")]
    ExistenceCheck {
        key: RecordKey,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{key}: delete of existing record failed")]
    Delete {
        key: RecordKey,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{key}: insert into {table} failed")]
    Insert {
        key: RecordKey,
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{key}: commit failed")]
    Commit {
        key: RecordKey,
        #[source]
        source: rusqlite::Error,
    },
}

impl ImportError {
    /// Failures that end the run whatever the error policy says.
    ///
    /// These point at the connection rather than at the record, so the
    /// next record would most likely hit them too.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::Begin { .. }
                | ImportError::ExistenceCheck { .. }
                | ImportError::Commit { .. }
        )
    }

    /// Message plus the database error behind it, as written to the error log
    pub fn detail(&self) -> String {
        match std::error::Error::source(self) {
            Some(source) => format!("{}: {}", self, source),
            None => self.to_string(),
        }
    }

    pub fn key(&self) -> &RecordKey {
        match self {
            ImportError::MissingKey { key }
            | ImportError::Begin { key, .. }
            | ImportError::ExistenceCheck { key, .. }
            | ImportError::Delete { key, .. }
            | ImportError::Insert { key, .. }
            | ImportError::Commit { key, .. } => key,
        }
    }
}

/// A run that ended on a fatal error.
///
/// The report keeps every outcome up to and including the record that
/// ended the run, so nothing collected so far is lost.
#[derive(Debug, Error)]
#[error("import aborted after {} records", .report.total())]
pub struct ImportAborted {
    pub report: ImportReport,
    #[source]
    pub error: ImportError,
}
