// 🔁 Record Importer - replace-and-insert of one filing per transaction
//
// For every record, in input order:
//   check (EIN, DLN) → delete existing row set → insert organisation,
//   location, 990-EZ metadata, 990 summary, people (+ addresses) → commit
//
// Dropping the rusqlite Transaction without commit rolls it back, so every
// early return below leaves nothing of the record behind.

use indicatif::ProgressBar;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db;
use crate::error::{ImportAborted, ImportError};
use crate::filing::FilingRecord;
use crate::report::{ImportReport, Outcome};

/// What happens to the run when a record fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ErrorPolicy {
    /// Roll back the failed record, note it, keep going
    #[default]
    Continue,
    /// Roll back the failed record and end the run
    Stop,
}

/// Rows written for one committed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordWrite {
    pub organisation_id: i64,
    pub people: usize,
    pub replaced: bool,
}

impl From<RecordWrite> for Outcome {
    fn from(write: RecordWrite) -> Self {
        if write.replaced {
            Outcome::Replaced {
                organisation_id: write.organisation_id,
                people: write.people,
            }
        } else {
            Outcome::Inserted {
                organisation_id: write.organisation_id,
                people: write.people,
            }
        }
    }
}

/// Import every record, one transaction each.
///
/// Returns `Err` on a fatal error (see [`ImportError::is_fatal`]) or, under
/// [`ErrorPolicy::Stop`], on the first failed record. The aborted run still
/// carries its report, with the record that ended it as the last failure.
/// The progress bar advances once per record, failed or not.
pub fn import_records(
    conn: &mut Connection,
    records: &[FilingRecord],
    policy: ErrorPolicy,
    progress: &ProgressBar,
) -> Result<ImportReport, ImportAborted> {
    let mut report = ImportReport::new();

    for record in records {
        let key = record.key();

        match import_record(conn, record, progress) {
            Ok(write) => {
                progress.suspend(|| info!("[OK] Imported record with {}", key));
                report.record(key, write.into());
            }
            Err(error) if error.is_fatal() || policy == ErrorPolicy::Stop => {
                progress.abandon();
                report.record(
                    key,
                    Outcome::Failed {
                        message: error.detail(),
                    },
                );
                report.finish();
                return Err(ImportAborted { report, error });
            }
            Err(err) => {
                let message = err.detail();
                progress.suspend(|| warn!("[XX] Rolled back: {}", message));
                report.record(key, Outcome::Failed { message });
            }
        }

        progress.inc(1);
    }

    report.finish();
    Ok(report)
}

/// Replace-and-insert a single record inside its own transaction
pub fn import_record(
    conn: &mut Connection,
    record: &FilingRecord,
    progress: &ProgressBar,
) -> Result<RecordWrite, ImportError> {
    let key = record.key();
    if !key.is_complete() {
        return Err(ImportError::MissingKey { key });
    }

    let tx = conn.transaction().map_err(|source| ImportError::Begin {
        key: key.clone(),
        source,
    })?;

    let insert_failed = |table: &'static str| {
        let key = key.clone();
        move |source: rusqlite::Error| ImportError::Insert { key, table, source }
    };

    // 1. Existence check
    progress.suspend(|| info!("[..] Checking record with {}", key));
    let existing = db::find_organisation_id(&tx, &key).map_err(|source| {
        ImportError::ExistenceCheck {
            key: key.clone(),
            source,
        }
    })?;

    // 2. Delete the earlier row set; dependent rows cascade
    if let Some(old_id) = existing {
        progress.suspend(|| {
            info!("[!!] Record with {} already exists (organisation {}), overwriting", key, old_id)
        });
        db::delete_organisation(&tx, &key).map_err(|source| ImportError::Delete {
            key: key.clone(),
            source,
        })?;
        progress.suspend(|| info!("[!!] Deleted existing record with {}", key));
    }

    // 3. Organisation, then everything hanging off it
    progress.suspend(|| info!("[..] Inserting record with {}", key));
    let organisation_id =
        db::insert_organisation(&tx, record).map_err(insert_failed(db::ORGANISATIONS))?;

    db::insert_organisation_location(&tx, organisation_id, &record.location)
        .map_err(insert_failed(db::ORGANISATION_LOCATIONS))?;

    if let Some(ez) = &record.form_990_ez {
        db::insert_organisation_metadata(&tx, organisation_id, ez)
            .map_err(insert_failed(db::ORGANISATION_METADATA))?;
    }

    if let Some(form) = &record.form_990 {
        db::insert_form_990(&tx, organisation_id, form)
            .map_err(insert_failed(db::ORGANISATION_FORM_990))?;
    }

    // 4. People in input order, each before its address
    for person in &record.people {
        let person_id = db::insert_person(&tx, organisation_id, person)
            .map_err(insert_failed(db::PEOPLE))?;

        if let Some(address) = &person.address {
            db::insert_person_location(&tx, person_id, address)
                .map_err(insert_failed(db::PEOPLE_LOCATIONS))?;
        }
    }

    tx.commit().map_err(|source| ImportError::Commit {
        key: key.clone(),
        source,
    })?;

    Ok(RecordWrite {
        organisation_id,
        people: record.people.len(),
        replaced: existing.is_some(),
    })
}
