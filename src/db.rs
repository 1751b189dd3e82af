// 🗄️ Storage - schema bootstrap and row-level statements
// Every dependent table cascades from organisations, so deleting an
// organisation removes the whole row set of a filing.

use crate::filing::{Address, FilingRecord, Form990, Form990Ez, Person, RecordKey};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub const ORGANISATIONS: &str = "organisations";
pub const ORGANISATION_LOCATIONS: &str = "organisation_locations";
pub const ORGANISATION_METADATA: &str = "organisation_metadata";
pub const ORGANISATION_FORM_990: &str = "organisation_form_990";
pub const PEOPLE: &str = "people";
pub const PEOPLE_LOCATIONS: &str = "people_locations";

/// Open (or create) the database file and make sure the schema exists
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    setup_database(&conn).context("Failed to set up database schema")?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    // (in-memory databases answer "memory" and keep their journal)
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    // Cascades only fire with enforcement switched on, and it is per connection
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Organisations (one row per (EIN, DLN))
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS organisations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            ein TEXT NOT NULL,
            dln TEXT NOT NULL,
            xml_batch_id TEXT NOT NULL,
            website TEXT,
            description TEXT,
            UNIQUE (ein, dln)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS organisation_locations (
            organisation_id INTEGER NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
            address_line_1 TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            zip_code TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS organisation_metadata (
            organisation_id INTEGER NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
            gross_receipts_amt INTEGER NOT NULL,
            total_revenue_amt INTEGER NOT NULL,
            total_expenses_amt INTEGER NOT NULL,
            excess_or_deficit_for_year_amt INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS organisation_form_990 (
            organisation_id INTEGER NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
            principal_officer_name TEXT,
            principal_officer_address_line_1 TEXT NOT NULL,
            principal_officer_city TEXT NOT NULL,
            principal_officer_state TEXT NOT NULL,
            principal_officer_zip_code TEXT NOT NULL,
            gross_receipts_amt INTEGER NOT NULL,
            website TEXT,
            mission_description TEXT,
            formation_year INTEGER NOT NULL,
            total_assets_end_of_year_amt INTEGER NOT NULL,
            total_liabilities_end_of_year_amt INTEGER NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // People (officers, directors, bookkeepers) and their addresses
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS people (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            organisation_id INTEGER NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
            bookkeeper BOOLEAN NOT NULL,
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            phone_number TEXT,
            average_hours REAL,
            compensation INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS people_locations (
            person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
            address_line_1 TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            zip_code TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes (foreign key columns, so cascades don't scan)
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_org_locations_org ON organisation_locations(organisation_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_org_metadata_org ON organisation_metadata(organisation_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_org_form_990_org ON organisation_form_990(organisation_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_people_org ON people(organisation_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_people_locations_person ON people_locations(person_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW STATEMENTS
// Plain rusqlite results: the importer tags each failure with its stage.
// ============================================================================

/// Id of the organisation stored under this key, if any
pub fn find_organisation_id(conn: &Connection, key: &RecordKey) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM organisations WHERE ein = ?1 AND dln = ?2",
        params![key.ein, key.dln],
        |row| row.get(0),
    )
    .optional()
}

pub fn delete_organisation(conn: &Connection, key: &RecordKey) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM organisations WHERE ein = ?1 AND dln = ?2",
        params![key.ein, key.dln],
    )
}

/// Insert the organisation row and return its generated id
pub fn insert_organisation(conn: &Connection, record: &FilingRecord) -> rusqlite::Result<i64> {
    conn.query_row(
        "INSERT INTO organisations (name, ein, dln, xml_batch_id, website, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING id",
        params![
            record.name,
            record.ein,
            record.dln,
            record.xml_batch_id,
            record.website(),
            record.description(),
        ],
        |row| row.get(0),
    )
}

pub fn insert_organisation_location(
    conn: &Connection,
    organisation_id: i64,
    location: &Address,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO organisation_locations (organisation_id, address_line_1, city, state, zip_code)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            organisation_id,
            location.address_line_1,
            location.city,
            location.state,
            location.zip_code,
        ],
    )?;
    Ok(())
}

pub fn insert_organisation_metadata(
    conn: &Connection,
    organisation_id: i64,
    ez: &Form990Ez,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO organisation_metadata (
            organisation_id, gross_receipts_amt, total_revenue_amt,
            total_expenses_amt, excess_or_deficit_for_year_amt
        ) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            organisation_id,
            ez.gross_receipts_amt,
            ez.total_revenue_amt,
            ez.total_expenses_amt,
            ez.excess_or_deficit_for_year_amt,
        ],
    )?;
    Ok(())
}

pub fn insert_form_990(
    conn: &Connection,
    organisation_id: i64,
    form: &Form990,
) -> rusqlite::Result<()> {
    let officer = &form.principal_officer_address;

    conn.execute(
        "INSERT INTO organisation_form_990 (
            organisation_id, principal_officer_name,
            principal_officer_address_line_1, principal_officer_city,
            principal_officer_state, principal_officer_zip_code,
            gross_receipts_amt, website, mission_description, formation_year,
            total_assets_end_of_year_amt, total_liabilities_end_of_year_amt
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            organisation_id,
            form.principal_officer_name,
            officer.address_line_1,
            officer.city,
            officer.state,
            officer.zip_code,
            form.gross_receipts_amount,
            form.website_address,
            form.mission_description,
            form.formation_year,
            form.total_assets_end_of_year_amount,
            form.total_liabilities_end_of_year_amount,
        ],
    )?;
    Ok(())
}

/// Insert one person and return the generated person id
pub fn insert_person(conn: &Connection, organisation_id: i64, person: &Person) -> rusqlite::Result<i64> {
    conn.query_row(
        "INSERT INTO people (
            organisation_id, bookkeeper, name, title, phone_number, average_hours, compensation
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING id",
        params![
            organisation_id,
            person.bookkeeper,
            person.person_name,
            person.person_title,
            person.phone_number,
            person.average_hours,
            person.compensation,
        ],
        |row| row.get(0),
    )
}

pub fn insert_person_location(
    conn: &Connection,
    person_id: i64,
    address: &Address,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO people_locations (person_id, address_line_1, city, state, zip_code)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            person_id,
            address.address_line_1,
            address.city,
            address.state,
            address.zip_code,
        ],
    )?;
    Ok(())
}

// ============================================================================
// READ BACK
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrganisation {
    pub id: i64,
    pub name: String,
    pub ein: String,
    pub dln: String,
    pub xml_batch_id: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPerson {
    pub id: i64,
    pub organisation_id: i64,
    pub bookkeeper: bool,
    pub name: String,
    pub title: String,
    pub phone_number: Option<String>,
    pub average_hours: Option<f64>,
    pub compensation: Option<i64>,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub organisations: i64,
    pub organisation_locations: i64,
    pub organisation_metadata: i64,
    pub organisation_form_990: i64,
    pub people: i64,
    pub people_locations: i64,
}

pub fn find_organisation(conn: &Connection, ein: &str, dln: &str) -> Result<Option<StoredOrganisation>> {
    let organisation = conn
        .query_row(
            "SELECT id, name, ein, dln, xml_batch_id, website, description
             FROM organisations
             WHERE ein = ?1 AND dln = ?2",
            params![ein, dln],
            |row| {
                Ok(StoredOrganisation {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    ein: row.get(2)?,
                    dln: row.get(3)?,
                    xml_batch_id: row.get(4)?,
                    website: row.get(5)?,
                    description: row.get(6)?,
                })
            },
        )
        .optional()?;

    Ok(organisation)
}

/// People of one organisation in insertion order
pub fn get_people(conn: &Connection, organisation_id: i64) -> Result<Vec<StoredPerson>> {
    let mut stmt = conn.prepare(
        "SELECT id, organisation_id, bookkeeper, name, title, phone_number, average_hours, compensation
         FROM people
         WHERE organisation_id = ?1
         ORDER BY id",
    )?;

    let people = stmt
        .query_map([organisation_id], |row| {
            Ok(StoredPerson {
                id: row.get(0)?,
                organisation_id: row.get(1)?,
                bookkeeper: row.get(2)?,
                name: row.get(3)?,
                title: row.get(4)?,
                phone_number: row.get(5)?,
                average_hours: row.get(6)?,
                compensation: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(people)
}

pub fn table_counts(conn: &Connection) -> Result<TableCounts> {
    let count = |table: &str| -> Result<i64> {
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(n)
    };

    Ok(TableCounts {
        organisations: count(ORGANISATIONS)?,
        organisation_locations: count(ORGANISATION_LOCATIONS)?,
        organisation_metadata: count(ORGANISATION_METADATA)?,
        organisation_form_990: count(ORGANISATION_FORM_990)?,
        people: count(PEOPLE)?,
        people_locations: count(PEOPLE_LOCATIONS)?,
    })
}
