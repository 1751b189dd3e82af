// 📄 Filing Records - input model for the nonprofit filing batch
// One FilingRecord per JSON object in the input array

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One filing as delivered by the extraction step.
///
/// Required text fields read a JSON `null` as the empty string. Optional
/// text fields read both `null` and `""` as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FilingRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ein: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub dln: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub object_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub xml_batch_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub location: Address,

    #[serde(default, deserialize_with = "null_as_default")]
    pub people: Vec<Person>,

    #[serde(default)]
    pub form_990: Option<Form990>,

    #[serde(default)]
    pub form_990_ez: Option<Form990Ez>,
}

impl FilingRecord {
    /// Natural key of the filing
    pub fn key(&self) -> RecordKey {
        RecordKey {
            ein: self.ein.clone(),
            dln: self.dln.clone(),
        }
    }

    /// Website text, only ever taken from the 990-EZ summary
    pub fn website(&self) -> Option<&str> {
        self.form_990_ez.as_ref().and_then(|ez| ez.website.as_deref())
    }

    /// Mission / primary exempt purpose, only ever taken from the 990-EZ summary
    pub fn description(&self) -> Option<&str> {
        self.form_990_ez
            .as_ref()
            .and_then(|ez| ez.primary_exempt_purpose_txt.as_deref())
    }
}

/// (EIN, DLN) pair identifying one logical filing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub ein: String,
    pub dln: String,
}

impl RecordKey {
    /// Both halves of the key carry text
    pub fn is_complete(&self) -> bool {
        !self.ein.trim().is_empty() && !self.dln.trim().is_empty()
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EIN {} DLN {}", self.ein, self.dln)
    }
}

/// Postal address owned by an organisation or a person
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Address {
    #[serde(default, deserialize_with = "null_as_default")]
    pub address_line_1: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub zip_code: String,
}

/// Officer, director, key employee or bookkeeper listed on the filing
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Person {
    #[serde(default, deserialize_with = "null_as_default")]
    pub person_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub person_title: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub average_hours: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub bookkeeper: bool,

    #[serde(default)]
    pub compensation: Option<i64>,

    #[serde(default)]
    pub address: Option<Address>,
}

/// Summary financials of the short-form return
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Form990Ez {
    #[serde(default, deserialize_with = "null_as_default")]
    pub gross_receipts_amt: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_revenue_amt: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_expenses_amt: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub excess_or_deficit_for_year_amt: i64,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub primary_exempt_purpose_txt: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub website: Option<String>,
}

/// Summary of the full-form return
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Form990 {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub principal_officer_name: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub principal_officer_address: Address,

    #[serde(default, deserialize_with = "null_as_default")]
    pub gross_receipts_amount: i64,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub website_address: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub mission_description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub formation_year: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_assets_end_of_year_amount: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_liabilities_end_of_year_amount: i64,
}

// ============================================================================
// NULL HANDLING
// ============================================================================

/// Collapse blank text to `None`.
///
/// Applied to every optional text column: a blank phone number, website or
/// mission statement is stored as NULL, never as `''`.
pub fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(non_empty))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

// ============================================================================
// LOADING
// ============================================================================

/// Decode a JSON array of filing records from a string
pub fn parse_records(json: &str) -> Result<Vec<FilingRecord>> {
    serde_json::from_str(json).context("Failed to decode filing records")
}

/// Read the whole input file into memory
pub fn load_records(path: &Path) -> Result<Vec<FilingRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;

    let records: Vec<FilingRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to decode filing records from {}", path.display()))?;

    Ok(records)
}
