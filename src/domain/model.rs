use crate::utils::error::{LinkGenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// Mandatory phone column of every contacts file.
pub const PHONE_COLUMN: &str = "TELEFONO";
/// Conventional name column, also the historical substitution marker.
pub const NAME_COLUMN: &str = "NOMBRE";

/// Default regions offered to staff, in display order.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Region {
    #[default]
    CO,
    US,
    MX,
    PE,
    EC,
    AR,
    CL,
    VE,
    BR,
    ES,
}

impl Region {
    pub const ALL: [Region; 10] = [
        Region::CO,
        Region::US,
        Region::MX,
        Region::PE,
        Region::EC,
        Region::AR,
        Region::CL,
        Region::VE,
        Region::BR,
        Region::ES,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::CO => "CO",
            Region::US => "US",
            Region::MX => "MX",
            Region::PE => "PE",
            Region::EC => "EC",
            Region::AR => "AR",
            Region::CL => "CL",
            Region::VE => "VE",
            Region::BR => "BR",
            Region::ES => "ES",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Region::ALL
            .into_iter()
            .find(|region| region.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Region::ALL.iter().map(Region::as_str).collect();
                format!("unknown region '{}', expected one of {}", s, names.join(", "))
            })
    }
}

/// Deep-link host format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Provider {
    #[default]
    #[serde(rename = "wa.me")]
    WaMe,
    #[serde(rename = "api")]
    Api,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::WaMe => f.write_str("wa.me"),
            Provider::Api => f.write_str("api"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wa.me" | "wame" => Ok(Provider::WaMe),
            "api" | "api.whatsapp.com" => Ok(Provider::Api),
            other => Err(format!("unknown provider '{}', expected wa.me or api", other)),
        }
    }
}

/// Digits-only international number. Empty means the raw input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct CanonicalPhone(String);

impl CanonicalPhone {
    pub fn invalid() -> Self {
        Self(String::new())
    }

    pub(crate) fn from_digits(digits: String) -> Self {
        debug_assert!(digits.chars().all(|c| c.is_ascii_digit()));
        Self(digits)
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One contact: a form submission or one CSV row, every value kept as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContact {
    pub fields: HashMap<String, String>,
}

impl RawContact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn phone(&self) -> &str {
        self.get(PHONE_COLUMN).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawContact {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Uploaded tabular input: the header schema plus rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawContact>,
}

impl ContactTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawContact>) -> Self {
        Self { headers, rows }
    }

    /// Builds a table whose schema is the union of the rows' keys.
    pub fn from_rows(rows: Vec<RawContact>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in &rows {
            let mut keys: Vec<&String> = row.fields.keys().collect();
            keys.sort();
            for key in keys {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
        Self { headers, rows }
    }

    /// Reads comma-separated text with a header row. Values stay strings,
    /// so leading zeros survive; short rows are padded with empty values.
    /// Repeated header names are rejected.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(unreadable)?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        for (i, header) in headers.iter().enumerate() {
            if headers[..i].contains(header) {
                return Err(LinkGenError::UnreadableInput {
                    message: format!("column {:?} appears more than once in the header", header),
                });
            }
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(unreadable)?;
            if record.len() > headers.len() {
                return Err(LinkGenError::UnreadableInput {
                    message: format!(
                        "line {} has {} fields but the header has {}",
                        record.position().map(|p| p.line()).unwrap_or_default(),
                        record.len(),
                        headers.len()
                    ),
                });
            }
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), record.get(i).unwrap_or_default().to_string()))
                .collect();
            rows.push(RawContact { fields });
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        Self::from_csv_reader(data)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn unreadable(err: csv::Error) -> LinkGenError {
    LinkGenError::UnreadableInput {
        message: err.to_string(),
    }
}

/// Output of one successfully processed contact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRecord {
    /// 1-based row number in the input.
    #[serde(rename = "FILA")]
    pub row: usize,
    #[serde(rename = "TELEFONO_E164")]
    pub phone: CanonicalPhone,
    #[serde(skip)]
    pub message: String,
    #[serde(rename = "LINK")]
    pub link: String,
}

/// Row dropped because a placeholder had no matching column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub variable: String,
}

/// Every input row lands in exactly one of the three lists, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub total_rows: usize,
    pub links: Vec<LinkRecord>,
    pub invalid_phone_rows: Vec<usize>,
    pub skipped_rows: Vec<SkippedRow>,
}

impl BatchResult {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total_rows: self.total_rows,
            generated: self.links.len(),
            invalid_phone_rows: self.invalid_phone_rows.clone(),
            skipped_rows: self.skipped_rows.clone(),
            qr_images: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub generated: usize,
    pub invalid_phone_rows: Vec<usize>,
    pub skipped_rows: Vec<SkippedRow>,
    pub qr_images: usize,
}

/// What the load stage produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub links_csv_path: String,
    pub archive_path: Option<String>,
    pub summary: BatchSummary,
}
