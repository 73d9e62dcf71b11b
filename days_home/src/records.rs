//! Stay records as supplied by the input source, and their normalized form.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::StaysError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One input record, still as text.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawStay {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Nights")]
    pub nights: String,
    #[serde(rename = "Checkout Date")]
    pub checkout_date: String,
}

impl RawStay {
    pub fn new(city: &str, nights: &str, checkout_date: &str) -> Self {
        Self {
            city: city.to_string(),
            nights: nights.to_string(),
            checkout_date: checkout_date.to_string(),
        }
    }
}

/// A single overnight stay covering `start..=end`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StayInterval {
    pub city: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StayInterval {
    pub fn new(
        city: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, StaysError> {
        if end < start {
            return Err(StaysError::InvertedInterval { start, end });
        }
        Ok(Self {
            city: city.into(),
            start,
            end,
        })
    }
}

/// Parse a CSV document with `City`, `Nights` and `Checkout Date` columns.
pub fn parse_records(input: &[u8]) -> Result<Vec<RawStay>, StaysError> {
    let text = String::from_utf8_lossy(input);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<RawStay>().enumerate() {
        let row = row.map_err(|e| StaysError::RecordSource(format!("row {}: {}", idx + 1, e)))?;
        out.push(row);
    }
    Ok(out)
}

/// Convert raw records into stay intervals sorted by arrival date.
///
/// The arrival date is the checkout date minus the night count. Sorting is
/// stable, so stays arriving on the same day keep their input order.
pub fn normalize_stays(raw: &[RawStay]) -> Result<Vec<StayInterval>, StaysError> {
    let mut stays = Vec::with_capacity(raw.len());
    for (idx, record) in raw.iter().enumerate() {
        stays.push(normalize_one(idx + 1, record)?);
    }
    stays.sort_by_key(|stay| stay.start);
    Ok(stays)
}

fn normalize_one(record_no: usize, record: &RawStay) -> Result<StayInterval, StaysError> {
    let malformed = |field: &'static str, value: &str| StaysError::MalformedRecord {
        record: record_no,
        field,
        value: value.to_string(),
    };

    let city = record.city.trim();
    if city.is_empty() {
        return Err(malformed("city", &record.city));
    }
    let checkout = NaiveDate::parse_from_str(record.checkout_date.trim(), DATE_FORMAT)
        .map_err(|_| malformed("checkout date", &record.checkout_date))?;
    let nights: u32 = record
        .nights
        .trim()
        .parse()
        .map_err(|_| malformed("nights", &record.nights))?;
    let start = checkout
        .checked_sub_days(Days::new(nights.into()))
        .ok_or_else(|| malformed("nights", &record.nights))?;

    StayInterval::new(city, start, checkout)
}
