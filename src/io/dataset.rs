//! Reference dataset ingest.
//!
//! Turns the historical-listings CSV into typed `Listing`s for the
//! exploration and evaluation commands. Inference never reads it.
//!
//! - **Strict schema** for required columns (clear error, nothing loaded)
//! - **Row-level validation** (bad rows are skipped and reported by line)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{DEFAULT_WARD, DayOfWeek, HouseType, LegalDocuments, RawInput};
use crate::error::AppError;

pub const DEFAULT_DATA_PATH: &str = "data/cleaned_data.csv";

/// `Ward` is optional; listings without one use the default ward.
const REQUIRED_COLUMNS: [&str; 10] = [
    "District",
    "House_type",
    "Legal_documents",
    "No_floor",
    "No_bedroom",
    "Area",
    "Length",
    "Width",
    "Day_Of_Week",
    "Month",
];

/// One historical listing, categoricals kept as they appear in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub date: Option<NaiveDate>,
    pub district: String,
    pub ward: String,
    pub house_type: String,
    pub legal_documents: String,
    pub no_floor: String,
    pub no_bedroom: String,
    pub area: f64,
    pub length: f64,
    pub width: f64,
    /// Million VND per m².
    pub price: Option<f64>,
    pub day_of_week: String,
    pub month: u8,
    pub price_range: Option<String>,
}

/// Categorical columns the exploration summary can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingField {
    #[value(name = "House_type")]
    HouseType,
    #[value(name = "Legal_documents")]
    LegalDocuments,
    #[value(name = "No_floor")]
    NoFloor,
    #[value(name = "No_bedroom")]
    NoBedroom,
    #[value(name = "Day_Of_Week")]
    DayOfWeek,
    #[value(name = "District")]
    District,
}

/// Numeric columns the exploration summary can average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingMetric {
    #[value(name = "Price")]
    Price,
    #[value(name = "Area")]
    Area,
    #[value(name = "Length")]
    Length,
    #[value(name = "Width")]
    Width,
}

impl ListingField {
    pub fn column(self) -> &'static str {
        match self {
            ListingField::HouseType => "House_type",
            ListingField::LegalDocuments => "Legal_documents",
            ListingField::NoFloor => "No_floor",
            ListingField::NoBedroom => "No_bedroom",
            ListingField::DayOfWeek => "Day_Of_Week",
            ListingField::District => "District",
        }
    }
}

impl ListingMetric {
    pub fn column(self) -> &'static str {
        match self {
            ListingMetric::Price => "Price",
            ListingMetric::Area => "Area",
            ListingMetric::Length => "Length",
            ListingMetric::Width => "Width",
        }
    }
}

impl Listing {
    pub fn field(&self, field: ListingField) -> &str {
        match field {
            ListingField::HouseType => &self.house_type,
            ListingField::LegalDocuments => &self.legal_documents,
            ListingField::NoFloor => &self.no_floor,
            ListingField::NoBedroom => &self.no_bedroom,
            ListingField::DayOfWeek => &self.day_of_week,
            ListingField::District => &self.district,
        }
    }

    pub fn metric(&self, metric: ListingMetric) -> Option<f64> {
        match metric {
            ListingMetric::Price => self.price,
            ListingMetric::Area => Some(self.area),
            ListingMetric::Length => Some(self.length),
            ListingMetric::Width => Some(self.width),
        }
    }

    /// Interpret the listing as prediction input.
    pub fn to_raw_input(&self) -> Result<RawInput, String> {
        let house_type = HouseType::ALL
            .into_iter()
            .find(|h| h.as_str() == self.house_type)
            .ok_or_else(|| format!("unknown House_type '{}'", self.house_type))?;
        let legal_documents = LegalDocuments::ALL
            .into_iter()
            .find(|l| l.as_str() == self.legal_documents)
            .ok_or_else(|| format!("unknown Legal_documents '{}'", self.legal_documents))?;
        let day_of_week = DayOfWeek::parse_category(&self.day_of_week)
            .ok_or_else(|| format!("unknown Day_Of_Week '{}'", self.day_of_week))?;

        Ok(RawInput {
            district: self.district.clone(),
            ward: if self.ward.is_empty() {
                DEFAULT_WARD.to_string()
            } else {
                self.ward.clone()
            },
            house_type,
            legal_documents,
            no_floor: self.no_floor.parse().map_err(|e| format!("No_floor: {e}"))?,
            no_bedroom: self.no_bedroom.parse().map_err(|e| format!("No_bedroom: {e}"))?,
            length: self.length,
            width: self.width,
            area: self.area,
            day_of_week,
            month: self.month,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub listings: Vec<Listing>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl Dataset {
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.listings.iter().filter_map(|l| l.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

/// Load the reference CSV.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open dataset '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read dataset headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::input(format!(
            "Dataset '{}' is missing required column(s): {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut listings = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header line, then 1-based numbering.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_listing(&record, &header_map));
        match parsed {
            Ok(listing) => listings.push(listing),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "dataset rows skipped");
    }
    debug!(path = %path.display(), rows_read, rows_used = listings.len(), "dataset loaded");

    Ok(Dataset {
        columns: headers.iter().map(normalize_header_name).collect(),
        listings,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_listing(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Listing, String> {
    let month = get_required(record, header_map, "Month")?;
    let month = month
        .parse::<f64>()
        .ok()
        .filter(|m| m.fract() == 0.0 && (1.0..=12.0).contains(m))
        .map(|m| m as u8)
        .ok_or_else(|| format!("Invalid Month '{month}'"))?;

    Ok(Listing {
        date: get_optional(record, header_map, "Date").map(parse_date).transpose()?,
        district: get_required(record, header_map, "District")?.to_string(),
        ward: get_optional(record, header_map, "Ward").unwrap_or_default().to_string(),
        house_type: get_required(record, header_map, "House_type")?.to_string(),
        legal_documents: get_required(record, header_map, "Legal_documents")?.to_string(),
        no_floor: get_required(record, header_map, "No_floor")?.to_string(),
        no_bedroom: get_required(record, header_map, "No_bedroom")?.to_string(),
        area: parse_f64(record, header_map, "Area")?,
        length: parse_f64(record, header_map, "Length")?,
        width: parse_f64(record, header_map, "Width")?,
        price: get_optional(record, header_map, "Price")
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite()),
        day_of_week: get_required(record, header_map, "Day_Of_Week")?.to_string(),
        month,
        price_range: get_optional(record, header_map, "Price_range").map(str::to_string),
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let raw = get_required(record, header_map, name)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid {name} '{raw}'"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD or DD/MM/YYYY."))
}
