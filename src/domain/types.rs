//! Shared domain types.
//!
//! These types are deliberately small and plain so that both front-ends, the
//! aligner and the reporting code can pass them around without conversions.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::district::Region;
use crate::error::AppError;

/// Price-per-area bands (million VND / m²), in class-index order.
pub const PRICE_BUCKETS: [&str; 8] = [
    "1-60", "61-70", "71-80", "81-90", "91-100", "101-200", "201-300", "301-1000",
];

/// Ward used when the caller does not pick one.
pub const DEFAULT_WARD: &str = "NGHĨA ĐÔ";

pub const AREA_RANGE: (f64, f64) = (1.0, 500.0);
pub const WIDTH_RANGE: (f64, f64) = (1.0, 20.0);
pub const LENGTH_RANGE: (f64, f64) = (1.0, 50.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HouseType {
    #[value(name = "BYROAD")]
    Byroad,
    #[value(name = "STREET_HOUSE")]
    StreetHouse,
    #[value(name = "TOWNHOUSE")]
    Townhouse,
    #[value(name = "VILLA")]
    Villa,
}

impl HouseType {
    pub const ALL: [HouseType; 4] = [
        HouseType::Byroad,
        HouseType::StreetHouse,
        HouseType::Townhouse,
        HouseType::Villa,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HouseType::Byroad => "BYROAD",
            HouseType::StreetHouse => "STREET_HOUSE",
            HouseType::Townhouse => "TOWNHOUSE",
            HouseType::Villa => "VILLA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalDocuments {
    #[value(name = "AVAILABLE")]
    Available,
    #[value(name = "WAITING")]
    Waiting,
    #[value(name = "OTHERS")]
    Others,
}

impl LegalDocuments {
    pub const ALL: [LegalDocuments; 3] = [
        LegalDocuments::Available,
        LegalDocuments::Waiting,
        LegalDocuments::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LegalDocuments::Available => "AVAILABLE",
            LegalDocuments::Waiting => "WAITING",
            LegalDocuments::Others => "OTHERS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum DayOfWeek {
    #[value(name = "Monday")]
    Monday,
    #[value(name = "Tuesday")]
    Tuesday,
    #[value(name = "Wednesday")]
    Wednesday,
    #[value(name = "Thursday")]
    Thursday,
    #[value(name = "Friday")]
    Friday,
    #[value(name = "Saturday")]
    Saturday,
    #[value(name = "Sunday")]
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Category as it appears in the training data (`FRIDAY`).
    pub fn model_category(self) -> String {
        self.display_name().to_uppercase()
    }

    /// Parse either the display name or the upper-case training category.
    pub fn parse_category(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.display_name().eq_ignore_ascii_case(s))
    }
}

/// Floor / bedroom count as offered by the front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomCount {
    Exact(u8),
    GreaterThanTen,
}

impl RoomCount {
    pub fn options() -> Vec<RoomCount> {
        (1..=10)
            .map(RoomCount::Exact)
            .chain(std::iter::once(RoomCount::GreaterThanTen))
            .collect()
    }

    pub fn category(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RoomCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomCount::Exact(n) => write!(f, "{n}"),
            RoomCount::GreaterThanTen => write!(f, "GREATER_THAN_10"),
        }
    }
}

impl FromStr for RoomCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("GREATER_THAN_10") || s == ">10" {
            return Ok(RoomCount::GreaterThanTen);
        }
        match s.parse::<u8>() {
            Ok(n) if (1..=10).contains(&n) => Ok(RoomCount::Exact(n)),
            _ => Err(format!("expected 1..10 or GREATER_THAN_10, got '{s}'")),
        }
    }
}

/// Property attributes as entered by the user, before any model-specific shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInput {
    /// Used verbatim; region lookup is an exact string match.
    pub district: String,
    pub ward: String,
    pub house_type: HouseType,
    pub legal_documents: LegalDocuments,
    pub no_floor: RoomCount,
    pub no_bedroom: RoomCount,
    pub length: f64,
    pub width: f64,
    pub area: f64,
    pub day_of_week: DayOfWeek,
    pub month: u8,
}

impl RawInput {
    /// Reject values outside the ranges the front-ends offer.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=12).contains(&self.month) {
            return Err(AppError::input(format!("Month must be 1..12, got {}.", self.month)));
        }
        check_range("Area", self.area, AREA_RANGE)?;
        check_range("Width", self.width, WIDTH_RANGE)?;
        check_range("Length", self.length, LENGTH_RANGE)?;
        if self.district.trim().is_empty() {
            return Err(AppError::input("District must not be empty."));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<(), AppError> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(AppError::input(format!("{name} must be within [{lo}, {hi}], got {value}.")))
    }
}

/// One cell of a model-ready row.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(s) => write!(f, "{s}"),
            FeatureValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            FeatureValue::Number(v) => write!(f, "{v}"),
        }
    }
}

/// Output class label exactly as the pipeline lists it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Index(i64),
    Name(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Index(i) => write!(f, "{i}"),
            ClassLabel::Name(s) => write!(f, "{s}"),
        }
    }
}

impl ClassLabel {
    /// Human-readable bucket name for a raw prediction.
    ///
    /// Integer predictions index into [`PRICE_BUCKETS`]; string predictions pass through.
    pub fn display_label(&self) -> String {
        match self {
            ClassLabel::Index(i) => usize::try_from(*i)
                .ok()
                .and_then(|idx| PRICE_BUCKETS.get(idx))
                .map(|s| s.to_string())
                .unwrap_or_else(|| i.to_string()),
            ClassLabel::Name(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbability {
    pub class: ClassLabel,
    pub probability: f64,
}

/// Single-row, model-ready record in contract column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedRow {
    pub cells: Vec<(String, FeatureValue)>,
}

impl AlignedRow {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Bucket name shown to the user.
    pub label: String,
    /// Raw `predict` output.
    pub raw: ClassLabel,
    pub region: Region,
    pub row: AlignedRow,
    /// Keyed by the pipeline's own class order.
    pub probabilities: Vec<ClassProbability>,
}

impl PredictionResult {
    pub fn top_probability(&self) -> Option<&ClassProbability> {
        self.probabilities.iter().fold(None, |best, p| match best {
            Some(b) if b.probability >= p.probability => Some(b),
            _ => Some(p),
        })
    }
}

/// Resolved configuration for serving predictions.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub model_path: PathBuf,
    pub fallback_path: PathBuf,
    /// Column list for pre-encoded models that do not record their own.
    pub feature_list: Option<PathBuf>,
    pub show_chart: bool,
    pub chart_width: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_count_parses_front_end_values() {
        assert_eq!("4".parse::<RoomCount>().unwrap(), RoomCount::Exact(4));
        assert_eq!(
            "greater_than_10".parse::<RoomCount>().unwrap(),
            RoomCount::GreaterThanTen
        );
        assert!("0".parse::<RoomCount>().is_err());
        assert!("11".parse::<RoomCount>().is_err());
        assert_eq!(RoomCount::options().len(), 11);
    }

    #[test]
    fn integer_prediction_maps_to_bucket() {
        assert_eq!(ClassLabel::Index(0).display_label(), "1-60");
        assert_eq!(ClassLabel::Index(7).display_label(), "301-1000");
        assert_eq!(ClassLabel::Index(8).display_label(), "8");
        assert_eq!(ClassLabel::Index(-1).display_label(), "-1");
    }

    #[test]
    fn string_prediction_passes_through() {
        let label = ClassLabel::Name("3".to_string());
        assert_eq!(label.display_label(), "3");
    }

    #[test]
    fn day_of_week_uses_upper_case_category() {
        assert_eq!(DayOfWeek::Friday.model_category(), "FRIDAY");
        assert_eq!(DayOfWeek::parse_category("FRIDAY"), Some(DayOfWeek::Friday));
    }

    #[test]
    fn number_cells_render_without_trailing_zeros() {
        assert_eq!(FeatureValue::Number(8.0).to_string(), "8");
        assert_eq!(FeatureValue::Number(44.5).to_string(), "44.5");
    }
}
