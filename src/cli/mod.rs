//! Command-line parsing for the house-price predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! alignment and prediction code. Flags resolve into plain domain structs
//! (`RawInput`, `ServeConfig`) before anything else runs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_WARD, DayOfWeek, DistrictTable, HouseType, LegalDocuments, RawInput, RoomCount, ServeConfig,
};
use crate::error::AppError;
use crate::io::dataset::{DEFAULT_DATA_PATH, ListingField, ListingMetric};
use crate::io::model_file::{DEFAULT_FALLBACK_PATH, DEFAULT_MODEL_PATH};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hpp", version, about = "Hanoi house price range predictor")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict the price range of one property given as flags.
    Predict(PredictArgs),
    /// Prompt for property attributes and predict until `q` or end of input.
    Interactive(InteractiveArgs),
    /// Print what the model artifact expects as input.
    Inspect(InspectArgs),
    /// Derive the one-hot feature list from the reference dataset.
    Features(FeaturesArgs),
    /// Summarize the reference dataset.
    Explore(ExploreArgs),
    /// Score the reference dataset with the model and report accuracy.
    Evaluate(EvaluateArgs),
}

/// Where to find the model artifact.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Primary model artifact (JSON).
    #[arg(long = "model", env = "HPP_MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Fallback location tried when the primary artifact is missing.
    #[arg(long = "model-fallback", env = "HPP_MODEL_FALLBACK", default_value = DEFAULT_FALLBACK_PATH)]
    pub model_fallback: PathBuf,

    /// Feature list (from `hpp features`) for pre-encoded models that record no columns.
    #[arg(long = "features", env = "HPP_FEATURES", value_name = "FILE")]
    pub feature_list: Option<PathBuf>,
}

/// Probability chart options.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Do not draw the probability bar chart.
    #[arg(long)]
    pub no_chart: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 40)]
    pub chart_width: usize,
}

impl Default for ChartArgs {
    fn default() -> Self {
        Self {
            no_chart: false,
            chart_width: 40,
        }
    }
}

impl ModelArgs {
    pub fn serve_config(&self, chart: &ChartArgs) -> ServeConfig {
        ServeConfig {
            model_path: self.model.clone(),
            fallback_path: self.model_fallback.clone(),
            feature_list: self.feature_list.clone(),
            show_chart: !chart.no_chart,
            chart_width: chart.chart_width,
        }
    }
}

/// Property attributes for a one-shot prediction.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// District name, used verbatim (e.g. "CẦU GIẤY").
    #[arg(long, default_value = "CẦU GIẤY", conflicts_with = "district_id")]
    pub district: String,

    /// District identifier from the built-in table (e.g. cau-giay).
    #[arg(long)]
    pub district_id: Option<String>,

    #[arg(long, default_value = DEFAULT_WARD)]
    pub ward: String,

    #[arg(long, value_enum, ignore_case = true, default_value_t = HouseType::Byroad)]
    pub house_type: HouseType,

    #[arg(long, value_enum, ignore_case = true, default_value_t = LegalDocuments::Available)]
    pub legal_documents: LegalDocuments,

    /// Number of floors: 1..10 or GREATER_THAN_10.
    #[arg(long, default_value = "4")]
    pub floors: RoomCount,

    /// Number of bedrooms: 1..10 or GREATER_THAN_10.
    #[arg(long, default_value = "3")]
    pub bedrooms: RoomCount,

    /// Length in meters.
    #[arg(long, default_value_t = 11.0)]
    pub length: f64,

    /// Width in meters.
    #[arg(long, default_value_t = 4.0)]
    pub width: f64,

    /// Area in square meters.
    #[arg(long, default_value_t = 44.0)]
    pub area: f64,

    /// Day of the week the listing was posted.
    #[arg(long, value_enum, ignore_case = true, default_value_t = DayOfWeek::Monday)]
    pub day: DayOfWeek,

    /// Month the listing was posted (1-12).
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub month: u8,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub chart: ChartArgs,
}

impl PredictArgs {
    pub fn to_raw_input(&self) -> Result<RawInput, AppError> {
        let district = match &self.district_id {
            Some(id) => DistrictTable::global()
                .by_id(id)
                .map(|d| d.name.to_string())
                .ok_or_else(|| AppError::input(format!("Unknown district id: {id}")))?,
            None => self.district.clone(),
        };

        Ok(RawInput {
            district,
            ward: self.ward.clone(),
            house_type: self.house_type,
            legal_documents: self.legal_documents,
            no_floor: self.floors,
            no_bedroom: self.bedrooms,
            length: self.length,
            width: self.width,
            area: self.area,
            day_of_week: self.day,
            month: self.month,
        })
    }

    pub fn serve_config(&self) -> ServeConfig {
        self.model.serve_config(&self.chart)
    }
}

#[derive(Debug, Args, Clone)]
pub struct InteractiveArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub chart: ChartArgs,
}

/// Reference dataset location.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Reference dataset (CSV).
    #[arg(long = "data", env = "HPP_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Write the artifact's feature names here, one per line.
    #[arg(long, value_name = "FILE")]
    pub write_features: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output file for the feature list.
    #[arg(long, default_value = "feature_list.txt")]
    pub out: PathBuf,

    /// Compare against this model's expected feature count.
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Column to group by.
    #[arg(long, value_enum, ignore_case = true, default_value_t = ListingField::HouseType)]
    pub by: ListingField,

    /// Column averaged per group.
    #[arg(long, value_enum, ignore_case = true, default_value_t = ListingMetric::Price)]
    pub metric: ListingMetric,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 40)]
    pub chart_width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hpp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn predict_defaults_match_the_front_end() {
        let Command::Predict(args) = parse(&["predict"]).command else {
            panic!("expected predict");
        };
        let raw = args.to_raw_input().unwrap();
        assert_eq!(raw.district, "CẦU GIẤY");
        assert_eq!(raw.ward, DEFAULT_WARD);
        assert_eq!(raw.house_type, HouseType::Byroad);
        assert_eq!(raw.no_floor, RoomCount::Exact(4));
        assert_eq!(raw.area, 44.0);
        assert!(args.serve_config().show_chart);
    }

    #[test]
    fn district_id_resolves_through_the_table() {
        let Command::Predict(args) = parse(&["predict", "--district-id", "thanh-xuan"]).command else {
            panic!("expected predict");
        };
        assert_eq!(args.to_raw_input().unwrap().district, "THANH XUÂN");
    }

    #[test]
    fn unknown_district_id_is_an_input_error() {
        let Command::Predict(args) = parse(&["predict", "--district-id", "atlantis"]).command else {
            panic!("expected predict");
        };
        let err = args.to_raw_input().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Input);
    }

    #[test]
    fn room_counts_and_enums_parse_from_flags() {
        let cli = parse(&[
            "-vv",
            "predict",
            "--house-type",
            "villa",
            "--floors",
            "GREATER_THAN_10",
            "--day",
            "friday",
            "--no-chart",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.house_type, HouseType::Villa);
        assert_eq!(args.floors, RoomCount::GreaterThanTen);
        assert_eq!(args.day, DayOfWeek::Friday);
        assert!(!args.serve_config().show_chart);
    }

    #[test]
    fn feature_list_flag_reaches_the_serve_config() {
        let Command::Predict(args) = parse(&["predict", "--features", "feature_list.txt"]).command else {
            panic!("expected predict");
        };
        assert_eq!(args.serve_config().feature_list, Some(PathBuf::from("feature_list.txt")));
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let res = Cli::try_parse_from(["hpp", "predict", "--month", "13"]);
        assert!(res.is_err());
    }
}
