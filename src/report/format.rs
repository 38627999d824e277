//! Text formatting for every command's terminal output.

use std::path::Path;

use crate::app::pipeline::{Evaluation, Served};
use crate::debug::InspectReport;
use crate::domain::ServeConfig;
use crate::error::AppError;
use crate::io::dataset::RowError;
use crate::plot::render_bars;
use crate::report::ExploreSummary;

/// Format a served prediction: input row, label, probability table.
pub fn format_prediction(served: &Served, config: &ServeConfig) -> String {
    let result = &served.result;
    let mut out = String::new();

    out.push_str("=== hpp - House Price Prediction ===\n");
    out.push_str(&format!(
        "Model: {} ({})\n",
        served.model_name,
        served.model_path.display()
    ));

    out.push_str("\nModel input:\n");
    let width = result.row.columns().map(|c| c.chars().count()).max().unwrap_or(0);
    for (name, value) in &result.row.cells {
        out.push_str(&format!("  {name:<width$}  {value}\n"));
    }
    out.push_str(&format!(
        "Region: {} ({})\n",
        match result.region.flag() {
            1 => "urban",
            _ => "non-urban",
        },
        result.region.flag()
    ));

    out.push_str(&format!("\nPredicted price range: {} million VND/m²\n", result.label));

    out.push_str("\nProbability distribution:\n");
    let top = result.top_probability().map(|p| p.class.clone());
    let label_width = result
        .probabilities
        .iter()
        .map(|p| p.class.to_string().chars().count())
        .max()
        .unwrap_or(0)
        .max(5);
    out.push_str(&format!("  {:<label_width$}  probability\n", "class"));
    for p in &result.probabilities {
        let mark = if Some(&p.class) == top.as_ref() { "*" } else { " " };
        out.push_str(&format!(
            "{mark} {:<label_width$}  {:.4}\n",
            p.class.to_string(),
            p.probability
        ));
    }

    if config.show_chart {
        let rows: Vec<(String, f64)> = result
            .probabilities
            .iter()
            .map(|p| (p.class.to_string(), p.probability))
            .collect();
        out.push('\n');
        out.push_str(&render_bars(&rows, config.chart_width));
    }

    out
}

/// User-facing text for a failed request.
pub fn format_failure(err: &AppError) -> String {
    format!("Prediction unavailable ({}): {}", err.kind().label(), err.message())
}

/// Format the `inspect` report.
pub fn format_inspect(report: &InspectReport) -> String {
    let c = &report.contract;
    let mut out = String::new();

    out.push_str(&format!("Model file: {}\n", report.path.display()));
    out.push_str(&format!("Name: {}\n", c.name));
    out.push_str(&format!("Model type: {}\n", c.model_kind));
    out.push_str(&format!("Steps in pipeline: {}\n", c.steps.join(" -> ")));
    for (step, columns) in &c.step_columns {
        out.push_str(&format!("Transformer '{step}' takes columns: {}\n", columns.join(", ")));
    }
    match report.feature_names() {
        Some(names) => {
            out.push_str(&format!("Input features expected by the pipeline ({}):\n", names.len()));
            for name in names {
                out.push_str(&format!("  {name}\n"));
            }
        }
        None => out.push_str("No feature names recorded in the artifact.\n"),
    }
    out.push_str(&format!("Expected numeric features: {}\n", c.n_features));
    out.push_str(&format!("Input encoding: {}\n", c.encoding.describe()));
    out.push_str(&format!(
        "Classes: {}\n",
        c.classes.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    ));

    out
}

/// Format the `features` command summary.
pub fn format_feature_list(names: &[String], written_to: &Path, model_expects: Option<usize>) -> String {
    let mut out = String::new();
    let preview: Vec<&str> = names.iter().take(10).map(String::as_str).collect();
    out.push_str(&format!("Columns after encoding: {} ...\n", preview.join(", ")));
    out.push_str(&format!("Total features: {}\n", names.len()));
    if let Some(n) = model_expects {
        let verdict = if n == names.len() { "match" } else { "MISMATCH" };
        out.push_str(&format!("Model expected features: {n} ({verdict})\n"));
    }
    out.push_str(&format!("Feature list written to {}\n", written_to.display()));
    out
}

/// Format the `explore` summary.
pub fn format_explore(summary: &ExploreSummary, row_errors: &[RowError], chart_width: usize) -> String {
    let mut out = String::new();

    out.push_str("=== Market insight ===\n");
    out.push_str(&format!("Total listings: {}\n", summary.total));
    out.push_str(&format!("Districts covered: {}\n", summary.districts));
    match summary.avg_area {
        Some(a) => out.push_str(&format!("Avg area (m²): {a:.1}\n")),
        None => out.push_str("Avg area (m²): n/a\n"),
    }
    out.push_str(&format!("Data columns: {}\n", summary.n_columns));
    if let Some((from, to)) = summary.date_span {
        out.push_str(&format!("Listing dates: {from} .. {to}\n"));
    }
    if !row_errors.is_empty() {
        out.push_str(&format!("Skipped rows: {}\n", row_errors.len()));
        for e in row_errors.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    out.push_str("\nHouse type breakdown:\n");
    out.push_str(&render_bars(&as_f64(&summary.by_house_type), chart_width));

    out.push_str("\nPrice range distribution:\n");
    out.push_str(&render_bars(&as_f64(&summary.by_price_range), chart_width));

    out.push_str("\nListings by district:\n");
    out.push_str(&render_bars(&as_f64(&summary.by_district), chart_width));

    out.push_str("\nAverage area per price range:\n");
    out.push_str(&render_bars(&summary.area_by_price_range, chart_width));

    out.push_str(&format!(
        "\n{} vs the average {}:\n",
        summary.group_field.column().replace('_', " "),
        summary.group_metric.column().to_lowercase()
    ));
    out.push_str(&render_bars(&summary.grouped, chart_width));

    out
}

/// Format the `evaluate` summary with its confusion matrix.
pub fn format_evaluation(eval: &Evaluation) -> String {
    let mut out = String::new();

    out.push_str(&format!("Model: {}\n", eval.model_path.display()));
    out.push_str(&format!("Scored listings: {}\n", eval.scored));
    match eval.accuracy() {
        Some(acc) => out.push_str(&format!("Accuracy: {:.1}% ({}/{})\n", acc * 100.0, eval.correct, eval.scored)),
        None => out.push_str("Accuracy: n/a\n"),
    }
    if !eval.failures.is_empty() {
        out.push_str(&format!("Unscored listings: {}\n", eval.failures.len()));
        for (idx, reason) in eval.failures.iter().take(5) {
            out.push_str(&format!("  listing {}: {reason}\n", idx + 1));
        }
    }

    out.push_str("\nConfusion matrix (rows = actual, columns = predicted):\n");
    let cell = eval
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(1)
        .max(4);
    out.push_str(&format!("{:>cell$}", ""));
    for label in &eval.labels {
        out.push_str(&format!(" {label:>cell$}"));
    }
    out.push('\n');
    for (label, row) in eval.labels.iter().zip(&eval.confusion) {
        out.push_str(&format!("{label:>cell$}"));
        for n in row {
            out.push_str(&format!(" {n:>cell$}"));
        }
        out.push('\n');
    }

    out
}

fn as_f64(counts: &[(String, usize)]) -> Vec<(String, f64)> {
    counts.iter().map(|(k, n)| (k.clone(), *n as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{Outcome, serve};
    use crate::domain::{DayOfWeek, HouseType, LegalDocuments, RawInput, RoomCount};
    use std::path::PathBuf;

    fn config() -> ServeConfig {
        ServeConfig {
            model_path: PathBuf::from("models/randomForest_with_area_pipeline.json"),
            fallback_path: PathBuf::from("missing.json"),
            feature_list: None,
            show_chart: true,
            chart_width: 10,
        }
    }

    #[test]
    fn prediction_report_marks_the_top_class() {
        let raw = RawInput {
            district: "CẦU GIẤY".to_string(),
            ward: "NGHĨA ĐÔ".to_string(),
            house_type: HouseType::Villa,
            legal_documents: LegalDocuments::Available,
            no_floor: RoomCount::Exact(4),
            no_bedroom: RoomCount::Exact(3),
            length: 11.0,
            width: 4.0,
            area: 44.0,
            day_of_week: DayOfWeek::Friday,
            month: 8,
        };
        let Outcome::Predicted(served) = serve(&config(), &raw) else {
            panic!("demo model should serve");
        };
        let text = format_prediction(&served, &config());
        assert!(text.contains("Predicted price range: 101-200 million VND/m²"));
        assert!(text.contains("* 101-200"));
        assert!(text.contains("Region: urban (1)"));
        assert!(text.contains("█"));
    }

    #[test]
    fn failure_text_names_the_kind() {
        let err = AppError::model_load("Model artifact not found");
        assert_eq!(
            format_failure(&err),
            "Prediction unavailable (model load error): Model artifact not found"
        );
    }

    #[test]
    fn inspect_report_lists_contract_details() {
        let report = crate::debug::inspect_model(&config().model_path, &config().fallback_path).unwrap();
        let text = format_inspect(&report);
        assert!(text.contains("Model type: random_forest"));
        assert!(text.contains("Steps in pipeline: ordinal_encoder -> random_forest"));
        assert!(text.contains("Input features expected by the pipeline (12):"));
        assert!(text.contains("Expected numeric features: 12"));
        assert!(text.contains("Classes: 1-60, "));
    }

    #[test]
    fn feature_list_summary_flags_a_count_mismatch() {
        let names: Vec<String> = (0..12).map(|i| format!("f{i}")).collect();
        let text = format_feature_list(&names, Path::new("feature_list.txt"), Some(40));
        assert!(text.contains("Columns after encoding: f0, f1, f2, f3, f4, f5, f6, f7, f8, f9 ..."));
        assert!(text.contains("Total features: 12"));
        assert!(text.contains("Model expected features: 40 (MISMATCH)"));
        assert!(text.ends_with("Feature list written to feature_list.txt\n"));
    }

    #[test]
    fn explore_report_mentions_skipped_rows_and_groups() {
        let ds = crate::io::dataset::load_dataset(Path::new("data/cleaned_data.csv")).unwrap();
        let summary = crate::report::summarize(
            &ds,
            crate::io::dataset::ListingField::HouseType,
            crate::io::dataset::ListingMetric::Price,
        );
        let text = format_explore(&summary, &ds.row_errors, 20);
        assert!(text.contains("Total listings: 18"));
        assert!(text.contains("Skipped rows: 1"));
        assert!(text.contains("  line 20: "));
        assert!(text.contains("House type vs the average price:"));
    }

    #[test]
    fn evaluation_report_prints_a_square_matrix() {
        let eval = Evaluation {
            model_path: PathBuf::from("m.json"),
            scored: 4,
            correct: 3,
            failures: vec![(6, "no Price_range".to_string())],
            labels: vec!["1-60".to_string(), "61-80".to_string()],
            confusion: vec![vec![2, 1], vec![0, 1]],
        };
        let text = format_evaluation(&eval);
        assert!(text.contains("Accuracy: 75.0% (3/4)"));
        assert!(text.contains("  listing 7: no Price_range"));
        let matrix: Vec<&str> = text.lines().skip_while(|l| !l.starts_with("Confusion")).skip(1).collect();
        assert_eq!(matrix[0], "       1-60 61-80");
        assert_eq!(matrix[1], " 1-60     2     1");
        assert_eq!(matrix[2], "61-80     0     1");
    }
}
