//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - dispatches to the command handlers, which print reports

use std::io;

use clap::Parser;

use crate::cli::{ChartArgs, Cli, Command, EvaluateArgs, ExploreArgs, FeaturesArgs, InspectArgs, InteractiveArgs, PredictArgs};
use crate::domain::ServeConfig;
use crate::error::AppError;
use crate::models::ClassifierPipeline;

pub mod pipeline;

/// Entry point for the `hpp` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Predict(args) => handle_predict(&args),
        Command::Interactive(args) => handle_interactive(&args),
        Command::Inspect(args) => handle_inspect(&args),
        Command::Features(args) => handle_features(&args),
        Command::Explore(args) => handle_explore(&args),
        Command::Evaluate(args) => handle_evaluate(&args),
    }
}

/// Log events go to stderr so reports on stdout stay clean.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn handle_predict(args: &PredictArgs) -> Result<(), AppError> {
    println!("{}", predict_report(args)?);
    Ok(())
}

/// The prediction report, or the failure for `main` to print with its exit code.
fn predict_report(args: &PredictArgs) -> Result<String, AppError> {
    let config = args.serve_config();
    let raw = args.to_raw_input()?;

    match pipeline::serve(&config, &raw) {
        pipeline::Outcome::Predicted(served) => Ok(crate::report::format_prediction(&served, &config)),
        pipeline::Outcome::Failed(err) => Err(err),
    }
}

fn handle_interactive(args: &InteractiveArgs) -> Result<(), AppError> {
    let config = args.model.serve_config(&args.chart);
    let stdin = io::stdin();
    let stdout = io::stdout();
    crate::cli::prompt::run_session(&mut stdin.lock(), &mut stdout.lock(), &config)?;
    Ok(())
}

fn handle_inspect(args: &InspectArgs) -> Result<(), AppError> {
    let report = crate::debug::inspect_model(&args.model.model, &args.model.model_fallback)?;
    println!("{}", crate::report::format_inspect(&report));

    if let Some(path) = &args.write_features {
        let Some(names) = report.feature_names() else {
            return Err(AppError::model_load(
                "The artifact records no feature names; nothing to write.",
            ));
        };
        crate::io::export::write_feature_list(path, &names)?;
        println!("Feature names written to {}", path.display());
    }

    Ok(())
}

fn handle_features(args: &FeaturesArgs) -> Result<(), AppError> {
    let dataset = crate::io::dataset::load_dataset(&args.data.data)?;
    let names = crate::debug::derive_feature_list(&dataset);
    crate::io::export::write_feature_list(&args.out, &names)?;

    let model_expects = match &args.model {
        Some(path) => Some(crate::io::model_file::load_pipeline(path)?.contract().n_features),
        None => None,
    };

    println!(
        "{}",
        crate::report::format_feature_list(&names, &args.out, model_expects)
    );
    Ok(())
}

fn handle_explore(args: &ExploreArgs) -> Result<(), AppError> {
    let dataset = crate::io::dataset::load_dataset(&args.data.data)?;
    let summary = crate::report::summarize(&dataset, args.by, args.metric);
    println!(
        "{}",
        crate::report::format_explore(&summary, &dataset.row_errors, args.chart_width)
    );
    Ok(())
}

fn handle_evaluate(args: &EvaluateArgs) -> Result<(), AppError> {
    let dataset = crate::io::dataset::load_dataset(&args.data.data)?;
    let config = ServeConfig {
        show_chart: false,
        ..args.model.serve_config(&ChartArgs::default())
    };
    let eval = pipeline::evaluate(&config, &dataset)?;
    println!("{}", crate::report::format_evaluation(&eval));
    Ok(())
}
