//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initialises logging
//! - parses CLI arguments
//! - builds the predictor client from env + flags
//! - runs predictions/sweeps on a Tokio runtime
//! - prints reports/plots and writes optional exports

use clap::Parser;
use log::{debug, error};

use crate::cli::{
    Command, DatasetArgs, EvaluateArgs, InputArgs, PredictArgs, PreviewArgs, ServiceArgs, SweepArgs,
};
use crate::client::{HttpPredictor, Predictor, PredictorConfig};
use crate::domain::{PhysicalInputs, PredictionRequest};
use crate::error::{AppError, PredictError};
use crate::sweep::{SweepAxis, SweepRange, axis_grid};

pub mod pipeline;

/// Largest sweep grid the front ends will submit.
pub const MAX_SWEEP_POINTS: usize = 200;

/// Shown instead of transport details when the single prediction fails.
pub const PREDICTOR_UNREACHABLE: &str = "could not reach the SNR predictor";

/// Entry point for the `osis` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // We want `osis` and `osis --na 0.6` to behave like `osis tui ...`.
    //
    // Clap requires a subcommand name, so we rewrite argv before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Preview(args) => handle_preview(args),
        Command::Predict(args) => handle_predict(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Tui(args) => crate::tui::run(args),
        Command::Dataset(args) => handle_dataset(args),
        Command::Evaluate(args) => handle_evaluate(args),
    }
}

fn handle_preview(args: PreviewArgs) -> Result<(), AppError> {
    let inputs = resolve_inputs(&args.input)?;
    let request = PredictionRequest::from_inputs(inputs)?;
    println!("{}", crate::report::format_preview(request.inputs(), request.derived()));
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let inputs = resolve_inputs(&args.input)?;
    let request = PredictionRequest::from_inputs(inputs)?;
    let predictor = build_predictor(&args.service)?;

    let runtime = build_runtime()?;
    let response = runtime
        .block_on(predictor.predict(&request))
        .map_err(unreachable_notice)?;

    if args.json {
        let body = serde_json::to_string_pretty(&response)
            .map_err(|e| AppError::new(4, format!("Failed to encode response: {e}")))?;
        println!("{body}");
    } else {
        println!("{}", crate::report::format_prediction(&request, &response));
    }
    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let inputs = resolve_inputs(&args.input)?;
    let range = args.range.to_range();
    check_sweep_size(&range)?;
    let predictor = build_predictor(&args.service)?;

    let runtime = build_runtime()?;
    let run = runtime
        .block_on(pipeline::run_submission(&predictor, inputs, &range))
        .map_err(unreachable_notice)?;

    println!("{}", crate::report::format_prediction(&run.request, &run.prediction));

    let series = run.sweep.map_err(|e| {
        error!("sweep failed: {e}");
        AppError::from(e)
    })?;

    println!("{}", crate::report::format_sweep_table(&series));
    if !args.no_plot {
        println!("{}", crate::plot::render_sweep_plot(&series, args.width, args.height));
    }
    if let Some(path) = &args.export {
        crate::io::write_sweep_csv(path, &series)?;
    }
    Ok(())
}

fn handle_dataset(args: DatasetArgs) -> Result<(), AppError> {
    let rows = crate::data::generate_dataset(args.count, args.seed)?;
    crate::io::write_dataset_csv(&args.out, &rows)?;
    println!("Wrote {} rows to {}", rows.len(), args.out.display());
    Ok(())
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let rows = crate::data::generate_dataset(args.count, args.seed)?;
    let predictor = build_predictor(&args.service)?;

    let runtime = build_runtime()?;
    let eval = runtime
        .block_on(pipeline::run_evaluation(&predictor, &rows, args.concurrency))
        .map_err(unreachable_notice)?;

    println!("{}", crate::report::format_evaluation(&eval));
    Ok(())
}

/// Inputs from `--inputs` if given, otherwise from flags; validated either way.
pub fn resolve_inputs(args: &InputArgs) -> Result<PhysicalInputs, AppError> {
    let inputs = match &args.inputs {
        Some(path) => crate::io::read_inputs_json(path)?,
        None => args.to_inputs(),
    };
    inputs.validate()?;
    Ok(inputs)
}

/// Environment config with CLI overrides applied.
pub fn predictor_config(args: &ServiceArgs) -> Result<PredictorConfig, AppError> {
    let mut config = PredictorConfig::from_env()?;
    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        config.timeout = std::time::Duration::from_secs(secs.max(1));
    }
    debug!("predictor endpoint {}", config.endpoint());
    Ok(config)
}

fn build_predictor(args: &ServiceArgs) -> Result<HttpPredictor, AppError> {
    let config = predictor_config(args)?;
    HttpPredictor::new(&config).map_err(AppError::from)
}

pub(crate) fn build_runtime() -> Result<tokio::runtime::Runtime, AppError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AppError::new(4, format!("Failed to start async runtime: {e}")))
}

/// Reject grids the front ends should not fan out.
pub fn check_sweep_size(range: &SweepRange) -> Result<usize, AppError> {
    let points = axis_grid(SweepAxis::NumericalAperture, range)?.len();
    if points > MAX_SWEEP_POINTS {
        return Err(AppError::new(
            2,
            format!("Sweep has {points} points; at most {MAX_SWEEP_POINTS} are allowed (raise --na-step)."),
        ));
    }
    Ok(points)
}

/// Remote failures become the generic notice; the detail goes to the log.
fn unreachable_notice(err: PredictError) -> AppError {
    if err.is_remote() {
        error!("prediction failed: {err}");
        AppError::new(4, PREDICTOR_UNREACHABLE)
    } else {
        AppError::from(err)
    }
}

/// Rewrite argv so `osis` defaults to `osis tui`.
///
/// Rules:
/// - `osis`                      -> `osis tui`
/// - `osis --na 0.6 ...`         -> `osis tui --na 0.6 ...`
/// - `osis --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "preview" | "predict" | "sweep" | "tui" | "dataset" | "evaluate"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["osis"])), argv(&["osis", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["osis", "--na", "0.6"])),
            argv(&["osis", "tui", "--na", "0.6"])
        );
        assert_eq!(rewrite_args(argv(&["osis", "sweep"])), argv(&["osis", "sweep"]));
        assert_eq!(rewrite_args(argv(&["osis", "--help"])), argv(&["osis", "--help"]));
    }

    #[test]
    fn sweep_size_is_capped() {
        assert_eq!(check_sweep_size(&SweepRange::default()).unwrap(), 8);
        let dense = SweepRange {
            min: 0.1,
            max: 1.0,
            step: 0.001,
        };
        assert_eq!(check_sweep_size(&dense).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn remote_failures_get_the_generic_notice() {
        let err = unreachable_notice(PredictError::Transport("connection refused".into()));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), PREDICTOR_UNREACHABLE);
        assert!(!err.to_string().contains("connection refused"));

        let err = unreachable_notice(PredictError::validation("numerical_aperture", "bad"));
        assert_eq!(err.exit_code(), 2);
    }
}
