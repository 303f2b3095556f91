//! Text reports for the CLI.

use crate::app::pipeline::Evaluation;
use crate::domain::{PhysicalInputs, PredictionRequest, PredictionResponse, SweepSeries};
use crate::physics::{DerivedFeatures, local_baseline_snr_db, thermal_factor};

/// Derived features and the local physics estimate (no service involved).
pub fn format_preview(inputs: &PhysicalInputs, derived: &DerivedFeatures) -> String {
    let mut out = String::new();
    out.push_str("=== osis - derived features (local) ===\n");
    out.push_str(&format_inputs_line(inputs));
    out.push_str(&format_derived(derived));
    out.push_str(&format!(
        "thermal factor : {:.3e}\n",
        thermal_factor(inputs.activation_energy_ev, inputs.temperature_c)
    ));
    out.push_str(&format!(
        "physics SNR    : {:.2} dB (local estimate)\n",
        local_baseline_snr_db(inputs, derived)
    ));
    out
}

/// Single-point prediction with its physics / residual breakdown.
pub fn format_prediction(request: &PredictionRequest, response: &PredictionResponse) -> String {
    let mut out = String::new();
    out.push_str("=== osis - SNR prediction ===\n");
    out.push_str(&format_inputs_line(request.inputs()));
    out.push_str(&format_derived(request.derived()));
    out.push('\n');
    out.push_str(&format!("predicted SNR  : {:.2} dB\n", response.predicted_snr_db));
    out.push_str(&format!("  physics      : {:.2} dB\n", response.physics_snr_db));
    out.push_str(&format!("  ML residual  : {:+.2} dB\n", response.ml_residual_db));
    out.push_str(&format!(
        "  local physics: {:.2} dB (client crosstalk estimate)\n",
        local_baseline_snr_db(request.inputs(), request.derived())
    ));
    if !response.is_consistent() {
        out.push_str(&format!(
            "  note: breakdown off by {:+.3} dB\n",
            response.decomposition_gap()
        ));
    }
    out
}

/// NA vs predicted SNR table, in series order.
pub fn format_sweep_table(series: &SweepSeries) -> String {
    let peak = series.peak();
    let mut out = String::new();
    out.push_str(format!("{:>6} {:>12}", "NA", "SNR (dB)").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<12}", "", "").trim_end());
    out.push('\n');
    for p in series.points() {
        let marker = match peak {
            Some(best) if best.numerical_aperture == p.numerical_aperture => " *",
            _ => "",
        };
        out.push_str(&format!(
            "{:>6.2} {:>12.2}{marker}\n",
            p.numerical_aperture, p.predicted_snr_db
        ));
    }
    out
}

pub fn format_evaluation(eval: &Evaluation) -> String {
    let mut out = String::new();
    out.push_str("=== osis - predictor evaluation ===\n");
    out.push_str(&format!("samples        : {}\n", eval.metrics.n));
    out.push_str(&format!("R²             : {:.5}\n", eval.metrics.r2));
    out.push_str(&format!("RMSE           : {:.4} dB\n", eval.metrics.rmse));
    out.push_str(&format!("MAE            : {:.4} dB\n", eval.metrics.mae));
    out.push_str(&format!(
        "physics gap    : {:.4} dB mean |service - local|\n",
        eval.physics_gap_mae
    ));
    out
}

fn format_inputs_line(inputs: &PhysicalInputs) -> String {
    format!(
        "λ={}nm NA={:.3} pitch={:.1}nm layers={} spacing={:.0}nm material={} T={:.1}°C RH={:.0}% prml={} ctc={}\n",
        inputs.wavelength_nm,
        inputs.numerical_aperture,
        inputs.track_pitch_nm,
        inputs.layer_count,
        inputs.layer_spacing_nm,
        inputs.recording_material.as_str(),
        inputs.temperature_c,
        inputs.relative_humidity,
        on_off(inputs.prml_enabled),
        on_off(inputs.ctc_enabled),
    )
}

fn format_derived(derived: &DerivedFeatures) -> String {
    format!(
        "spot size      : {:.2} nm\nISI factor     : {:.4}\ncrosstalk      : {:.4} (client estimate)\n",
        derived.spot_size_nm, derived.isi_factor, derived.crosstalk_factor
    )
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SweepPoint;

    #[test]
    fn sweep_table_marks_peak() {
        let series = SweepSeries::from_grid_order(vec![
            SweepPoint { numerical_aperture: 0.60, predicted_snr_db: 18.0 },
            SweepPoint { numerical_aperture: 0.65, predicted_snr_db: 21.5 },
        ]);
        let expected = concat!(
            "    NA     SNR (dB)\n",
            "------ ------------\n",
            "  0.60        18.00\n",
            "  0.65        21.50 *\n",
        );
        assert_eq!(format_sweep_table(&series), expected);
    }

    #[test]
    fn prediction_report_shows_breakdown() {
        let request = PredictionRequest::from_inputs(PhysicalInputs::default()).unwrap();
        let response = PredictionResponse {
            predicted_snr_db: 41.25,
            physics_snr_db: 37.0,
            ml_residual_db: 4.25,
        };
        let txt = format_prediction(&request, &response);
        assert!(txt.contains("predicted SNR  : 41.25 dB"), "{txt}");
        assert!(txt.contains("ML residual  : +4.25 dB"), "{txt}");
        assert!(!txt.contains("note:"), "{txt}");
    }
}
