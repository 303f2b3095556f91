//! Ratatui-based terminal UI.
//!
//! A form of physical inputs with a live derived-feature preview. Enter
//! submits the inputs; the prediction and NA sweep run on a background worker
//! and report back over a channel, tagged with their sweep generation. Only
//! the latest generation may touch the chart.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, warn};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{RunOutput, run_submission};
use crate::app::{PREDICTOR_UNREACHABLE, check_sweep_size, predictor_config, resolve_inputs};
use crate::cli::TuiArgs;
use crate::client::HttpPredictor;
use crate::domain::{InputDraft, PhysicalInputs, PredictionRequest, PredictionResponse, SweepSeries};
use crate::error::{AppError, PredictError};
use crate::physics::local_baseline_snr_db;
use crate::sweep::{SweepGeneration, SweepRange, SweepTicket};

mod plotters_chart;

use plotters_chart::SweepPlottersChart;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let inputs = resolve_inputs(&args.input)?;
    let range = args.range.to_range();
    check_sweep_size(&range)?;
    let predictor = HttpPredictor::new(&predictor_config(&args.service)?)?;
    let runtime = crate::app::build_runtime()?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(&inputs, range, predictor, runtime);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Form rows, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Wavelength,
    NumericalAperture,
    TrackPitch,
    LayerSpacing,
    LayerCount,
    Material,
    ThermalConductivity,
    ActivationEnergy,
    Temperature,
    Humidity,
    Prml,
    Ctc,
}

impl Field {
    const ALL: [Field; 12] = [
        Field::Wavelength,
        Field::NumericalAperture,
        Field::TrackPitch,
        Field::LayerSpacing,
        Field::LayerCount,
        Field::Material,
        Field::ThermalConductivity,
        Field::ActivationEnergy,
        Field::Temperature,
        Field::Humidity,
        Field::Prml,
        Field::Ctc,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::Wavelength => "Wavelength (nm)",
            Field::NumericalAperture => "NA",
            Field::TrackPitch => "Track pitch (nm)",
            Field::LayerSpacing => "Layer spacing (nm)",
            Field::LayerCount => "Layers",
            Field::Material => "Material",
            Field::ThermalConductivity => "Thermal cond. (W/m·K)",
            Field::ActivationEnergy => "Activation (eV)",
            Field::Temperature => "Temperature (°C)",
            Field::Humidity => "Humidity (%)",
            Field::Prml => "PRML",
            Field::Ctc => "CTC",
        }
    }

    fn is_text(self) -> bool {
        !matches!(self, Field::Material | Field::Prml | Field::Ctc)
    }
}

/// Form contents as typed. Numeric fields stay text until parsed.
#[derive(Debug, Clone)]
struct Form {
    text: [String; 12],
    material: crate::domain::RecordingMaterial,
    prml: bool,
    ctc: bool,
}

impl Form {
    fn from_inputs(inputs: &PhysicalInputs) -> Self {
        let mut text: [String; 12] = Default::default();
        text[0] = inputs.wavelength_nm.to_string();
        text[1] = inputs.numerical_aperture.to_string();
        text[2] = inputs.track_pitch_nm.to_string();
        text[3] = inputs.layer_spacing_nm.to_string();
        text[4] = inputs.layer_count.to_string();
        text[6] = inputs.thermal_conductivity_w_mk.to_string();
        text[7] = inputs.activation_energy_ev.to_string();
        text[8] = inputs.temperature_c.to_string();
        text[9] = inputs.relative_humidity.to_string();
        Self {
            text,
            material: inputs.recording_material,
            prml: inputs.prml_enabled,
            ctc: inputs.ctc_enabled,
        }
    }

    fn index(field: Field) -> usize {
        Field::ALL.iter().position(|&f| f == field).unwrap_or(0)
    }

    fn text(&self, field: Field) -> &str {
        &self.text[Self::index(field)]
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        &mut self.text[Self::index(field)]
    }

    fn number(&self, field: Field) -> Option<f64> {
        let raw = self.text(field).trim();
        if raw.is_empty() {
            None
        } else {
            // Unparseable text previews as NaN and fails submission as "not a number".
            Some(raw.parse().unwrap_or(f64::NAN))
        }
    }

    fn draft(&self) -> InputDraft {
        InputDraft {
            wavelength_nm: self.number(Field::Wavelength),
            numerical_aperture: self.number(Field::NumericalAperture),
            track_pitch_nm: self.number(Field::TrackPitch),
            layer_spacing_nm: self.number(Field::LayerSpacing),
            layer_count: self.number(Field::LayerCount),
            thermal_conductivity_w_mk: self.number(Field::ThermalConductivity),
            activation_energy_ev: self.number(Field::ActivationEnergy),
            temperature_c: self.number(Field::Temperature),
            relative_humidity: self.number(Field::Humidity),
            recording_material: Some(self.material),
            prml_enabled: self.prml,
            ctc_enabled: self.ctc,
        }
    }

    fn display(&self, field: Field) -> String {
        match field {
            Field::Material => self.material.as_str().to_string(),
            Field::Prml => on_off(self.prml).to_string(),
            Field::Ctc => on_off(self.ctc).to_string(),
            _ => self.text(field).to_string(),
        }
    }
}

/// The single "current chart" slot.
///
/// Installing a series releases the previous one first; nothing else writes
/// to the slot, so a failed sweep leaves it as it was.
#[derive(Debug, Default)]
struct ChartSlot {
    series: Option<SweepSeries>,
}

impl ChartSlot {
    fn install(&mut self, series: SweepSeries) {
        drop(self.series.take());
        self.series = Some(series);
    }

    fn current(&self) -> Option<&SweepSeries> {
        self.series.as_ref()
    }
}

/// A finished background job.
struct Outcome {
    ticket: SweepTicket,
    result: Result<RunOutput, PredictError>,
}

/// The latest accepted single-point answer.
struct Prediction {
    request: PredictionRequest,
    response: PredictionResponse,
}

struct App {
    form: Form,
    selected: usize,
    range: SweepRange,
    predictor: HttpPredictor,
    runtime: tokio::runtime::Runtime,
    generation: SweepGeneration,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
    in_flight: bool,
    chart: ChartSlot,
    prediction: Option<Prediction>,
    status: String,
    updated_at: Option<String>,
}

impl App {
    fn new(
        inputs: &PhysicalInputs,
        range: SweepRange,
        predictor: HttpPredictor,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            form: Form::from_inputs(inputs),
            selected: 0,
            range,
            predictor,
            runtime,
            generation: SweepGeneration::new(),
            tx,
            rx,
            in_flight: false,
            chart: ChartSlot::default(),
            prediction: None,
            status: "Enter to predict + sweep.".to_string(),
            updated_at: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.drain_outcomes() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn selected_field(&self) -> Field {
        Field::ALL[self.selected]
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let field = self.selected_field();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(Field::ALL.len() - 1),
            KeyCode::Left | KeyCode::Right => {
                let forward = code == KeyCode::Right;
                match field {
                    Field::Material => {
                        self.form.material = if forward {
                            self.form.material.next()
                        } else {
                            self.form.material.prev()
                        };
                    }
                    Field::Prml => self.form.prml = !self.form.prml,
                    Field::Ctc => self.form.ctc = !self.form.ctc,
                    _ => {}
                }
            }
            KeyCode::Char(' ') if !field.is_text() => {
                match field {
                    Field::Material => self.form.material = self.form.material.next(),
                    Field::Prml => self.form.prml = !self.form.prml,
                    Field::Ctc => self.form.ctc = !self.form.ctc,
                    _ => {}
                }
            }
            KeyCode::Char(c) if field.is_text() && (c.is_ascii_digit() || matches!(c, '.' | '-' | 'e')) => {
                self.form.text_mut(field).push(c);
            }
            KeyCode::Backspace if field.is_text() => {
                self.form.text_mut(field).pop();
            }
            KeyCode::Enter => self.submit(),
            _ => {}
        }
        false
    }

    /// Validate the form and hand the job to a background worker.
    fn submit(&mut self) {
        let inputs = match self.form.draft().complete() {
            Ok(inputs) => inputs,
            Err(e) => {
                self.status = e.to_string();
                return;
            }
        };

        let ticket = self.generation.begin();
        let predictor = self.predictor.clone();
        let range = self.range;
        let tx = self.tx.clone();
        let handle = self.runtime.handle().clone();

        // A plain thread drives the job with `Handle::block_on`, so the
        // submission future does not have to be `Send`.
        std::thread::spawn(move || {
            let result = handle.block_on(run_submission(&predictor, inputs, &range));
            let _ = tx.send(Outcome { ticket, result });
        });

        self.in_flight = true;
        self.status = format!("Predicting… (sweep #{})", self.generation.current());
    }

    /// Apply finished jobs. Returns `true` if anything changed.
    fn drain_outcomes(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => {
                    self.apply(outcome);
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    fn apply(&mut self, outcome: Outcome) {
        if !outcome.ticket.is_current() {
            warn!(
                "discarding superseded sweep #{} (latest #{})",
                outcome.ticket.id(),
                self.generation.current()
            );
            return;
        }
        self.in_flight = false;
        self.updated_at = Some(Local::now().format("%H:%M:%S").to_string());

        let run = match outcome.result {
            Ok(run) => run,
            Err(e) if e.is_remote() => {
                error!("prediction failed: {e}");
                self.status = format!("{PREDICTOR_UNREACHABLE}.");
                return;
            }
            Err(e) => {
                self.status = e.to_string();
                return;
            }
        };

        self.prediction = Some(Prediction {
            request: run.request,
            response: run.prediction,
        });

        match run.sweep {
            Ok(series) => {
                self.status = format!("Sweep done ({} points).", series.len());
                self.chart.install(series);
            }
            Err(e) => {
                error!("sweep failed: {e}");
                self.status = "Sweep failed; chart unchanged.".to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let gray = Style::default().fg(Color::Gray);
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("osis", Style::default().fg(Color::Cyan)),
            Span::raw(" · optical storage SNR"),
        ]));

        match &self.prediction {
            Some(p) => {
                lines.push(Line::from(Span::styled(
                    format!(
                        "predicted {:.2} dB = physics {:.2} dB {:+.2} dB ML residual",
                        p.response.predicted_snr_db, p.response.physics_snr_db, p.response.ml_residual_db
                    ),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    format!(
                        "at λ={}nm NA={:.3} | local physics {:.2} dB",
                        p.request.inputs().wavelength_nm,
                        p.request.numerical_aperture(),
                        local_baseline_snr_db(p.request.inputs(), p.request.derived())
                    ),
                    gray,
                )));
            }
            None => lines.push(Line::from(Span::styled("no prediction yet", gray))),
        }

        if let Some(peak) = self.chart.current().and_then(SweepSeries::peak) {
            lines.push(Line::from(Span::styled(
                format!(
                    "best NA {:.2} → {:.2} dB over [{:.2}, {:.2}]",
                    peak.numerical_aperture, peak.predicted_snr_db, self.range.min, self.range.max
                ),
                gray,
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(0)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(chunks[0]);

        self.draw_form(frame, left[0]);
        self.draw_preview(frame, left[1]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = Field::ALL
            .iter()
            .map(|&f| ListItem::new(format!("{:<22} {}", f.label(), self.form.display(f))))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Inputs").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_preview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let derived = self.form.draft().preview();
        let lines = vec![
            Line::from(format!("spot size  {:>10.2} nm", derived.spot_size_nm)),
            Line::from(format!("ISI        {:>10.4}", derived.isi_factor)),
            Line::from(format!("crosstalk  {:>10.4}", derived.crosstalk_factor)),
        ];
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Derived (live)").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("NA sweep").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = self.chart.current() else {
            let msg = Paragraph::new("No sweep yet. Press Enter.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let xy = series.xy();
        let (x_bounds, y_bounds) = chart_bounds(&xy);
        let marker = self.prediction.as_ref().and_then(|p| {
            let x = p.request.numerical_aperture();
            (x >= x_bounds[0] && x <= x_bounds[1]).then_some((x, p.response.predicted_snr_db))
        });

        let widget = SweepPlottersChart {
            series: &xy,
            peak: series.peak().map(|p| (p.numerical_aperture, p.predicted_snr_db)),
            marker,
            x_bounds,
            y_bounds,
            x_label: "NA",
            y_label: "SNR (dB)",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ field  type/⌫ edit  ←/→ toggle  Enter submit  q quit";
        let mut spans = vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
        ];
        if self.in_flight {
            spans.push(Span::styled("⟳ ", Style::default().fg(Color::Cyan)));
        }
        spans.push(Span::styled(&self.status, Style::default().fg(Color::Yellow)));
        if let Some(at) = &self.updated_at {
            spans.push(Span::styled(format!(" (updated {at})"), Style::default().fg(Color::Gray)));
        }
        let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Axis bounds for a sweep, with a little vertical headroom.
fn chart_bounds(xy: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in xy {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !(x_min.is_finite() && x_max.is_finite()) || x_max <= x_min {
        let mid = if x_min.is_finite() { x_min } else { 0.5 };
        x_min = mid - 0.05;
        x_max = mid + 0.05;
    }
    if !(y_min.is_finite() && y_max.is_finite()) || y_max <= y_min {
        let mid = if y_min.is_finite() { y_min } else { 0.0 };
        y_min = mid - 0.5;
        y_max = mid + 0.5;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
