//! ASCII plotting of sweep series for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - sweep points: `o`
//! - the best grid point: `*`
//! - segments between points: `-`

use crate::domain::SweepSeries;

/// Render NA (x) against predicted SNR (y).
pub fn render_sweep_plot(series: &SweepSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let xy = series.xy();

    let (x_min, x_max) = range(xy.iter().map(|&(x, _)| x)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(xy.iter().map(|&(_, y)| y)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let cells: Vec<(usize, usize)> = xy
        .iter()
        .map(|&(x, y)| (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height)))
        .collect();

    // Segments first so points can overlay.
    for w in cells.windows(2) {
        draw_line(&mut grid, w[0].0, w[0].1, w[1].0, w[1].1, '-');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }
    if let Some(peak) = series.peak() {
        let x = map_x(peak.numerical_aperture, x_min, x_max, width);
        let y = map_y(peak.predicted_snr_db, y_min, y_max, height);
        grid[y][x] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: NA=[{x_min:.2}, {x_max:.2}] | SNR=[{y_min:.2}, {y_max:.2}]dB\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() && max.is_finite() {
        // Single point or flat series: widen so it sits mid-plot.
        Some((min - 0.5, max + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SweepPoint;

    #[test]
    fn plot_golden_snapshot_small() {
        let series = SweepSeries::from_grid_order(vec![
            SweepPoint { numerical_aperture: 0.6, predicted_snr_db: 10.0 },
            SweepPoint { numerical_aperture: 0.7, predicted_snr_db: 20.0 },
        ]);

        let txt = render_sweep_plot(&series, 10, 5);
        let expected = concat!(
            "Plot: NA=[0.60, 0.70] | SNR=[9.50, 20.50]dB\n",
            "        -*\n",
            "      --\n",
            "    --\n",
            "  --\n",
            "o-\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_renders_blank_grid() {
        let txt = render_sweep_plot(&SweepSeries::default(), 10, 5);
        assert_eq!(txt.lines().count(), 6);
    }
}
