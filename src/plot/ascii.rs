//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - selected ideal functions: `-` line
//! - training points: `o`
//! - test points: `m` (mapped), `x` (unmatched)

use crate::domain::{ClassificationResult, TableModel};
use crate::fit::BestFit;
use crate::plot::{bounds, selected_curves};

/// Training points over their selected ideal functions.
pub fn render_fit_plot(
    training: &TableModel,
    ideal: &TableModel,
    best: &BestFit,
    width: usize,
    height: usize,
) -> String {
    let curves: Vec<Vec<(f64, f64)>> = selected_curves(ideal, best)
        .into_iter()
        .map(|c| c.points)
        .collect();

    let mut marks = Vec::new();
    for train_name in best.selection.keys() {
        if let Some(series) = training.column(train_name) {
            marks.extend(
                training
                    .x()
                    .iter()
                    .zip(&series.values)
                    .map(|(&x, &y)| (x, y, 'o')),
            );
        }
    }

    render_plot("Training vs selected ideal functions", &curves, &marks, width, height)
}

/// Test points (mapped / unmatched) over the selected ideal functions.
pub fn render_classification_plot(
    results: &[ClassificationResult],
    ideal: &TableModel,
    best: &BestFit,
    width: usize,
    height: usize,
) -> String {
    let curves: Vec<Vec<(f64, f64)>> = selected_curves(ideal, best)
        .into_iter()
        .map(|c| c.points)
        .collect();

    let marks: Vec<(f64, f64, char)> = results
        .iter()
        .map(|r| (r.x, r.y_test, if r.is_matched() { 'm' } else { 'x' }))
        .collect();

    render_plot("Test mapping (m = mapped, x = unmatched)", &curves, &marks, width, height)
}

fn render_plot(
    title: &str,
    curves: &[Vec<(f64, f64)>],
    marks: &[(f64, f64, char)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all: Vec<(f64, f64)> = curves
        .iter()
        .flatten()
        .copied()
        .chain(marks.iter().map(|&(x, y, _)| (x, y)))
        .collect();
    let ((x_min, x_max), (y_min, y_max)) = bounds(all.iter()).unwrap_or(((0.0, 1.0), (0.0, 1.0)));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for curve in curves {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for &(x, y, ch) in marks {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = ch;
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "{title}: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let span = x_max - x_min;
    let u = if span > 0.0 {
        ((x - x_min) / span).clamp(0.0, 1.0)
    } else {
        0.5
    };
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else if grid[row][col] == ' ' {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
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
