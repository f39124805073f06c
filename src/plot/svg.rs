//! SVG charts rendered with Plotters.
//!
//! Two charts per run:
//!
//! - fit chart: training points over the ideal function selected for them
//! - classification chart: test points, coloured by the function that absorbed
//!   them, with a deviation segment down to the ideal curve; unmatched points
//!   are drawn as crosses
//!
//! Rendering goes to an in-memory string first so the drawing code can be
//! exercised without touching the filesystem.

use std::path::Path;

use log::debug;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::domain::{ClassificationResult, TableModel};
use crate::error::AppError;
use crate::fit::BestFit;
use crate::plot::{PlotStyle, Rgb, SelectedCurve, bounds, selected_curves};

type Bounds = ((f64, f64), (f64, f64));

/// Render the fit chart and write it to `path`.
pub fn write_fit_chart(
    path: &Path,
    training: &TableModel,
    ideal: &TableModel,
    best: &BestFit,
    style: &PlotStyle,
) -> Result<(), AppError> {
    let svg = render_fit_svg(training, ideal, best, style)?;
    write_svg(path, &svg)
}

/// Render the classification chart and write it to `path`.
pub fn write_classification_chart(
    path: &Path,
    results: &[ClassificationResult],
    ideal: &TableModel,
    best: &BestFit,
    style: &PlotStyle,
) -> Result<(), AppError> {
    let svg = render_classification_svg(results, ideal, best, style)?;
    write_svg(path, &svg)
}

/// Fit chart as an SVG document.
pub fn render_fit_svg(
    training: &TableModel,
    ideal: &TableModel,
    best: &BestFit,
    style: &PlotStyle,
) -> Result<String, AppError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
        draw_fit(&root, training, ideal, best, style).map_err(chart_error)?;
        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

/// Classification chart as an SVG document.
pub fn render_classification_svg(
    results: &[ClassificationResult],
    ideal: &TableModel,
    best: &BestFit,
    style: &PlotStyle,
) -> Result<String, AppError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
        draw_classification(&root, results, ideal, best, style).map_err(chart_error)?;
        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

fn draw_fit<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    training: &TableModel,
    ideal: &TableModel,
    best: &BestFit,
    style: &PlotStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let curves = selected_curves(ideal, best);
    let mut all: Vec<(f64, f64)> = curves.iter().flat_map(|c| c.points.iter().copied()).collect();
    for train_name in best.selection.keys() {
        if let Some(series) = training.column(train_name) {
            all.extend(training.x().iter().copied().zip(series.values.iter().copied()));
        }
    }
    let ((x0, x1), (y0, y1)) = padded_bounds(bounds(all.iter()));

    let mut chart = ChartBuilder::on(root)
        .caption("Training data vs selected ideal functions", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    for (idx, curve) in curves.iter().enumerate() {
        let color = rgb(style.color(idx));
        let line = color.stroke_width(style.line_width);
        chart
            .draw_series(LineSeries::new(curve.points.iter().copied(), line))?
            .label(format!("{} (ideal for {})", curve.ideal, curve.train))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));

        if let Some(series) = training.column(&curve.train) {
            let size = style.point_size;
            chart
                .draw_series(
                    training
                        .x()
                        .iter()
                        .zip(&series.values)
                        .filter(|(x, y)| x.is_finite() && y.is_finite())
                        .map(|(&x, &y)| Circle::new((x, y), size, color.mix(0.5).filled())),
                )?
                .label(format!("{} (training)", curve.train))
                .legend(move |(x, y)| Circle::new((x + 10, y), size, color.mix(0.5).filled()));
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn draw_classification<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    results: &[ClassificationResult],
    ideal: &TableModel,
    best: &BestFit,
    style: &PlotStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let curves = selected_curves(ideal, best);
    let all: Vec<(f64, f64)> = curves
        .iter()
        .flat_map(|c| c.points.iter().copied())
        .chain(results.iter().map(|r| (r.x, r.y_test)))
        .collect();
    let ((x0, x1), (y0, y1)) = padded_bounds(bounds(all.iter()));

    let mut chart = ChartBuilder::on(root)
        .caption("Test data mapped to ideal functions", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    for (idx, curve) in curves.iter().enumerate() {
        let line = rgb(style.color(idx)).stroke_width(style.line_width);
        chart
            .draw_series(LineSeries::new(curve.points.iter().copied(), line))?
            .label(curve.ideal.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));
    }

    let deviation = rgb(style.deviation);
    chart.draw_series(results.iter().filter_map(|r| {
        let ideal_y = r.ideal_y?;
        Some(PathElement::new(vec![(r.x, r.y_test), (r.x, ideal_y)], deviation.mix(0.6)))
    }))?;

    let size = style.point_size;
    chart.draw_series(
        matched_points(results, &curves)
            .into_iter()
            .map(|(p, idx)| Circle::new(p, size, rgb(style.color(idx)).filled())),
    )?;

    let unmatched = rgb(style.unmatched);
    chart
        .draw_series(
            results
                .iter()
                .filter(|r| !r.is_matched())
                .map(|r| Cross::new((r.x, r.y_test), size + 1, unmatched.stroke_width(2))),
        )?
        .label("unmatched")
        .legend(move |(x, y)| Cross::new((x + 10, y), size + 1, unmatched.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Each matched test point once, with the index of the first curve drawing
/// its ideal function (several training columns may share one).
fn matched_points(results: &[ClassificationResult], curves: &[SelectedCurve]) -> Vec<((f64, f64), usize)> {
    results
        .iter()
        .filter_map(|r| {
            let ideal = r.mapped_ideal.as_deref()?;
            let idx = curves.iter().position(|c| c.ideal == ideal)?;
            Some(((r.x, r.y_test), idx))
        })
        .collect()
}

fn rgb((r, g, b): Rgb) -> RGBColor {
    RGBColor(r, g, b)
}

/// 5% headroom on both axes; degenerate spans are widened to a unit box.
fn padded_bounds(b: Option<Bounds>) -> Bounds {
    let ((x0, x1), (y0, y1)) = b.unwrap_or(((0.0, 1.0), (0.0, 1.0)));
    (pad(x0, x1), pad(y0, y1))
}

fn pad(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span <= 0.0 {
        return (min - 0.5, max + 0.5);
    }
    let p = span * 0.05;
    (min - p, max + p)
}

fn write_svg(path: &Path, svg: &str) -> Result<(), AppError> {
    std::fs::write(path, svg)
        .map_err(|e| AppError::new(4, format!("Failed to write chart '{}': {e}", path.display())))?;
    debug!("Wrote chart {} ({} bytes)", path.display(), svg.len());
    Ok(())
}

fn chart_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> AppError {
    AppError::new(4, format!("Failed to render chart: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Series;
    use crate::fit::select_best_fit;

    fn fixture() -> (TableModel, TableModel, BestFit) {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let training = TableModel::new(
            "train",
            x.clone(),
            vec![
                Series::new("y1", vec![0.1, 1.0, 2.1, 2.9]),
                Series::new("y2", vec![5.0, 5.1, 4.9, 5.0]),
            ],
        )
        .unwrap();
        let ideal = TableModel::new(
            "ideal",
            x,
            vec![
                Series::new("y1", vec![0.0, 1.0, 2.0, 3.0]),
                Series::new("y2", vec![5.0, 5.0, 5.0, 5.0]),
            ],
        )
        .unwrap();
        let best = select_best_fit(&training, &ideal).unwrap();
        (training, ideal, best)
    }

    #[test]
    fn fit_chart_is_an_svg_document_with_legend() {
        let (training, ideal, best) = fixture();
        let svg = render_fit_svg(&training, &ideal, &best, &PlotStyle::default()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("y1 (ideal for y1)"));
        assert!(svg.contains("y2 (training)"));
    }

    #[test]
    fn classification_chart_labels_unmatched_points() {
        let (_, ideal, best) = fixture();
        let results = vec![
            ClassificationResult::matched(1.0, 1.05, "y1", 1.0),
            ClassificationResult::unmatched(2.0, 40.0),
        ];
        let svg = render_classification_svg(&results, &ideal, &best, &PlotStyle::default()).unwrap();
        assert!(svg.contains("unmatched"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn shared_ideal_function_draws_each_point_once() {
        let x = vec![0.0, 1.0, 2.0];
        let training = TableModel::new(
            "train",
            x.clone(),
            vec![
                Series::new("y1", vec![0.0, 1.0, 2.0]),
                Series::new("y2", vec![0.1, 1.1, 2.1]),
            ],
        )
        .unwrap();
        let ideal = TableModel::new("ideal", x, vec![Series::new("y7", vec![0.0, 1.0, 2.0])]).unwrap();
        let best = select_best_fit(&training, &ideal).unwrap();
        let curves = selected_curves(&ideal, &best);
        assert_eq!(curves.len(), 2);

        let results = vec![
            ClassificationResult::matched(1.0, 1.05, "y7", 1.0),
            ClassificationResult::unmatched(2.0, 40.0),
        ];
        assert_eq!(matched_points(&results, &curves), vec![((1.0, 1.05), 0)]);
    }

    #[test]
    fn degenerate_bounds_are_widened() {
        let ((x0, x1), _) = padded_bounds(None);
        assert!((x0 + 0.05).abs() < 1e-12 && (x1 - 1.05).abs() < 1e-12);
        assert_eq!(pad(2.0, 2.0), (1.5, 2.5));
    }
}
