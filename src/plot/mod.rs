//! Visualization of inputs and results.
//!
//! - `ascii`: fixed-grid terminal plots (deterministic, golden-tested)
//! - `svg`: Plotters charts written to SVG files
//!
//! Styling is an explicit [`PlotStyle`] value passed at call time.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::domain::TableModel;
use crate::fit::BestFit;

/// An RGB triple.
pub type Rgb = (u8, u8, u8);

/// Colours and geometry for rendered charts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    /// Per-function colours, cycled in selection order.
    pub palette: Vec<Rgb>,
    /// Colour of test points that matched no function.
    pub unmatched: Rgb,
    /// Colour of the test-point-to-ideal deviation segments.
    pub deviation: Rgb,
    pub width: u32,
    pub height: u32,
    pub line_width: u32,
    pub point_size: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            palette: vec![
                (31, 119, 180),  // blue
                (44, 160, 44),   // green
                (255, 127, 14),  // orange
                (148, 103, 189), // purple
                (140, 86, 75),   // brown
                (23, 190, 207),  // cyan
            ],
            unmatched: (214, 39, 40),
            deviation: (0, 0, 0),
            width: 800,
            height: 600,
            line_width: 2,
            point_size: 3,
        }
    }
}

impl PlotStyle {
    /// Colour for the `idx`-th selected function.
    pub fn color(&self, idx: usize) -> Rgb {
        if self.palette.is_empty() {
            return (0, 0, 0);
        }
        self.palette[idx % self.palette.len()]
    }
}

/// A selected ideal function as a polyline sorted by `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCurve {
    pub train: String,
    pub ideal: String,
    pub points: Vec<(f64, f64)>,
}

/// Polylines for every selected ideal function, in selection order.
///
/// Selections naming a column the ideal table does not have are skipped.
pub fn selected_curves(ideal: &TableModel, best: &BestFit) -> Vec<SelectedCurve> {
    best.selection
        .iter()
        .filter_map(|(train, ideal_name)| {
            let series = ideal.column(ideal_name)?;
            let mut points: Vec<(f64, f64)> = ideal
                .x()
                .iter()
                .copied()
                .zip(series.values.iter().copied())
                .collect();
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            Some(SelectedCurve {
                train: train.to_string(),
                ideal: ideal_name.clone(),
                points,
            })
        })
        .collect()
}

/// Bounding box over every point, or `None` when there is nothing finite.
pub(crate) fn bounds<'a>(points: impl Iterator<Item = &'a (f64, f64)> + Clone) -> Option<((f64, f64), (f64, f64))> {
    let xs = crate::domain::table::finite_range(points.clone().map(|p| p.0))?;
    let ys = crate::domain::table::finite_range(points.map(|p| p.1))?;
    Some((xs, ys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Series;

    #[test]
    fn palette_cycles() {
        let style = PlotStyle::default();
        assert_eq!(style.color(0), style.color(style.palette.len()));

        let bare = PlotStyle {
            palette: vec![],
            ..PlotStyle::default()
        };
        assert_eq!(bare.color(3), (0, 0, 0));
    }

    #[test]
    fn curves_follow_selection_order_and_sort_by_x() {
        let ideal = TableModel::new(
            "ideal",
            vec![2.0, 0.0, 1.0],
            vec![Series::new("a", vec![20.0, 0.0, 10.0]), Series::new("b", vec![2.0, 0.0, 1.0])],
        )
        .unwrap();
        let best = BestFit {
            selection: [("t1", "b".to_string()), ("t2", "a".to_string()), ("t3", "zz".to_string())]
                .into_iter()
                .collect(),
            max_deviation: Default::default(),
            fits: vec![],
            skipped: vec![],
        };

        let curves = selected_curves(&ideal, &best);
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].ideal, "b");
        assert_eq!(curves[0].points, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(curves[1].train, "t2");
    }
}
