//! Gradation curve plotted against its envelope.
//!
//! [`ChartData`] is always available so callers can feed their own plotting
//! layer. PNG rendering needs the `chart` feature.
//!
//! Openings run largest-first on a logarithmic axis, as on the laboratory
//! sheet. The axis is laid out in [`axis_position`] units, `-log10(opening)`,
//! so that plain linear coordinates increase to the right while openings
//! decrease.

use std::ops::Range;

use serde::Serialize;

use crate::gradation::GradationResult;

/// Margin factor applied to both ends of the logarithmic opening axis.
const OPENING_MARGIN: f64 = 1.25;

/// Horizontal position of an opening on the chart axis.
///
/// # Examples
/// ```
/// use concretelab::chart::{axis_position, opening_at};
///
/// assert!(axis_position(37.5) < axis_position(4.75));
/// assert!((opening_at(axis_position(4.75)) - 4.75).abs() < 1e-12);
/// ```
#[must_use]
pub fn axis_position(opening_mm: f64) -> f64 {
    -opening_mm.log10()
}

/// Opening in millimetres at a horizontal axis position.
#[must_use]
pub fn opening_at(position: f64) -> f64 {
    10_f64.powf(-position)
}

/// Points of a gradation chart, largest opening first.
///
/// Sieves with a non-positive opening cannot sit on a logarithmic axis and are
/// left out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartData {
    /// Chart title, the aggregate class when known.
    pub title: String,
    /// `(opening mm, passing %)` of the sample.
    pub curve: Vec<(f64, f64)>,
    /// `(opening mm, upper limit %)` of the envelope.
    pub upper: Vec<(f64, f64)>,
    /// `(opening mm, lower limit %)` of the envelope.
    pub lower: Vec<(f64, f64)>,
}

impl ChartData {
    /// Collect the curve and bands of an analysis.
    #[must_use]
    pub fn from_result(result: &GradationResult) -> Self {
        let rows = result.rows().iter().filter(|row| row.limits.sieve_mm > 0.0);
        Self {
            title: result.class().unwrap_or("Gradation").to_string(),
            curve: rows
                .clone()
                .map(|row| (row.limits.sieve_mm, row.passing_pct))
                .collect(),
            upper: rows
                .clone()
                .map(|row| (row.limits.sieve_mm, row.limits.upper_pct))
                .collect(),
            lower: rows
                .map(|row| (row.limits.sieve_mm, row.limits.lower_pct))
                .collect(),
        }
    }

    /// Whether there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curve.is_empty()
    }

    /// Closed outline of the envelope band: the upper limits followed by the
    /// lower limits in reverse.
    #[must_use]
    pub fn band_outline(&self) -> Vec<(f64, f64)> {
        self.upper
            .iter()
            .chain(self.lower.iter().rev())
            .copied()
            .collect()
    }

    /// Horizontal axis range in [`axis_position`] units, largest opening
    /// first, with a margin on both sides; `None` without points.
    #[must_use]
    pub fn opening_axis(&self) -> Option<Range<f64>> {
        let openings = self.curve.iter().map(|&(opening, _)| opening);
        let smallest = openings.clone().fold(f64::INFINITY, f64::min);
        let largest = openings.fold(f64::NEG_INFINITY, f64::max);
        if smallest.is_finite() && largest.is_finite() {
            let left = axis_position(largest * OPENING_MARGIN);
            let right = axis_position(smallest / OPENING_MARGIN);
            Some(left..right)
        } else {
            None
        }
    }

    /// Passing axis range: 0 to 105 %, extended downwards when the curve goes
    /// negative.
    #[must_use]
    pub fn passing_range(&self) -> Range<f64> {
        let lowest = self
            .curve
            .iter()
            .chain(self.lower.iter())
            .map(|&(_, pct)| pct)
            .fold(0.0, f64::min);
        let bottom = if lowest < 0.0 { lowest - 5.0 } else { 0.0 };
        bottom..105.0
    }
}

#[cfg(feature = "chart")]
pub use self::render::render_png;

#[cfg(feature = "chart")]
mod render {
    use std::error::Error;
    use std::path::Path;

    use plotters::prelude::*;

    use super::{axis_position, opening_at, ChartData};
    use crate::errors::ExportError;
    use crate::gradation::GradationResult;

    /// Draw the passing curve of `result` over its envelope band into a PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptyChart`] when the analysis has no sieve with
    /// a positive opening and [`ExportError::Chart`] when drawing fails.
    pub fn render_png(
        result: &GradationResult,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), ExportError> {
        let data = ChartData::from_result(result);
        if data.is_empty() {
            return Err(ExportError::EmptyChart);
        }
        draw(&data, path, size).map_err(|error| ExportError::Chart(error.to_string()))
    }

    /// Points moved onto the reversed logarithmic axis.
    fn on_axis(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        points
            .iter()
            .map(|&(opening, pct)| (axis_position(opening), pct))
            .collect()
    }

    fn draw(data: &ChartData, path: &Path, size: (u32, u32)) -> Result<(), Box<dyn Error>> {
        let openings = data.opening_axis().ok_or("no openings to plot")?;

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&data.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(openings, data.passing_range())?;

        chart
            .configure_mesh()
            .x_desc("Sieve opening (mm)")
            .y_desc("Passing (%)")
            .x_label_formatter(&|position: &f64| format!("{:.2}", opening_at(*position)))
            .draw()?;

        let band = GREEN.mix(0.2);
        chart
            .draw_series(std::iter::once(Polygon::new(
                on_axis(&data.band_outline()),
                band.filled(),
            )))?
            .label("Envelope")
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], band.filled()));
        chart.draw_series(LineSeries::new(on_axis(&data.upper), &GREEN))?;
        chart.draw_series(LineSeries::new(on_axis(&data.lower), &GREEN))?;

        let curve = on_axis(&data.curve);
        chart
            .draw_series(LineSeries::new(curve.clone(), &BLUE))?
            .label("Sample")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        chart.draw_series(
            curve
                .into_iter()
                .map(|point| Circle::new(point, 3, BLUE.filled())),
        )?;

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}
