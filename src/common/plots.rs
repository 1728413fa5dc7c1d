//! Plotting infrastructure for goal achievement time line charts
//!
//! This module renders multi-series line charts using the [`plotters`] crate. Charts are saved
//! as PNG files; the resolution and fonts come from [`PlotSettings`].

use plotters::coord::ranged1d::ValueFormatter;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Ten colour categorical palette; series beyond the tenth reuse colours from the start
const PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

/// Returns the palette colour for the series at `index`
pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Scaling of the X axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    /// Base 10 logarithmic; points with a non-positive X value cannot be shown and are dropped
    Log,
}

/// A labelled line of (x, y) points, drawn in the given order
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: AxisScale,
    pub series: Vec<Series>,
}

/// Image and font settings shared by every rendered chart
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub width: u32,
    pub height: u32,
    pub caption_size: f64,
    pub axis_description_size: f64,
    pub label_size: f64,
    pub legend_size: f64,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            caption_size: 40.0,
            axis_description_size: 30.0,
            label_size: 22.0,
            legend_size: 22.0,
        }
    }
}

impl PlotSettings {
    fn font(&self, size: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::Serif, size, FontStyle::Normal)
    }
}

/// Creates a multi-series line chart and saves it as a PNG file
///
/// # Arguments
/// * `plot` - Title, axis labels, X axis scaling and the series to draw
/// * `output_path` - Path where the PNG file should be saved
/// * `settings` - Resolution and font sizes
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If there is nothing to draw or an error occurred during rendering
///
/// # Chart Properties
/// * One line per series, coloured from a ten colour palette in series order
/// * Legend in the upper right corner listing every series label
/// * X axis linear or logarithmic (base 10) as requested, Y axis linear
/// * Axis ranges cover all points with a 5% margin on the Y axis
pub fn create_line_plot(plot: &LinePlot, output_path: &Path, settings: &PlotSettings) -> Result<()> {
    let series = drawable_series(plot)?;
    let (x_range, y_range) = axis_ranges(&series, plot.x_scale);

    let root = BitMapBackend::new(output_path, (settings.width, settings.height));
    let drawing_area = root.into_drawing_area();

    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut builder = ChartBuilder::on(&drawing_area);
    builder
        .caption(&plot.title, settings.font(settings.caption_size))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(90);

    match plot.x_scale {
        AxisScale::Linear => {
            let mut chart = builder
                .build_cartesian_2d(x_range, y_range)
                .map_err(|e| PlotError::ChartConfig(e.to_string()))?;
            draw_chart(&mut chart, plot, &series, settings)?;
        }
        AxisScale::Log => {
            let mut chart = builder
                .build_cartesian_2d(x_range.log_scale(), y_range)
                .map_err(|e| PlotError::ChartConfig(e.to_string()))?;
            draw_chart(&mut chart, plot, &series, settings)?;
        }
    }

    // Ensure everything is properly rendered and saved
    drawing_area
        .present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Draws mesh, lines and legend onto an already configured chart
fn draw_chart<'a, DB, X>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<X, RangedCoordf64>>,
    plot: &LinePlot,
    series: &[Series],
    settings: &PlotSettings,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    X: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let whole_number = |x: &f64| format!("{:.0}", x.round());

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .axis_desc_style(settings.font(settings.axis_description_size))
        .label_style(settings.font(settings.label_size));

    if plot.x_scale == AxisScale::Log {
        mesh.x_label_formatter(&whole_number);
    }

    mesh.draw().map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (index, line) in series.iter().enumerate() {
        let color = series_color(index);
        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                color.stroke_width(3),
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(line.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(3))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(settings.font(settings.legend_size))
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Removes points that cannot be drawn and rejects plots left with nothing to show
fn drawable_series(plot: &LinePlot) -> Result<Vec<Series>> {
    let series: Vec<Series> = plot
        .series
        .iter()
        .map(|line| Series {
            label: line.label.clone(),
            points: line
                .points
                .iter()
                .copied()
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .filter(|(x, _)| plot.x_scale == AxisScale::Linear || *x > 0.0)
                .collect(),
        })
        .filter(|line| !line.points.is_empty())
        .collect();

    if series.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "Plot '{}' has no drawable points",
            plot.title
        )));
    }

    Ok(series)
}

/// Calculates axis ranges covering every point
///
/// Degenerate ranges (a single distinct value) are widened so the chart stays valid.
fn axis_ranges(series: &[Series], x_scale: AxisScale) -> (Range<f64>, Range<f64>) {
    let points = || series.iter().flat_map(|line| line.points.iter());

    let x_min = points().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let x_max = points().map(|(x, _)| *x).fold(f64::NEG_INFINITY, f64::max);
    let y_min = points().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let y_max = points().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max);

    let x_range = match x_scale {
        AxisScale::Log => {
            // Ensure x_min >= 1.0 to avoid log(0) domain errors
            let x_min = x_min.max(1.0);
            let x_max = x_max.max(x_min);
            if x_min >= x_max {
                x_min..x_min * 10.0
            } else {
                x_min..x_max
            }
        }
        AxisScale::Linear => {
            if x_min >= x_max {
                x_min - 1.0..x_max + 1.0
            } else {
                x_min..x_max
            }
        }
    };

    let padding = if y_max > y_min {
        (y_max - y_min) * 0.05
    } else {
        (y_max.abs() * 0.05).max(0.5)
    };

    (x_range, y_min - padding..y_max + padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn plot(x_scale: AxisScale, series: Vec<Series>) -> LinePlot {
        LinePlot {
            title: "Test".to_string(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            x_scale,
            series,
        }
    }

    fn series(label: &str, points: &[(f64, f64)]) -> Series {
        Series {
            label: label.to_string(),
            points: points.to_vec(),
        }
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(series_color(0), series_color(10));
        assert_ne!(series_color(0), series_color(1));
    }

    #[test]
    fn empty_plots_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("empty.png");
        let settings = PlotSettings::default();

        let result = create_line_plot(&plot(AxisScale::Linear, vec![]), &output_path, &settings);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        let only_empty_series = plot(AxisScale::Linear, vec![series("a", &[])]);
        let result = create_line_plot(&only_empty_series, &output_path, &settings);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
        assert!(!output_path.exists());
    }

    #[test]
    fn log_scale_drops_non_positive_points() {
        let log_plot = plot(
            AxisScale::Log,
            vec![series("a", &[(0.0, 1.0), (10.0, 2.0)]), series("b", &[(0.0, 3.0)])],
        );

        let drawable = drawable_series(&log_plot).unwrap();
        assert_eq!(drawable, vec![series("a", &[(10.0, 2.0)])]);
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let linear_plot = plot(
            AxisScale::Linear,
            vec![series("a", &[(1.0, f64::NAN), (2.0, f64::INFINITY), (3.0, 1.5)])],
        );

        let drawable = drawable_series(&linear_plot).unwrap();
        assert_eq!(drawable[0].points, vec![(3.0, 1.5)]);
    }

    #[test]
    fn axis_ranges_cover_points_with_padding() {
        let lines = vec![series("a", &[(10.0, 1.0), (1000.0, 3.0)])];
        let (x_range, y_range) = axis_ranges(&lines, AxisScale::Log);

        assert_eq!(x_range, 10.0..1000.0);
        assert!((y_range.start - 0.9).abs() < 1e-10);
        assert!((y_range.end - 3.1).abs() < 1e-10);
    }

    #[test]
    fn degenerate_ranges_are_widened() {
        let lines = vec![series("a", &[(100.0, 2.0)])];

        let (x_range, y_range) = axis_ranges(&lines, AxisScale::Log);
        assert_eq!(x_range, 100.0..1000.0);
        assert!(y_range.start < 2.0 && y_range.end > 2.0);

        let (x_range, _) = axis_ranges(&lines, AxisScale::Linear);
        assert_eq!(x_range, 99.0..101.0);
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn renders_log_scale_plot() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("log.png");

        let log_plot = plot(
            AxisScale::Log,
            vec![
                series("A_STAR", &[(10.0, 1.0), (100.0, 1.0), (1000.0, 1.0)]),
                series("CES Backup Ratio: 1.0", &[(10.0, 2.5), (100.0, 1.8)]),
            ],
        );

        let result = create_line_plot(&log_plot, &output_path, &PlotSettings::default());
        assert!(result.is_ok());
        assert!(output_path.exists());

        let _ = fs::remove_file(&output_path);
    }
}
