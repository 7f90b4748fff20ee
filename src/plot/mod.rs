//! Comparative line charts over sweep results.
//!
//! Records are grouped per sketch variant; each (variant, y metric) pair
//! becomes one curve. The first y metric is drawn solid, the second dashed.

pub mod axis;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use plotters::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::record::{Metric, SweepResultSet};
use crate::sketch::SketchKind;
use axis::AxisScale;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YSeries {
    pub metric: Metric,
    pub label: String,
}

impl YSeries {
    pub fn new(metric: Metric, label: impl Into<String>) -> Self {
        Self {
            metric,
            label: label.into(),
        }
    }
}

/// Horizontal line drawn at a fixed y value across the whole chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub y: f64,
    pub label: String,
}

/// What to draw and where to save it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub x: Metric,
    /// One or two metrics; only the first two are drawn.
    pub y: Vec<YSeries>,
    pub title: String,
    pub stem: String,
    pub x_desc: String,
    pub y_desc: String,
    /// Sort each variant's points by x instead of keeping sweep order.
    pub sort_by_x: bool,
    pub reference: Option<ReferenceLine>,
}

impl ChartSpec {
    pub fn new(x: Metric, y: Vec<YSeries>, title: impl Into<String>, stem: impl Into<String>) -> Self {
        Self {
            x,
            y,
            title: title.into(),
            stem: stem.into(),
            x_desc: x.title(),
            y_desc: "Percentage (%)".to_string(),
            sort_by_x: false,
            reference: None,
        }
    }

    pub fn x_desc(mut self, desc: impl Into<String>) -> Self {
        self.x_desc = desc.into();
        self
    }

    pub fn y_desc(mut self, desc: impl Into<String>) -> Self {
        self.y_desc = desc.into();
        self
    }

    pub fn sorted_by_x(mut self) -> Self {
        self.sort_by_x = true;
        self
    }

    pub fn reference(mut self, y: f64, label: impl Into<String>) -> Self {
        self.reference = Some(ReferenceLine {
            y,
            label: label.into(),
        });
        self
    }

    /// Precision and recall against phi.
    pub fn phi_sensitivity() -> Self {
        Self::new(
            Metric::Phi,
            accuracy_series(),
            "Precision/Recall vs Phi",
            "phi_sensitivity",
        )
    }

    /// Precision and recall against sketch footprint.
    pub fn memory_analysis() -> Self {
        Self::new(
            Metric::SketchSize,
            accuracy_series(),
            "Precision/Recall vs Sketch Size in Bytes",
            "memory_analysis",
        )
    }

    /// Precision and recall against time spent streaming into the sketch.
    pub fn update_time() -> Self {
        Self::new(
            Metric::StreamTime,
            accuracy_series(),
            "Precision and Recall vs Update Time",
            "precision_and_recall_vs_update_time",
        )
        .x_desc("Update Time (seconds)")
        .y_desc("Precision/Recall (%)")
        .sorted_by_x()
    }

    /// Stream time against sketch size, with the exact-count time of a full
    /// hash-map pass as the baseline.
    pub fn time_analysis(count_time: f64) -> Self {
        Self::new(
            Metric::SketchSize,
            vec![YSeries::new(Metric::StreamTime, "Stream Time")],
            "Streaming Time vs Sketch Size",
            "time_analysis",
        )
        .x_desc("Sketch Size (Bytes)")
        .y_desc("Time (seconds)")
        .reference(count_time, "Baseline Count Time")
    }
}

fn accuracy_series() -> Vec<YSeries> {
    vec![
        YSeries::new(Metric::Precision, "Precision"),
        YSeries::new(Metric::Recall, "Recall"),
    ]
}

/// One drawn line.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub sketch: SketchKind,
    pub style: LineStyle,
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Groups records by variant and extracts the points of every curve.
///
/// Variants without records, and records lacking the x or y metric, are
/// left out rather than treated as errors.
pub fn build_curves(results: &SweepResultSet, spec: &ChartSpec) -> Vec<Curve> {
    let styles = [LineStyle::Solid, LineStyle::Dashed];
    let mut curves = Vec::new();
    for sketch in SketchKind::ALL {
        let mut group: Vec<_> = results
            .for_sketch(sketch)
            .filter_map(|r| r.get(spec.x).map(|x| (x, r)))
            .collect();
        if group.is_empty() {
            continue;
        }
        if spec.sort_by_x {
            group.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        for (series, style) in spec.y.iter().zip(styles) {
            let points: Vec<(f64, f64)> = group
                .iter()
                .filter_map(|(x, r)| r.get(series.metric).map(|y| (*x, y)))
                .collect();
            if points.is_empty() {
                continue;
            }
            curves.push(Curve {
                sketch,
                style,
                label: format!("{} {}", sketch.label(), series.label),
                points,
            });
        }
    }
    curves
}

/// `<dir>/<stem>_<YYYYMMDD_HHMMSS>.png`, with `_<n>` appended when a file
/// from the same second already exists.
pub fn timestamped_path(dir: &Path, stem: &str, now: NaiveDateTime) -> PathBuf {
    let base = format!("{stem}_{}", now.format("%Y%m%d_%H%M%S"));
    let mut path = dir.join(format!("{base}.png"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{base}_{n}.png"));
        n += 1;
    }
    path
}

pub struct ChartRenderer {
    out_dir: PathBuf,
    size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            out_dir: out_dir.into(),
            size,
        }
    }

    /// Renders `spec` over `results` and returns the written file.
    pub fn render(&self, results: &SweepResultSet, spec: &ChartSpec) -> Result<PathBuf, PlotError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|source| PlotError::OutputDir {
            path: self.out_dir.clone(),
            source,
        })?;
        let path = timestamped_path(&self.out_dir, &spec.stem, Local::now().naive_local());
        let curves = build_curves(results, spec);

        draw_chart(&path, self.size, spec, &curves).map_err(|err| PlotError::Render {
            path: path.clone(),
            message: err.to_string(),
        })?;
        info!(path = %path.display(), curves = curves.len(), "saved chart");
        Ok(path)
    }
}

fn draw_chart(
    out_path: &Path,
    size: (u32, u32),
    spec: &ChartSpec,
    curves: &[Curve],
) -> Result<(), Box<dyn std::error::Error>> {
    let xs = curves.iter().flat_map(|c| c.points.iter().map(|p| p.0));
    let x_axis = AxisScale::fit(spec.x.axis_kind(), xs, false);

    let y_kind = spec
        .y
        .first()
        .map(|s| s.metric.axis_kind())
        .unwrap_or(crate::record::AxisKind::Plain);
    let ys = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|p| p.1))
        .chain(spec.reference.as_ref().map(|r| r.y));
    let y_axis = AxisScale::fit(y_kind, ys, true);

    let root = BitMapBackend::new(out_path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = (x_axis.lo, x_axis.hi);
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_axis, y_axis)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    if let Some(reference) = &spec.reference {
        let line = vec![(x_lo, reference.y), (x_hi, reference.y)];
        let style = RED.stroke_width(2);
        chart
            .draw_series(DashedLineSeries::new(line, 8, 6, style))?
            .label(reference.label.as_str())
            .legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (8, 0)], style)
                    + PathElement::new(vec![(12, 0), (20, 0)], style)
            });
    }

    for curve in curves {
        let color = curve.sketch.color();
        let style = color.stroke_width(2);
        let points = curve.points.iter().copied();
        match curve.style {
            LineStyle::Solid => {
                chart
                    .draw_series(LineSeries::new(points, style))?
                    .label(curve.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            }
            LineStyle::Dashed => {
                chart
                    .draw_series(DashedLineSeries::new(points, 8, 6, style))?
                    .label(curve.label.as_str())
                    .legend(move |(x, y)| {
                        EmptyElement::at((x, y))
                            + PathElement::new(vec![(0, 0), (8, 0)], style)
                            + PathElement::new(vec![(12, 0), (20, 0)], style)
                    });
            }
        }
        chart.draw_series(
            curve
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
        )?;
    }

    if !curves.is_empty() || spec.reference.is_some() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
