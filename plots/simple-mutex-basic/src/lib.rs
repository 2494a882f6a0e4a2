use std::path::{Path, PathBuf};

use common::config::Settings;
use eyre::{Context, Result};
use plotters::{
    coord::{
        ranged1d::{Ranged, SegmentedCoord, ValueFormatter},
        types::{RangedCoordf64, RangedCoordu32},
    },
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use simple_mutex::{
    Implementation, ReportFormat,
    result::{BenchReport, CsSensitivitySeries, Fairness, ThroughputSeries},
};
use tracing::{debug, warn};

const CANDIDATE_COLOR: RGBColor = RGBColor(31, 119, 180);
const REFERENCE_COLOR: RGBColor = RGBColor(255, 127, 14);
const BAR_COLORS: [RGBColor; 2] = [RGBColor(255, 107, 107), RGBColor(78, 205, 196)];

fn line_color(implementation: Implementation) -> RGBColor {
    match implementation {
        Implementation::Simple => CANDIDATE_COLOR,
        Implementation::Pthread => REFERENCE_COLOR,
    }
}

/// Divides every value by the first one. `None` if there is no first value
/// or it is zero.
pub fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let first = *values.first()?;
    if first == 0.0 {
        return None;
    }
    Some(values.iter().map(|value| value / first).collect())
}

/// One category slot per bar. Segmented ranges include their end value.
fn bar_axis(bars: usize) -> SegmentedCoord<RangedCoordu32> {
    (0u32..bars.saturating_sub(1) as u32).into_segmented()
}

fn bar_label(entries: &[(Implementation, f64)], x: &SegmentValue<u32>) -> String {
    match x {
        SegmentValue::CenterOf(idx) => entries
            .get(*idx as usize)
            .map(|(implementation, _)| implementation.key().to_owned())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

struct LineChart<'c> {
    title: &'c str,
    x_desc: &'c str,
    y_desc: &'c str,
    log_x: bool,
    x: Vec<f64>,
    x_bounds: (f64, f64),
    lines: [(Implementation, Vec<f64>); 2],
    ideal: Option<f64>,
}

impl<'c> LineChart<'c> {
    fn new(
        title: &'c str,
        x_desc: &'c str,
        y_desc: &'c str,
        x: Vec<f64>,
        lines: [(Implementation, Vec<f64>); 2],
    ) -> Self {
        let x_bounds = (
            x.iter().copied().fold(f64::INFINITY, f64::min),
            x.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        );
        Self {
            title,
            x_desc,
            y_desc,
            log_x: false,
            x,
            x_bounds,
            lines,
            ideal: None,
        }
    }

    fn log_x(mut self) -> Self {
        self.log_x = true;
        self
    }

    fn ideal(mut self, level: f64) -> Self {
        self.ideal = Some(level);
        self
    }
}

/// Renders the charts of one simple mutex report. Every chart gets its own
/// drawing area which is presented before the call returns.
pub struct SimpleMutexBasic<'a> {
    settings: &'a Settings,
    format: &'a ReportFormat,
}

impl<'a> SimpleMutexBasic<'a> {
    pub fn new(settings: &'a Settings, format: &'a ReportFormat) -> Self {
        Self { settings, format }
    }

    /// Renders every chart that has data, in a fixed order
    pub fn plot_all(&self, report: &BenchReport) -> Result<Vec<PathBuf>> {
        let written = [
            self.plot_throughput(&report.throughput, None)?,
            self.plot_scalability(&report.throughput, None)?,
            self.plot_fairness(&report.fairness, None)?,
            self.plot_cs_sensitivity(&report.cs_sensitivity, None)?,
        ];
        Ok(written.into_iter().flatten().collect())
    }

    pub fn plot_throughput(
        &self,
        series: &ThroughputSeries,
        output: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        if series.is_empty() {
            debug!("No throughput data");
            return Ok(None);
        }
        let path = self.destination(output, &self.settings.files.throughput);
        self.draw_line_chart(
            &path,
            &LineChart::new(
                "Mutex Throughput vs Contention",
                "Number of Threads",
                "Throughput (M ops/sec)",
                series.keys().iter().map(|&x| x as f64).collect(),
                [
                    (Implementation::Simple, series.candidate().to_vec()),
                    (Implementation::Pthread, series.reference().to_vec()),
                ],
            ),
        )?;
        println!("Saved throughput plot to {}", path.display());
        Ok(Some(path))
    }

    pub fn plot_scalability(
        &self,
        series: &ThroughputSeries,
        output: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        if series.is_empty() {
            debug!("No throughput data to normalize");
            return Ok(None);
        }
        let (Some(candidate), Some(reference)) =
            (normalize(series.candidate()), normalize(series.reference()))
        else {
            warn!("Single thread throughput is zero, skipping scalability plot");
            return Ok(None);
        };
        let path = self.destination(output, &self.settings.files.scalability);
        self.draw_line_chart(
            &path,
            &LineChart::new(
                "Mutex Scalability",
                "Number of Threads",
                "Normalized Throughput (vs 1 thread)",
                series.keys().iter().map(|&x| x as f64).collect(),
                [
                    (Implementation::Simple, candidate),
                    (Implementation::Pthread, reference),
                ],
            )
            .ideal(1.0),
        )?;
        println!("Saved scalability plot to {}", path.display());
        Ok(Some(path))
    }

    pub fn plot_fairness(
        &self,
        fairness: &Fairness,
        output: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let entries: Vec<(Implementation, f64)> = fairness.entries().collect();
        if entries.is_empty() {
            debug!("No fairness data");
            return Ok(None);
        }
        let path = self.destination(output, &self.settings.files.fairness);
        self.draw_bar_chart(&path, &entries)?;
        println!("Saved fairness chart to {}", path.display());
        Ok(Some(path))
    }

    pub fn plot_cs_sensitivity(
        &self,
        series: &CsSensitivitySeries,
        output: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        // A logarithmic axis has no place for a zero sized critical section
        let rows: Vec<usize> = (0..series.len())
            .filter(|&idx| series.keys()[idx] > 0)
            .collect();
        if rows.is_empty() {
            debug!("No critical section data");
            return Ok(None);
        }
        let pick = |values: &[f64]| rows.iter().map(|&idx| values[idx]).collect::<Vec<_>>();
        let path = self.destination(output, &self.settings.files.cs_sensitivity);
        self.draw_line_chart(
            &path,
            &LineChart::new(
                "Performance vs Critical Section Size",
                "Critical Section Size (ns, log scale)",
                "Throughput (K ops/sec)",
                rows.iter().map(|&idx| series.keys()[idx] as f64).collect(),
                [
                    (Implementation::Simple, pick(series.candidate())),
                    (Implementation::Pthread, pick(series.reference())),
                ],
            )
            .log_x(),
        )?;
        println!("Saved CS sensitivity plot to {}", path.display());
        Ok(Some(path))
    }

    fn destination(&self, output: Option<&Path>, filename: &str) -> PathBuf {
        output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.output_path(filename))
    }

    fn px(&self, points: f64) -> u32 {
        self.settings.font_px(points).round() as u32
    }

    fn font(&self, points: f64) -> FontDesc<'static> {
        ("sans-serif", self.settings.font_px(points)).into_font()
    }

    fn caption_font(&self) -> FontDesc<'static> {
        self.font(14.0)
    }

    fn draw_bar_chart(&self, path: &Path, entries: &[(Implementation, f64)]) -> Result<()> {
        let root = BitMapBackend::new(path, self.settings.pixels(self.settings.bar_figure))
            .into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("Mutex Fairness Comparison", self.caption_font())
            .margin(self.px(10.0))
            .x_label_area_size(self.px(30.0))
            .y_label_area_size(self.px(50.0))
            .build_cartesian_2d(bar_axis(entries.len()), 0.0..1.1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Fairness Ratio (min/max)")
            .x_label_formatter(&|x: &SegmentValue<u32>| bar_label(entries, x))
            .axis_desc_style(self.font(12.0))
            .label_style(self.font(11.0))
            .draw()?;

        let value_style =
            TextStyle::from(self.font(11.0)).pos(Pos::new(HPos::Center, VPos::Bottom));
        for (idx, (implementation, value)) in entries.iter().enumerate() {
            let color = BAR_COLORS[idx % BAR_COLORS.len()];
            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(color.filled())
                        .margin(self.px(30.0))
                        .data([(idx as u32, *value)]),
                )?
                .label(self.format.label(*implementation))
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled())
                });
            chart.draw_series(std::iter::once(Text::new(
                format!("{value:.3}"),
                (SegmentValue::CenterOf(idx as u32), value + 0.01),
                value_style.clone(),
            )))?;
        }
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(self.font(11.0))
            .draw()?;
        root.present()
            .wrap_err_with(|| format!("Write {}", path.display()))?;
        Ok(())
    }

    fn draw_line_chart(&self, path: &Path, spec: &LineChart<'_>) -> Result<()> {
        let root = BitMapBackend::new(path, self.settings.pixels(self.settings.line_figure))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = spec.x_bounds;
        let y_max = spec
            .lines
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .chain(spec.ideal)
            .filter(|y| y.is_finite())
            .fold(0.0, f64::max);
        let y_range = 0.0..if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        let mut builder = ChartBuilder::on(&root);
        builder
            .caption(spec.title, self.caption_font())
            .margin(self.px(10.0))
            .x_label_area_size(self.px(30.0))
            .y_label_area_size(self.px(50.0));
        if spec.log_x {
            let mut chart =
                builder.build_cartesian_2d((x_min / 1.5..x_max * 1.5).log_scale(), y_range)?;
            self.draw_lines(&mut chart, spec)?;
        } else {
            let pad = ((x_max - x_min) * 0.05).max(0.5);
            let mut chart = builder.build_cartesian_2d(x_min - pad..x_max + pad, y_range)?;
            self.draw_lines(&mut chart, spec)?;
        }
        root.present()
            .wrap_err_with(|| format!("Write {}", path.display()))?;
        Ok(())
    }

    fn draw_lines<'b, X>(
        &self,
        chart: &mut ChartContext<'b, BitMapBackend<'b>, Cartesian2d<X, RangedCoordf64>>,
        spec: &LineChart<'_>,
    ) -> Result<()>
    where
        X: Ranged<ValueType = f64> + ValueFormatter<f64>,
    {
        chart
            .configure_mesh()
            .x_desc(spec.x_desc)
            .y_desc(spec.y_desc)
            .axis_desc_style(self.font(12.0))
            .label_style(self.font(10.0))
            .draw()?;

        let width = self.px(1.5).max(1);
        let marker = self.px(4.0) as i32;
        for (implementation, values) in &spec.lines {
            let color = line_color(*implementation);
            let points: Vec<(f64, f64)> =
                spec.x.iter().copied().zip(values.iter().copied()).collect();
            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(width)))?
                .label(self.format.label(*implementation))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
                });
            match implementation {
                Implementation::Simple => chart.draw_series(PointSeries::of_element(
                    points,
                    marker,
                    color.filled(),
                    &|c, s, st| EmptyElement::at(c) + Circle::new((0, 0), s, st),
                ))?,
                Implementation::Pthread => chart.draw_series(PointSeries::of_element(
                    points,
                    marker,
                    color.filled(),
                    &|c, s, st| EmptyElement::at(c) + Rectangle::new([(-s, -s), (s, s)], st),
                ))?,
            };
        }

        if let Some(level) = spec.ideal {
            let ideal = BLACK.mix(0.5);
            let (x_min, x_max) = spec.x_bounds;
            chart
                .draw_series(LineSeries::new(
                    [(x_min, level), (x_max, level)],
                    ideal.stroke_width(width),
                ))?
                .label("Ideal")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], ideal.stroke_width(width))
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(self.font(11.0))
            .draw()?;
        Ok(())
    }
}
