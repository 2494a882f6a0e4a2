use std::path::{Path, PathBuf};

/// Where and how charts are written
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub dpi: u32,
    /// Figure size in inches for the line charts
    pub line_figure: (f64, f64),
    /// Figure size in inches for the fairness bar chart
    pub bar_figure: (f64, f64),
    pub files: ChartFiles,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFiles {
    pub throughput: String,
    pub scalability: String,
    pub fairness: String,
    pub cs_sensitivity: String,
}

impl Default for ChartFiles {
    fn default() -> Self {
        Self {
            throughput: "throughput.png".to_owned(),
            scalability: "scalability.png".to_owned(),
            fairness: "fairness.png".to_owned(),
            cs_sensitivity: "cs_sensitivity.png".to_owned(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            dpi: 150,
            line_figure: (10.0, 6.0),
            bar_figure: (8.0, 6.0),
            files: ChartFiles::default(),
        }
    }
}

impl Settings {
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Pixel dimensions of a figure given in inches
    pub fn pixels(&self, (width, height): (f64, f64)) -> (u32, u32) {
        let dpi = self.dpi as f64;
        ((width * dpi).round() as u32, (height * dpi).round() as u32)
    }

    /// Converts a typographic point size to pixels at the configured DPI
    pub fn font_px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }
}
