use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use common::config::Settings;
use eyre::Result;
use simple_mutex::ReportFormat;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod plot;

const USAGE: &str = "Usage: mutex-plots <benchmark_results.txt>";
const MODULES: &[&str] = &["common", "simple_mutex", "simple_mutex_basic"];

/// Render comparison charts from a simple_mutex_bench report
#[derive(Parser)]
struct Cli {
    /// Text report printed by simple_mutex_bench
    report: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    /// No report given, usage was printed
    Usage,
    Plotted(Vec<PathBuf>),
}

impl Outcome {
    fn exit_code(&self) -> u8 {
        match self {
            Outcome::Usage => 1,
            Outcome::Plotted(_) => 0,
        }
    }
}

fn run(cli: Cli, settings: &Settings, format: &ReportFormat) -> Result<Outcome> {
    let Some(report) = cli.report else {
        println!("{USAGE}");
        return Ok(Outcome::Usage);
    };
    Ok(Outcome::Plotted(plot::plot(&report, settings, format)?))
}

fn main() -> Result<ExitCode> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();

    let mut env_filter = EnvFilter::new(format!("mutex_plots={log_level}"));
    for module in MODULES {
        env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
    }
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    match run(args, &Settings::default(), &ReportFormat::default()) {
        Ok(outcome) => Ok(ExitCode::from(outcome.exit_code())),
        Err(err) => {
            error!("{err:#?}");
            Err(err)
        }
    }
}
