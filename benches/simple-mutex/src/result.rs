use common::table::Row;
use eyre::Result;
use itertools::multiunzip;
use regex::Regex;
use tracing::debug;

use crate::{Implementation, ReportFormat};

/// Candidate and reference measurements keyed by an integer x value.
/// All three columns always have the same length.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ComparisonSeries {
    keys: Vec<u64>,
    candidate: Vec<f64>,
    reference: Vec<f64>,
}

/// Thread count against throughput in M ops/sec
pub type ThroughputSeries = ComparisonSeries;

/// Critical section size in ns against throughput in K ops/sec
pub type CsSensitivitySeries = ComparisonSeries;

impl FromIterator<Row> for ComparisonSeries {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        let (keys, candidate, reference) = multiunzip(
            iter.into_iter()
                .map(|row| (row.key, row.candidate, row.reference)),
        );
        Self {
            keys,
            candidate,
            reference,
        }
    }
}

impl ComparisonSeries {
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    pub fn candidate(&self) -> &[f64] {
        &self.candidate
    }

    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Fairness ratios (min/max per thread operations), each one optional
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Fairness {
    pub simple: Option<f64>,
    pub pthread: Option<f64>,
}

impl Fairness {
    pub fn get(&self, implementation: Implementation) -> Option<f64> {
        match implementation {
            Implementation::Simple => self.simple,
            Implementation::Pthread => self.pthread,
        }
    }

    /// Present entries, candidate first
    pub fn entries(&self) -> impl Iterator<Item = (Implementation, f64)> + '_ {
        Implementation::ALL
            .into_iter()
            .filter_map(move |implementation| Some((implementation, self.get(implementation)?)))
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_none() && self.pthread.is_none()
    }
}

/// Everything extracted from a single report
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BenchReport {
    pub throughput: ThroughputSeries,
    pub fairness: Fairness,
    pub cs_sensitivity: CsSensitivitySeries,
}

pub fn parse_throughput(output: &str, format: &ReportFormat) -> ThroughputSeries {
    let series: ThroughputSeries = format.throughput_table().scan(output).collect();
    debug!("Parsed {} throughput rows", series.len());
    series
}

pub fn parse_cs_sensitivity(output: &str, format: &ReportFormat) -> CsSensitivitySeries {
    let series: CsSensitivitySeries = format.cs_table().scan(output).collect();
    debug!("Parsed {} critical section rows", series.len());
    series
}

pub fn parse_fairness(output: &str, format: &ReportFormat) -> Result<Fairness> {
    // The candidate ratio is printed several lines below its label
    let re_simple = Regex::new(&format!(
        r"(?s){}.*?Fairness ratio.*?(\d+\.\d+)",
        regex::escape(&format.candidate_label)
    ))?;
    let re_pthread = Regex::new(&format!(
        r"{}.*?(\d+\.\d+)",
        regex::escape(&format.reference_fairness)
    ))?;

    let capture = |re: &Regex| {
        re.captures(output)
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().parse().ok())
    };
    let fairness = Fairness {
        simple: capture(&re_simple),
        pthread: capture(&re_pthread),
    };
    debug!("Parsed fairness {fairness:?}");
    Ok(fairness)
}

pub fn parse_output(output: &str, format: &ReportFormat) -> Result<BenchReport> {
    Ok(BenchReport {
        throughput: parse_throughput(output, format),
        fairness: parse_fairness(output, format)?,
        cs_sensitivity: parse_cs_sensitivity(output, format),
    })
}

#[cfg(test)]
mod tests {
    use common::table::Termination;

    use super::*;

    const REPORT: &str = include_str!("../testdata/simple_mutex_bench.txt");

    #[test]
    fn throughput_table() {
        let text = "\
Threads | simple_mutex_t | pthread_mutex_t
1 | 12.5 ops | 11.9 ops
2 | 20.1 ops | 18.0 ops
";
        let series = parse_throughput(text, &ReportFormat::default());
        assert_eq!(series.keys(), &[1, 2]);
        assert_eq!(series.candidate(), &[12.5, 20.1]);
        assert_eq!(series.reference(), &[11.9, 18.0]);
    }

    #[test]
    fn throughput_keeps_source_order_and_duplicates() {
        let text = "\
Threads | simple_mutex_t | pthread_mutex_t
4 | 3.0 | 2.0
1 | 9.0 | 8.0
4 | 3.5 | 2.5
";
        let series = parse_throughput(text, &ReportFormat::default());
        assert_eq!(series.keys(), &[4, 1, 4]);
        assert_eq!(series.candidate(), &[3.0, 9.0, 3.5]);
    }

    #[test]
    fn full_report() {
        let report = parse_output(REPORT, &ReportFormat::default()).unwrap();

        assert_eq!(report.throughput.keys(), &[1, 2, 4, 8]);
        assert_eq!(report.throughput.candidate(), &[45.12, 22.40, 15.02, 12.31]);
        assert_eq!(report.throughput.reference(), &[40.01, 18.75, 14.88, 13.90]);

        assert_eq!(report.fairness.simple, Some(0.873));
        assert_eq!(report.fairness.pthread, Some(0.912));

        assert_eq!(report.cs_sensitivity.keys(), &[10, 100, 1000, 10000]);
        assert_eq!(report.cs_sensitivity.candidate(), &[2100.5, 450.2, 95.4, 9.8]);
        assert_eq!(report.cs_sensitivity.reference(), &[1980.3, 430.1, 93.0, 9.7]);
    }

    #[test]
    fn scanning_to_end_of_input_picks_up_later_tables() {
        let format = ReportFormat {
            termination: Termination::EndOfInput,
            ..Default::default()
        };
        let series = parse_throughput(REPORT, &format);
        assert_eq!(series.keys(), &[1, 2, 4, 8, 10, 100, 1000, 10000]);
    }

    #[test]
    fn parsing_is_repeatable() {
        let format = ReportFormat::default();
        assert_eq!(
            parse_output(REPORT, &format).unwrap(),
            parse_output(REPORT, &format).unwrap()
        );
    }

    #[test]
    fn cs_rows_with_candidate_label_are_skipped() {
        let format = ReportFormat::default();
        let text = "CS Size (ns) | simple_mutex_t (K ops/sec) | pthread_mutex_t (K ops/sec)\n100 | 450.2 | 430.1\n";
        let series = parse_cs_sensitivity(text, &format);
        assert_eq!(series.keys(), &[100]);
        assert_eq!(series.candidate(), &[450.2]);
        assert_eq!(series.reference(), &[430.1]);

        let text = "CS Size (ns) | simple_mutex_t (K ops/sec) | pthread_mutex_t (K ops/sec)\n100 | 450.2 | 430.1 simple_mutex_t\n";
        assert!(parse_cs_sensitivity(text, &format).is_empty());
    }

    #[test]
    fn fairness_phrases() {
        let text = "\
Testing simple_mutex_t (not fair by design):
  Thread  0:   100 ops

  Fairness ratio (min/max): 0.873 (1.0 = perfectly fair)
Pthread fairness ratio 0.912
";
        let fairness = parse_fairness(text, &ReportFormat::default()).unwrap();
        assert_eq!(fairness.simple, Some(0.873));
        assert_eq!(fairness.pthread, Some(0.912));
        let keys: Vec<&str> = fairness.entries().map(|(i, _)| i.key()).collect();
        assert_eq!(keys, vec!["simple", "pthread"]);
    }

    #[test]
    fn pthread_ratio_must_share_its_line() {
        let text = "Pthread fairness ratio (min/max):\n0.912\n";
        let fairness = parse_fairness(text, &ReportFormat::default()).unwrap();
        assert_eq!(fairness.pthread, None);
    }

    #[test]
    fn no_tables_no_phrases() {
        let report = parse_output("nothing to see here\n| a | b |\n", &ReportFormat::default()).unwrap();
        assert!(report.throughput.is_empty());
        assert!(report.cs_sensitivity.is_empty());
        assert!(report.fairness.is_empty());
        assert_eq!(report.fairness.entries().count(), 0);
    }
}
