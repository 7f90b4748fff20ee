//! Extracts run metrics from the external program's stdout.
//!
//! The program prints free-form text; every metric is anchored on a fixed
//! label, e.g. `precision: 95.00 percent` or
//! `True Positives: 12.000000\t False Positives: 1.000000`. Several labels may
//! share one line, so matching is not line-anchored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A label that is absent, or present with a value that does not fit the
/// field's type, leaves the metric missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("metric `{field}` missing from program output")]
    MissingMetric { field: &'static str },
}

impl ParseError {
    pub fn field(&self) -> &'static str {
        match self {
            ParseError::MissingMetric { field } => field,
        }
    }
}

/// Which label set the parser requires.
///
/// Older builds of the external program print only the accuracy block;
/// newer ones also print stream and count timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseLevel {
    Baseline,
    #[default]
    Timing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    pub stream_time: f64,
    pub count_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub sketch_size: u64,
    pub real_k: u64,
    pub tp: f64,
    pub fp: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
    pub timings: Option<Timings>,
}

const FLOAT: &str = r"([0-9]+(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?)";
const INT: &str = r"([0-9]+)";

struct Field {
    name: &'static str,
    re: Regex,
}

impl Field {
    fn new(name: &'static str, label: &str, value: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!(r"{label}:\s*{value}"))?;
        Ok(Self { name, re })
    }

    fn capture<'t>(&self, text: &'t str) -> Result<&'t str, ParseError> {
        self.re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(ParseError::MissingMetric { field: self.name })
    }

    fn value<T: std::str::FromStr>(&self, text: &str) -> Result<T, ParseError> {
        let raw = self.capture(text)?;
        raw.parse::<T>().map_err(|_| {
            debug!(field = self.name, raw, "unparsable metric value");
            ParseError::MissingMetric { field: self.name }
        })
    }

    fn float(&self, text: &str) -> Result<f64, ParseError> {
        self.value(text)
    }

    fn int(&self, text: &str) -> Result<u64, ParseError> {
        self.value(text)
    }
}

pub struct OutputParser {
    level: ParseLevel,
    precision: Field,
    recall: Field,
    sketch_size: Field,
    real_k: Field,
    tp: Field,
    fp: Field,
    fn_: Field,
    stream_time: Field,
    count_time: Field,
}

impl OutputParser {
    pub fn new(level: ParseLevel) -> Self {
        // Every pattern is assembled from the constants above.
        Self::build(level).expect("metric patterns are valid regexes")
    }

    fn build(level: ParseLevel) -> Result<Self, regex::Error> {
        Ok(Self {
            level,
            precision: Field::new("precision", r"\bprecision", FLOAT)?,
            recall: Field::new("recall", r"\brecall", FLOAT)?,
            sketch_size: Field::new("sketch_size", r"Size of Sketch in Bytes", INT)?,
            real_k: Field::new("real_k", r"Real K value", INT)?,
            tp: Field::new("tp", r"True Positives", FLOAT)?,
            fp: Field::new("fp", r"False Positives", FLOAT)?,
            fn_: Field::new("fn", r"False Negatives", FLOAT)?,
            stream_time: Field::new("stream_time", r"Time to stream items into sketch", FLOAT)?,
            count_time: Field::new("count_time", r"Time to count [0-9]+ items", FLOAT)?,
        })
    }

    /// Parses one run's stdout. Fails closed: any missing or malformed field
    /// rejects the whole run.
    pub fn parse(&self, output: &str) -> Result<ParsedMetrics, ParseError> {
        let timings = match self.level {
            ParseLevel::Baseline => None,
            ParseLevel::Timing => Some(Timings {
                stream_time: self.stream_time.float(output)?,
                count_time: self.count_time.float(output)?,
            }),
        };
        Ok(ParsedMetrics {
            precision: self.precision.float(output)?,
            recall: self.recall.float(output)?,
            sketch_size: self.sketch_size.int(output)?,
            real_k: self.real_k.int(output)?,
            tp: self.tp.float(output)?,
            fp: self.fp.float(output)?,
            fn_: self.fn_.float(output)?,
            timings,
        })
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new(ParseLevel::default())
    }
}
