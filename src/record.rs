use serde::Serialize;

use crate::parser::{ParsedMetrics, Timings};
use crate::sketch::SketchKind;

/// Result of one successful invocation of the external program.
///
/// Fields are private so a record cannot change once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    sketch: SketchKind,
    phi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    buckets: Option<u32>,
    #[serde(flatten)]
    metrics: ParsedMetrics,
}

impl RunRecord {
    pub fn new(sketch: SketchKind, phi: f64, buckets: Option<u32>, metrics: ParsedMetrics) -> Self {
        Self {
            sketch,
            phi,
            buckets,
            metrics,
        }
    }

    pub fn sketch(&self) -> SketchKind {
        self.sketch
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn buckets(&self) -> Option<u32> {
        self.buckets
    }

    pub fn timings(&self) -> Option<Timings> {
        self.metrics.timings
    }

    /// Value of `metric` for this record, or `None` when the record was
    /// parsed without it (timings at baseline level, buckets on a phi sweep).
    pub fn get(&self, metric: Metric) -> Option<f64> {
        let m = &self.metrics;
        match metric {
            Metric::Phi => Some(self.phi),
            Metric::Buckets => self.buckets.map(f64::from),
            Metric::Precision => Some(m.precision),
            Metric::Recall => Some(m.recall),
            Metric::SketchSize => Some(m.sketch_size as f64),
            Metric::RealK => Some(m.real_k as f64),
            Metric::TruePositives => Some(m.tp),
            Metric::FalsePositives => Some(m.fp),
            Metric::FalseNegatives => Some(m.fn_),
            Metric::StreamTime => m.timings.map(|t| t.stream_time),
            Metric::CountTime => m.timings.map(|t| t.count_time),
        }
    }
}

/// How an axis carrying a metric is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Plain,
    Bytes,
    Seconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Phi,
    Buckets,
    Precision,
    Recall,
    SketchSize,
    RealK,
    TruePositives,
    FalsePositives,
    FalseNegatives,
    StreamTime,
    CountTime,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::Phi => "phi",
            Metric::Buckets => "buckets",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::SketchSize => "sketch_size",
            Metric::RealK => "real_k",
            Metric::TruePositives => "tp",
            Metric::FalsePositives => "fp",
            Metric::FalseNegatives => "fn",
            Metric::StreamTime => "stream_time",
            Metric::CountTime => "count_time",
        }
    }

    /// Axis title: `sketch_size` becomes `Sketch Size`.
    pub fn title(self) -> String {
        self.name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn axis_kind(self) -> AxisKind {
        match self {
            Metric::SketchSize => AxisKind::Bytes,
            Metric::StreamTime | Metric::CountTime => AxisKind::Seconds,
            _ => AxisKind::Plain,
        }
    }
}

/// Records from one sweep call, in the sweep's parameter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SweepResultSet {
    records: Vec<RunRecord>,
}

impl SweepResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, other: SweepResultSet) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RunRecord> {
        self.records.iter()
    }

    /// Records of one variant, in sweep order.
    pub fn for_sketch(&self, sketch: SketchKind) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(move |r| r.sketch == sketch)
    }
}

impl FromIterator<RunRecord> for SweepResultSet {
    fn from_iter<I: IntoIterator<Item = RunRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SweepResultSet {
    type Item = &'a RunRecord;
    type IntoIter = std::slice::Iter<'a, RunRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
