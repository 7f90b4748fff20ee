//! Axis ranges, tick placement and tick labels.
//!
//! [`AxisScale`] doubles as a plotters coordinate, so charts draw exactly the
//! ticks and labels computed here.

use std::ops::Range;

use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};

use crate::record::AxisKind;

/// `8192` -> `8KB`, `512` -> `512B`. Kilobytes are decimal.
pub fn format_bytes(bytes: f64) -> String {
    if bytes >= 1000.0 {
        format!("{:.0}KB", bytes / 1000.0)
    } else {
        format!("{}B", bytes.round() as i64)
    }
}

pub fn format_seconds(secs: f64) -> String {
    format!("{secs:.2}")
}

/// Shortest decimal form after dropping float noise from tick arithmetic.
pub fn format_plain(v: f64) -> String {
    let r = (v * 1e9).round() / 1e9;
    if r == 0.0 { "0".to_string() } else { format!("{r}") }
}

/// Tick spacing for time axes, chosen from the largest observed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeTicks {
    pub major: f64,
    pub minor: Option<f64>,
}

impl TimeTicks {
    pub fn for_max(max_secs: f64) -> Self {
        if max_secs < 1.0 {
            Self {
                major: 0.1,
                minor: Some(0.02),
            }
        } else if max_secs < 5.0 {
            Self {
                major: 0.5,
                minor: Some(0.1),
            }
        } else {
            Self {
                major: 1.0,
                minor: None,
            }
        }
    }
}

/// A 1-2-5 step giving roughly `target` intervals over `span`.
pub fn nice_step(span: f64, target: usize) -> f64 {
    if !(span > 0.0 && span.is_finite()) || target == 0 {
        return 1.0;
    }
    let raw = span / target as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

const MAX_TICKS: usize = 200;

/// Multiples of `step` inside `[lo, hi]`.
pub fn ticks_between(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || lo > hi {
        return Vec::new();
    }
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last)
        .take(MAX_TICKS)
        .map(|k| (k as f64 * step * 1e9).round() / 1e9)
        .collect()
}

/// Resolved range and tick marks for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    pub kind: AxisKind,
    pub lo: f64,
    pub hi: f64,
    pub major: Vec<f64>,
    pub minor: Vec<f64>,
}

impl AxisScale {
    /// Fits the axis around `values`. `from_zero` pins the lower bound to 0
    /// for quantities that are plotted against an absolute scale.
    pub fn fit(kind: AxisKind, values: impl IntoIterator<Item = f64>, from_zero: bool) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            min = 0.0;
            max = 1.0;
        }

        let (lo, hi) = if from_zero {
            let hi = if max > 0.0 { max * 1.05 } else { 1.0 };
            (0.0f64.min(min), hi)
        } else if (max - min).abs() < f64::EPSILON {
            let pad = if max == 0.0 { 1.0 } else { max.abs() * 0.1 };
            (min - pad, max + pad)
        } else {
            let pad = (max - min) * 0.05;
            (min - pad, max + pad)
        };

        let (major_step, minor_step) = match kind {
            AxisKind::Seconds => {
                let ticks = TimeTicks::for_max(max);
                (ticks.major, ticks.minor)
            }
            AxisKind::Bytes | AxisKind::Plain => (nice_step(hi - lo, 8), None),
        };
        let mut major = ticks_between(lo, hi, major_step);
        if major.len() >= MAX_TICKS {
            major = ticks_between(lo, hi, nice_step(hi - lo, 8));
        }
        let minor = match minor_step {
            Some(step) if ticks_between(lo, hi, step).len() < MAX_TICKS => {
                ticks_between(lo, hi, step)
            }
            _ => Vec::new(),
        };

        Self {
            kind,
            lo,
            hi,
            major,
            minor,
        }
    }

    pub fn label(&self, v: f64) -> String {
        match self.kind {
            AxisKind::Bytes => format_bytes(v),
            AxisKind::Seconds => format_seconds(v),
            AxisKind::Plain => format_plain(v),
        }
    }
}

impl Ranged for AxisScale {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = self.hi - self.lo;
        if span <= 0.0 {
            return (limit.0 + limit.1) / 2;
        }
        let frac = (value - self.lo) / span;
        limit.0 + ((limit.1 - limit.0) as f64 * frac + 1e-3).floor() as i32
    }

    /// Bold requests get the major ticks, light requests the minor ones.
    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            self.minor.clone()
        } else {
            self.major.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.lo..self.hi
    }
}

impl ValueFormatter<f64> for AxisScale {
    fn format_ext(&self, value: &f64) -> String {
        self.label(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_labels() {
        assert_eq!(format_bytes(8192.0), "8KB");
        assert_eq!(format_bytes(512.0), "512B");
        assert_eq!(format_bytes(1000.0), "1KB");
        assert_eq!(format_bytes(999.0), "999B");
        assert_eq!(format_bytes(0.0), "0B");
    }

    #[test]
    fn time_tick_thresholds() {
        assert_eq!(TimeTicks::for_max(0.4).major, 0.1);
        assert_eq!(TimeTicks::for_max(0.4).minor, Some(0.02));
        assert_eq!(TimeTicks::for_max(1.0).major, 0.5);
        assert_eq!(TimeTicks::for_max(4.99).minor, Some(0.1));
        assert_eq!(TimeTicks::for_max(5.0).major, 1.0);
        assert_eq!(TimeTicks::for_max(12.0).minor, None);
    }

    #[test]
    fn seconds_axis_uses_time_ticks() {
        let axis = AxisScale::fit(AxisKind::Seconds, [0.2, 0.8], false);
        assert!(axis.lo < 0.2 && axis.hi > 0.8);
        assert!(axis.major.contains(&0.5));
        assert!(axis.major.windows(2).all(|w| (w[1] - w[0] - 0.1).abs() < 1e-9));
        assert!(!axis.minor.is_empty());
        assert_eq!(axis.label(0.5), "0.50");
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(10.0, 10), 1.0);
        assert_eq!(nice_step(8000.0, 8), 1000.0);
        assert!((nice_step(0.009, 8) - 0.002).abs() < 1e-12);
        assert_eq!(nice_step(0.0, 8), 1.0);
    }

    #[test]
    fn ticks_are_clean_multiples() {
        let ticks = ticks_between(0.0005, 0.0105, 0.001);
        assert_eq!(ticks.first(), Some(&0.001));
        assert_eq!(ticks.last(), Some(&0.01));
        assert_eq!(ticks.len(), 10);
        assert_eq!(format_plain(ticks[6]), "0.007");
    }

    #[test]
    fn empty_axis_defaults_to_unit_range() {
        let axis = AxisScale::fit(AxisKind::Plain, std::iter::empty(), false);
        assert!(axis.lo < axis.hi);
        assert!(!axis.major.is_empty());
    }

    #[test]
    fn coordinate_maps_linearly_and_serves_ticks() {
        let axis = AxisScale::fit(AxisKind::Bytes, [512.0, 8192.0], true);
        assert_eq!(axis.map(&axis.lo, (0, 800)), 0);
        assert_eq!(axis.map(&axis.hi, (0, 800)), 800);
        assert_eq!(Ranged::range(&axis), axis.lo..axis.hi);
        assert_eq!(axis.format_ext(&8000.0), "8KB");
        assert_eq!(axis.format_ext(&500.0), "500B");
    }

    #[test]
    fn single_value_axis_is_padded() {
        let axis = AxisScale::fit(AxisKind::Bytes, [4096.0], false);
        assert!(axis.lo < 4096.0 && axis.hi > 4096.0);
    }
}
