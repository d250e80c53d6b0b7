//! Per-tick sample log.

use crate::types::Vec3;

/// One observation, taken at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Cumulative simulation time including this tick (s)
    pub t: f64,
    /// Light body velocity along X
    pub v1: f64,
    /// Heavy body velocity along X
    pub v2: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(t: f64, v1: f64, v2: f64, position: Vec3) -> Self {
        Self {
            t,
            v1,
            v2,
            x: position.x,
            y: position.y,
            z: position.z,
        }
    }
}

/// Anything that can be written as one delimited row.
pub trait Row {
    /// Field values in column order.
    fn fields(&self) -> Vec<f64>;
}

impl Row for Sample {
    fn fields(&self) -> Vec<f64> {
        vec![self.t, self.v1, self.v2, self.x, self.y, self.z]
    }
}

/// Append-only, ordered series of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<R = Sample> {
    samples: Vec<R>,
}

impl<R> Default for TimeSeries<R> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<R> TimeSeries<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: R) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// A fresh iterator from the first sample on every call.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.samples.iter()
    }

    pub fn last(&self) -> Option<&R> {
        self.samples.last()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.samples
    }
}

impl<'a, R> IntoIterator for &'a TimeSeries<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Owns the series during a run; hands out read-only views.
#[derive(Debug, Clone)]
pub struct TimeSeriesRecorder<R = Sample> {
    series: TimeSeries<R>,
}

impl<R> Default for TimeSeriesRecorder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> TimeSeriesRecorder<R> {
    pub fn new() -> Self {
        Self {
            series: TimeSeries::new(),
        }
    }

    pub fn record(&mut self, sample: R) {
        self.series.push(sample);
    }

    pub fn series(&self) -> &TimeSeries<R> {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
