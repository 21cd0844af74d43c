//! Fixed-range histograms with equally sized bins.
//!
//! Values outside `[xmin, xmax)` are clamped into the first or last bin, so
//! every observation is counted.

use serde::{Deserialize, Serialize};

/// `nbins` equal bins over `[xmin, xmax)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    pub nbins: usize,
    pub xmin: f64,
    pub xmax: f64,
}

impl Binning {
    pub fn width(&self) -> f64 {
        (self.xmax - self.xmin) / self.nbins as f64
    }

    /// Bin holding `x`. NaN lands in the first bin.
    pub fn bin_of(&self, x: f64) -> usize {
        if x.is_nan() || x <= self.xmin {
            return 0;
        }
        let bin = ((x - self.xmin) / self.width()) as usize;
        bin.min(self.nbins - 1)
    }

    /// `[lower, upper)` boundaries of bin `i`.
    pub fn bounds(&self, i: usize) -> (f64, f64) {
        let width = self.width();
        (
            self.xmin + i as f64 * width,
            self.xmin + (i + 1) as f64 * width,
        )
    }
}

/// Convert counts to frequencies in place. Histograms without any count are
/// left untouched.
fn normalize(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        values.iter_mut().for_each(|v| *v /= total);
    }
}

fn take_log(values: &mut [f64]) {
    values.iter_mut().for_each(|v| *v = v.ln());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    binning: Binning,
    values: Vec<f64>,
}

impl Histogram {
    /// Every bin starts at `pseudocount`.
    pub fn new(binning: Binning, pseudocount: f64) -> Self {
        Histogram {
            binning,
            values: vec![pseudocount; binning.nbins],
        }
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn add(&mut self, x: f64) {
        let bin = self.binning.bin_of(x);
        self.values[bin] += 1.0;
    }

    pub fn value_at(&self, x: f64) -> f64 {
        self.values[self.binning.bin_of(x)]
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Add `other` bin by bin. Both histograms must share their binning.
    pub fn merge(&mut self, other: &Histogram) {
        debug_assert_eq!(self.binning, other.binning);
        self.values
            .iter_mut()
            .zip(&other.values)
            .for_each(|(a, b)| *a += b);
    }

    pub fn normalize(&mut self) {
        normalize(&mut self.values);
    }

    pub fn log(&mut self) {
        take_log(&mut self.values);
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.values.len() == self.binning.nbins
    }
}

/// Joint histogram of two values sharing one binning, stored row major
/// (`x` selects the row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    binning: Binning,
    values: Vec<f64>,
}

impl Histogram2D {
    pub fn new(binning: Binning, pseudocount: f64) -> Self {
        Histogram2D {
            binning,
            values: vec![pseudocount; binning.nbins * binning.nbins],
        }
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn offset(&self, x: f64, y: f64) -> usize {
        self.binning.bin_of(x) * self.binning.nbins + self.binning.bin_of(y)
    }

    pub fn add(&mut self, x: f64, y: f64) {
        let offset = self.offset(x, y);
        self.values[offset] += 1.0;
    }

    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        self.values[self.offset(x, y)]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.binning.nbins + j]
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn merge(&mut self, other: &Histogram2D) {
        debug_assert_eq!(self.binning, other.binning);
        self.values
            .iter_mut()
            .zip(&other.values)
            .for_each(|(a, b)| *a += b);
    }

    pub fn normalize(&mut self) {
        normalize(&mut self.values);
    }

    pub fn log(&mut self) {
        take_log(&mut self.values);
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.values.len() == self.binning.nbins * self.binning.nbins
    }
}
