//! Multi-octave value noise.
//!
//! Each octave draws a coarse grid of uniform random values, blurs it with a
//! Gaussian kernel and resamples it up to the target size with cubic
//! interpolation. Octave `o` uses frequency `2^o` (the coarse grid shrinks)
//! and amplitude `0.5^o`. The sum is rescaled to `[0, 1]`.

use fastrand::Rng;
use tileworld_common::{GenError, GenResult};
use tracing::debug;

use crate::grid::{Grid, ScalarField};

/// Octaves used for elevation and moisture.
pub const DEFAULT_OCTAVES: u32 = 6;

/// Gaussian sigma applied to every coarse grid.
pub const SMOOTHING_SIGMA: f64 = 1.0;

/// Kernel radius in multiples of sigma.
const KERNEL_TRUNCATE: f64 = 4.0;

/// Value of every cell of a degenerate (flat) field after normalization.
pub const DEGENERATE_FILL: f64 = 0.0;

/// Synthesizes normalized scalar fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseFieldGenerator {
    octaves: u32,
}

impl NoiseFieldGenerator {
    /// Creates a generator with `octaves` layers.
    #[must_use]
    pub const fn new(octaves: u32) -> Self {
        Self { octaves }
    }

    /// Generates a `width` x `height` field with values in `[0, 1]`.
    ///
    /// A flat result (min == max) cannot be rescaled; it comes back as a
    /// constant field of [`DEGENERATE_FILL`].
    pub fn generate(&self, width: u32, height: u32, rng: &mut Rng) -> GenResult<ScalarField> {
        if width == 0 || height == 0 {
            return Err(GenError::InvalidDimensions { width, height });
        }
        let (out_cols, out_rows) = (width as usize, height as usize);
        let mut acc = vec![0.0; out_cols * out_rows];

        for octave in 0..self.octaves {
            let frequency = 2f64.powi(octave as i32);
            let amplitude = 0.5f64.powi(octave as i32);

            let rows = (f64::from(height) / frequency).ceil() as usize + 2;
            let cols = (f64::from(width) / frequency).ceil() as usize + 2;

            let coarse: Vec<f64> = (0..rows * cols).map(|_| rng.f64()).collect();
            let smoothed = gaussian_blur(&coarse, rows, cols, SMOOTHING_SIGMA);
            let resized = resample(&smoothed, rows, cols, out_rows, out_cols);

            for (a, r) in acc.iter_mut().zip(&resized) {
                *a += r * amplitude;
            }
        }

        normalize(width, height, acc)
    }
}

/// Rescales `values` linearly onto `[0, 1]`. Only an exactly flat input
/// (min == max) falls back to [`DEGENERATE_FILL`].
fn normalize(width: u32, height: u32, values: Vec<f64>) -> GenResult<ScalarField> {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        debug!(width, height, "Degenerate noise field, returning constant");
        return Grid::new(width, height, DEGENERATE_FILL);
    }

    Grid::from_cells(width, height, values.into_iter().map(|v| (v - lo) / span).collect())
}

impl Default for NoiseFieldGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_OCTAVES)
    }
}

/// Separable Gaussian blur with mirrored edges (`d c b a | a b c d | d c b a`).
fn gaussian_blur(data: &[f64], rows: usize, cols: usize, sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return data.to_vec();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    let mut horizontal = vec![0.0; data.len()];
    for r in 0..rows {
        for c in 0..cols {
            horizontal[r * cols + c] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * data[r * cols + reflect(c as isize + k as isize - radius, cols)])
                .sum();
        }
    }

    let mut out = vec![0.0; data.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[r * cols + c] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * horizontal[reflect(r as isize + k as isize - radius, rows) * cols + c])
                .sum();
        }
    }
    out
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (KERNEL_TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| (-0.5 * (i as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Mirrors an out-of-range index back into `0..len`.
fn reflect(index: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let m = index.rem_euclid(period);
    if m >= len as isize {
        (period - 1 - m) as usize
    } else {
        m as usize
    }
}

/// Cubic resampling; corner samples of input and output line up.
fn resample(data: &[f64], rows: usize, cols: usize, out_rows: usize, out_cols: usize) -> Vec<f64> {
    let mut wide = vec![0.0; rows * out_cols];
    for r in 0..rows {
        let line = &data[r * cols..(r + 1) * cols];
        for (c, v) in resample_line(line, out_cols).into_iter().enumerate() {
            wide[r * out_cols + c] = v;
        }
    }

    let mut out = vec![0.0; out_rows * out_cols];
    let mut column = vec![0.0; rows];
    for c in 0..out_cols {
        for (r, slot) in column.iter_mut().enumerate() {
            *slot = wide[r * out_cols + c];
        }
        for (r, v) in resample_line(&column, out_rows).into_iter().enumerate() {
            out[r * out_cols + c] = v;
        }
    }
    out
}

fn resample_line(line: &[f64], out_len: usize) -> Vec<f64> {
    let n = line.len();
    let last = n as isize - 1;
    let sample = |i: isize| line[i.clamp(0, last) as usize];
    let scale = if out_len > 1 {
        (n - 1) as f64 / (out_len - 1) as f64
    } else {
        0.0
    };

    (0..out_len)
        .map(|i| {
            let t = i as f64 * scale;
            let i0 = t.floor() as isize;
            let f = t - t.floor();
            catmull_rom(sample(i0 - 1), sample(i0), sample(i0 + 1), sample(i0 + 2), f)
        })
        .collect()
}

fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}
