//! Window functions for spreading between nodes and the oversampled grid.
//!
//! Each dimension of a plan gets its own [`Window`], parameterised by the
//! frequency extent `N`, the oversampled size `n` and the cutoff `m`. All
//! spatial arguments are measured in grid units, i.e. `v = n * x - l`.

use core::f64::consts::PI;

use libm::{exp, floor, sin, sinh, sqrt};

use crate::config::WindowKind;

/// Samples per grid unit in the linear-interpolation table.
pub const LIN_PSI_SAMPLES_PER_UNIT: usize = 1 << 12;

/// Modified Bessel function of the first kind, order zero.
pub fn bessel_i0(x: f64) -> f64 {
    let base = x * x / 4.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut j = 1.0;
    loop {
        term *= base / (j * j);
        let old = sum;
        sum += term;
        if sum == old || !sum.is_finite() {
            break;
        }
        j += 1.0;
    }
    sum
}

/// One dimension's window.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    kind: WindowKind,
    n: usize,
    m: usize,
    /// Shape parameter (`b` in the usual NFFT notation).
    b: f64,
    /// `exp(-r^2 / b)` for `r` in `0..2m+2`, Gaussian window only.
    fg_exp_l: Vec<f64>,
}

impl Window {
    pub fn new(kind: WindowKind, big_n: usize, n: usize, m: usize) -> Self {
        let sigma = n as f64 / big_n as f64;
        let mf = m as f64;
        let b = match kind {
            WindowKind::KaiserBessel => PI * (2.0 - 1.0 / sigma),
            WindowKind::Gaussian => 2.0 * sigma * mf / ((2.0 * sigma - 1.0) * PI),
        };
        let fg_exp_l = match kind {
            WindowKind::Gaussian => (0..2 * m + 2)
                .map(|r| {
                    let r = r as f64;
                    exp(-r * r / b)
                })
                .collect(),
            WindowKind::KaiserBessel => Vec::new(),
        };
        Self {
            kind,
            n,
            m,
            b,
            fg_exp_l,
        }
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    /// Number of grid points touched per node in this dimension.
    pub fn support(&self) -> usize {
        2 * self.m + 2
    }

    /// Window value at distance `v` (grid units) from a grid point.
    pub fn phi(&self, v: f64) -> f64 {
        let m = self.m as f64;
        match self.kind {
            WindowKind::KaiserBessel => {
                let r = m * m - v * v;
                if r > 0.0 {
                    let q = sqrt(r);
                    sinh(self.b * q) / (PI * q)
                } else if r < 0.0 {
                    let q = sqrt(-r);
                    sin(self.b * q) / (PI * q)
                } else {
                    self.b / PI
                }
            }
            WindowKind::Gaussian => exp(-v * v / self.b) / sqrt(PI * self.b),
        }
    }

    /// Fourier coefficient of the periodised window at frequency `k`,
    /// scaled by `n`.
    pub fn phi_hut(&self, k: isize) -> f64 {
        let w = 2.0 * PI * k as f64 / self.n as f64;
        match self.kind {
            WindowKind::KaiserBessel => {
                let r = (self.b * self.b - w * w).max(0.0);
                bessel_i0(self.m as f64 * sqrt(r))
            }
            WindowKind::Gaussian => exp(-self.b * w * w / 4.0),
        }
    }

    /// Position of node coordinate `x` on the oversampled grid, wrapped
    /// into `[-n/2, n/2]` so that `floor` stays far from `isize` limits.
    pub fn grid_position(&self, x: f64) -> f64 {
        self.n as f64 * (x - x.round())
    }

    /// First grid index (before wrapping) touched by a node at `u = n * x`.
    pub fn first_index(&self, u: f64) -> isize {
        floor(u) as isize - self.m as isize
    }

    /// Write the window values for a node at `u = n * x` into `out`
    /// (length [`support`](Self::support)); returns the first grid index.
    pub fn fill(&self, u: f64, out: &mut [f64]) -> isize {
        let l0 = self.first_index(u);
        for (r, w) in out.iter_mut().enumerate() {
            *w = self.phi(u - (l0 + r as isize) as f64);
        }
        l0
    }

    /// Per-node factors for fast Gaussian gridding: the window value at the
    /// first grid point without its `exp(-r^2/b)` term, and the ratio between
    /// consecutive points.
    pub fn fast_gaussian_factors(&self, u: f64) -> (isize, f64, f64) {
        let l0 = self.first_index(u);
        let s = u - l0 as f64;
        let head = exp(-s * s / self.b) / sqrt(PI * self.b);
        let ratio = exp(2.0 * s / self.b);
        (l0, head, ratio)
    }

    /// Expand fast Gaussian factors into window values.
    pub fn fill_fast_gaussian(&self, head: f64, ratio: f64, out: &mut [f64]) {
        let mut pow = head;
        for (w, &tail) in out.iter_mut().zip(&self.fg_exp_l) {
            *w = pow * tail;
            pow *= ratio;
        }
    }

    /// Tabulate the window on `[0, m + 1]` for linear interpolation.
    pub fn linear_table(&self) -> LinearTable {
        let k = LIN_PSI_SAMPLES_PER_UNIT;
        let len = (self.m + 1) * k + 2;
        let values = (0..len).map(|i| self.phi(i as f64 / k as f64)).collect();
        LinearTable { per_unit: k, values }
    }
}

/// Window samples on a uniform fine grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTable {
    per_unit: usize,
    values: Vec<f64>,
}

impl LinearTable {
    /// Interpolated window value at distance `v`.
    pub fn eval(&self, v: f64) -> f64 {
        let y = v.abs() * self.per_unit as f64;
        let i = floor(y) as usize;
        if i + 1 >= self.values.len() {
            return 0.0;
        }
        let frac = y - i as f64;
        self.values[i] + (self.values[i + 1] - self.values[i]) * frac
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
