//! Regular-grid FFT used by the fast transforms.
//!
//! The one-dimensional FFTs come from `rustfft`. A process-wide
//! [`FftBackend`] owns the cache of planned lengths; it is set
//! up once by [`init`] (or by constructing a plan with `fftw_init`) and is
//! read-only for plans afterwards apart from the cache lock taken while a
//! plan is being built. [`GridFft`] applies those FFTs along every axis of a
//! row-major d-dimensional grid.

use std::sync::{Arc, Mutex, OnceLock};

use hashbrown::HashMap;
use log::debug;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

static BACKEND: OnceLock<FftBackend> = OnceLock::new();

/// Process-wide FFT state.
pub struct FftBackend {
    /// Planned FFTs keyed by `(length, inverse)`.
    cache: Mutex<HashMap<(usize, bool), Arc<dyn Fft<f64>>>>,
}

/// Initialise the FFT backend. Calling it again is a no-op.
pub fn init() -> &'static FftBackend {
    BACKEND.get_or_init(|| {
        debug!("initialising FFT backend");
        FftBackend {
            cache: Mutex::new(HashMap::new()),
        }
    })
}

/// The backend, if [`init`] has run.
pub fn backend() -> Option<&'static FftBackend> {
    BACKEND.get()
}

pub fn is_initialized() -> bool {
    BACKEND.get().is_some()
}

impl FftBackend {
    /// A planned FFT of length `len`, shared between plans.
    pub fn plan(&self, len: usize, direction: FftDirection) -> Arc<dyn Fft<f64>> {
        let inverse = direction == FftDirection::Inverse;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            cache
                .entry((len, inverse))
                .or_insert_with(|| FftPlanner::new().plan_fft(len, direction)),
        )
    }

    /// Number of distinct `(length, direction)` pairs planned so far.
    pub fn cached_plans(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Multi-dimensional FFT over a row-major grid with dimension 0 slowest.
pub struct GridFft {
    dims: Vec<usize>,
    forward: Vec<Arc<dyn Fft<f64>>>,
    inverse: Vec<Arc<dyn Fft<f64>>>,
    scratch: Vec<Complex64>,
    line: Vec<Complex64>,
    /// Copy of the input for out-of-place runs that must preserve it.
    staging: Vec<Complex64>,
    destroy_input: bool,
}

impl GridFft {
    pub fn new(backend: &FftBackend, dims: &[usize], destroy_input: bool) -> Self {
        let forward: Vec<_> = dims
            .iter()
            .map(|&n| backend.plan(n, FftDirection::Forward))
            .collect();
        let inverse: Vec<_> = dims
            .iter()
            .map(|&n| backend.plan(n, FftDirection::Inverse))
            .collect();
        let scratch_len = forward
            .iter()
            .chain(&inverse)
            .map(|f| {
                f.get_inplace_scratch_len()
                    .max(f.get_outofplace_scratch_len())
            })
            .max()
            .unwrap_or(0);
        let longest = dims.iter().copied().max().unwrap_or(0);
        Self {
            dims: dims.to_vec(),
            forward,
            inverse,
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
            line: vec![Complex64::new(0.0, 0.0); longest],
            staging: Vec::new(),
            destroy_input,
        }
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transform `buf` in place.
    pub fn process(&mut self, direction: FftDirection, buf: &mut [Complex64]) {
        debug_assert_eq!(buf.len(), self.len());
        let last = self.dims.len() - 1;
        let fft = Arc::clone(self.fft(direction, last));
        let scratch_len = fft.get_inplace_scratch_len();
        fft.process_with_scratch(buf, &mut self.scratch[..scratch_len]);
        self.strided_axes(direction, buf);
    }

    /// Transform `input` into `output`. Unless the plan allows destroying its
    /// input, `input` is left untouched.
    pub fn process_out_of_place(
        &mut self,
        direction: FftDirection,
        input: &mut [Complex64],
        output: &mut [Complex64],
    ) {
        debug_assert_eq!(input.len(), self.len());
        debug_assert_eq!(output.len(), self.len());
        let last = self.dims.len() - 1;
        let fft = Arc::clone(self.fft(direction, last));
        let scratch_len = fft.get_outofplace_scratch_len();
        let scratch = &mut self.scratch[..scratch_len];
        if self.destroy_input {
            fft.process_outofplace_with_scratch(input, output, scratch);
        } else {
            self.staging.clear();
            self.staging.extend_from_slice(input);
            fft.process_outofplace_with_scratch(&mut self.staging, output, scratch);
        }
        self.strided_axes(direction, output);
    }

    fn fft(&self, direction: FftDirection, axis: usize) -> &Arc<dyn Fft<f64>> {
        match direction {
            FftDirection::Forward => &self.forward[axis],
            FftDirection::Inverse => &self.inverse[axis],
        }
    }

    /// Apply the FFT along every axis except the contiguous last one.
    fn strided_axes(&mut self, direction: FftDirection, buf: &mut [Complex64]) {
        let d = self.dims.len();
        for axis in (0..d.saturating_sub(1)).rev() {
            let len = self.dims[axis];
            let stride: usize = self.dims[axis + 1..].iter().product();
            let outer: usize = self.dims[..axis].iter().product();
            let fft = Arc::clone(self.fft(direction, axis));
            let scratch_len = fft.get_inplace_scratch_len();
            for o in 0..outer {
                for i in 0..stride {
                    let base = o * len * stride + i;
                    let line = &mut self.line[..len];
                    for (l, v) in line.iter_mut().enumerate() {
                        *v = buf[base + l * stride];
                    }
                    fft.process_with_scratch(line, &mut self.scratch[..scratch_len]);
                    for (l, v) in line.iter().enumerate() {
                        buf[base + l * stride] = *v;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    fn naive_dft_2d(data: &[Complex64], rows: usize, cols: usize, sign: f64) -> Vec<Complex64> {
        let mut out = vec![Complex64::new(0.0, 0.0); rows * cols];
        for k0 in 0..rows {
            for k1 in 0..cols {
                let mut acc = Complex64::new(0.0, 0.0);
                for l0 in 0..rows {
                    for l1 in 0..cols {
                        let phase = sign
                            * 2.0
                            * PI
                            * ((k0 * l0) as f64 / rows as f64 + (k1 * l1) as f64 / cols as f64);
                        acc += data[l0 * cols + l1] * Complex64::from_polar(1.0, phase);
                    }
                }
                out[k0 * cols + k1] = acc;
            }
        }
        out
    }

    fn sample(len: usize) -> Vec<Complex64> {
        (0..len)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect()
    }

    #[test]
    fn init_is_idempotent() {
        let a = init() as *const FftBackend;
        let b = init() as *const FftBackend;
        assert_eq!(a, b);
        assert!(is_initialized());
        assert!(backend().is_some());
    }

    #[test]
    fn plans_are_cached() {
        let backend = init();
        let a = backend.plan(24, FftDirection::Forward);
        let b = backend.plan(24, FftDirection::Forward);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(backend.cached_plans() >= 1);
    }

    #[test]
    fn grid_matches_naive_dft_in_place() {
        let (rows, cols) = (6, 10);
        let data = sample(rows * cols);
        let mut grid = GridFft::new(init(), &[rows, cols], true);
        for (direction, sign) in [(FftDirection::Forward, -1.0), (FftDirection::Inverse, 1.0)] {
            let mut buf = data.clone();
            grid.process(direction, &mut buf);
            let expected = naive_dft_2d(&data, rows, cols, sign);
            for (a, b) in buf.iter().zip(&expected) {
                assert!((*a - *b).norm() < 1e-10, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn out_of_place_preserves_input_unless_allowed() {
        let (rows, cols) = (4, 8);
        let data = sample(rows * cols);
        let expected = naive_dft_2d(&data, rows, cols, -1.0);

        let mut grid = GridFft::new(init(), &[rows, cols], false);
        let mut input = data.clone();
        let mut output = vec![Complex64::new(0.0, 0.0); rows * cols];
        grid.process_out_of_place(FftDirection::Forward, &mut input, &mut output);
        assert_eq!(input, data);
        for (a, b) in output.iter().zip(&expected) {
            assert!((*a - *b).norm() < 1e-10);
        }

        let mut grid = GridFft::new(init(), &[rows, cols], true);
        let mut input = data.clone();
        grid.process_out_of_place(FftDirection::Forward, &mut input, &mut output);
        for (a, b) in output.iter().zip(&expected) {
            assert!((*a - *b).norm() < 1e-10);
        }
    }

    #[test]
    fn three_dimensional_roundtrip() {
        let dims = [4, 6, 8];
        let data = sample(dims.iter().product());
        let mut grid = GridFft::new(init(), &dims, true);
        let mut buf = data.clone();
        grid.process(FftDirection::Forward, &mut buf);
        grid.process(FftDirection::Inverse, &mut buf);
        let scale = buf.len() as f64;
        for (a, b) in buf.iter().zip(&data) {
            assert!((*a / scale - *b).norm() < 1e-12);
        }
    }
}
