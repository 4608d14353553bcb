//! Fast approximate transforms.
//!
//! Forward: deconvolve `f_hat` by the window's Fourier coefficients onto the
//! oversampled grid, FFT the grid, then interpolate at each node with the
//! window. The adjoint runs the transposed steps in reverse order.

use log::trace;
use rustfft::num_complex::Complex64;
use rustfft::FftDirection;

use crate::config::ResolvedConfig;
use crate::error::{NfftError, Result};
use crate::fft::{FftBackend, GridFft};
use crate::psi::Spreader;
use crate::window::Window;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Deconvolution by the window's Fourier coefficients, and the map from
/// coefficient order to the oversampled grid.
struct Deconvolution {
    big_n: Vec<usize>,
    n: Vec<usize>,
    /// Row-major strides of the oversampled grid.
    grid_strides: Vec<usize>,
    windows: Vec<Window>,
    /// `1 / phi_hut` per dimension, indexed by `k + N/2`; `None` evaluates
    /// the factors on each transform.
    phi_hut_inv: Option<Vec<Vec<f64>>>,
}

impl Deconvolution {
    fn new(big_n: &[usize], n: &[usize], windows: Vec<Window>, tabulate: bool) -> Self {
        let d = n.len();
        let mut grid_strides = vec![1; d];
        for t in (0..d.saturating_sub(1)).rev() {
            grid_strides[t] = grid_strides[t + 1] * n[t + 1];
        }
        let phi_hut_inv = tabulate.then(|| {
            windows
                .iter()
                .zip(big_n)
                .map(|(w, &big)| {
                    (0..big)
                        .map(|c| 1.0 / w.phi_hut(c as isize - (big / 2) as isize))
                        .collect()
                })
                .collect()
        });
        Self {
            big_n: big_n.to_vec(),
            n: n.to_vec(),
            grid_strides,
            windows,
            phi_hut_inv,
        }
    }

    /// Visit every coefficient with its grid index and deconvolution factor.
    fn for_each_coefficient(&self, mut f: impl FnMut(usize, usize, f64)) {
        let d = self.big_n.len();
        let total: usize = self.big_n.iter().product();
        let mut digits = vec![0usize; d];
        for i in 0..total {
            let mut grid = 0;
            let mut factor = 1.0;
            for t in 0..d {
                let k = digits[t] as isize - (self.big_n[t] / 2) as isize;
                grid += k.rem_euclid(self.n[t] as isize) as usize * self.grid_strides[t];
                factor *= match &self.phi_hut_inv {
                    Some(tables) => tables[t][digits[t]],
                    None => 1.0 / self.windows[t].phi_hut(k),
                };
            }
            f(i, grid, factor);
            for t in (0..d).rev() {
                digits[t] += 1;
                if digits[t] < self.big_n[t] {
                    break;
                }
                digits[t] = 0;
            }
        }
    }
}

/// Working state of the fast transforms for one plan.
pub(crate) struct FastTransform {
    deconv: Deconvolution,
    spreader: Spreader,
    grid_fft: GridFft,
    /// Grid in node space.
    g: Vec<Complex64>,
    /// Grid in frequency space for out-of-place FFTs.
    g_hat: Option<Vec<Complex64>>,
}

impl FastTransform {
    pub fn new(cfg: &ResolvedConfig, backend: &FftBackend) -> Self {
        let windows: Vec<Window> = cfg
            .big_n
            .iter()
            .zip(&cfg.n)
            .map(|(&big, &n)| Window::new(cfg.window, big, n, cfg.cutoff))
            .collect();
        Self {
            spreader: Spreader::new(windows.clone(), &cfg.n, cfg.flags.psi),
            deconv: Deconvolution::new(&cfg.big_n, &cfg.n, windows, cfg.flags.pre_phi_hut),
            grid_fft: GridFft::new(backend, &cfg.n, cfg.fft_flags.destroy_input),
            g: vec![ZERO; cfg.grid_total],
            g_hat: cfg
                .flags
                .fft_out_of_place
                .then(|| vec![ZERO; cfg.grid_total]),
        }
    }

    pub fn precompute(&mut self, x: &[f64]) {
        self.spreader.precompute(x);
    }

    pub fn invalidate(&mut self) {
        self.spreader.invalidate();
    }

    pub fn is_ready(&self) -> bool {
        self.spreader.is_ready()
    }

    /// Approximate `f[j] = sum_k f_hat[k] exp(-2 pi i k . x_j)`.
    pub fn trafo(&mut self, x: &[f64], f_hat: &[Complex64], f: &mut [Complex64]) -> Result<()> {
        if !self.is_ready() {
            return Err(NfftError::PrecomputeRequired);
        }
        trace!("nfft trafo on grid {:?}", self.deconv.n);

        // Deconvolution onto the input grid of the FFT.
        let mut input = self.g_hat.take();
        {
            let target = input.as_mut().unwrap_or(&mut self.g);
            target.fill(ZERO);
            self.deconv
                .for_each_coefficient(|i, grid, factor| target[grid] = f_hat[i] * factor);
        }

        match input.as_mut() {
            Some(g_hat) => {
                self.grid_fft
                    .process_out_of_place(FftDirection::Forward, g_hat, &mut self.g)
            }
            None => self.grid_fft.process(FftDirection::Forward, &mut self.g),
        }
        self.g_hat = input;

        let Self { spreader, g, .. } = self;
        for (j, out) in f.iter_mut().enumerate() {
            let mut acc = ZERO;
            spreader.visit_node(x, j, |i, w| acc += g[i] * w);
            *out = acc;
        }
        Ok(())
    }

    /// Approximate `f_hat[k] = sum_j f[j] exp(+2 pi i k . x_j)`.
    pub fn adjoint(&mut self, x: &[f64], f: &[Complex64], f_hat: &mut [Complex64]) -> Result<()> {
        if !self.is_ready() {
            return Err(NfftError::PrecomputeRequired);
        }
        trace!("nfft adjoint on grid {:?}", self.deconv.n);

        {
            let Self { spreader, g, .. } = &mut *self;
            g.fill(ZERO);
            for (j, &v) in f.iter().enumerate() {
                spreader.visit_node(x, j, |i, w| g[i] += v * w);
            }
        }

        let mut output = self.g_hat.take();
        match output.as_mut() {
            Some(g_hat) => {
                self.grid_fft
                    .process_out_of_place(FftDirection::Inverse, &mut self.g, g_hat)
            }
            None => self.grid_fft.process(FftDirection::Inverse, &mut self.g),
        }

        {
            let source = output.as_deref().unwrap_or(self.g.as_slice());
            self.deconv
                .for_each_coefficient(|i, grid, factor| f_hat[i] = source[grid] * factor);
        }
        self.g_hat = output;
        Ok(())
    }
}
