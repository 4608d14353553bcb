//! Transform plans.
//!
//! A [`Plan`] owns the node coordinates `x`, the Fourier coefficients
//! `f_hat`, the sample values `f` and every working buffer the fast
//! transforms need. Buffers are copied in and out, so a snapshot returned by
//! [`Plan::x`] never aliases plan state.
//!
//! ```
//! use knfft::{Complex64, Plan};
//!
//! let mut plan = Plan::init_1d(14, 19)?;
//! let x: Vec<f64> = (0..19).map(|j| j as f64 / 19.0 - 0.5).collect();
//! plan.set_x(&x)?;
//! plan.set_f_hat(&vec![Complex64::new(1.0, 0.0); 14])?;
//! plan.precompute()?;
//! plan.trafo()?;
//! let fast = plan.f()?;
//! plan.direct_trafo()?;
//! let exact = plan.f()?;
//! assert!(knfft::accuracy::error_l_infty(&exact, &fast)? < 1e-8);
//! plan.finalize()?;
//! # Ok::<(), knfft::NfftError>(())
//! ```

use core::fmt;

use log::debug;
use rustfft::num_complex::Complex64;

use crate::config::{GuruConfig, ResolvedConfig, WindowKind};
use crate::error::{config_err, Buffer, NfftError, Result};
use crate::fft;
use crate::flags::{FftFlags, NfftFlags};
use crate::ndft::{ndft_adjoint, ndft_trafo};
use crate::nfft::FastTransform;

/// A transform plan. See the [module documentation](self).
pub struct Plan {
    /// `None` once finalized.
    inner: Option<Box<PlanState>>,
}

struct PlanState {
    cfg: ResolvedConfig,
    /// `None` while a caller-owned buffer has not been supplied.
    x: Option<Vec<f64>>,
    f_hat: Option<Vec<Complex64>>,
    f: Option<Vec<Complex64>>,
    fast: FastTransform,
}

impl Plan {
    /// One-dimensional plan with default flags.
    pub fn init_1d(n: usize, m: usize) -> Result<Self> {
        Self::init(1, &[n], m)
    }

    pub fn init_2d(n0: usize, n1: usize, m: usize) -> Result<Self> {
        Self::init(2, &[n0, n1], m)
    }

    pub fn init_3d(n0: usize, n1: usize, n2: usize, m: usize) -> Result<Self> {
        Self::init(3, &[n0, n1, n2], m)
    }

    /// `d`-dimensional plan with default flags, oversampling and window.
    pub fn init(d: usize, big_n: &[usize], m: usize) -> Result<Self> {
        check_rank("N", d, big_n)?;
        Self::from_config(GuruConfig::new(big_n, m))
    }

    /// Plan with every parameter given explicitly.
    pub fn init_guru(
        d: usize,
        big_n: &[usize],
        m: usize,
        n: &[usize],
        cutoff: usize,
        flags: NfftFlags,
        fft_flags: FftFlags,
    ) -> Result<Self> {
        check_rank("N", d, big_n)?;
        check_rank("n", d, n)?;
        Self::from_config(
            GuruConfig::new(big_n, m)
                .oversampled(n)
                .cutoff(cutoff)
                .flags(flags)
                .fft_flags(fft_flags),
        )
    }

    /// Build a plan from a [`GuruConfig`].
    pub fn from_config(config: GuruConfig) -> Result<Self> {
        let cfg = config.resolve()?;
        let backend = if cfg.flags.fftw_init {
            fft::init()
        } else {
            fft::backend().ok_or_else(|| {
                config_err("FFT backend is not initialised: pass fftw_init or call fft::init() first")
            })?
        };
        let fast = FastTransform::new(&cfg, backend);
        let d = cfg.big_n.len();
        let flags = cfg.flags;
        let state = PlanState {
            x: flags.malloc_x.then(|| vec![0.0; d * cfg.m_total]),
            f_hat: flags
                .malloc_f_hat
                .then(|| vec![Complex64::new(0.0, 0.0); cfg.n_total]),
            f: flags
                .malloc_f
                .then(|| vec![Complex64::new(0.0, 0.0); cfg.m_total]),
            fast,
            cfg,
        };
        debug!(
            "created plan d={} N={:?} n={:?} M={} m={} window={:?} flags={:#x}",
            d,
            state.cfg.big_n,
            state.cfg.n,
            state.cfg.m_total,
            state.cfg.cutoff,
            state.cfg.window,
            flags.bits()
        );
        Ok(Self {
            inner: Some(Box::new(state)),
        })
    }

    fn state(&self) -> Result<&PlanState> {
        self.inner.as_deref().ok_or(NfftError::Finalized)
    }

    fn state_mut(&mut self) -> Result<&mut PlanState> {
        self.inner.as_deref_mut().ok_or(NfftError::Finalized)
    }

    pub fn d(&self) -> Result<usize> {
        Ok(self.state()?.cfg.big_n.len())
    }

    /// Number of Fourier coefficients.
    pub fn n_total(&self) -> Result<usize> {
        Ok(self.state()?.cfg.n_total)
    }

    /// Number of nodes.
    pub fn m_total(&self) -> Result<usize> {
        Ok(self.state()?.cfg.m_total)
    }

    /// Frequency extents per dimension.
    pub fn big_n(&self) -> Result<&[usize]> {
        Ok(&self.state()?.cfg.big_n)
    }

    /// Oversampled grid size per dimension.
    pub fn n(&self) -> Result<&[usize]> {
        Ok(&self.state()?.cfg.n)
    }

    pub fn cutoff(&self) -> Result<usize> {
        Ok(self.state()?.cfg.cutoff)
    }

    pub fn flags(&self) -> Result<NfftFlags> {
        Ok(self.state()?.cfg.flags)
    }

    pub fn fft_flags(&self) -> Result<FftFlags> {
        Ok(self.state()?.cfg.fft_flags)
    }

    pub fn window(&self) -> Result<WindowKind> {
        Ok(self.state()?.cfg.window)
    }

    /// Copy of the node coordinates, `x[j * d + t]`.
    pub fn x(&self) -> Result<Vec<f64>> {
        self.state()?.x.clone().ok_or(NfftError::Detached(Buffer::X))
    }

    /// Copy of the Fourier coefficients.
    pub fn f_hat(&self) -> Result<Vec<Complex64>> {
        self.state()?
            .f_hat
            .clone()
            .ok_or(NfftError::Detached(Buffer::FHat))
    }

    /// Copy of the sample values.
    pub fn f(&self) -> Result<Vec<Complex64>> {
        self.state()?.f.clone().ok_or(NfftError::Detached(Buffer::F))
    }

    /// Assign the nodes. Any precomputed psi is discarded.
    ///
    /// Finite coordinates outside `[-0.5, 0.5)` are accepted and taken modulo
    /// one; infinite or NaN coordinates fail with
    /// [`NfftError::NodeOutOfRange`] and leave the nodes unchanged.
    pub fn set_x(&mut self, x: &[f64]) -> Result<()> {
        let state = self.state_mut()?;
        let expected = state.cfg.big_n.len() * state.cfg.m_total;
        if x.len() == expected {
            if let Some(index) = x.iter().position(|v| !v.is_finite()) {
                return Err(NfftError::NodeOutOfRange {
                    index,
                    value: x[index],
                });
            }
        }
        assign(&mut state.x, x, Buffer::X, expected)?;
        state.fast.invalidate();
        Ok(())
    }

    pub fn set_f_hat(&mut self, f_hat: &[Complex64]) -> Result<()> {
        let state = self.state_mut()?;
        let expected = state.cfg.n_total;
        assign(&mut state.f_hat, f_hat, Buffer::FHat, expected)
    }

    pub fn set_f(&mut self, f: &[Complex64]) -> Result<()> {
        let state = self.state_mut()?;
        let expected = state.cfg.m_total;
        assign(&mut state.f, f, Buffer::F, expected)
    }

    /// Check that every node coordinate is finite and inside `[-0.5, 0.5)`.
    pub fn check_nodes(&self) -> Result<()> {
        let state = self.state()?;
        let x = state.x.as_deref().ok_or(NfftError::Detached(Buffer::X))?;
        match x
            .iter()
            .position(|v| !(v.is_finite() && (-0.5..0.5).contains(v)))
        {
            Some(index) => Err(NfftError::NodeOutOfRange {
                index,
                value: x[index],
            }),
            None => Ok(()),
        }
    }

    /// Whether the fast transforms are waiting for [`precompute`](Self::precompute).
    pub fn needs_precompute(&self) -> Result<bool> {
        Ok(!self.state()?.fast.is_ready())
    }

    /// Build the psi cache for the current nodes. A no-op for strategies
    /// that evaluate the window on demand.
    pub fn precompute(&mut self) -> Result<()> {
        let PlanState { x, fast, .. } = self.state_mut()?;
        let x = x.as_deref().ok_or(NfftError::Detached(Buffer::X))?;
        fast.precompute(x);
        Ok(())
    }

    /// Same as [`precompute`](Self::precompute).
    pub fn precompute_one_psi(&mut self) -> Result<()> {
        self.precompute()
    }

    /// Fast forward transform, `f_hat` into `f`.
    pub fn trafo(&mut self) -> Result<()> {
        let PlanState {
            x, f_hat, f, fast, ..
        } = self.state_mut()?;
        let (x, f_hat, f) = buffers(x, f_hat.as_deref(), f.as_deref_mut(), Buffer::F)?;
        fast.trafo(x, f_hat, f)
    }

    /// Fast adjoint transform, `f` into `f_hat`.
    pub fn adjoint(&mut self) -> Result<()> {
        let PlanState {
            x, f_hat, f, fast, ..
        } = self.state_mut()?;
        let (x, f, f_hat) = buffers(x, f.as_deref(), f_hat.as_deref_mut(), Buffer::FHat)?;
        fast.adjoint(x, f, f_hat)
    }

    /// Exact forward transform, `f_hat` into `f`.
    pub fn direct_trafo(&mut self) -> Result<()> {
        let PlanState {
            cfg, x, f_hat, f, ..
        } = self.state_mut()?;
        let (x, f_hat, f) = buffers(x, f_hat.as_deref(), f.as_deref_mut(), Buffer::F)?;
        ndft_trafo(&cfg.big_n, x, f_hat, f);
        Ok(())
    }

    /// Exact adjoint transform, `f` into `f_hat`.
    pub fn direct_adjoint(&mut self) -> Result<()> {
        let PlanState {
            cfg, x, f_hat, f, ..
        } = self.state_mut()?;
        let (x, f, f_hat) = buffers(x, f.as_deref(), f_hat.as_deref_mut(), Buffer::FHat)?;
        ndft_adjoint(&cfg.big_n, x, f, f_hat);
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.inner.is_none()
    }

    /// Release every buffer. The plan is unusable afterwards and a second
    /// call fails with [`NfftError::Finalized`].
    pub fn finalize(&mut self) -> Result<()> {
        let state = self.inner.take().ok_or(NfftError::Finalized)?;
        debug!(
            "finalized plan N={:?} M={}",
            state.cfg.big_n, state.cfg.m_total
        );
        Ok(())
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.as_deref() {
            Some(state) => f
                .debug_struct("Plan")
                .field("N", &state.cfg.big_n)
                .field("n", &state.cfg.n)
                .field("M", &state.cfg.m_total)
                .field("cutoff", &state.cfg.cutoff)
                .field("window", &state.cfg.window)
                .field("flags", &state.cfg.flags)
                .finish(),
            None => f.write_str("Plan(finalized)"),
        }
    }
}

fn check_rank(name: &str, d: usize, extents: &[usize]) -> Result<()> {
    if extents.len() != d {
        return Err(config_err(format!(
            "{name} has {} entries but d = {d}",
            extents.len()
        )));
    }
    Ok(())
}

fn assign<T: Copy>(slot: &mut Option<Vec<T>>, src: &[T], buffer: Buffer, expected: usize) -> Result<()> {
    if src.len() != expected {
        return Err(NfftError::ShapeMismatch {
            buffer,
            expected,
            actual: src.len(),
        });
    }
    match slot {
        Some(dst) => dst.copy_from_slice(src),
        None => *slot = Some(src.to_vec()),
    }
    Ok(())
}

/// Resolve the buffers a transform reads and writes, failing on the first
/// detached one.
fn buffers<'a, T, U>(
    x: &'a Option<Vec<f64>>,
    input: Option<&'a [T]>,
    output: Option<&'a mut [U]>,
    output_kind: Buffer,
) -> Result<(&'a [f64], &'a [T], &'a mut [U])> {
    let x = x.as_deref().ok_or(NfftError::Detached(Buffer::X))?;
    let input_kind = match output_kind {
        Buffer::F => Buffer::FHat,
        _ => Buffer::F,
    };
    let input = input.ok_or(NfftError::Detached(input_kind))?;
    let output = output.ok_or(NfftError::Detached(output_kind))?;
    Ok((x, input, output))
}
