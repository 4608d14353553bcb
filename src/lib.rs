//! # knfft - non-uniform FFT plans for Rust
//!
//! Exact (NDFT) and fast approximate (NFFT) transforms between Fourier
//! coefficients on a regular d-dimensional frequency grid and function
//! values at irregularly spaced nodes in `[-0.5, 0.5)^d`.
//!
//! ```text
//! f[j]     = sum_k f_hat[k] * exp(-2 pi i k . x_j)     (trafo)
//! f_hat[k] = sum_j f[j]     * exp(+2 pi i k . x_j)     (adjoint)
//! ```
//!
//! ## Features
//!
//! - **Plans** owning nodes, coefficients and samples with shape-checked
//!   copy-in/copy-out accessors and an explicit `finalize`
//! - **Fast transforms** via window convolution on an oversampled grid and
//!   `rustfft`, with Kaiser-Bessel (default) or Gaussian windows
//! - **Precompute strategies** from on-demand evaluation up to the full
//!   interpolation matrix, selected by [`PsiStrategy`]
//! - **Classic flag bits** (`PRE_PHI_HUT`, `PRE_PSI`, `MALLOC_X`, ...) convertible to
//!   and from the typed [`NfftFlags`]
//! - **Reference data** in a plain-text fixture format, see [`fixture`]
//!
//! ## Environment
//!
//! - `KNFFT_CUTOFF`: default window cutoff for the simple constructors
//! - `KNFFT_WINDOW`: `kaiser-bessel` or `gaussian`
//!
//! ## Examples
//!
//! ```bash
//! cargo run --example simple_test
//! cargo run --example strategies
//! ```

pub mod accuracy;
pub mod config;
pub mod error;
pub mod fft;
pub mod fixture;
pub mod flags;
pub mod ndft;
mod nfft;
pub mod plan;
mod psi;
pub mod window;

pub use config::{GuruConfig, PlanDefaults, WindowKind, DEFAULT_CUTOFF};
pub use error::{Buffer, NfftError, Result};
pub use fixture::ReferenceData;
pub use flags::{
    FftFlags, NfftFlags, PsiStrategy, FFTW_DESTROY_INPUT, FFTW_ESTIMATE, FFTW_INIT, FFT_OUT_OF_PLACE,
    FG_PSI, MALLOC_F, MALLOC_F_HAT, MALLOC_X, PRE_FG_PSI, PRE_FULL_PSI, PRE_LIN_PSI, PRE_ONE_PSI,
    PRE_PHI_HUT, PRE_PSI,
};
pub use plan::Plan;
pub use rustfft::num_complex::Complex64;
