//! Direct (exact) non-uniform discrete Fourier transforms.
//!
//! These are the O(N_total * M_total) reference sums the fast transforms
//! approximate:
//!
//! ```text
//! f[j]     = sum_k f_hat[k] * exp(-2 pi i k . x_j)
//! f_hat[k] = sum_j f[j]     * exp(+2 pi i k . x_j)
//! ```
//!
//! with `k_t` running over `-N_t/2 .. N_t - N_t/2 - 1` in row-major order.

use core::f64::consts::PI;

use libm::sincos;
use rustfft::num_complex::Complex64;

/// Frequency multi-indices of the grid `big_n`, flattened row-major with
/// dimension 0 slowest; `d` entries per coefficient.
pub fn frequencies(big_n: &[usize]) -> Vec<f64> {
    let d = big_n.len();
    let total: usize = big_n.iter().product();
    let mut out = Vec::with_capacity(total * d);
    let mut digits = vec![0usize; d];
    for _ in 0..total {
        out.extend(
            digits
                .iter()
                .zip(big_n)
                .map(|(&c, &n)| c as f64 - (n / 2) as f64),
        );
        for t in (0..d).rev() {
            digits[t] += 1;
            if digits[t] < big_n[t] {
                break;
            }
            digits[t] = 0;
        }
    }
    out
}

#[inline]
fn phase(k: &[f64], node: &[f64]) -> f64 {
    2.0 * PI * k.iter().zip(node).map(|(a, b)| a * b).sum::<f64>()
}

/// Forward NDFT: evaluate the trigonometric polynomial `f_hat` at every node.
pub fn ndft_trafo(big_n: &[usize], x: &[f64], f_hat: &[Complex64], f: &mut [Complex64]) {
    let d = big_n.len();
    let freqs = frequencies(big_n);
    for (node, out) in x.chunks_exact(d).zip(f.iter_mut()) {
        let mut acc = Complex64::new(0.0, 0.0);
        for (k, &c) in freqs.chunks_exact(d).zip(f_hat) {
            let (s, co) = sincos(-phase(k, node));
            acc += c * Complex64::new(co, s);
        }
        *out = acc;
    }
}

/// Adjoint NDFT: conjugate transpose of [`ndft_trafo`].
pub fn ndft_adjoint(big_n: &[usize], x: &[f64], f: &[Complex64], f_hat: &mut [Complex64]) {
    let d = big_n.len();
    let freqs = frequencies(big_n);
    for (k, out) in freqs.chunks_exact(d).zip(f_hat.iter_mut()) {
        let mut acc = Complex64::new(0.0, 0.0);
        for (node, &v) in x.chunks_exact(d).zip(f) {
            let (s, co) = sincos(phase(k, node));
            acc += v * Complex64::new(co, s);
        }
        *out = acc;
    }
}
