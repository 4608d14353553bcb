//! Compares the psi precompute strategies on random nodes: accuracy against
//! the direct transform and time per fast transform.
//!
//! ```bash
//! cargo run --release --example strategies
//! ```
use std::time::Instant;

use knfft::accuracy::error_l_infty;
use knfft::{Complex64, GuruConfig, NfftFlags, Plan, PsiStrategy, WindowKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> knfft::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let big_n = [64usize, 64];
    let m_total = 4096;
    let mut rng = StdRng::seed_from_u64(2024);
    let x: Vec<f64> = (0..2 * m_total).map(|_| rng.gen_range(-0.5..0.5)).collect();
    let f_hat: Vec<Complex64> = (0..big_n.iter().product::<usize>())
        .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect();

    let mut direct = Plan::init_2d(big_n[0], big_n[1], m_total)?;
    direct.set_x(&x)?;
    direct.set_f_hat(&f_hat)?;
    direct.direct_trafo()?;
    let exact = direct.f()?;
    direct.finalize()?;

    for psi in [
        PsiStrategy::OnDemand,
        PsiStrategy::FastGaussian,
        PsiStrategy::PreLinear,
        PsiStrategy::PreFastGaussian,
        PsiStrategy::PrePsi,
        PsiStrategy::PreFullPsi,
    ] {
        let window = if psi.is_fast_gaussian() {
            WindowKind::Gaussian
        } else {
            WindowKind::KaiserBessel
        };
        let cutoff = if window == WindowKind::Gaussian { 10 } else { 6 };
        let cfg = GuruConfig::new(&big_n, m_total)
            .cutoff(cutoff)
            .window(window)
            .flags(NfftFlags::default().with_psi(psi));
        let mut plan = Plan::from_config(cfg)?;
        plan.set_x(&x)?;
        plan.set_f_hat(&f_hat)?;

        let start = Instant::now();
        plan.precompute()?;
        let precompute = start.elapsed();

        let start = Instant::now();
        plan.trafo()?;
        let trafo = start.elapsed();
        let err = error_l_infty(&exact, &plan.f()?)?;
        let (name, window) = (format!("{psi:?}"), format!("{window:?}"));
        println!(
            "{name:<16} window={window:<13} m={cutoff:<2} precompute={precompute:>10.2?} trafo={trafo:>10.2?} error={err:.2e}"
        );
        plan.finalize()?;
    }
    Ok(())
}
