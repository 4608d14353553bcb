//! Runs the 1-D and 2-D reference scenarios and prints the errors of the
//! direct and fast transforms.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example simple_test
//! ```
use knfft::accuracy::max_abs_diff;
use knfft::{Complex64, FftFlags, NfftFlags, Plan, PsiStrategy, ReferenceData};

fn report(plan: &mut Plan, data: &ReferenceData) -> knfft::Result<()> {
    plan.set_x(&data.x)?;
    plan.set_f_hat(&data.f_hat)?;
    plan.precompute()?;

    plan.direct_trafo()?;
    println!("  ndft_trafo     max |err| = {:.3e}", max_abs_diff(&data.f, &plan.f()?)?);
    plan.set_f(&vec![Complex64::new(0.0, 0.0); data.f.len()])?;
    plan.trafo()?;
    println!("  nfft_trafo     max |err| = {:.3e}", max_abs_diff(&data.f, &plan.f()?)?);

    plan.set_f(&data.f)?;
    plan.direct_adjoint()?;
    println!(
        "  ndft_adjoint   max |err| = {:.3e}",
        max_abs_diff(&data.adjoint_f_hat, &plan.f_hat()?)?
    );
    plan.set_f_hat(&vec![Complex64::new(0.0, 0.0); data.f_hat.len()])?;
    plan.adjoint()?;
    println!(
        "  nfft_adjoint   max |err| = {:.3e}",
        max_abs_diff(&data.adjoint_f_hat, &plan.f_hat()?)?
    );
    plan.finalize()
}

fn main() -> knfft::Result<()> {
    env_logger::init();
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");

    let mut plan = Plan::init_1d(14, 19)?;
    println!("1-D plan {plan:?}");
    let data = ReferenceData::read_for(format!("{dir}/simple_test_nfft_1d.txt"), &plan)?;
    report(&mut plan, &data)?;

    let flags = NfftFlags::default().with_psi(PsiStrategy::PreFullPsi);
    let mut plan = Plan::init_guru(2, &[32, 14], 448, &[64, 32], 7, flags, FftFlags::default())?;
    println!("2-D plan {plan:?}");
    let data = ReferenceData::read_for(format!("{dir}/simple_test_nfft_2d.txt"), &plan)?;
    report(&mut plan, &data)
}
