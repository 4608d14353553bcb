use knfft::{Buffer, Complex64, GuruConfig, NfftError, NfftFlags, Plan, PsiStrategy};
use proptest::prelude::*;

fn complex_vec(len: usize) -> impl Strategy<Value = Vec<Complex64>> {
    proptest::collection::vec((-10.0f64..10.0, -10.0f64..10.0), len)
        .prop_map(|v| v.into_iter().map(|(re, im)| Complex64::new(re, im)).collect())
}

fn dot(a: &[Complex64], b: &[Complex64]) -> Complex64 {
    a.iter().zip(b).map(|(x, y)| x * y.conj()).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn assigned_buffers_read_back_unchanged(
        n in 1usize..12,
        m in 1usize..12,
        seed in any::<u64>(),
    ) {
        let mut plan = Plan::init_1d(n, m).unwrap();
        let x: Vec<f64> = (0..m)
            .map(|j| ((seed.wrapping_add(j as u64 * 7919) % 1000) as f64 / 1000.0) - 0.5)
            .collect();
        let f_hat: Vec<Complex64> = (0..n).map(|k| Complex64::new(k as f64, -(seed as f64))).collect();
        plan.set_x(&x).unwrap();
        plan.set_f_hat(&f_hat).unwrap();
        prop_assert_eq!(plan.x().unwrap(), x);
        prop_assert_eq!(plan.f_hat().unwrap(), f_hat);
    }

    #[test]
    fn wrong_lengths_are_rejected(n in 1usize..10, m in 1usize..10, extra in 1usize..5) {
        let mut plan = Plan::init_2d(n, 3, m).unwrap();
        let err = plan.set_x(&vec![0.0; 2 * m + extra]).unwrap_err();
        prop_assert_eq!(err, NfftError::ShapeMismatch { buffer: Buffer::X, expected: 2 * m, actual: 2 * m + extra });
        prop_assert!(plan.set_f(&vec![Complex64::new(0.0, 0.0); m + extra]).is_err());
        prop_assert!(plan.set_f_hat(&vec![Complex64::new(0.0, 0.0); 3 * n + extra]).is_err());
    }

    #[test]
    fn fast_adjoint_is_the_transpose_of_fast_trafo(
        x in proptest::collection::vec(-0.5f64..0.5, 24),
        f_hat in complex_vec(20),
        f in complex_vec(12),
    ) {
        let cfg = GuruConfig::new(&[5, 4], 12)
            .cutoff(3)
            .flags(NfftFlags::default().with_psi(PsiStrategy::OnDemand));
        let mut plan = Plan::from_config(cfg).unwrap();
        plan.set_x(&x).unwrap();
        plan.set_f_hat(&f_hat).unwrap();
        plan.trafo().unwrap();
        let af = plan.f().unwrap();
        plan.set_f(&f).unwrap();
        plan.adjoint().unwrap();
        let ahf = plan.f_hat().unwrap();
        let lhs = dot(&af, &f);
        let rhs = dot(&f_hat, &ahf);
        prop_assert!((lhs - rhs).norm() <= 1e-10 * (1.0 + lhs.norm()), "{} vs {}", lhs, rhs);
    }

    #[test]
    fn fast_trafo_tracks_direct(
        x in proptest::collection::vec(-0.5f64..0.5, 16),
        f_hat in complex_vec(9),
    ) {
        let mut plan = Plan::init_1d(9, 16).unwrap();
        plan.set_x(&x).unwrap();
        plan.set_f_hat(&f_hat).unwrap();
        plan.precompute().unwrap();
        plan.direct_trafo().unwrap();
        let exact = plan.f().unwrap();
        plan.set_f(&vec![Complex64::new(0.0, 0.0); 16]).unwrap();
        plan.trafo().unwrap();
        let err = knfft::accuracy::error_l_infty_1(&exact, &plan.f().unwrap(), &f_hat).unwrap();
        prop_assert!(err < 1e-9, "error {}", err);
    }
}
