//! Runs in its own test binary so nothing else has initialised the backend.

use knfft::{fft, FftFlags, NfftError, NfftFlags, Plan};

#[test]
fn plans_without_fftw_init_need_an_initialised_backend() {
    let flags = NfftFlags {
        fftw_init: false,
        ..NfftFlags::default()
    };
    let guru = || Plan::init_guru(1, &[8], 4, &[32], 4, flags, FftFlags::default());

    assert!(!fft::is_initialized());
    assert!(matches!(guru(), Err(NfftError::Configuration(_))));
    assert!(!fft::is_initialized());

    let backend = fft::init();
    assert!(fft::is_initialized());
    let mut plan = guru().unwrap();
    plan.precompute().unwrap();
    plan.trafo().unwrap();
    assert!(backend.cached_plans() >= 2);

    // A plan that initialises the backend itself reuses the same instance.
    let before = backend.cached_plans();
    Plan::init_1d(8, 4).unwrap();
    assert!(std::ptr::eq(backend, fft::init()));
    assert!(fft::init().cached_plans() >= before);
}
