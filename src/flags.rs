//! Plan configuration flags.
//!
//! The classic NFFT interface passes two bitsets: one for the transform
//! itself and one forwarded to the FFT planner. Here they are modelled as
//! [`NfftFlags`] and [`FftFlags`], with the window precomputation choices
//! folded into a single [`PsiStrategy`] so contradictory combinations cannot
//! be expressed. The bit constants are kept for callers porting code that
//! builds flags numerically; [`NfftFlags::from_bits`] rejects combinations
//! that select more than one strategy.

use crate::error::{config_err, Result};

pub const PRE_PHI_HUT: u32 = 1 << 0;
pub const FG_PSI: u32 = 1 << 1;
pub const PRE_LIN_PSI: u32 = 1 << 2;
pub const PRE_FG_PSI: u32 = 1 << 3;
pub const PRE_PSI: u32 = 1 << 4;
pub const PRE_FULL_PSI: u32 = 1 << 5;
pub const MALLOC_X: u32 = 1 << 6;
pub const MALLOC_F_HAT: u32 = 1 << 7;
pub const MALLOC_F: u32 = 1 << 8;
pub const FFT_OUT_OF_PLACE: u32 = 1 << 9;
pub const FFTW_INIT: u32 = 1 << 10;
/// Any strategy that needs `precompute` after the nodes are assigned.
pub const PRE_ONE_PSI: u32 = PRE_LIN_PSI | PRE_FG_PSI | PRE_PSI | PRE_FULL_PSI;

pub const FFTW_DESTROY_INPUT: u32 = 1 << 0;
pub const FFTW_ESTIMATE: u32 = 1 << 6;

const KNOWN_NFFT_BITS: u32 = PRE_PHI_HUT
    | FG_PSI
    | PRE_ONE_PSI
    | MALLOC_X
    | MALLOC_F_HAT
    | MALLOC_F
    | FFT_OUT_OF_PLACE
    | FFTW_INIT;

/// How window weights between nodes and the oversampled grid are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PsiStrategy {
    /// Evaluate the window for every node on each transform.
    #[default]
    OnDemand,
    /// Fast Gaussian gridding evaluated on each transform (`FG_PSI`).
    FastGaussian,
    /// Tabulate the window once and interpolate linearly (`PRE_LIN_PSI`).
    PreLinear,
    /// Store the per-node Gaussian factors (`PRE_FG_PSI`).
    PreFastGaussian,
    /// Store per-node, per-dimension window values (`PRE_PSI`).
    PrePsi,
    /// Store the full sparse interpolation matrix (`PRE_FULL_PSI`).
    PreFullPsi,
}

impl PsiStrategy {
    /// Whether [`Plan::precompute`](crate::Plan::precompute) must run after
    /// every node assignment.
    pub fn needs_precompute(self) -> bool {
        !matches!(self, PsiStrategy::OnDemand | PsiStrategy::FastGaussian)
    }

    /// Whether the strategy relies on the Gaussian window's factorisation.
    pub fn is_fast_gaussian(self) -> bool {
        matches!(self, PsiStrategy::FastGaussian | PsiStrategy::PreFastGaussian)
    }

    fn bits(self) -> u32 {
        match self {
            PsiStrategy::OnDemand => 0,
            PsiStrategy::FastGaussian => FG_PSI,
            PsiStrategy::PreLinear => PRE_LIN_PSI,
            PsiStrategy::PreFastGaussian => PRE_FG_PSI,
            PsiStrategy::PrePsi => PRE_PSI,
            PsiStrategy::PreFullPsi => PRE_FULL_PSI,
        }
    }
}

/// Transform-level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfftFlags {
    /// Tabulate the deconvolution factors at construction.
    pub pre_phi_hut: bool,
    pub psi: PsiStrategy,
    /// The plan allocates the node buffer itself.
    pub malloc_x: bool,
    /// The plan allocates the coefficient buffer itself.
    pub malloc_f_hat: bool,
    /// The plan allocates the sample buffer itself.
    pub malloc_f: bool,
    /// Keep separate input and output buffers for the grid FFT.
    pub fft_out_of_place: bool,
    /// Initialise the process-wide FFT backend during construction.
    pub fftw_init: bool,
}

impl Default for NfftFlags {
    /// The flags used by the simple constructors.
    fn default() -> Self {
        Self {
            pre_phi_hut: true,
            psi: PsiStrategy::PrePsi,
            malloc_x: true,
            malloc_f_hat: true,
            malloc_f: true,
            fft_out_of_place: true,
            fftw_init: true,
        }
    }
}

impl NfftFlags {
    /// Decode a classic flag bitset.
    pub fn from_bits(bits: u32) -> Result<Self> {
        let unknown = bits & !KNOWN_NFFT_BITS;
        if unknown != 0 {
            return Err(config_err(format!("unknown NFFT flag bits {unknown:#x}")));
        }
        let psi = match bits & (FG_PSI | PRE_ONE_PSI) {
            0 => PsiStrategy::OnDemand,
            FG_PSI => PsiStrategy::FastGaussian,
            PRE_LIN_PSI => PsiStrategy::PreLinear,
            // PRE_FG_PSI is the precomputed form of FG_PSI, so both may be set.
            PRE_FG_PSI => PsiStrategy::PreFastGaussian,
            x if x == FG_PSI | PRE_FG_PSI => PsiStrategy::PreFastGaussian,
            PRE_PSI => PsiStrategy::PrePsi,
            PRE_FULL_PSI => PsiStrategy::PreFullPsi,
            other => {
                return Err(config_err(format!(
                    "flags {other:#x} select more than one psi strategy"
                )))
            }
        };
        Ok(Self {
            pre_phi_hut: bits & PRE_PHI_HUT != 0,
            psi,
            malloc_x: bits & MALLOC_X != 0,
            malloc_f_hat: bits & MALLOC_F_HAT != 0,
            malloc_f: bits & MALLOC_F != 0,
            fft_out_of_place: bits & FFT_OUT_OF_PLACE != 0,
            fftw_init: bits & FFTW_INIT != 0,
        })
    }

    /// Encode back into the classic bitset.
    pub fn bits(&self) -> u32 {
        let mut bits = self.psi.bits();
        for (set, bit) in [
            (self.pre_phi_hut, PRE_PHI_HUT),
            (self.malloc_x, MALLOC_X),
            (self.malloc_f_hat, MALLOC_F_HAT),
            (self.malloc_f, MALLOC_F),
            (self.fft_out_of_place, FFT_OUT_OF_PLACE),
            (self.fftw_init, FFTW_INIT),
        ] {
            if set {
                bits |= bit;
            }
        }
        bits
    }

    pub fn with_psi(mut self, psi: PsiStrategy) -> Self {
        self.psi = psi;
        self
    }

    pub fn needs_precompute(&self) -> bool {
        self.psi.needs_precompute()
    }
}

/// Options forwarded to the FFT backend.
///
/// `rustfft` has no planning effort levels, so `estimate` is recorded
/// only. `destroy_input` allows the out-of-place grid FFT to use its input
/// buffer as scratch space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftFlags {
    pub estimate: bool,
    pub destroy_input: bool,
}

impl Default for FftFlags {
    fn default() -> Self {
        Self {
            estimate: true,
            destroy_input: true,
        }
    }
}

impl FftFlags {
    pub fn from_bits(bits: u32) -> Result<Self> {
        let unknown = bits & !(FFTW_ESTIMATE | FFTW_DESTROY_INPUT);
        if unknown != 0 {
            return Err(config_err(format!(
                "unsupported FFT planning flag bits {unknown:#x}"
            )));
        }
        Ok(Self {
            estimate: bits & FFTW_ESTIMATE != 0,
            destroy_input: bits & FFTW_DESTROY_INPUT != 0,
        })
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.estimate {
            bits |= FFTW_ESTIMATE;
        }
        if self.destroy_input {
            bits |= FFTW_DESTROY_INPUT;
        }
        bits
    }
}
