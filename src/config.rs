//! Plan configuration and process-wide defaults.
//!
//! The simple constructors take their cutoff and window from
//! [`PlanDefaults`], which is read once from the environment:
//!
//! - `KNFFT_CUTOFF`: window half-width `m` (default 8)
//! - `KNFFT_WINDOW`: `kaiser-bessel` (default) or `gaussian`
//!
//! Unparseable values are ignored with a warning.

use std::sync::OnceLock;

use log::warn;

use crate::error::{config_err, Result};
use crate::flags::{FftFlags, NfftFlags};

/// Cutoff used when neither the caller nor the environment picks one.
pub const DEFAULT_CUTOFF: usize = 8;

static DEFAULTS: OnceLock<PlanDefaults> = OnceLock::new();

/// Window function used to spread between nodes and the oversampled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    #[default]
    KaiserBessel,
    Gaussian,
}

impl core::str::FromStr for WindowKind {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kaiser-bessel" | "kaiser_bessel" | "kb" => Ok(WindowKind::KaiserBessel),
            "gaussian" | "gauss" => Ok(WindowKind::Gaussian),
            other => Err(format!("unknown window `{other}`")),
        }
    }
}

/// Defaults applied by [`Plan::init_1d`](crate::Plan::init_1d) and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanDefaults {
    pub cutoff: usize,
    pub window: WindowKind,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            window: WindowKind::KaiserBessel,
        }
    }
}

impl PlanDefaults {
    /// Process-wide defaults, resolved from the environment on first use.
    pub fn get() -> &'static PlanDefaults {
        DEFAULTS.get_or_init(|| {
            Self::from_lookup(|key| std::env::var(key).ok())
        })
    }

    /// Resolve defaults through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut defaults = Self::default();
        if let Some(raw) = lookup("KNFFT_CUTOFF") {
            match raw.trim().parse::<usize>() {
                Ok(m) if m > 0 => defaults.cutoff = m,
                _ => warn!("ignoring KNFFT_CUTOFF={raw:?}: expected a positive integer"),
            }
        }
        if let Some(raw) = lookup("KNFFT_WINDOW") {
            match raw.parse::<WindowKind>() {
                Ok(window) => defaults.window = window,
                Err(e) => warn!("ignoring KNFFT_WINDOW: {e}"),
            }
        }
        defaults
    }
}

/// Every parameter of an advanced plan.
///
/// ```
/// use knfft::{GuruConfig, NfftFlags, PsiStrategy, WindowKind};
///
/// let cfg = GuruConfig::new(&[32, 14], 448)
///     .oversampled(&[64, 32])
///     .cutoff(7)
///     .flags(NfftFlags::default().with_psi(PsiStrategy::PreFullPsi))
///     .window(WindowKind::KaiserBessel);
/// assert_eq!(cfg.n_total(), Some(448));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GuruConfig {
    pub big_n: Vec<usize>,
    pub m_total: usize,
    /// Oversampled grid; derived from `big_n` when `None`.
    pub n: Option<Vec<usize>>,
    /// Window half-width; [`PlanDefaults`] when `None`.
    pub cutoff: Option<usize>,
    pub flags: NfftFlags,
    pub fft_flags: FftFlags,
    /// Gaussian for the fast Gaussian strategies, otherwise
    /// [`PlanDefaults`], when `None`.
    pub window: Option<WindowKind>,
}

impl GuruConfig {
    pub fn new(big_n: &[usize], m_total: usize) -> Self {
        Self {
            big_n: big_n.to_vec(),
            m_total,
            n: None,
            cutoff: None,
            flags: NfftFlags::default(),
            fft_flags: FftFlags::default(),
            window: None,
        }
    }

    pub fn oversampled(mut self, n: &[usize]) -> Self {
        self.n = Some(n.to_vec());
        self
    }

    pub fn cutoff(mut self, m: usize) -> Self {
        self.cutoff = Some(m);
        self
    }

    pub fn flags(mut self, flags: NfftFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn fft_flags(mut self, fft_flags: FftFlags) -> Self {
        self.fft_flags = fft_flags;
        self
    }

    pub fn window(mut self, window: WindowKind) -> Self {
        self.window = Some(window);
        self
    }

    /// Product of the frequency extents, `None` on overflow.
    pub fn n_total(&self) -> Option<usize> {
        checked_product(&self.big_n)
    }

    /// Fill every unset field and check the result for consistency.
    pub(crate) fn resolve(&self) -> Result<ResolvedConfig> {
        let defaults = PlanDefaults::get();
        let d = self.big_n.len();
        if d == 0 {
            return Err(config_err("dimension d must be at least 1"));
        }
        if let Some(t) = self.big_n.iter().position(|&v| v == 0) {
            return Err(config_err(format!("N[{t}] must be positive")));
        }
        if self.m_total == 0 {
            return Err(config_err("M_total must be positive"));
        }
        let cutoff = self.cutoff.unwrap_or(defaults.cutoff);
        if cutoff == 0 {
            return Err(config_err("cutoff must be positive"));
        }
        let window = match self.window {
            Some(window) => window,
            None if self.flags.psi.is_fast_gaussian() => WindowKind::Gaussian,
            None => defaults.window,
        };
        let n = match &self.n {
            Some(n) => n.clone(),
            None => self
                .big_n
                .iter()
                .map(|&v| default_oversampled(v, cutoff))
                .collect(),
        };
        if n.len() != d {
            return Err(config_err(format!(
                "oversampled grid has {} entries but d = {d}",
                n.len()
            )));
        }
        for (t, (&nt, &big)) in n.iter().zip(&self.big_n).enumerate() {
            if nt < big {
                return Err(config_err(format!("n[{t}] = {nt} is smaller than N[{t}] = {big}")));
            }
            if 2 * cutoff + 2 > nt {
                return Err(config_err(format!(
                    "cutoff {cutoff} needs n[{t}] >= {} but n[{t}] = {nt}",
                    2 * cutoff + 2
                )));
            }
        }
        if self.flags.psi.is_fast_gaussian() && window != WindowKind::Gaussian {
            return Err(config_err(
                "fast Gaussian gridding requires the Gaussian window",
            ));
        }
        let n_total = checked_product(&self.big_n)
            .ok_or_else(|| config_err("N_total overflows usize"))?;
        let grid_total =
            checked_product(&n).ok_or_else(|| config_err("oversampled grid size overflows usize"))?;
        self.m_total
            .checked_mul(d)
            .ok_or_else(|| config_err("d * M_total overflows usize"))?;
        Ok(ResolvedConfig {
            big_n: self.big_n.clone(),
            n,
            n_total,
            grid_total,
            m_total: self.m_total,
            cutoff,
            window,
            flags: self.flags,
            fft_flags: self.fft_flags,
        })
    }
}

/// A validated [`GuruConfig`] with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedConfig {
    pub big_n: Vec<usize>,
    pub n: Vec<usize>,
    pub n_total: usize,
    pub grid_total: usize,
    pub m_total: usize,
    pub cutoff: usize,
    pub window: WindowKind,
    pub flags: NfftFlags,
    pub fft_flags: FftFlags,
}

/// Oversampled size used by the simple constructors: twice the next power
/// of two, and never narrower than the window support.
pub fn default_oversampled(big_n: usize, cutoff: usize) -> usize {
    (2 * big_n.next_power_of_two()).max((2 * cutoff + 2).next_power_of_two())
}

fn checked_product(v: &[usize]) -> Option<usize> {
    v.iter().try_fold(1usize, |acc, &x| acc.checked_mul(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PsiStrategy;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn env_overrides_apply() {
        let d = PlanDefaults::from_lookup(env(&[("KNFFT_CUTOFF", "5"), ("KNFFT_WINDOW", "gaussian")]));
        assert_eq!(d.cutoff, 5);
        assert_eq!(d.window, WindowKind::Gaussian);
    }

    #[test]
    fn invalid_env_values_fall_back() {
        let d = PlanDefaults::from_lookup(env(&[("KNFFT_CUTOFF", "zero"), ("KNFFT_WINDOW", "hann")]));
        assert_eq!(d, PlanDefaults::default());
        let d = PlanDefaults::from_lookup(env(&[("KNFFT_CUTOFF", "0")]));
        assert_eq!(d.cutoff, DEFAULT_CUTOFF);
    }

    #[test]
    fn default_oversampling() {
        assert_eq!(default_oversampled(14, 8), 32);
        assert_eq!(default_oversampled(16, 8), 32);
        assert_eq!(default_oversampled(2, 8), 32);
        assert_eq!(default_oversampled(100, 4), 256);
    }

    #[test]
    fn resolve_rejects_bad_grids() {
        let base = GuruConfig::new(&[32, 14], 448).cutoff(7);
        assert!(base.clone().oversampled(&[64, 32]).resolve().is_ok());
        assert!(base.clone().oversampled(&[16, 32]).resolve().is_err());
        assert!(base.clone().oversampled(&[64]).resolve().is_err());
        assert!(base.clone().oversampled(&[64, 15]).resolve().is_err());
        assert!(GuruConfig::new(&[], 4).resolve().is_err());
        assert!(GuruConfig::new(&[4, 0], 4).resolve().is_err());
        assert!(GuruConfig::new(&[4], 0).resolve().is_err());
        assert!(GuruConfig::new(&[4], 3).cutoff(0).resolve().is_err());
    }

    #[test]
    fn fast_gaussian_needs_gaussian_window() {
        let flags = NfftFlags::default().with_psi(PsiStrategy::FastGaussian);
        let cfg = GuruConfig::new(&[16], 10).cutoff(4).flags(flags);
        assert!(cfg.clone().window(WindowKind::KaiserBessel).resolve().is_err());
        assert!(cfg.clone().window(WindowKind::Gaussian).resolve().is_ok());
        assert_eq!(cfg.resolve().unwrap().window, WindowKind::Gaussian);
    }

    #[test]
    fn resolved_sizes() {
        let r = GuruConfig::new(&[8, 6, 4], 11)
            .cutoff(2)
            .window(WindowKind::Gaussian)
            .resolve()
            .unwrap();
        assert_eq!(r.n, vec![16, 16, 8]);
        assert_eq!(r.n_total, 192);
        assert_eq!(r.grid_total, 2048);
    }
}
