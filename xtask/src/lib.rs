use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use knfft::{Complex64, GuruConfig, NfftFlags, Plan, PsiStrategy, ReferenceData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Extra settings passed through to cargo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub rustflags: Option<String>,
}

/// Get the workspace root directory
pub fn workspace_root() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path
}

/// Read the build configuration from `KNFFT_RUSTFLAGS`.
pub fn detect_config() -> BuildConfig {
    compute_config(&env::var("KNFFT_RUSTFLAGS").unwrap_or_default())
}

/// Compute a [`BuildConfig`] from the raw flag string. Separated for testing.
pub fn compute_config(extra: &str) -> BuildConfig {
    let flags: Vec<&str> = extra.split_whitespace().collect();
    BuildConfig {
        rustflags: (!flags.is_empty()).then(|| flags.join(" ")),
    }
}

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args).current_dir(workspace_root());
    cmd
}

pub fn build_command() -> Command {
    cargo(&["build", "--workspace"])
}

pub fn test_command() -> Command {
    cargo(&["test", "--workspace"])
}

pub fn clippy_command() -> Command {
    cargo(&["clippy", "--workspace", "--all-targets"])
}

pub fn fmt_command() -> Command {
    cargo(&["fmt", "--all"])
}

pub fn bench_command(cfg: &BuildConfig) -> Command {
    let mut cmd = cargo(&["bench", "--manifest-path", "knfft-bench/Cargo.toml"]);
    if let Some(rf) = &cfg.rustflags {
        cmd.env("RUSTFLAGS", rf);
    }
    cmd
}

pub fn demo_command(cfg: &BuildConfig, example: &str) -> Command {
    let mut cmd = cargo(&["run", "--release", "--example", example]);
    if let Some(rf) = &cfg.rustflags {
        cmd.env("RUSTFLAGS", rf);
    }
    cmd
}

/// A reference-data case: frequency extents, node count and RNG seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCase {
    pub file: &'static str,
    pub big_n: Vec<usize>,
    pub m_total: usize,
    pub seed: u64,
}

/// The cases checked by the integration tests.
pub fn fixture_cases() -> Vec<FixtureCase> {
    vec![
        FixtureCase {
            file: "simple_test_nfft_1d.txt",
            big_n: vec![14],
            m_total: 19,
            seed: 20141,
        },
        FixtureCase {
            file: "simple_test_nfft_2d.txt",
            big_n: vec![32, 14],
            m_total: 448,
            seed: 20142,
        },
    ]
}

/// Random nodes and coefficients with their exact forward and adjoint
/// transforms.
pub fn generate_fixture(case: &FixtureCase) -> Result<ReferenceData> {
    let mut rng = StdRng::seed_from_u64(case.seed);
    let d = case.big_n.len();
    let n_total: usize = case.big_n.iter().product();
    let x: Vec<f64> = (0..d * case.m_total)
        .map(|_| rng.gen_range(-0.5..0.5))
        .collect();
    let f_hat: Vec<Complex64> = (0..n_total)
        .map(|_| Complex64::new(rng.gen(), rng.gen()))
        .collect();

    // Only the direct transforms run, so no psi cache is needed.
    let flags = NfftFlags::default().with_psi(PsiStrategy::OnDemand);
    let mut plan = Plan::from_config(GuruConfig::new(&case.big_n, case.m_total).flags(flags))?;
    plan.set_x(&x)?;
    plan.set_f_hat(&f_hat)?;
    plan.direct_trafo()?;
    let f = plan.f()?;
    plan.direct_adjoint()?;
    let adjoint_f_hat = plan.f_hat()?;
    plan.finalize()?;
    Ok(ReferenceData {
        x,
        f_hat,
        f,
        adjoint_f_hat,
    })
}

/// Write every fixture case into `dir`.
pub fn write_fixtures(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::new();
    for case in fixture_cases() {
        let path = dir.join(case.file);
        generate_fixture(&case)?
            .write(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_config() {
        assert_eq!(compute_config("").rustflags, None);
        assert_eq!(compute_config("   ").rustflags, None);
        let cfg = compute_config(" -C target-cpu=native  -C opt-level=3 ");
        assert_eq!(
            cfg.rustflags.as_deref(),
            Some("-C target-cpu=native -C opt-level=3")
        );
    }

    #[test]
    fn test_bench_env() {
        let cfg = compute_config("-C target-cpu=native");
        let cmd = bench_command(&cfg);
        let envs: Vec<_> = cmd
            .get_envs()
            .map(|(k, v)| {
                (
                    k.to_str().unwrap().to_string(),
                    v.unwrap().to_str().unwrap().to_string(),
                )
            })
            .collect();
        assert!(envs
            .iter()
            .any(|(k, v)| k == "RUSTFLAGS" && v == "-C target-cpu=native"));
        assert!(cmd.get_args().any(|a| a == "knfft-bench/Cargo.toml"));
    }

    #[test]
    fn test_other_commands() {
        assert!(build_command().get_args().any(|a| a == "build"));
        assert!(test_command().get_args().any(|a| a == "test"));
        assert!(clippy_command().get_args().any(|a| a == "clippy"));
        assert!(fmt_command().get_args().any(|a| a == "fmt"));
        let cfg = compute_config("");
        let dcmd = demo_command(&cfg, "strategies");
        assert!(dcmd.get_args().any(|a| a == "strategies"));
        assert_eq!(dcmd.get_envs().count(), 0);
    }

    #[test]
    fn test_fixture_shapes() {
        for case in fixture_cases() {
            let data = generate_fixture(&case).unwrap();
            let n_total: usize = case.big_n.iter().product();
            assert_eq!(data.x.len(), case.big_n.len() * case.m_total);
            assert_eq!(data.f_hat.len(), n_total);
            assert_eq!(data.f.len(), case.m_total);
            assert_eq!(data.adjoint_f_hat.len(), n_total);
            assert!(data.x.iter().all(|v| (-0.5..0.5).contains(v)));
        }
    }

    #[test]
    fn test_write_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_fixtures(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        let plan = Plan::init_1d(14, 19).unwrap();
        let data = ReferenceData::read_for(&written[0], &plan).unwrap();
        assert_eq!(data, generate_fixture(&fixture_cases()[0]).unwrap());
    }
}
