use clap::{Parser, Subcommand};
use std::path::PathBuf;
#[cfg(not(test))]
use xtask::*;

#[derive(Parser)]
#[command(author, version, about = "Development tasks for knfft")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build,
    Test,
    Clippy,
    Fmt,
    Analyze,
    Bench,
    /// Run one of the demos in release mode
    Demo {
        #[arg(default_value = "strategies")]
        name: String,
    },
    /// Regenerate the reference data used by the integration tests
    Fixtures {
        /// Output directory, `tests/data` of the workspace by default
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(not(test))]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = detect_config();

    let status = match cli.command {
        Commands::Build => build_command().status()?,
        Commands::Test => test_command().status()?,
        Commands::Clippy => clippy_command().status()?,
        Commands::Fmt => fmt_command().status()?,
        Commands::Analyze => {
            let fmt = fmt_command().status()?;
            if !fmt.success() {
                fmt
            } else {
                clippy_command().status()?
            }
        }
        Commands::Bench => bench_command(&cfg).status()?,
        Commands::Demo { name } => demo_command(&cfg, &name).status()?,
        Commands::Fixtures { out } => {
            let dir = out.unwrap_or_else(|| workspace_root().join("tests").join("data"));
            for path in write_fixtures(&dir)? {
                println!("wrote {}", path.display());
            }
            return Ok(());
        }
    };

    std::process::exit(status.code().unwrap_or(1));
}
