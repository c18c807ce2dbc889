use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Run `packer pack` over every fixture input
    Fixtures {
        #[arg(long, default_value = "dynamic")]
        strategy: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::Fixtures { strategy } => run_fixtures(&strategy)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

fn run_fixtures(strategy: &str) -> Result<()> {
    let metadata = MetadataCommand::new()
        .no_deps()
        .exec()
        .context("failed to read cargo metadata")?;
    let fixtures = metadata
        .workspace_root
        .as_std_path()
        .join("crates/packer/tests/fixtures");

    for entry in WalkDir::new(&fixtures).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !is_input_fixture(path) {
            continue;
        }

        println!("==> {}", path.display());
        let status = Command::new("cargo")
            .args(["run", "--quiet", "-p", "packer", "--", "pack", "--no-config"])
            .args(["--on-error", "skip", "--strategy", strategy])
            .arg(path)
            .status()?;
        if !status.success() {
            anyhow::bail!("packer failed on {}", path.display());
        }
    }
    Ok(())
}

fn is_input_fixture(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with("_input.txt"))
}
