//! Command line interface.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::debug;

use crate::app::batch::{BatchOptions, BatchReport, ErrorPolicy, Packer};
use crate::app::context::{PackContext, StrategyKind};
use crate::app::format::OutputFormat;
use crate::infra::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "packer",
    author,
    version,
    about = "Pick the most valuable items that fit in each package",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Solve every package line of an input file
    Pack(PackArgs),
    /// Print shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
struct PackArgs {
    /// Input file with one package per line, or `-` to read stdin
    input: PathBuf,
    /// Selection strategy: dynamic (exact) or greedy
    #[arg(long)]
    strategy: Option<StrategyKind>,
    /// What to do with malformed lines: abort or skip
    #[arg(long)]
    on_error: Option<ErrorPolicy>,
    /// Solve packages in parallel
    #[arg(long)]
    parallel: bool,
    /// Output format: plain or json
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Ignore user and workspace config files
    #[arg(long)]
    no_config: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Pack(args) => run_pack(args),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "packer", &mut io::stdout());
            Ok(())
        }
    }
}

fn run_pack(args: PackArgs) -> Result<()> {
    let config = if args.no_config {
        Config::load_builtin()?
    } else {
        Config::load()?
    };

    let strategy = args.strategy.unwrap_or(config.engine.strategy());
    let mut options = BatchOptions::from_config(&config);
    if let Some(policy) = args.on_error {
        options.on_error = policy;
    }
    options.parallel |= args.parallel;
    let format = args.format.unwrap_or(config.output.format());
    debug!(%strategy, on_error = %options.on_error, parallel = options.parallel, %format, "resolved settings");

    let packer = Packer::new(PackContext::with_kind(strategy), options);
    let report = read_and_pack(&packer, &args.input)?;

    let rendered = match format {
        OutputFormat::Plain => report.render_plain(),
        OutputFormat::Json => report.to_json()?,
    };
    if !rendered.is_empty() {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{rendered}").context("failed to write results")?;
    }
    Ok(())
}

fn read_and_pack(packer: &Packer, input: &Path) -> Result<BatchReport> {
    if input != Path::new("-") {
        return packer.pack_file(input);
    }

    let mut data = String::new();
    io::stdin()
        .read_to_string(&mut data)
        .context("failed to read packages from stdin")?;
    Ok(packer.pack_str(&data)?)
}
