use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = packer::cli::Cli::parse();
    packer::init(cli.verbosity());

    packer::cli::run(cli)
}
