use anyhow::Result;
use clap::Parser;

use keyrace::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
