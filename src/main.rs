use anyhow::{self, format_err};
use clap::Parser;

use so3::interfaces::cli::{log_heading, setup_logging, Cli};
use so3::interfaces::input::Input;
use so3::interfaces::InputHandle;
use so3::io::read_so3_yaml;

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    setup_logging(cli.output.as_deref())?;
    log_heading();

    let config = cli
        .config
        .ok_or_else(|| format_err!("No configuration file specified."))?;
    let input = read_so3_yaml::<Input, _>(&config)?;
    input.handle()
}
