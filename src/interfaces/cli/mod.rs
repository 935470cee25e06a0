use std::path::{Path, PathBuf};

use anyhow;
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::io::format::so3_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted `so3` heading to the `so3-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    so3_output!("╭───────────────────────────────────────────────────────────────────────────────────────╮");
    so3_output!("│      SSSSSSSSSSS        OOOOOOOOO             333333333333333                          │");
    so3_output!("│    SS:::::::::::S     OO:::::::::OO          3:::::::::::::::33                        │");
    so3_output!("│   S:::::SSSS:::::S  OO:::::::::::::OO        3::::::33333::::::3                       │");
    so3_output!("│   S:::::S    SSSSSSO:::::::OOO:::::::O       3333333     3:::::3                       │");
    so3_output!("│   S:::::S          O::::::O   O::::::O                   3:::::3                       │");
    so3_output!("│    S::::SSSS       O:::::O     O:::::O           33333333:::::3                        │");
    so3_output!("│     SS::::::SSSSS  O:::::O     O:::::O           3:::::::::::3                         │");
    so3_output!("│       SSS::::::::S O:::::O     O:::::O           33333333:::::3                        │");
    so3_output!("│          SSSSSS:::SO:::::O     O:::::O                   3:::::3                       │");
    so3_output!("│               S:::SO::::::O   O::::::O                   3:::::3                       │");
    so3_output!("│   SSSSSSS     S:::SO:::::::OOO:::::::O       3333333     3:::::3                       │");
    so3_output!("│   S::::::SSSSSS:::S OO:::::::::::::OO        3::::::33333::::::3                       │");
    so3_output!("│   S:::::::::::::SS    OO:::::::::OO          3:::::::::::::::33                        │");
    so3_output!("│    SSSSSSSSSSSSS        OOOOOOOOO             333333333333333                          │");
    so3_output!("│                                                                                       │");
    so3_output!("│   Wigner transforms on the rotation group with McEwen–Wiaux sampling    {version:>13} │");
    so3_output!("╰───────────────────────────────────────────────────────────────────────────────────────╯");
    so3_output!("");
}

/// Configures `log4rs` for the `so3` binary.
///
/// Main output lines go to standard output and, if `output` is given, also to `output` with the
/// extension `.out`. Warnings and errors from all other targets go to standard error.
///
/// # Arguments
///
/// * `output` - The optional name of the main output file, without extension.
///
/// # Errors
///
/// Errors when the output file cannot be created or when a logger has already been installed.
pub fn setup_logging(output: Option<&Path>) -> Result<log4rs::Handle, anyhow::Error> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {m}{n}")))
        .build();

    let mut builder = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut output_logger = Logger::builder().appender("stdout").additive(false);
    if let Some(name) = output {
        let mut path = name.to_path_buf();
        path.set_extension("out");
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{m}{n}")))
            .append(false)
            .build(path)?;
        builder = builder.appender(Appender::builder().build("output", Box::new(file)));
        output_logger = output_logger.appender("output");
    }
    let config = builder
        .logger(output_logger.build("so3-output", LevelFilter::Info))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
    Ok(log4rs::init_config(config)?)
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// The YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The main output file, without extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn test_interfaces_cli_parse() {
        let cli = Cli::parse_from(["so3", "-c", "input.yml", "--output", "run"]);
        assert_eq!(cli.config.unwrap().to_str(), Some("input.yml"));
        assert_eq!(cli.output.unwrap().to_str(), Some("run"));

        let cli = Cli::parse_from(["so3"]);
        assert!(cli.config.is_none());
        assert!(cli.output.is_none());
    }
}
