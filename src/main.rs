//! World Happiness dashboard CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use happiness_dashboard::logging::{init_logging, LogConfig};

mod cli;
mod commands;

use crate::cli::{Cli, Command};
use crate::commands::{run_options, run_page, run_render, run_views};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::Views => run_views(),
        Command::Options => run_options(&cli.data),
        Command::Render(args) => run_render(&cli.data, args),
        Command::Page(args) => run_page(&cli.data, args),
    };

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        with_ansi: match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
        },
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
    }
}
