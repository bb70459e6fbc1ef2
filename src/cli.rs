//! Command-line arguments for the happiness dashboard.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use happiness_dashboard::load_clean::DEFAULT_DATA_PATH;
use happiness_dashboard::logging::LogFormat;
use happiness_dashboard::View;

#[derive(Parser)]
#[command(
    name = "happiness-dashboard",
    version,
    about = "World Happiness Report dashboard",
    long_about = "Render charts over the cleaned World Happiness Report (2015-2019).\n\n\
                  Pick a view and, where the view needs them, a year and a country."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Cleaned report CSV.
    #[arg(long = "data", value_name = "PATH", default_value = DEFAULT_DATA_PATH, global = true)]
    pub data: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the dashboard views and the filters each one uses.
    Views,

    /// List the years and countries available for selection.
    Options,

    /// Draw the chart of a view to an image file.
    Render(RenderArgs),

    /// Write the dashboard page for a view as standalone HTML.
    Page(PageArgs),
}

#[derive(Args)]
pub struct SelectionArgs {
    /// View to show.
    #[arg(value_enum, value_name = "VIEW")]
    pub view: ViewArg,

    /// Year filter (defaults to the earliest year when the view needs one).
    #[arg(long = "year")]
    pub year: Option<u16>,

    /// Country filter (defaults to the first country when the view needs one).
    #[arg(long = "country")]
    pub country: Option<String>,
}

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output image; a `.png` extension selects bitmap output, anything else SVG.
    /// Defaults to `<VIEW>.svg`.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Chart size in pixels, e.g. `800x500`.
    #[arg(long = "size", value_name = "WxH", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,
}

#[derive(Args)]
pub struct PageArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output page. Defaults to `<VIEW>.html`.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Chart size in pixels, e.g. `800x500`.
    #[arg(long = "size", value_name = "WxH", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,
}

/// CLI names of the dashboard views.
#[derive(Clone, Copy, ValueEnum)]
pub enum ViewArg {
    TopCountries,
    AverageByYear,
    Distribution,
    FactorComposition,
    CountryTrend,
    CountryProportion,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::TopCountries => View::TopCountries,
            ViewArg::AverageByYear => View::AverageByYear,
            ViewArg::Distribution => View::Distribution,
            ViewArg::FactorComposition => View::FactorComposition,
            ViewArg::CountryTrend => View::CountryTrend,
            ViewArg::CountryProportion => View::CountryProportion,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("invalid dimension '{s}'"))
    };
    Ok((parse(w)?, parse(h)?))
}
