use crate::config::PolicySelection;
use crate::utils::parser::parse_finite_f64;
use clap::{Args, Parser, Subcommand, ValueEnum};
use randwalk::core::random::RandomNumberKind;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "randwalk developers",
    version,
    about = "randwalk CLI - Bit-reproducible two-dimensional random walks, advanced sequentially or in parallel.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by the parallel policy.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Advance a set of random walkers and report selected particles before and after.
    Run(RunArgs),
    /// Print the built-in configuration as a TOML document usable with `run --config`.
    Defaults,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    // --- Simulation ---
    /// Number of particles to simulate.
    #[arg(short = 'n', long, value_name = "INT")]
    pub particles: Option<u32>,

    /// Total number of steps per particle, including the initial step.
    #[arg(short = 'x', long, value_name = "INT")]
    pub steps: Option<u32>,

    /// Scale applied to every random step.
    #[arg(short = 'f', long, value_name = "FLOAT", value_parser = parse_finite_f64)]
    pub fluctuation: Option<f64>,

    /// Distribution each step is drawn from.
    #[arg(short = 's', long, value_enum, value_name = "STYLE")]
    pub style: Option<StyleArg>,

    /// Fractional bits of the fixed-point coordinates.
    #[arg(short = 'b', long, value_name = "INT")]
    pub bits: Option<u32>,

    /// Seed of the base random stream.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Independent replica of the same seed.
    #[arg(long, value_name = "INT")]
    pub replica: Option<u32>,

    // --- Execution ---
    /// Execution policy; `both` runs sequential and parallel and compares them.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub policy: Option<PolicySelection>,

    /// Steps per advance call between progress updates.
    #[arg(long, value_name = "INT")]
    pub chunk_steps: Option<u32>,

    // --- Reporting ---
    /// Number of evenly spaced particles to report.
    #[arg(short = 'r', long, value_name = "INT")]
    pub report: Option<usize>,

    /// Report these particle indices instead of evenly spaced ones.
    /// Accepts a comma-separated list or repeated flags.
    #[arg(short = 't', long = "track", value_name = "INDEX", value_delimiter = ',')]
    pub track: Vec<usize>,

    // --- Configuration ---
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S simulation.bits=32
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleArg {
    Uniform,
    Gaussian,
}

impl From<StyleArg> for RandomNumberKind {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Uniform => RandomNumberKind::Uniform,
            StyleArg::Gaussian => RandomNumberKind::Gaussian,
        }
    }
}
