use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "pkagraph CLI - Turns annotated pKa datasets into paired protonated/deprotonated molecular graph samples.",
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

    /// Write logs to a specified file in addition to the console output.
    /// The file always records DEBUG events, whatever the console verbosity.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the node and edge features known to the vocabulary.
    Features(FeaturesArgs),
    /// Pair every molecule of one or more SD files with its conjugate and build graph samples.
    Prepare(PrepareArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Node,
    Edge,
}

/// Arguments for the `features` subcommand.
#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// Only list features of this kind.
    #[arg(short, long, value_enum)]
    pub kind: Option<KindFilter>,

    /// Print the total width of the given feature names instead of the listing.
    #[arg(short, long, value_name = "NAME", num_args(1..))]
    pub width: Vec<String>,
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    // --- Core Arguments ---
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// An input SD file, as NAME=PATH or PATH (named after its file stem).
    /// Can be used multiple times; adds to the datasets of the config file.
    #[arg(short, long = "input", value_name = "[NAME=]PATH")]
    pub inputs: Vec<String>,

    /// Directory for the per-dataset manifests. Nothing is written without it.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    // --- Output Overrides ---
    #[command(flatten)]
    pub output_mode: OutputModeArgs,

    /// Split every dataset into this many cross-validation folds and write one manifest per fold.
    #[arg(short = 'k', long, value_name = "INT")]
    pub folds: Option<usize>,

    // --- Conjugate Overrides ---
    /// Override the pH used to decide the protonation direction.
    #[arg(long, value_name = "FLOAT")]
    pub ph: Option<f64>,

    /// Override `conjugate.ignore-danger` from the config file.
    #[command(flatten)]
    pub danger: DangerArgs,

    // --- Feature Overrides ---
    /// Override the node feature selection (in column order).
    #[arg(long, value_name = "NAME", num_args(1..))]
    pub node_features: Option<Vec<String>>,

    /// Override the edge feature selection (in column order).
    #[arg(long, value_name = "NAME", num_args(1..))]
    pub edge_features: Option<Vec<String>>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S conjugate.ph=7.0
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive output shape flags.
#[derive(Args, Debug, Clone, Default)]
#[group(required = false, multiple = false)]
pub struct OutputModeArgs {
    /// Keep both protonation states in every sample.
    #[arg(long)]
    pub paired: bool,
    /// Keep only one protonation state ('protonated' or 'deprotonated').
    #[arg(long, value_name = "SIDE")]
    pub single: Option<String>,
}

/// Mutually exclusive flags for conjugate generation at uncertain sites.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct DangerArgs {
    /// Protonate even where pKa and pH do not decide the direction.
    #[arg(long)]
    pub ignore_danger: bool,
    /// Treat sites where pKa and pH do not decide the direction as failures.
    #[arg(long)]
    pub respect_danger: bool,
}
