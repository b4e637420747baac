//! clkmap: clock buffer insertion for JSON netlists.
//!
//! Reads a Yosys-style JSON netlist, inserts clock buffers and input pads on
//! every clock net that needs them, and writes the modified netlist.

#![warn(missing_docs)]

mod run;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, ValueEnum};

/// Inserts clock buffers into a hierarchical netlist.
#[derive(Parser, Debug)]
#[command(name = "clkmap", version, about = "Clock buffer insertion")]
pub struct Cli {
    /// Suppress notes; errors are still shown.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print a per-module summary.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `clkmap.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// What to process.
    #[command(flatten)]
    pub args: ClkmapArgs,
}

/// Input, output, and overrides of the configuration file.
#[derive(Args, Debug)]
pub struct ClkmapArgs {
    /// The JSON netlist to read.
    pub input: PathBuf,

    /// Where to write the modified netlist.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Buffer cell type and `OUT:IN` port pair.
    #[arg(long, num_args = 2, value_names = ["CELL", "PORTS"])]
    pub buf: Option<Vec<String>>,

    /// Input pad cell type and `OUT:IN` port pair.
    #[arg(long, num_args = 2, value_names = ["CELL", "PORTS"])]
    pub inpad: Option<Vec<String>>,

    /// Restrict buffering to matching wires. May be repeated.
    #[arg(long = "select", value_name = "PATTERN")]
    pub select: Vec<String>,

    /// Mark this module as the design top.
    #[arg(long)]
    pub top: Option<String>,

    /// Output format for diagnostics and the insertion report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the environment.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON on stdout.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress notes.
    pub quiet: bool,
    /// Whether to print the per-module summary.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => color_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    match run::run(&cli.args, &global) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Colors unless `NO_COLOR` is set or the terminal is unknown or dumb.
fn color_terminal() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && std::env::var("TERM").is_ok_and(|term| term != "dumb")
}
