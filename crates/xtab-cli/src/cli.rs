//! CLI argument definitions for the xtab table compiler.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use xtab_model::ParentChildOrder;

#[derive(Parser)]
#[command(
    name = "xtab",
    version,
    about = "XBRL table linkbase compiler - render table definitions to grids",
    long_about = "Compile table definitions from a verified taxonomy package into\n\
                  cell grids with resolved and validated constraints, or export\n\
                  the DPM address map of a table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render tables of a taxonomy package.
    Render(RenderArgs),

    /// Export the DPM address map of one table as JSON.
    Dpm(DpmArgs),

    /// Verify a taxonomy package manifest and print its contents.
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct OrderArgs {
    /// Place children before their parent for this rendering pass.
    #[arg(long = "children-first", conflicts_with = "parent_first")]
    pub children_first: bool,

    /// Place parents before their children for this rendering pass.
    #[arg(long = "parent-first")]
    pub parent_first: bool,
}

impl OrderArgs {
    pub fn order_override(&self) -> Option<ParentChildOrder> {
        if self.children_first {
            Some(ParentChildOrder::ChildrenFirst)
        } else if self.parent_first {
            Some(ParentChildOrder::ParentFirst)
        } else {
            None
        }
    }
}

#[derive(Parser)]
pub struct RenderArgs {
    /// Taxonomy package directory containing manifest.toml.
    #[arg(value_name = "PACKAGE_DIR")]
    pub package_dir: PathBuf,

    /// Render only this table (default: every table in the package).
    #[arg(long = "table", value_name = "ID")]
    pub table: Option<String>,

    #[command(flatten)]
    pub order: OrderArgs,

    /// Output format for the rendered grids.
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: RenderFormatArg,
}

#[derive(Parser)]
pub struct DpmArgs {
    /// Taxonomy package directory containing manifest.toml.
    #[arg(value_name = "PACKAGE_DIR")]
    pub package_dir: PathBuf,

    /// Table to export.
    #[arg(long = "table", value_name = "ID")]
    pub table: String,

    #[command(flatten)]
    pub order: OrderArgs,

    /// Write the map to a file instead of stdout.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct VerifyArgs {
    /// Taxonomy package directory containing manifest.toml.
    #[arg(value_name = "PACKAGE_DIR")]
    pub package_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RenderFormatArg {
    Text,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
