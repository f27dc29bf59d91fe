//! CLI argument definitions for the RxNorm graph builder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rxgraph",
    version,
    about = "Turn RxNorm RRF extracts into graph bulk-import files",
    long_about = "Turn an RxNorm release into node and relationship CSV files.\n\n\
                  Reads RXNCONSO, RXNREL, RXNSAT and RXNSTY (plain or gzip), merges\n\
                  generic and brand concepts, and writes files for an offline bulk import."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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
    /// Build the import files from a release directory.
    Build(BuildArgs),

    /// Normalize product codes to their 11-digit form.
    Ndc {
        /// Codes to normalize, segmented or not.
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<String>,
    },

    /// Print the effective configuration as TOML.
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Directory holding the RXN*.RRF extracts (plain or .gz).
    #[arg(value_name = "RRF_DIR", default_value = ".")]
    pub rrf_dir: PathBuf,

    /// Configuration file; command-line flags override its values.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory for the import files.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Gzip every output file.
    #[arg(long = "compress")]
    pub compress: bool,

    /// Always parse the extracts, ignoring and not writing snapshots.
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Source vocabulary trusted for concepts and relationships.
    #[arg(long = "trusted-source", value_name = "SAB")]
    pub trusted_source: Option<String>,

    /// Skip the concept to semantic type and type hierarchy edges.
    #[arg(long = "no-semantic-edges")]
    pub no_semantic_edges: bool,

    /// Concept extract, instead of the one found in RRF_DIR.
    #[arg(long = "conso", value_name = "PATH")]
    pub conso: Option<PathBuf>,

    /// Relationship extract, instead of the one found in RRF_DIR.
    #[arg(long = "rel", value_name = "PATH")]
    pub rel: Option<PathBuf>,

    /// Attribute extract, instead of the one found in RRF_DIR.
    #[arg(long = "sat", value_name = "PATH")]
    pub sat: Option<PathBuf>,

    /// Semantic type extract, instead of the one found in RRF_DIR.
    #[arg(long = "sty", value_name = "PATH")]
    pub sty: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Configuration file to merge over the defaults.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
