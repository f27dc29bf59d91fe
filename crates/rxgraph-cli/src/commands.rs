use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::info_span;

use rxgraph_cli::pipeline::{BuildResult, run_build};
use rxgraph_ingest::{RrfInputs, locate_rrf_files};
use rxgraph_model::{PipelineOptions, RrfKind};
use rxgraph_transform::normalize_ndc;

use crate::cli::{BuildArgs, ConfigArgs};
use crate::summary::{apply_table_style, header_cell};

pub fn run_build_command(args: &BuildArgs) -> Result<BuildResult> {
    let span = info_span!("build_command", rrf_dir = %args.rrf_dir.display());
    let _enter = span.enter();

    let options = options_from_args(args)?;
    let inputs = inputs_from_args(args)?;
    run_build(&inputs, &options)
}

pub fn run_ndc(codes: &[String]) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Input"), header_cell("NDC")]);
    apply_table_style(&mut table);
    for code in codes {
        table.add_row(vec![code.clone(), normalize_ndc(code)]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_config(args: &ConfigArgs) -> Result<()> {
    let options = load_options(args.config.as_deref())?;
    let text = options
        .to_toml_string()
        .context("serialize configuration")?;
    print!("{text}");
    Ok(())
}

fn load_options(config: Option<&Path>) -> Result<PipelineOptions> {
    match config {
        Some(path) => PipelineOptions::from_toml_file(path)
            .with_context(|| format!("load configuration from {}", path.display())),
        None => Ok(PipelineOptions::default()),
    }
}

/// Defaults, then the configuration file, then command-line flags.
fn options_from_args(args: &BuildArgs) -> Result<PipelineOptions> {
    let mut options = load_options(args.config.as_deref())?;
    if let Some(dir) = &args.output_dir {
        options = options.with_output_dir(dir.clone());
    }
    if args.compress {
        options = options.with_compress(true);
    }
    if args.no_cache {
        options = options.with_snapshots(false);
    }
    if let Some(source) = &args.trusted_source {
        options = options.with_trusted_source(source.clone());
    }
    if args.no_semantic_edges {
        options.graph.semantic_type_edges = false;
    }
    Ok(options)
}

/// Extracts found in the release directory, replaced by any given explicitly.
fn inputs_from_args(args: &BuildArgs) -> Result<RrfInputs> {
    let mut inputs = locate_rrf_files(&args.rrf_dir)
        .with_context(|| format!("locate RRF files in {}", args.rrf_dir.display()))?;
    let overrides = [
        (RrfKind::Concept, &args.conso),
        (RrfKind::Relation, &args.rel),
        (RrfKind::Attribute, &args.sat),
        (RrfKind::SemanticType, &args.sty),
    ];
    for (kind, path) in overrides {
        if let Some(path) = path {
            inputs.set_path(kind, path.clone());
        }
    }
    inputs.verify().context("verify RRF inputs")?;
    Ok(inputs)
}
