//! Pipeline stages from RRF extracts to bulk-import files.
//!
//! Each stage is a plain function so callers and tests can run them one at
//! a time; [`run_build`] chains them.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use rxgraph_ingest::{RrfInputs, SnapshotCache, require_columns};
use rxgraph_model::{DropLog, PipelineOptions, RrfKind, WrittenFile};
use rxgraph_output::{write_node_file, write_relationship_file};
use rxgraph_transform::{
    GraphInputs, GraphModel, ResolvedEntities, build_graph_model, relationship_map,
    relationship_maps, resolve_entities,
};

use crate::report::{ImportReport, write_report};

/// The four parsed extracts.
#[derive(Debug, Clone)]
pub struct RrfTables {
    pub conso: DataFrame,
    pub rel: DataFrame,
    pub sat: DataFrame,
    pub sty: DataFrame,
}

impl RrfTables {
    pub fn table(&self, kind: RrfKind) -> &DataFrame {
        match kind {
            RrfKind::Concept => &self.conso,
            RrfKind::Relation => &self.rel,
            RrfKind::Attribute => &self.sat,
            RrfKind::SemanticType => &self.sty,
        }
    }
}

/// Relationship maps for the configured types plus the tradename map used
/// by entity resolution.
#[derive(Debug, Clone)]
pub struct RelationshipTables {
    pub by_type: BTreeMap<String, DataFrame>,
    pub tradenames: DataFrame,
}

/// Outcome of a full build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub tables: Vec<(RrfKind, usize)>,
    pub files: Vec<WrittenFile>,
    pub drops: DropLog,
    pub report: ImportReport,
    pub report_path: PathBuf,
}

impl BuildResult {
    pub fn file(&self, name: &str) -> Option<&WrittenFile> {
        self.files.iter().find(|file| file.file_name() == name)
    }
}

/// Reads the extracts, through the snapshot cache when it is enabled.
pub fn ingest_tables(inputs: &RrfInputs, cache: &SnapshotCache) -> Result<RrfTables> {
    let span = info_span!("ingest", snapshots = cache.is_enabled());
    let _enter = span.enter();
    let start = Instant::now();

    inputs.verify().context("verify RRF inputs")?;
    let load = |kind: RrfKind| -> Result<DataFrame> {
        let path = inputs.path(kind);
        let df = cache
            .load(path, kind)
            .with_context(|| format!("read {} table from {}", kind, path.display()))?;
        require_columns(&df, kind.table_name(), kind.headers())
            .with_context(|| format!("validate {kind} table"))?;
        Ok(df)
    };

    let tables = RrfTables {
        conso: load(RrfKind::Concept)?,
        rel: load(RrfKind::Relation)?,
        sat: load(RrfKind::Attribute)?,
        sty: load(RrfKind::SemanticType)?,
    };
    info!(
        conso = tables.conso.height(),
        rel = tables.rel.height(),
        sat = tables.sat.height(),
        sty = tables.sty.height(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(tables)
}

/// Builds the relationship maps of the configured types.
///
/// The tradename map is reused when its type is configured and built
/// separately otherwise, since resolution always needs it.
pub fn build_relationships(
    rel: &DataFrame,
    options: &PipelineOptions,
) -> Result<RelationshipTables> {
    let span = info_span!("relationships");
    let _enter = span.enter();

    let trusted = &options.resolution.trusted_source;
    let by_type = relationship_maps(rel, &options.graph.relation_types, trusted)
        .context("build relationship maps")?;
    let tradename_relation = &options.resolution.tradename_relation;
    let tradenames = match by_type.get(tradename_relation) {
        Some(map) => map.clone(),
        None => relationship_map(rel, tradename_relation, trusted)
            .with_context(|| format!("build {tradename_relation} map"))?,
    };
    Ok(RelationshipTables {
        by_type,
        tradenames,
    })
}

/// Merges generic and brand concepts into medication entities.
pub fn resolve(
    conso: &DataFrame,
    relationships: &RelationshipTables,
    options: &PipelineOptions,
    drops: &mut DropLog,
) -> Result<ResolvedEntities> {
    let span = info_span!("resolve");
    let _enter = span.enter();
    let start = Instant::now();

    let entities = resolve_entities(conso, &relationships.tradenames, &options.resolution, drops)
        .context("resolve medication entities")?;
    info!(
        merged = entities.merged.height(),
        standalone = entities.standalone.height(),
        duration_ms = start.elapsed().as_millis(),
        "entities resolved"
    );
    Ok(entities)
}

/// Assembles node and edge tables.
pub fn build_graph(
    tables: &RrfTables,
    relationships: &RelationshipTables,
    entities: &ResolvedEntities,
    options: &PipelineOptions,
    drops: &mut DropLog,
) -> Result<GraphModel> {
    let span = info_span!("graph");
    let _enter = span.enter();
    let start = Instant::now();

    let inputs = GraphInputs {
        conso: &tables.conso,
        sat: &tables.sat,
        sty: &tables.sty,
        relationships: &relationships.by_type,
        entities,
    };
    let model = build_graph_model(inputs, options, drops).context("build graph model")?;
    info!(
        node_files = model.nodes.len(),
        edge_files = model.edges.len(),
        nodes = model.node_rows(),
        edges = model.edge_rows(),
        duration_ms = start.elapsed().as_millis(),
        "graph model built"
    );
    Ok(model)
}

/// Writes every node file, then every relationship file.
pub fn write_outputs(
    model: &GraphModel,
    options: &PipelineOptions,
    drops: &mut DropLog,
) -> Result<Vec<WrittenFile>> {
    let span = info_span!("output", dir = %options.output.output_dir.display());
    let _enter = span.enter();
    let start = Instant::now();

    std::fs::create_dir_all(&options.output.output_dir).with_context(|| {
        format!(
            "create output directory {}",
            options.output.output_dir.display()
        )
    })?;

    let mut files = Vec::with_capacity(model.nodes.len() + model.edges.len());
    for table in &model.nodes {
        let written = write_node_file(&table.data, &table.spec, &options.output, drops)
            .with_context(|| format!("write {}", table.spec.name))?;
        files.push(written);
    }
    for table in &model.edges {
        let written = write_relationship_file(&table.data, &table.spec, &options.output, drops)
            .with_context(|| format!("write {}", table.spec.name))?;
        files.push(written);
    }
    info!(
        files = files.len(),
        duration_ms = start.elapsed().as_millis(),
        "output written"
    );
    Ok(files)
}

/// Runs the whole pipeline and writes the run report.
pub fn run_build(inputs: &RrfInputs, options: &PipelineOptions) -> Result<BuildResult> {
    let span = info_span!("build", output_dir = %options.output.output_dir.display());
    let _enter = span.enter();
    let start = Instant::now();
    let mut drops = DropLog::new();

    // === Stage 1: Ingest ===
    let cache = SnapshotCache::new(options.cache.snapshots);
    let tables = ingest_tables(inputs, &cache)?;

    // === Stage 2: Relationship maps ===
    let relationships = build_relationships(&tables.rel, options)?;

    // === Stage 3: Entity resolution ===
    let entities = resolve(&tables.conso, &relationships, options, &mut drops)?;

    // === Stage 4: Graph model ===
    let model = build_graph(&tables, &relationships, &entities, options, &mut drops)?;

    // === Stage 5: Output ===
    let files = write_outputs(&model, options, &mut drops)?;
    let report = ImportReport::new(&files, &drops);
    let report_path = write_report(&report, &options.output.output_dir)?;

    info!(
        files = files.len(),
        dropped = drops.total(),
        duration_ms = start.elapsed().as_millis(),
        "build complete"
    );
    Ok(BuildResult {
        output_dir: options.output.output_dir.clone(),
        tables: RrfKind::ALL
            .iter()
            .map(|kind| (*kind, tables.table(*kind).height()))
            .collect(),
        files,
        drops,
        report,
        report_path,
    })
}
