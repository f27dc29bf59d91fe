//! Assembly of node and edge tables from resolved entities.
//!
//! Every edge table is gated on the node ids emitted in the same model, so
//! the written files are referentially consistent. Rows failing the gate are
//! counted in the [`DropLog`].

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use rxgraph_common::{filter_rows, text_column, text_frame};
use rxgraph_model::{
    DropLog, DropReason, GraphOptions, NodeFileSpec, PipelineOptions, RelationshipFileSpec,
};

use crate::error::{Result, require_columns};
use crate::ndc::normalize_ndc;
use crate::resolve::ResolvedEntities;

const STAGE: &str = "graph";

pub const NDC_NODES_FILE: &str = "ndc_nodes.csv";
pub const NDC_EDGES_FILE: &str = "ndc_cui_relations.csv";
pub const STY_NODES_FILE: &str = "tui_semantic_types_nodes.csv";

/// A node table with the spec used to write it.
#[derive(Debug, Clone)]
pub struct NodeTable {
    pub spec: NodeFileSpec,
    pub data: DataFrame,
}

/// An edge table with the spec used to write it.
#[derive(Debug, Clone)]
pub struct EdgeTable {
    pub spec: RelationshipFileSpec,
    pub data: DataFrame,
}

/// All tables of one import.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    pub nodes: Vec<NodeTable>,
    pub edges: Vec<EdgeTable>,
}

impl GraphModel {
    pub fn node_rows(&self) -> usize {
        self.nodes.iter().map(|table| table.data.height()).sum()
    }

    pub fn edge_rows(&self) -> usize {
        self.edges.iter().map(|table| table.data.height()).sum()
    }

    pub fn node_table(&self, name: &str) -> Option<&NodeTable> {
        self.nodes.iter().find(|table| table.spec.name == name)
    }

    pub fn edge_table(&self, name: &str) -> Option<&EdgeTable> {
        self.edges.iter().find(|table| table.spec.name == name)
    }
}

/// Tables consumed by [`build_graph_model`].
#[derive(Debug, Clone, Copy)]
pub struct GraphInputs<'a> {
    pub conso: &'a DataFrame,
    pub sat: &'a DataFrame,
    pub sty: &'a DataFrame,
    /// Relationship maps keyed by relation type.
    pub relationships: &'a BTreeMap<String, DataFrame>,
    pub entities: &'a ResolvedEntities,
}

/// File name of the edge table for a relation type.
pub fn relation_file_name(rela_type: &str) -> String {
    format!("rel_{rela_type}.csv")
}

/// File name of the medication node table for a term type.
pub fn medication_file_name(tty: &str) -> String {
    format!("rxcui_{tty}_nodes.csv")
}

/// Builds the node and edge tables of the import.
pub fn build_graph_model(
    inputs: GraphInputs<'_>,
    options: &PipelineOptions,
    log: &mut DropLog,
) -> Result<GraphModel> {
    let graph = &options.graph;
    let mut model = GraphModel::default();

    let medications = medication_nodes(inputs.entities, graph)?;
    let medication_ids = inputs.entities.medication_ids()?;

    let ndc = ndc_nodes(inputs.sat, inputs.conso, options, log)?;
    let ndc_edges = gate_edges(&ndc, "rxcui", &medication_ids, NDC_EDGES_FILE, log)?
        .select(["ndc", "rxaui", "rxcui"])?;
    model.nodes.push(NodeTable {
        spec: NodeFileSpec::new(NDC_NODES_FILE, "ndc", &[graph.ndc_label.as_str()]),
        data: ndc,
    });

    let sty_nodes = semantic_type_nodes(inputs.sty)?;
    let sty_edges = if graph.semantic_type_edges {
        Some((
            semantic_type_edges(inputs.sty, &medication_ids, graph, log)?,
            semantic_tree_edges(&sty_nodes, graph, log)?,
        ))
    } else {
        None
    };
    model.nodes.push(NodeTable {
        spec: NodeFileSpec::new(STY_NODES_FILE, "tui", &[graph.sty_label.as_str()]),
        data: sty_nodes,
    });
    model.nodes.extend(medications);

    model.edges.push(EdgeTable {
        spec: RelationshipFileSpec::new(
            NDC_EDGES_FILE,
            ("ndc", graph.ndc_label.as_str()),
            ("rxcui", graph.medication_label.as_str()),
        )
        .with_type(&graph.ndc_relation_type),
        data: ndc_edges,
    });

    for (rela_type, map) in inputs.relationships {
        let name = relation_file_name(rela_type);
        require_columns(map, &name, &["rxcui1", "rxcui2"])?;
        let data = gate_both_endpoints(map, &medication_ids, &name, log)?;
        model.edges.push(EdgeTable {
            spec: RelationshipFileSpec::new(
                name,
                ("rxcui1", graph.medication_label.as_str()),
                ("rxcui2", graph.medication_label.as_str()),
            )
            .with_type(rela_type),
            data,
        });
    }

    if let Some((has_type, isa)) = sty_edges {
        model.edges.push(has_type);
        model.edges.push(isa);
    }

    tracing::info!(
        node_files = model.nodes.len(),
        nodes = model.node_rows(),
        edge_files = model.edges.len(),
        edges = model.edge_rows(),
        "graph model built"
    );
    Ok(model)
}

/// Medication nodes from the merged and standalone entities, one table per TTY.
fn medication_nodes(entities: &ResolvedEntities, graph: &GraphOptions) -> Result<Vec<NodeTable>> {
    const COLUMNS: [&str; 7] = ["rxcui", "rxaui", "tty", "code", "sab", "generic", "brand"];

    let mut by_tty: BTreeMap<String, Vec<Vec<Option<String>>>> = BTreeMap::new();
    for df in [&entities.merged, &entities.standalone] {
        let mut columns = Vec::with_capacity(COLUMNS.len());
        for name in COLUMNS {
            if rxgraph_common::has_column(df, name) {
                columns.push(text_column(df, name)?);
            } else {
                columns.push(vec![None; df.height()]);
            }
        }
        for idx in 0..df.height() {
            let Some(tty) = columns[2][idx].clone() else {
                continue;
            };
            let table = by_tty
                .entry(tty)
                .or_insert_with(|| vec![Vec::new(); COLUMNS.len()]);
            for (target, source) in table.iter_mut().zip(&columns) {
                target.push(source[idx].clone());
            }
        }
    }

    let mut tables = Vec::with_capacity(by_tty.len());
    for (tty, columns) in by_tty {
        let data = text_frame(
            COLUMNS
                .iter()
                .map(|name| (*name).to_string())
                .zip(columns)
                .collect(),
        )?;
        tables.push(NodeTable {
            spec: NodeFileSpec::new(
                medication_file_name(&tty),
                "rxcui",
                &[graph.medication_label.as_str(), tty.as_str()],
            ),
            data,
        });
    }
    Ok(tables)
}

/// Product-code nodes: trusted, unsuppressed NDC attributes keyed by normalized code.
fn ndc_nodes(
    sat: &DataFrame,
    conso: &DataFrame,
    options: &PipelineOptions,
    log: &mut DropLog,
) -> Result<DataFrame> {
    require_columns(
        sat,
        "sat",
        &["rxcui", "rxaui", "atn", "atv", "sab", "suppress"],
    )?;
    require_columns(conso, "conso", &["rxcui", "str"])?;

    let mut names: BTreeMap<String, String> = BTreeMap::new();
    let conso_cuis = text_column(conso, "rxcui")?;
    let conso_names = text_column(conso, "str")?;
    for (cui, name) in conso_cuis.into_iter().zip(conso_names) {
        if let (Some(cui), Some(name)) = (cui, name) {
            names.entry(cui).or_insert(name);
        }
    }

    let rxcui = text_column(sat, "rxcui")?;
    let rxaui = text_column(sat, "rxaui")?;
    let atn = text_column(sat, "atn")?;
    let atv = text_column(sat, "atv")?;
    let sab = text_column(sat, "sab")?;
    let suppress = text_column(sat, "suppress")?;

    let resolution = &options.resolution;
    let mut seen = BTreeSet::new();
    let mut duplicates = 0usize;
    let mut columns: [Vec<Option<String>>; 4] = Default::default();
    for idx in 0..sat.height() {
        let is_ndc = atn[idx].as_deref() == Some(options.graph.ndc_attribute.as_str())
            && suppress[idx].as_deref() == Some(resolution.not_suppressed_flag.as_str())
            && sab[idx].as_deref() == Some(resolution.trusted_source.as_str());
        let Some(code) = atv[idx].as_deref().filter(|_| is_ndc) else {
            continue;
        };
        let ndc = normalize_ndc(code);
        if !seen.insert(ndc.clone()) {
            duplicates += 1;
            continue;
        }
        let brand = rxcui[idx].as_ref().and_then(|cui| names.get(cui)).cloned();
        columns[0].push(Some(ndc));
        columns[1].push(rxcui[idx].clone());
        columns[2].push(rxaui[idx].clone());
        columns[3].push(brand);
    }
    log.record(STAGE, NDC_NODES_FILE, DropReason::DuplicateNdc, duplicates);

    let [ndc, rxcui, rxaui, brand] = columns;
    Ok(text_frame(vec![
        ("ndc".to_string(), ndc),
        ("rxcui".to_string(), rxcui),
        ("rxaui".to_string(), rxaui),
        ("brand".to_string(), brand),
    ])?)
}

/// Semantic-type nodes with the number of records referencing each type.
fn semantic_type_nodes(sty: &DataFrame) -> Result<DataFrame> {
    require_columns(sty, "sty", &["tui", "stn", "sty"])?;
    let tui = text_column(sty, "tui")?;
    let stn = text_column(sty, "stn")?;
    let label = text_column(sty, "sty")?;

    let mut counts: BTreeMap<(Option<String>, String, Option<String>), u32> = BTreeMap::new();
    for idx in 0..sty.height() {
        let Some(tui) = tui[idx].clone() else {
            continue;
        };
        *counts
            .entry((stn[idx].clone(), tui, label[idx].clone()))
            .or_insert(0) += 1;
    }

    let mut stn_values = Vec::with_capacity(counts.len());
    let mut tui_values = Vec::with_capacity(counts.len());
    let mut sty_values = Vec::with_capacity(counts.len());
    let mut reference_count = Vec::with_capacity(counts.len());
    for ((stn, tui, label), count) in counts {
        stn_values.push(stn);
        tui_values.push(Some(tui));
        sty_values.push(label);
        reference_count.push(count);
    }

    let mut df = text_frame(vec![
        ("stn".to_string(), stn_values),
        ("tui".to_string(), tui_values),
        ("sty".to_string(), sty_values),
    ])?;
    df.with_column(Series::new("reference_count".into(), reference_count).into_column())?;
    Ok(df)
}

/// Concept to semantic-type edges for medication concepts, one per `(rxcui, tui)`.
fn semantic_type_edges(
    sty: &DataFrame,
    medication_ids: &BTreeSet<String>,
    graph: &GraphOptions,
    log: &mut DropLog,
) -> Result<EdgeTable> {
    let name = relation_file_name(&graph.semantic_type_relation);
    require_columns(sty, "sty", &["rxcui", "tui"])?;
    let rxcui = text_column(sty, "rxcui")?;
    let tui = text_column(sty, "tui")?;

    let mut seen = BTreeSet::new();
    let mut dangling = 0usize;
    let mut duplicates = 0usize;
    let mut keep_rxcui = Vec::new();
    let mut keep_tui = Vec::new();
    for (cui, tui) in rxcui.into_iter().zip(tui) {
        let (Some(cui), Some(tui)) = (cui, tui) else {
            dangling += 1;
            continue;
        };
        if !medication_ids.contains(&cui) {
            dangling += 1;
            continue;
        }
        if !seen.insert((cui.clone(), tui.clone())) {
            duplicates += 1;
            continue;
        }
        keep_rxcui.push(Some(cui));
        keep_tui.push(Some(tui));
    }
    log.record(STAGE, &name, DropReason::DanglingEndpoint, dangling);
    log.record(STAGE, &name, DropReason::DuplicateRow, duplicates);

    let data = text_frame(vec![
        ("rxcui".to_string(), keep_rxcui),
        ("tui".to_string(), keep_tui),
    ])?;
    Ok(EdgeTable {
        spec: RelationshipFileSpec::new(
            name,
            ("rxcui", graph.medication_label.as_str()),
            ("tui", graph.sty_label.as_str()),
        )
        .with_type(&graph.semantic_type_relation),
        data,
    })
}

/// Parent position in the semantic-type tree: `A1.1.3` to `A1.1`, `A1` to `A`.
pub fn parent_tree_number(stn: &str) -> Option<&str> {
    match stn.rfind('.') {
        Some(pos) => Some(&stn[..pos]),
        None if stn.len() > 1 => stn.get(..1),
        None => None,
    }
}

/// Type-hierarchy edges from each semantic type to its parent type.
fn semantic_tree_edges(
    sty_nodes: &DataFrame,
    graph: &GraphOptions,
    log: &mut DropLog,
) -> Result<EdgeTable> {
    let name = format!("rel_sty_{}.csv", graph.semantic_tree_relation);
    let stn = text_column(sty_nodes, "stn")?;
    let tui = text_column(sty_nodes, "tui")?;

    let mut tui_by_stn: BTreeMap<&str, &str> = BTreeMap::new();
    for (stn, tui) in stn.iter().zip(&tui) {
        if let (Some(stn), Some(tui)) = (stn, tui) {
            tui_by_stn.entry(stn.as_str()).or_insert(tui.as_str());
        }
    }

    let mut missing_parent = 0usize;
    let mut child = Vec::new();
    let mut parent = Vec::new();
    for (stn, tui) in stn.iter().zip(&tui) {
        let (Some(stn), Some(tui)) = (stn, tui) else {
            continue;
        };
        let Some(parent_stn) = parent_tree_number(stn) else {
            continue;
        };
        match tui_by_stn.get(parent_stn) {
            Some(parent_tui) if *parent_tui != tui.as_str() => {
                child.push(Some(tui.clone()));
                parent.push(Some((*parent_tui).to_string()));
            }
            Some(_) => {}
            None => missing_parent += 1,
        }
    }
    log.record(STAGE, &name, DropReason::MissingParentType, missing_parent);

    let data = text_frame(vec![
        ("tui".to_string(), child),
        ("parent_tui".to_string(), parent),
    ])?;
    Ok(EdgeTable {
        spec: RelationshipFileSpec::new(
            name,
            ("tui", graph.sty_label.as_str()),
            ("parent_tui", graph.sty_label.as_str()),
        )
        .with_type(&graph.semantic_tree_relation),
        data,
    })
}

/// Keeps rows whose `column` value is a known node id.
fn gate_edges(
    df: &DataFrame,
    column: &str,
    ids: &BTreeSet<String>,
    target: &str,
    log: &mut DropLog,
) -> Result<DataFrame> {
    let keep: Vec<bool> = text_column(df, column)?
        .iter()
        .map(|value| value.as_ref().is_some_and(|id| ids.contains(id)))
        .collect();
    let dropped = keep.iter().filter(|kept| !**kept).count();
    log.record(STAGE, target, DropReason::DanglingEndpoint, dropped);
    Ok(filter_rows(df, &keep)?)
}

/// Keeps relation rows whose `rxcui1` and `rxcui2` are both known node ids.
fn gate_both_endpoints(
    df: &DataFrame,
    ids: &BTreeSet<String>,
    target: &str,
    log: &mut DropLog,
) -> Result<DataFrame> {
    let start = text_column(df, "rxcui1")?;
    let end = text_column(df, "rxcui2")?;
    let known = |value: &Option<String>| value.as_ref().is_some_and(|id| ids.contains(id));
    let keep: Vec<bool> = start
        .iter()
        .zip(&end)
        .map(|(start, end)| known(start) && known(end))
        .collect();
    let dropped = keep.iter().filter(|kept| !**kept).count();
    log.record(STAGE, target, DropReason::DanglingEndpoint, dropped);
    Ok(filter_rows(df, &keep)?)
}
