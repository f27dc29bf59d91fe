//! Tests for the node and relationship writers.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use polars::prelude::DataFrame;
use rxgraph_common::text_frame;
use rxgraph_model::{
    DropLog, DropReason, FileKind, NodeFileSpec, OutputOptions, RelationshipFileSpec,
};
use rxgraph_output::{OutputError, write_node_file, write_relationship_file};
use tempfile::TempDir;

fn test_df(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
    text_frame(
        columns
            .into_iter()
            .map(|(name, values)| {
                (
                    name.to_string(),
                    values
                        .into_iter()
                        .map(|v| (!v.is_empty()).then(|| v.to_string()))
                        .collect(),
                )
            })
            .collect(),
    )
    .unwrap()
}

fn output(dir: &TempDir, compress: bool) -> OutputOptions {
    OutputOptions {
        output_dir: dir.path().to_path_buf(),
        compress,
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn node_file_has_unique_ids_and_labels() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![
        ("rxcui", vec!["100", "100", "101"]),
        ("generic", vec!["Acetaminophen", "Paracetamol", "Caffeine"]),
        ("brand", vec!["", "", ""]),
    ]);
    let spec = NodeFileSpec::new("rxcui_IN_nodes.csv", "rxcui", &["rxcui", "IN"]);
    let mut drops = DropLog::new();

    let written = write_node_file(&df, &spec, &output(&dir, false), &mut drops).unwrap();

    assert_eq!(written.kind, FileKind::Nodes);
    assert_eq!(written.rows, 2);
    assert_eq!(written.path, dir.path().join("rxcui_IN_nodes.csv"));
    assert_eq!(
        drops.count("rxcui_IN_nodes.csv", DropReason::DuplicateId),
        1
    );
    assert_eq!(
        drops.count("rxcui_IN_nodes.csv", DropReason::DuplicateRow),
        0
    );
    insta::assert_snapshot!(read(&written.path), @r"
rxcui:ID(RXCUI),generic,:LABEL
100,Acetaminophen,RXCUI;IN
101,Caffeine,RXCUI;IN
");
}

#[test]
fn node_file_without_labels_fails() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![("tui", vec!["T121"])]);
    let spec = NodeFileSpec {
        name: "sty.csv".to_string(),
        id_column: Some("tui".to_string()),
        labels: Vec::new(),
    };

    let mut drops = DropLog::new();
    let err = write_node_file(&df, &spec, &output(&dir, false), &mut drops).unwrap_err();
    assert!(matches!(err, OutputError::MissingLabel { .. }));
    assert!(!dir.path().join("sty.csv").exists());
}

#[test]
fn node_file_keeps_existing_label_column() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![("tui", vec!["T121"]), (":LABEL", vec!["STY;TYPE"])]);
    let spec = NodeFileSpec {
        name: "sty.csv".to_string(),
        id_column: Some("tui".to_string()),
        labels: Vec::new(),
    };

    let mut drops = DropLog::new();
    let written = write_node_file(&df, &spec, &output(&dir, false), &mut drops).unwrap();
    assert_eq!(read(&written.path), "tui:ID(TUI),:LABEL\nT121,STY;TYPE\n");
}

#[test]
fn node_file_missing_id_column_fails() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![("code", vec!["1"])]);
    let spec = NodeFileSpec::new("ndc_nodes.csv", "ndc", &["NDC"]);

    let mut drops = DropLog::new();
    let err = write_node_file(&df, &spec, &output(&dir, false), &mut drops).unwrap_err();
    assert!(matches!(err, OutputError::MissingIdColumn { ref column, .. } if column == "ndc"));
}

#[test]
fn relationship_file_headers_and_type() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![
        ("RXCUI1", vec!["300", "300", "301"]),
        ("rxaui1", vec!["", "", ""]),
        ("rxcui2", vec!["100", "100", "100"]),
        (
            ":TYPE",
            vec!["Has_Ingredient ", "Has_Ingredient ", "has_ingredient"],
        ),
    ]);
    let spec = RelationshipFileSpec::new(
        "rel_has_ingredient.csv",
        ("rxcui1", "RXCUI"),
        ("rxcui2", "rxcui"),
    );
    let mut drops = DropLog::new();

    let written = write_relationship_file(&df, &spec, &output(&dir, false), &mut drops).unwrap();

    assert_eq!(written.kind, FileKind::Relationships);
    assert_eq!(written.rows, 2);
    assert_eq!(
        drops.count("rel_has_ingredient.csv", DropReason::DuplicateRow),
        1
    );
    insta::assert_snapshot!(read(&written.path), @r"
rxcui1:START_ID(RXCUI),rxcui2:END_ID(RXCUI),:TYPE
300,100,has_ingredient
301,100,has_ingredient
");
}

#[test]
fn relationship_file_uses_default_type() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![("ndc", vec!["00002143380"]), ("rxcui", vec!["100"])]);
    let spec = RelationshipFileSpec::new(
        "ndc_cui_relations.csv",
        ("ndc", "NDC"),
        ("rxcui", "RXCUI"),
    )
    .with_type("AKA");

    let mut drops = DropLog::new();
    let written = write_relationship_file(&df, &spec, &output(&dir, false), &mut drops).unwrap();
    assert_eq!(
        read(&written.path),
        "ndc:START_ID(NDC),rxcui:END_ID(RXCUI),:TYPE\n00002143380,100,aka\n"
    );
}

#[test]
fn relationship_contract_lists_every_missing_requirement() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![("rxcui2", vec!["100"])]);
    let spec = RelationshipFileSpec::new(
        "rel_contains.csv",
        ("rxcui1", "RXCUI"),
        ("rxcui2", "RXCUI"),
    );

    let mut drops = DropLog::new();
    let err = write_relationship_file(&df, &spec, &output(&dir, false), &mut drops).unwrap_err();
    match err {
        OutputError::RelationshipContract { path, missing } => {
            assert_eq!(path, dir.path().join("rel_contains.csv"));
            assert_eq!(
                missing,
                vec!["start id column 'rxcui1'", "relationship type"]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("rel_contains.csv").exists());
}

#[test]
fn empty_table_keeps_its_header() {
    let dir = TempDir::new().unwrap();
    let df = test_df(vec![("rxcui1", vec![]), ("rxcui2", vec![])]);
    let spec = RelationshipFileSpec::new(
        "rel_contains.csv",
        ("rxcui1", "RXCUI"),
        ("rxcui2", "RXCUI"),
    )
    .with_type("contains");

    let mut drops = DropLog::new();
    let written = write_relationship_file(&df, &spec, &output(&dir, false), &mut drops).unwrap();
    assert_eq!(written.rows, 0);
    assert_eq!(
        read(&written.path),
        "rxcui1:START_ID(RXCUI),rxcui2:END_ID(RXCUI),:TYPE\n"
    );
}

#[test]
fn compressed_output_is_deterministic() {
    let df = test_df(vec![
        ("ndc", vec!["00002143380", "12345678901"]),
        ("brand", vec!["Acetaminophen", "Tylenol, Extra Strength"]),
    ]);
    let spec = NodeFileSpec::new("ndc_nodes.csv", "ndc", &["NDC"]);

    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let mut drops = DropLog::new();
    let first = write_node_file(&df, &spec, &output(&first_dir, true), &mut drops).unwrap();
    let second = write_node_file(&df, &spec, &output(&second_dir, true), &mut drops).unwrap();

    assert_eq!(first.path, first_dir.path().join("ndc_nodes.csv.gz"));
    let first_bytes = std::fs::read(&first.path).unwrap();
    assert_eq!(first_bytes, std::fs::read(&second.path).unwrap());

    let mut text = String::new();
    GzDecoder::new(first_bytes.as_slice())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(
        text,
        "ndc:ID(NDC),brand,:LABEL\n00002143380,Acetaminophen,NDC\n12345678901,\"Tylenol, Extra Strength\",NDC\n"
    );
}
