//! End-to-end tests of the build pipeline over RRF files on disk.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use rxgraph_cli::pipeline::{BuildResult, run_build};
use rxgraph_cli::report::{REPORT_FILE, read_report};
use rxgraph_ingest::{RrfInputs, discover_rrf_files};
use rxgraph_model::{DropReason, FileKind, PipelineOptions};
use tempfile::TempDir;

fn rrf_line(fields: &[&str]) -> String {
    format!("{}|\n", fields.join("|"))
}

fn conso_line(rxcui: &str, tty: &str, name: &str) -> String {
    let rxaui = format!("A{rxcui}");
    rrf_line(&[
        rxcui, "ENG", "", "L1", "PF", "S1", "Y", &rxaui, "", "", "", "RXNORM", tty, rxcui, name,
        "", "N", "4096",
    ])
}

fn rel_line(rxcui1: &str, rela: &str, rxcui2: &str, sab: &str) -> String {
    rrf_line(&[
        rxcui1, "", "CUI", "RO", rxcui2, "", "CUI", rela, "R1", "", sab, sab, "", "", "N", "",
    ])
}

fn sat_line(rxcui: &str, atn: &str, atv: &str) -> String {
    let rxaui = format!("A{rxcui}");
    rrf_line(&[
        rxcui, "", "", &rxaui, "AUI", rxcui, "AT1", "", atn, "RXNORM", atv, "N", "4096",
    ])
}

fn sty_line(rxcui: &str, tui: &str, stn: &str, sty: &str) -> String {
    rrf_line(&[rxcui, tui, stn, sty, "AT2", "4096"])
}

fn conso_text() -> String {
    [
        conso_line("100", "IN", "Acetaminophen"),
        conso_line("300", "SCD", "Acetaminophen 500 MG Oral Tablet"),
        conso_line("200", "SBD", "Tylenol 500 MG Oral Tablet"),
        conso_line("400", "BN", "Tylenol"),
        conso_line("500", "BN", "Panadol"),
    ]
    .concat()
}

fn rel_text() -> String {
    [
        rel_line("300", "has_ingredient", "100", "RXNORM"),
        rel_line("999", "has_ingredient", "100", "RXNORM"),
        rel_line("300", "has_ingredient", "100", "MTHSPL"),
        rel_line("200", "has_tradename", "300", "RXNORM"),
    ]
    .concat()
}

fn sat_text() -> String {
    [
        sat_line("300", "NDC", "0002-1433-80"),
        sat_line("300", "NDC", "00002143380"),
        sat_line("777", "NDC", "12345-678-90"),
        sat_line("300", "DM_SPL_ID", "12345"),
    ]
    .concat()
}

fn sty_text() -> String {
    [
        sty_line("100", "T121", "A1.4.1.1.1", "Pharmacologic Substance"),
        sty_line("100", "T116", "A1.4.1.1", "Amino Acid, Peptide, or Protein"),
        sty_line("300", "T200", "A1.3.3", "Clinical Drug"),
        sty_line("400", "T200", "A1.3.3", "Clinical Drug"),
        sty_line("888", "T121", "A1.4.1.1.1", "Pharmacologic Substance"),
    ]
    .concat()
}

/// Writes a release directory, gzipping the concept extract when asked.
fn release_dir(gzip_conso: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    if gzip_conso {
        let file = std::fs::File::create(dir.path().join("RXNCONSO.RRF.gz")).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(conso_text().as_bytes()).unwrap();
        encoder.finish().unwrap();
    } else {
        std::fs::write(dir.path().join("RXNCONSO.RRF"), conso_text()).unwrap();
    }
    std::fs::write(dir.path().join("RXNREL.RRF"), rel_text()).unwrap();
    std::fs::write(dir.path().join("RXNSAT.RRF"), sat_text()).unwrap();
    std::fs::write(dir.path().join("RXNSTY.RRF"), sty_text()).unwrap();
    dir
}

fn build_into(release: &Path, output: &Path) -> BuildResult {
    let inputs = discover_rrf_files(release).unwrap();
    let options = PipelineOptions::default().with_output_dir(output);
    run_build(&inputs, &options).unwrap()
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

fn output_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

#[test]
fn build_writes_medication_and_product_files() {
    let release = release_dir(false);
    let output = TempDir::new().unwrap();
    let result = build_into(release.path(), output.path());

    assert_eq!(
        read(output.path(), "rxcui_IN_nodes.csv"),
        "rxcui:ID(RXCUI),rxaui,tty,code,sab,generic,brand,:LABEL\n\
         100,A100,IN,100,RXNORM,Acetaminophen,Acetaminophen,RXCUI;IN\n"
    );
    assert_eq!(
        read(output.path(), "rxcui_SCD_nodes.csv"),
        "rxcui:ID(RXCUI),rxaui,tty,code,sab,generic,brand,:LABEL\n\
         300,A300,SCD,300,RXNORM,Acetaminophen 500 MG Oral Tablet,Tylenol 500 MG Oral Tablet,RXCUI;SCD\n"
    );
    assert_eq!(
        read(output.path(), "rxcui_BN_nodes.csv"),
        "rxcui:ID(RXCUI),rxaui,tty,code,sab,brand,:LABEL\n\
         400,A400,BN,400,RXNORM,Tylenol,RXCUI;BN\n\
         500,A500,BN,500,RXNORM,Panadol,RXCUI;BN\n"
    );
    assert!(result.file("rxcui_SBD_nodes.csv").is_none());

    assert_eq!(
        read(output.path(), "ndc_nodes.csv"),
        "ndc:ID(NDC),rxcui,rxaui,brand,:LABEL\n\
         00002143380,300,A300,Acetaminophen 500 MG Oral Tablet,NDC\n\
         12345067890,777,A777,,NDC\n"
    );
    assert_eq!(
        read(output.path(), "ndc_cui_relations.csv"),
        "ndc:START_ID(NDC),rxaui,rxcui:END_ID(RXCUI),:TYPE\n00002143380,A300,300,aka\n"
    );
    assert_eq!(
        result
            .drops
            .count("ndc_nodes.csv", DropReason::DuplicateNdc),
        1
    );
    assert_eq!(
        result
            .drops
            .count("ndc_cui_relations.csv", DropReason::DanglingEndpoint),
        1
    );
}

#[test]
fn build_gates_relationships_on_emitted_nodes() {
    let release = release_dir(false);
    let output = TempDir::new().unwrap();
    let result = build_into(release.path(), output.path());

    assert_eq!(
        read(output.path(), "rel_has_ingredient.csv"),
        "rxcui1:START_ID(RXCUI),rxcui2:END_ID(RXCUI),:TYPE\n300,100,has_ingredient\n"
    );
    assert_eq!(
        result
            .drops
            .count("rel_has_ingredient.csv", DropReason::DanglingEndpoint),
        1
    );

    // The brand was folded into its generic, so the tradename edge has no start node.
    assert_eq!(result.file("rel_has_tradename.csv").unwrap().rows, 0);
    assert_eq!(
        result
            .drops
            .count("rel_has_tradename.csv", DropReason::DanglingEndpoint),
        1
    );
    assert_eq!(result.file("rel_consists_of.csv").unwrap().rows, 0);
    assert_eq!(result.file("rel_contains.csv").unwrap().rows, 0);
}

#[test]
fn build_writes_semantic_types_and_hierarchy() {
    let release = release_dir(false);
    let output = TempDir::new().unwrap();
    let result = build_into(release.path(), output.path());

    assert_eq!(
        read(output.path(), "tui_semantic_types_nodes.csv"),
        "stn,tui:ID(STY),sty,reference_count,:LABEL\n\
         A1.3.3,T200,Clinical Drug,2,STY\n\
         A1.4.1.1,T116,\"Amino Acid, Peptide, or Protein\",1,STY\n\
         A1.4.1.1.1,T121,Pharmacologic Substance,2,STY\n"
    );
    assert_eq!(
        read(output.path(), "rel_sty_isa.csv"),
        "tui:START_ID(STY),parent_tui:END_ID(STY),:TYPE\nT121,T116,isa\n"
    );
    assert_eq!(result.file("rel_has_semantic_type.csv").unwrap().rows, 4);
    assert_eq!(
        result
            .drops
            .count("rel_has_semantic_type.csv", DropReason::DanglingEndpoint),
        1
    );
    assert_eq!(
        result
            .drops
            .count("rel_sty_isa.csv", DropReason::MissingParentType),
        2
    );
}

/// Splits an `name:ID(SPACE)` style header into its kind and id space.
fn id_field(header: &str) -> Option<(&str, &str)> {
    let (_, field) = header.split_once(':')?;
    let (kind, space) = field.split_once('(')?;
    Some((kind, space.strip_suffix(')')?))
}

#[test]
fn every_relationship_endpoint_resolves_to_a_unique_node() {
    let release = release_dir(false);
    let output = TempDir::new().unwrap();
    build_into(release.path(), output.path());

    let files: Vec<PathBuf> = output_files(output.path())
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    assert!(!files.is_empty());

    let mut ids: HashMap<String, HashSet<String>> = HashMap::new();
    let mut endpoints: Vec<(String, String, String)> = Vec::new();
    for path in &files {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().clone();
        for record in reader.records() {
            let record = record.unwrap();
            for (header, value) in headers.iter().zip(record.iter()) {
                match id_field(header) {
                    Some(("ID", space)) => {
                        let fresh = ids
                            .entry(space.to_string())
                            .or_default()
                            .insert(value.to_string());
                        assert!(fresh, "{name}: duplicate {space} id {value}");
                    }
                    Some(("START_ID" | "END_ID", space)) => {
                        endpoints.push((name.clone(), space.to_string(), value.to_string()));
                    }
                    _ => {}
                }
            }
        }
    }

    assert_eq!(ids["RXCUI"].len(), 4);
    assert_eq!(ids["NDC"].len(), 2);
    assert_eq!(ids["STY"].len(), 3);
    assert!(
        endpoints
            .iter()
            .any(|(name, _, _)| name == "rel_has_semantic_type.csv")
    );
    for (name, space, value) in &endpoints {
        let known = ids.get(space).is_some_and(|set| set.contains(value));
        assert!(known, "{name}: {space} endpoint {value} has no node");
    }
}

#[test]
fn report_lists_files_drops_and_import_arguments() {
    let release = release_dir(false);
    let output = TempDir::new().unwrap();
    let result = build_into(release.path(), output.path());

    assert_eq!(result.report_path, output.path().join(REPORT_FILE));
    let report = read_report(&result.report_path).unwrap();
    assert_eq!(report, result.report);
    assert_eq!(report.files.len(), result.files.len());
    assert_eq!(
        report.drops.iter().map(|entry| entry.count).sum::<usize>(),
        result.drops.total()
    );

    let node_args: Vec<&str> = report
        .import_args
        .iter()
        .filter(|arg| arg.starts_with("--nodes="))
        .map(String::as_str)
        .collect();
    assert_eq!(
        node_args,
        vec![
            "--nodes=ndc_nodes.csv",
            "--nodes=tui_semantic_types_nodes.csv",
            "--nodes=rxcui_BN_nodes.csv",
            "--nodes=rxcui_IN_nodes.csv",
            "--nodes=rxcui_SCD_nodes.csv",
        ]
    );
    let relationship_files = report
        .files
        .iter()
        .filter(|file| file.kind == FileKind::Relationships)
        .count();
    assert_eq!(
        report
            .import_args
            .iter()
            .filter(|arg| arg.starts_with("--relationships="))
            .count(),
        relationship_files
    );
}

#[test]
fn gzip_input_matches_plain_input() {
    let plain = release_dir(false);
    let gzip = release_dir(true);
    let plain_out = TempDir::new().unwrap();
    let gzip_out = TempDir::new().unwrap();

    build_into(plain.path(), plain_out.path());
    build_into(gzip.path(), gzip_out.path());

    for name in ["rxcui_IN_nodes.csv", "ndc_nodes.csv", REPORT_FILE] {
        assert_eq!(
            read(plain_out.path(), name),
            read(gzip_out.path(), name),
            "{name}"
        );
    }
}

#[test]
fn rerun_from_snapshots_is_byte_identical() {
    let release = release_dir(true);
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    build_into(release.path(), first.path());
    assert!(release.path().join("RXNCONSO.RRF.feather").is_file());
    build_into(release.path(), second.path());

    let first_files = output_files(first.path());
    let second_files = output_files(second.path());
    assert_eq!(first_files.len(), second_files.len());
    for (left, right) in first_files.iter().zip(&second_files) {
        assert_eq!(left.file_name(), right.file_name());
        assert_eq!(
            std::fs::read(left).unwrap(),
            std::fs::read(right).unwrap(),
            "{}",
            left.display()
        );
    }
}

#[test]
fn compressed_build_writes_gz_files() {
    let release = release_dir(false);
    let output = TempDir::new().unwrap();
    let inputs = discover_rrf_files(release.path()).unwrap();
    let options = PipelineOptions::default()
        .with_output_dir(output.path())
        .with_compress(true)
        .with_snapshots(false);

    let result = run_build(&inputs, &options).unwrap();

    assert!(result.files.iter().all(|file| file.file_name().ends_with(".csv.gz")));
    assert!(output.path().join("ndc_nodes.csv.gz").is_file());
    assert!(!release.path().join("RXNCONSO.feather").exists());
    assert!(
        result
            .report
            .import_args
            .contains(&"--nodes=ndc_nodes.csv.gz".to_string())
    );
}

#[test]
fn missing_inputs_are_reported_together() {
    let release = TempDir::new().unwrap();
    std::fs::write(release.path().join("RXNCONSO.RRF"), conso_text()).unwrap();
    let inputs = RrfInputs::new(
        release.path().join("RXNCONSO.RRF"),
        release.path().join("RXNREL.RRF"),
        release.path().join("RXNSAT.RRF"),
        release.path().join("RXNSTY.RRF"),
    );
    let output = TempDir::new().unwrap();
    let options = PipelineOptions::default().with_output_dir(output.path());

    let err = run_build(&inputs, &options).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("RXNREL.RRF"), "{message}");
    assert!(message.contains("RXNSAT.RRF"), "{message}");
    assert!(message.contains("RXNSTY.RRF"), "{message}");
    assert!(output_files(output.path()).is_empty());
}
