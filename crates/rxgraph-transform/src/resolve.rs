//! Merging of generic and brand concepts into medication entities.
//!
//! Generic concepts (ingredients and clinical drugs) are joined to their
//! brand concepts through the tradename relation. A generic with several
//! brands fans out into several rows; the first keeps the generic CUI and
//! each later row is re-keyed to its brand CUI, so every final row has a
//! distinct CUI. Brand concepts never reached by that join are kept in a
//! separate standalone set.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use rxgraph_common::{text_column, text_frame};
use rxgraph_model::{DropLog, DropReason, ResolutionOptions};

use crate::error::{Result, require_columns};

const STAGE: &str = "resolve";

/// Columns read from the concept table.
pub const CONCEPT_COLUMNS: [&str; 7] = ["rxcui", "rxaui", "tty", "code", "sab", "str", "suppress"];

/// Columns of [`ResolvedEntities::merged`].
pub const MERGED_COLUMNS: [&str; 8] = [
    "rxcui",
    "rxaui",
    "tty",
    "code",
    "sab",
    "generic",
    "brand_rxcui",
    "brand",
];

/// Columns of [`ResolvedEntities::standalone`].
pub const STANDALONE_COLUMNS: [&str; 6] = ["rxcui", "rxaui", "tty", "code", "sab", "brand"];

/// Output of [`resolve_entities`].
#[derive(Debug, Clone)]
pub struct ResolvedEntities {
    /// Generic concepts with their brand, one row per CUI.
    pub merged: DataFrame,
    /// Brand concepts with no generic counterpart, one row per CUI.
    pub standalone: DataFrame,
}

impl ResolvedEntities {
    /// Every CUI that becomes a medication node.
    pub fn medication_ids(&self) -> Result<BTreeSet<String>> {
        let mut ids = BTreeSet::new();
        for df in [&self.merged, &self.standalone] {
            ids.extend(text_column(df, "rxcui")?.into_iter().flatten());
        }
        Ok(ids)
    }
}

/// Concept rows in column-major form.
struct ConceptRows {
    rxcui: Vec<Option<String>>,
    rxaui: Vec<Option<String>>,
    tty: Vec<Option<String>>,
    code: Vec<Option<String>>,
    sab: Vec<Option<String>>,
    name: Vec<Option<String>>,
    suppress: Vec<Option<String>>,
}

impl ConceptRows {
    fn read(conso: &DataFrame) -> Result<Self> {
        Ok(Self {
            rxcui: text_column(conso, "rxcui")?,
            rxaui: text_column(conso, "rxaui")?,
            tty: text_column(conso, "tty")?,
            code: text_column(conso, "code")?,
            sab: text_column(conso, "sab")?,
            name: text_column(conso, "str")?,
            suppress: text_column(conso, "suppress")?,
        })
    }

    fn len(&self) -> usize {
        self.rxcui.len()
    }

    /// Rows whose TTY equals `tty` or starts with `prefix` and that are not suppressed.
    fn select(&self, tty: &str, prefix: &str, not_suppressed: &str) -> Vec<usize> {
        (0..self.len())
            .filter(|&idx| {
                let matches_tty = self.tty[idx]
                    .as_deref()
                    .is_some_and(|value| value == tty || value.starts_with(prefix));
                matches_tty && self.suppress[idx].as_deref() == Some(not_suppressed)
            })
            .collect()
    }
}

/// One generic row after the tradename join.
#[derive(Debug, Clone)]
struct MergedRow {
    concept: usize,
    rxcui: Option<String>,
    brand_rxcui: Option<String>,
    brand: Option<String>,
}

/// Merges generic and brand concepts.
///
/// `tradenames` is the relationship map of the tradename relation, where
/// `rxcui2` is the generic concept and `rxcui1` its brand.
pub fn resolve_entities(
    conso: &DataFrame,
    tradenames: &DataFrame,
    options: &ResolutionOptions,
    log: &mut DropLog,
) -> Result<ResolvedEntities> {
    require_columns(conso, "conso", &CONCEPT_COLUMNS)?;
    require_columns(
        tradenames,
        &options.tradename_relation,
        &["rxcui1", "rxcui2"],
    )?;

    let concepts = ConceptRows::read(conso)?;
    let generic = concepts.select(
        &options.ingredient_tty,
        &options.clinical_drug_prefix,
        &options.not_suppressed_flag,
    );
    let brand = concepts.select(
        &options.brand_name_tty,
        &options.branded_drug_prefix,
        &options.not_suppressed_flag,
    );

    let mut brand_names: BTreeMap<&str, &str> = BTreeMap::new();
    for &idx in &brand {
        if let (Some(cui), Some(name)) = (&concepts.rxcui[idx], &concepts.name[idx]) {
            brand_names.entry(cui.as_str()).or_insert(name.as_str());
        }
    }

    let mut brands_of: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let brand_cuis = text_column(tradenames, "rxcui1")?;
    let generic_cuis = text_column(tradenames, "rxcui2")?;
    for (brand_cui, generic_cui) in brand_cuis.into_iter().zip(generic_cuis) {
        if let (Some(brand_cui), Some(generic_cui)) = (brand_cui, generic_cui) {
            brands_of.entry(generic_cui).or_default().push(brand_cui);
        }
    }

    // Left join: generics without a tradename keep one row with no brand CUI.
    let mut joined = Vec::with_capacity(generic.len());
    let mut reached_brands = BTreeSet::new();
    for &idx in &generic {
        let rxcui = concepts.rxcui[idx].clone();
        let matches = rxcui.as_ref().and_then(|cui| brands_of.get(cui));
        match matches {
            Some(brand_list) => {
                for brand_cui in brand_list {
                    reached_brands.insert(brand_cui.clone());
                    joined.push(MergedRow {
                        concept: idx,
                        rxcui: rxcui.clone(),
                        brand_rxcui: Some(brand_cui.clone()),
                        brand: brand_names
                            .get(brand_cui.as_str())
                            .map(|name| (*name).to_string()),
                    });
                }
            }
            None => joined.push(MergedRow {
                concept: idx,
                rxcui: rxcui.clone(),
                brand_rxcui: None,
                brand: None,
            }),
        }
    }
    let joined_rows = joined.len();

    for row in &mut joined {
        if row.brand.is_none() {
            row.brand = concepts.name[row.concept].clone();
        }
    }

    let merged = dedupe_merged(joined, log);
    tracing::info!(
        generic = generic.len(),
        joined = joined_rows,
        merged = merged.len(),
        "generic concepts merged with brands"
    );

    let generic_ids: BTreeSet<&str> = generic
        .iter()
        .filter_map(|&idx| concepts.rxcui[idx].as_deref())
        .collect();
    let merged_ids: BTreeSet<&str> = merged
        .iter()
        .filter_map(|row| row.rxcui.as_deref())
        .collect();

    let mut standalone = Vec::new();
    let mut seen = BTreeSet::new();
    let mut duplicate_standalone = 0usize;
    for &idx in &brand {
        if concepts.sab[idx].as_deref() != Some(options.trusted_source.as_str()) {
            continue;
        }
        let Some(cui) = concepts.rxcui[idx].as_deref() else {
            continue;
        };
        if reached_brands.contains(cui) || generic_ids.contains(cui) || merged_ids.contains(cui) {
            continue;
        }
        if seen.insert(cui) {
            standalone.push(idx);
        } else {
            duplicate_standalone += 1;
        }
    }
    log.record(
        STAGE,
        "standalone",
        DropReason::DuplicateId,
        duplicate_standalone,
    );
    tracing::info!(standalone = standalone.len(), "standalone brand concepts");

    Ok(ResolvedEntities {
        merged: merged_frame(&concepts, &merged)?,
        standalone: standalone_frame(&concepts, &standalone)?,
    })
}

/// Applies the duplicate, substitution and collision rules to joined rows.
fn dedupe_merged(joined: Vec<MergedRow>, log: &mut DropLog) -> Vec<MergedRow> {
    let mut pairs = BTreeSet::new();
    let mut unique = Vec::with_capacity(joined.len());
    let mut duplicate_pairs = 0usize;
    for row in joined {
        if pairs.insert((row.rxcui.clone(), row.brand_rxcui.clone())) {
            unique.push(row);
        } else {
            duplicate_pairs += 1;
        }
    }
    log.record(
        STAGE,
        "merged",
        DropReason::DuplicateTradename,
        duplicate_pairs,
    );

    let mut groups_seen = BTreeSet::new();
    let mut substituted = Vec::with_capacity(unique.len());
    let mut missing_brand = 0usize;
    let mut substitutions = 0usize;
    for mut row in unique {
        if groups_seen.insert(row.rxcui.clone()) {
            substituted.push(row);
            continue;
        }
        match row.brand_rxcui.clone() {
            Some(brand_cui) => {
                row.rxcui = Some(brand_cui);
                substitutions += 1;
                substituted.push(row);
            }
            None => missing_brand += 1,
        }
    }
    log.record(
        STAGE,
        "merged",
        DropReason::MissingBrandConcept,
        missing_brand,
    );
    tracing::info!(
        substituted = substitutions,
        "later rows re-keyed to brand concepts"
    );

    let mut ids_seen = BTreeSet::new();
    let mut merged = Vec::with_capacity(substituted.len());
    let mut collisions = 0usize;
    for row in substituted {
        if ids_seen.insert(row.rxcui.clone()) {
            merged.push(row);
        } else {
            collisions += 1;
        }
    }
    log.record(STAGE, "merged", DropReason::ConceptCollision, collisions);
    merged
}

fn merged_frame(concepts: &ConceptRows, rows: &[MergedRow]) -> Result<DataFrame> {
    let pick = |values: &[Option<String>]| -> Vec<Option<String>> {
        rows.iter().map(|row| values[row.concept].clone()).collect()
    };
    let columns = vec![
        rows.iter().map(|row| row.rxcui.clone()).collect(),
        pick(&concepts.rxaui),
        pick(&concepts.tty),
        pick(&concepts.code),
        pick(&concepts.sab),
        pick(&concepts.name),
        rows.iter().map(|row| row.brand_rxcui.clone()).collect(),
        rows.iter().map(|row| row.brand.clone()).collect(),
    ];
    Ok(text_frame(
        MERGED_COLUMNS
            .iter()
            .map(|name| (*name).to_string())
            .zip(columns)
            .collect(),
    )?)
}

fn standalone_frame(concepts: &ConceptRows, rows: &[usize]) -> Result<DataFrame> {
    let pick = |values: &[Option<String>]| -> Vec<Option<String>> {
        rows.iter().map(|&idx| values[idx].clone()).collect()
    };
    let columns = vec![
        pick(&concepts.rxcui),
        pick(&concepts.rxaui),
        pick(&concepts.tty),
        pick(&concepts.code),
        pick(&concepts.sab),
        pick(&concepts.name),
    ];
    Ok(text_frame(
        STANDALONE_COLUMNS
            .iter()
            .map(|name| (*name).to_string())
            .zip(columns)
            .collect(),
    )?)
}
