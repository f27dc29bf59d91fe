//! Projection of the relation table to typed edge candidates.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use rxgraph_common::{filter_rows, text_column};

use crate::error::{Result, require_columns};

/// Column carrying the relationship type in import files.
pub const TYPE_COLUMN: &str = ":TYPE";

const RELATION_COLUMNS: [&str; 4] = ["rxcui1", "rxaui1", "rxcui2", "rxaui2"];

/// Rows of `rel` with `rela == rela_type` from `trusted_source`.
///
/// The result holds `rxcui1, rxaui1, rxcui2, rxaui2, :TYPE`.
pub fn relationship_map(
    rel: &DataFrame,
    rela_type: &str,
    trusted_source: &str,
) -> Result<DataFrame> {
    require_columns(
        rel,
        "rel",
        &["rxcui1", "rxaui1", "rxcui2", "rxaui2", "rela", "sab"],
    )?;

    let rela = text_column(rel, "rela")?;
    let sab = text_column(rel, "sab")?;
    let keep: Vec<bool> = rela
        .iter()
        .zip(&sab)
        .map(|(rela, sab)| {
            rela.as_deref() == Some(rela_type) && sab.as_deref() == Some(trusted_source)
        })
        .collect();

    let mut projected = filter_rows(rel, &keep)?
        .select(RELATION_COLUMNS.iter().copied().chain(["rela"]))?;
    projected.rename("rela", TYPE_COLUMN.into())?;

    tracing::debug!(
        rela = rela_type,
        rows = projected.height(),
        "relationship map"
    );
    Ok(projected)
}

/// Builds one relationship map per type, keyed by type.
pub fn relationship_maps(
    rel: &DataFrame,
    rela_types: &[String],
    trusted_source: &str,
) -> Result<BTreeMap<String, DataFrame>> {
    let mut maps = BTreeMap::new();
    for rela_type in rela_types {
        let map = relationship_map(rel, rela_type, trusted_source)?;
        maps.insert(rela_type.clone(), map);
    }
    tracing::info!(types = maps.len(), "relationship maps built");
    Ok(maps)
}
