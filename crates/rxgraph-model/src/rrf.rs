//! RRF table kinds and their fixed column schemas.

use std::fmt;

use serde::{Deserialize, Serialize};

const CONSO_HEADERS: &[&str] = &[
    "rxcui", "lat", "ts", "lui", "stt", "sui", "ispref", "rxaui", "saui", "scui", "sdui", "sab",
    "tty", "code", "str", "srl", "suppress", "cvf",
];

const REL_HEADERS: &[&str] = &[
    "rxcui1", "rxaui1", "stype1", "rel", "rxcui2", "rxaui2", "stype2", "rela", "rui", "srui",
    "sab", "sl", "dir", "rg", "suppress", "cvf",
];

const SAT_HEADERS: &[&str] = &[
    "rxcui", "lui", "sui", "rxaui", "stype", "code", "atui", "satui", "atn", "sab", "atv",
    "suppress", "cvf",
];

const STY_HEADERS: &[&str] = &["rxcui", "tui", "stn", "sty", "atui", "cvf"];

/// One of the four RRF extracts consumed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RrfKind {
    /// Concept names and sources (RXNCONSO).
    Concept,
    /// Inter-concept relations (RXNREL).
    Relation,
    /// Simple concept and atom attributes (RXNSAT).
    Attribute,
    /// Semantic types (RXNSTY).
    SemanticType,
}

impl RrfKind {
    pub const ALL: [RrfKind; 4] = [
        RrfKind::Concept,
        RrfKind::Relation,
        RrfKind::Attribute,
        RrfKind::SemanticType,
    ];

    /// Column names in file order, already standardized.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            RrfKind::Concept => CONSO_HEADERS,
            RrfKind::Relation => REL_HEADERS,
            RrfKind::Attribute => SAT_HEADERS,
            RrfKind::SemanticType => STY_HEADERS,
        }
    }

    /// File name used by the RxNorm release, without compression suffix.
    pub fn file_name(self) -> &'static str {
        match self {
            RrfKind::Concept => "RXNCONSO.RRF",
            RrfKind::Relation => "RXNREL.RRF",
            RrfKind::Attribute => "RXNSAT.RRF",
            RrfKind::SemanticType => "RXNSTY.RRF",
        }
    }

    /// Short table name used in log fields and error messages.
    pub fn table_name(self) -> &'static str {
        match self {
            RrfKind::Concept => "conso",
            RrfKind::Relation => "rel",
            RrfKind::Attribute => "sat",
            RrfKind::SemanticType => "sty",
        }
    }
}

impl fmt::Display for RrfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_schema_has_eighteen_columns() {
        let headers = RrfKind::Concept.headers();
        assert_eq!(headers.len(), 18);
        assert_eq!(headers[0], "rxcui");
        assert_eq!(headers[14], "str");
    }

    #[test]
    fn file_names_match_release_layout() {
        let names: Vec<_> = RrfKind::ALL.iter().map(|kind| kind.file_name()).collect();
        assert_eq!(
            names,
            vec!["RXNCONSO.RRF", "RXNREL.RRF", "RXNSAT.RRF", "RXNSTY.RRF"]
        );
    }
}
