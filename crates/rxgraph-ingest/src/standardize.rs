//! Column-name standardization.

use polars::prelude::DataFrame;
use rxgraph_common::column_names;

use crate::error::Result;

/// Normalizes a column name to lower snake case.
///
/// Rules are applied in order: trim; whitespace runs, hyphen runs and the
/// characters `/ \ .` become `_`; `#` becomes `num`; `( )` and `! @ $ % ^ & *`
/// are removed; underscore runs collapse to one; the result is lower-cased.
///
/// ```
/// use rxgraph_ingest::standardize_column_name;
///
/// assert_eq!(standardize_column_name("  RXCUI 1 "), "rxcui_1");
/// assert_eq!(standardize_column_name("Code #"), "code_num");
/// assert_eq!(standardize_column_name("a - b/(c)"), "a_b_c");
/// ```
pub fn standardize_column_name(name: &str) -> String {
    let mut replaced = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        match ch {
            c if c.is_whitespace() => replaced.push('_'),
            '-' | '/' | '\\' | '.' => replaced.push('_'),
            '#' => replaced.push_str("num"),
            '(' | ')' | '!' | '@' | '$' | '%' | '^' | '&' | '*' => {}
            c => replaced.push(c),
        }
    }

    let mut collapsed = String::with_capacity(replaced.len());
    for ch in replaced.chars() {
        if ch == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed.to_lowercase()
}

/// Renames every column of `df` to its standardized form.
pub fn standardize_columns(df: &mut DataFrame) -> Result<()> {
    for name in column_names(df) {
        let standardized = standardize_column_name(&name);
        if standardized != name {
            df.rename(&name, standardized.into())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_standard_names_unchanged() {
        assert_eq!(standardize_column_name("rxcui"), "rxcui");
        assert_eq!(standardize_column_name("suppress"), "suppress");
    }

    #[test]
    fn test_whitespace_and_hyphen_runs() {
        assert_eq!(standardize_column_name("Source  Abbrev"), "source_abbrev");
        assert_eq!(standardize_column_name("term--type"), "term_type");
        assert_eq!(standardize_column_name("a - b"), "a_b");
    }

    #[test]
    fn test_separators_and_symbols() {
        assert_eq!(standardize_column_name("atn.value"), "atn_value");
        assert_eq!(standardize_column_name(r"a\b"), "a_b");
        assert_eq!(standardize_column_name("Dose (mg)"), "dose_mg");
        assert_eq!(standardize_column_name("cost$%!"), "cost");
        assert_eq!(standardize_column_name("#REF"), "numref");
    }

    #[test]
    fn test_underscores_collapse() {
        assert_eq!(standardize_column_name("a___b"), "a_b");
        assert_eq!(standardize_column_name("a_*_b"), "a_b");
    }
}
