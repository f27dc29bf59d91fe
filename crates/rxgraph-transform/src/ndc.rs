//! National Drug Code normalization.

/// Expected widths of the labeler, product and package segments.
const SEGMENT_WIDTHS: [usize; 3] = [5, 4, 2];

/// Length of a normalized code.
pub const NDC_LENGTH: usize = 11;

/// Canonicalizes a product code to 11 ASCII digits.
///
/// Every character other than a digit or hyphen is removed. Hyphenated codes
/// are split into segments fitted to widths 5, 4 and 2: short segments are
/// zero-padded on the left, long ones keep their rightmost digits (this loses
/// information, so `123456-1-1` and `23456-1-1` collide). Segments past the
/// third are appended unchanged. The joined digits are zero-padded to 11 or
/// cut to their rightmost 11.
///
/// ```
/// use rxgraph_transform::normalize_ndc;
///
/// assert_eq!(normalize_ndc("12345-6789-01"), "12345678901");
/// assert_eq!(normalize_ndc("123-45-6"), "00123004506");
/// assert_eq!(normalize_ndc("(0002) 1433 80"), "00002143380");
/// ```
pub fn normalize_ndc(code: &str) -> String {
    let cleaned: String = code
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    let joined = if cleaned.contains('-') {
        cleaned
            .split('-')
            .enumerate()
            .map(|(idx, segment)| match SEGMENT_WIDTHS.get(idx) {
                Some(width) => fit_segment(segment, *width),
                None => segment.to_string(),
            })
            .collect::<String>()
    } else {
        cleaned
    };

    let digits: String = joined.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > NDC_LENGTH {
        digits[digits.len() - NDC_LENGTH..].to_string()
    } else {
        format!("{digits:0>width$}", width = NDC_LENGTH)
    }
}

fn fit_segment(segment: &str, width: usize) -> String {
    if segment.len() > width {
        segment[segment.len() - width..].to_string()
    } else {
        format!("{segment:0>width$}")
    }
}
